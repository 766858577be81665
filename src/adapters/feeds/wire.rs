//! Price update wire format.
//!
//! Both the WebSocket and the SSE endpoints carry the same JSON body per
//! message: `{"ticker":"APPLE","price":151}`. Malformed bodies are
//! decode failures; well-formed updates for an unknown ticker or with an
//! unusable price are dropped here so they never reach the supervisor.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::ticker::{PriceEvent, Ticker, UnknownTicker};
use crate::ports::price_feed::FeedError;

#[derive(Debug, Deserialize)]
struct WirePriceUpdate {
    ticker: String,
    price: f64,
}

/// Why a well-formed update was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Discard {
    UnknownTicker(String),
    InvalidPrice { ticker: Ticker, price: f64 },
}

/// Outcome of decoding one message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Event(PriceEvent),
    Discarded(Discard),
}

/// Decode a single message body.
pub fn decode_price_update(text: &str) -> Result<Decoded, FeedError> {
    let msg: WirePriceUpdate =
        serde_json::from_str(text).map_err(|e| FeedError::Decode(e.to_string()))?;

    let ticker = match msg.ticker.parse::<Ticker>() {
        Ok(t) => t,
        Err(UnknownTicker(symbol)) => return Ok(Decoded::Discarded(Discard::UnknownTicker(symbol))),
    };

    Ok(PriceEvent::new(ticker, msg.price).map_or(
        Decoded::Discarded(Discard::InvalidPrice {
            ticker,
            price: msg.price,
        }),
        Decoded::Event,
    ))
}

/// Decode a message for a session: discards are logged and skipped.
///
/// Returns `None` when the message was dropped.
pub fn decode_frame(text: &str) -> Option<Result<PriceEvent, FeedError>> {
    match decode_price_update(text) {
        Ok(Decoded::Event(event)) => Some(Ok(event)),
        Ok(Decoded::Discarded(Discard::UnknownTicker(symbol))) => {
            warn!(symbol = %symbol, "Dropping price update for unknown ticker");
            None
        }
        Ok(Decoded::Discarded(Discard::InvalidPrice { ticker, price })) => {
            debug!(ticker = %ticker, price, "Dropping price update with unusable price");
            None
        }
        Err(e) => Some(Err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_integer_and_fractional_prices() {
        let d = decode_price_update(r#"{"ticker":"APPLE","price":151}"#).unwrap();
        assert_eq!(d, Decoded::Event(PriceEvent::new(Ticker::Apple, 151.0).unwrap()));

        let d = decode_price_update(r#"{"ticker":"MICROSOFT","price":180.25}"#).unwrap();
        assert_eq!(d, Decoded::Event(PriceEvent::new(Ticker::Microsoft, 180.25).unwrap()));
    }

    #[test]
    fn test_unknown_ticker_is_discarded_not_relabeled() {
        let d = decode_price_update(r#"{"ticker":"TESLA","price":200}"#).unwrap();
        assert_eq!(d, Decoded::Discarded(Discard::UnknownTicker("TESLA".into())));
        assert!(decode_frame(r#"{"ticker":"UNKNOWN","price":200}"#).is_none());
    }

    #[test]
    fn test_non_positive_prices_are_discarded() {
        for body in [
            r#"{"ticker":"AMAZON","price":0}"#,
            r#"{"ticker":"AMAZON","price":-12.5}"#,
        ] {
            assert!(matches!(
                decode_price_update(body).unwrap(),
                Decoded::Discarded(Discard::InvalidPrice { ticker: Ticker::Amazon, .. })
            ));
            assert!(decode_frame(body).is_none());
        }
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        for body in ["not json", r#"{"ticker":"APPLE"}"#, r#"{"price":5}"#, r#"{"ticker":"APPLE","price":"x"}"#] {
            assert!(matches!(decode_price_update(body), Err(FeedError::Decode(_))), "{body}");
            assert!(matches!(decode_frame(body), Some(Err(FeedError::Decode(_)))));
        }
    }
}

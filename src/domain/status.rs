//! Connection status of the streaming price feed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Health of the supervised price stream.
///
/// `Disconnected` is only ever reached through a deliberate shutdown;
/// transport failures always route through `Reconnecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Live,
    Reconnecting,
    #[default]
    Disconnected,
}

/// Presentation severity for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warn,
    Danger,
}

impl ConnectionStatus {
    pub const ALL: [Self; 4] = [Self::Connecting, Self::Live, Self::Reconnecting, Self::Disconnected];

    /// Upper-case badge label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::Connecting => "CONNECTING",
            Self::Reconnecting => "RECONNECTING",
            Self::Disconnected => "DISCONNECTED",
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::Live => Severity::Success,
            Self::Connecting => Severity::Info,
            Self::Reconnecting => Severity::Warn,
            Self::Disconnected => Severity::Danger,
        }
    }

    /// Lower-case name, used as a metrics label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Live => "live",
            Self::Reconnecting => "reconnecting",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

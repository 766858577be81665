//! Integration Tests - Price Board and End-to-end Snapshot Flow
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;

use mockall::mock;
use mockall::predicate::*;

use stock_feed_client::adapters::feeds::{ReplayScript, ReplayStep, ReplayTransport};
use stock_feed_client::domain::account::{Holding, TradeAction, TradeRequest, TradeResponse, UserInformation};
use stock_feed_client::domain::organization::{Department, Employee};
use stock_feed_client::domain::status::ConnectionStatus;
use stock_feed_client::domain::ticker::{PriceSnapshot, Ticker, TickerMap};
use stock_feed_client::ports::directory::DirectoryApi;
use stock_feed_client::ports::price_feed::PriceTransport;
use stock_feed_client::ports::trading_api::TradingApi;
use stock_feed_client::usecases::{NoticeLevel, PriceBoard, SnapshotEvent, SnapshotFeed, StreamSupervisor};

// ---- Mock Definitions ----

mock! {
    pub Trading {}

    #[async_trait::async_trait]
    impl TradingApi for Trading {
        async fn user_information(&self, user_id: u32) -> anyhow::Result<UserInformation>;
        async fn trade(&self, request: &TradeRequest) -> anyhow::Result<TradeResponse>;
    }
}

mock! {
    pub Directory {}

    #[async_trait::async_trait]
    impl DirectoryApi for Directory {
        async fn employee(&self, id: u32) -> anyhow::Result<Employee>;
        async fn department(&self, id: u32) -> anyhow::Result<Department>;
    }
}

// ---- Fixtures ----

fn user(holdings: Vec<Holding>) -> UserInformation {
    UserInformation {
        user_id: Some(7),
        name: "Sam".to_string(),
        balance: 10_000.0,
        holdings,
        employee_id: Some(11),
        department_id: Some(3),
    }
}

fn department() -> Department {
    Department {
        id: 3,
        department_code: "EQUITY".to_string(),
        department_name: "Equity Trading".to_string(),
        location: Some("London".to_string()),
        active: true,
    }
}

fn employee() -> Employee {
    Employee {
        id: 11,
        first_name: "Sam".to_string(),
        last_name: "Rivera".to_string(),
        email: "sam.rivera@example.com".to_string(),
        department: None,
    }
}

fn snapshot(prices: [f64; 4]) -> PriceSnapshot {
    PriceSnapshot::new(TickerMap::from_fn(|t| prices[t.index()]))
}

fn board(trading: MockTrading, directory: MockDirectory) -> PriceBoard<MockTrading, MockDirectory> {
    PriceBoard::new(Arc::new(trading), Arc::new(directory), 7)
}

fn empty_directory() -> MockDirectory {
    let mut directory = MockDirectory::new();
    directory.expect_employee().returning(|_| Ok(employee()));
    directory.expect_department().returning(|_| Ok(department()));
    directory
}

// ---- User loading ----

#[tokio::test]
async fn test_refresh_user_loads_directory_records() {
    let mut trading = MockTrading::new();
    trading
        .expect_user_information()
        .with(eq(7))
        .times(1)
        .returning(|_| Ok(user(vec![])));

    let mut directory = MockDirectory::new();
    directory.expect_employee().with(eq(11)).times(1).returning(|_| Ok(employee()));
    directory.expect_department().with(eq(3)).times(1).returning(|_| Ok(department()));

    let mut board = board(trading, directory);
    assert!(board.refresh_user().await.is_none());

    assert_eq!(board.user().map(|u| u.name.as_str()), Some("Sam"));
    assert_eq!(board.employee().map(Employee::full_name).as_deref(), Some("Sam Rivera"));
    assert_eq!(board.department().map(|d| d.department_code.as_str()), Some("EQUITY"));
}

#[tokio::test]
async fn test_refresh_user_failure_clears_everything() {
    let mut trading = MockTrading::new();
    let mut calls = 0;
    trading.expect_user_information().times(2).returning(move |_| {
        calls += 1;
        if calls == 1 {
            Ok(user(vec![]))
        } else {
            Err(anyhow::anyhow!("API error 500 Internal Server Error"))
        }
    });

    let mut board = board(trading, empty_directory());
    assert!(board.refresh_user().await.is_none());
    assert!(board.employee().is_some());

    let notice = board.refresh_user().await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.summary, "User Load Failed");
    assert_eq!(notice.detail, "User 7 not found or server error.");
    assert!(board.user().is_none());
    assert!(board.employee().is_none());
    assert!(board.department().is_none());
}

#[tokio::test]
async fn test_directory_failure_only_clears_that_record() {
    let mut trading = MockTrading::new();
    trading.expect_user_information().returning(|_| Ok(user(vec![])));

    let mut directory = MockDirectory::new();
    directory
        .expect_employee()
        .returning(|_| Err(anyhow::anyhow!("API error 404 Not Found")));
    directory.expect_department().returning(|_| Ok(department()));

    let mut board = board(trading, directory);
    assert!(board.refresh_user().await.is_none());
    assert!(board.user().is_some());
    assert!(board.employee().is_none());
    assert!(board.department().is_some());
}

#[tokio::test]
async fn test_user_without_directory_links_skips_lookups() {
    let mut trading = MockTrading::new();
    trading.expect_user_information().returning(|_| {
        Ok(UserInformation {
            employee_id: None,
            department_id: None,
            ..user(vec![])
        })
    });

    let mut directory = MockDirectory::new();
    directory.expect_employee().never();
    directory.expect_department().never();

    let mut board = board(trading, directory);
    assert!(board.refresh_user().await.is_none());
    assert!(board.employee().is_none());
}

// ---- Valuation ----

#[tokio::test]
async fn test_portfolio_value_uses_known_prices() {
    let mut trading = MockTrading::new();
    trading.expect_user_information().returning(|_| {
        Ok(user(vec![
            Holding { ticker: Ticker::Apple, quantity: 2 },
            Holding { ticker: Ticker::Google, quantity: 1 },
        ]))
    });

    let mut board = board(trading, empty_directory());
    assert!((board.portfolio_value() - 0.0).abs() < f64::EPSILON);

    board.refresh_user().await;
    // No prices yet: holdings count as zero.
    assert!((board.portfolio_value() - 10_000.0).abs() < 1e-9);

    board.apply_snapshot(&snapshot([150.0, 130.0, 140.0, 300.0]));
    assert!((board.portfolio_value() - 10_440.0).abs() < 1e-9);

    let held = board.holdings_by_ticker();
    assert_eq!(*held.get(Ticker::Apple), 2);
    assert_eq!(*held.get(Ticker::Amazon), 0);
}

#[test]
fn test_on_status_dedupes_and_warns_on_reconnect() {
    let mut board = board(MockTrading::new(), MockDirectory::new());

    assert!(board.on_status(ConnectionStatus::Connecting).is_none());
    assert!(board.on_status(ConnectionStatus::Live).is_none());

    let notice = board.on_status(ConnectionStatus::Reconnecting).unwrap();
    assert_eq!(notice.level, NoticeLevel::Warn);
    assert_eq!(notice.summary, "Reconnecting");
    assert_eq!(notice.detail, "Lost live stock updates; attempting to reconnect...");

    assert!(board.on_status(ConnectionStatus::Reconnecting).is_none());
}

// ---- Trading ----

#[tokio::test]
async fn test_sell_without_holding_rejected_locally() {
    let mut trading = MockTrading::new();
    trading.expect_user_information().returning(|_| Ok(user(vec![])));
    trading.expect_trade().never();

    let mut board = board(trading, empty_directory());
    board.refresh_user().await;

    let notice = board.trade(Ticker::Amazon, TradeAction::Sell).await;
    assert_eq!(notice.level, NoticeLevel::Warn);
    assert_eq!(notice.summary, "Cannot Sell");
    assert_eq!(notice.detail, "You don't own any AMAZON shares yet.");
}

#[tokio::test]
async fn test_buy_uses_rounded_live_price_and_reloads_user() {
    let mut trading = MockTrading::new();
    trading.expect_user_information().times(2).returning(|_| Ok(user(vec![])));
    trading
        .expect_trade()
        .withf(|req| {
            req.user_id == 7
                && req.ticker == Ticker::Apple
                && req.action == TradeAction::Buy
                && req.quantity == 1
                && req.price == 151
        })
        .times(1)
        .returning(|_| {
            Ok(TradeResponse {
                balance: Some(9_849.0),
                message: Some("BUY APPLE @ $151".to_string()),
            })
        });

    let mut board = board(trading, empty_directory());
    board.refresh_user().await;
    board.apply_snapshot(&snapshot([150.6, 130.0, 140.0, 300.0]));

    let notice = board.trade(Ticker::Apple, TradeAction::Buy).await;
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.summary, "Trade Submitted");
    assert_eq!(notice.detail, "BUY APPLE @ $151");
}

#[tokio::test]
async fn test_trade_without_price_uses_default_and_fallback_message() {
    let mut trading = MockTrading::new();
    trading.expect_user_information().returning(|_| {
        Ok(user(vec![Holding { ticker: Ticker::Microsoft, quantity: 1 }]))
    });
    trading
        .expect_trade()
        .withf(|req| req.price == 100 && req.action == TradeAction::Sell)
        .times(1)
        .returning(|_| Ok(TradeResponse { balance: None, message: None }));

    let mut board = board(trading, empty_directory());
    board.refresh_user().await;

    let notice = board.trade(Ticker::Microsoft, TradeAction::Sell).await;
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.detail, "SELL MICROSOFT");
}

#[tokio::test]
async fn test_trade_failure_reports_error() {
    let mut trading = MockTrading::new();
    trading.expect_user_information().times(1).returning(|_| Ok(user(vec![])));
    trading
        .expect_trade()
        .returning(|_| Err(anyhow::anyhow!("API error 400 Bad Request: insufficient balance")));

    let mut board = board(trading, empty_directory());
    board.refresh_user().await;

    let notice = board.trade(Ticker::Google, TradeAction::Buy).await;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.summary, "Trade Failed");
    assert!(notice.detail.contains("insufficient balance"));
}

// ---- End-to-end ----

#[tokio::test(start_paused = true)]
async fn test_replay_feed_to_price_board() {
    let mut round_one: Vec<ReplayStep> = Ticker::ALL
        .into_iter()
        .map(|t| ReplayStep::frame(t, 100.0 + t.index() as f64))
        .collect();
    // A partial round before the drop is discarded.
    round_one.push(ReplayStep::frame(Ticker::Apple, 999.0));
    round_one.push(ReplayStep::frame(Ticker::Amazon, 999.0));
    round_one.push(ReplayStep::End);

    let round_two = vec![
        ReplayStep::frame(Ticker::Google, 142.0),
        ReplayStep::frame(Ticker::Apple, 151.0),
        ReplayStep::frame(Ticker::Microsoft, 305.0),
        ReplayStep::frame(Ticker::Apple, 152.0),
        ReplayStep::frame(Ticker::Amazon, 131.0),
    ];

    let transport = Arc::new(ReplayTransport::new(vec![
        ReplayScript::Session(round_one),
        ReplayScript::Session(round_two),
    ]));
    let supervisor = StreamSupervisor::new(Arc::clone(&transport) as Arc<dyn PriceTransport>);
    let mut feed = SnapshotFeed::new(supervisor.subscribe().unwrap());

    let mut trading = MockTrading::new();
    trading.expect_user_information().returning(|_| {
        Ok(user(vec![Holding { ticker: Ticker::Apple, quantity: 10 }]))
    });
    let mut board = board(trading, empty_directory());
    board.refresh_user().await;

    let mut statuses = Vec::new();
    let mut snapshots = Vec::new();
    while snapshots.len() < 2 {
        match feed.next().await.unwrap() {
            SnapshotEvent::Status(status) => {
                board.on_status(status);
                statuses.push(status);
            }
            SnapshotEvent::Snapshot(snap) => {
                board.apply_snapshot(&snap);
                snapshots.push(snap);
            }
        }
    }

    assert_eq!(
        statuses,
        vec![
            ConnectionStatus::Connecting,
            ConnectionStatus::Live,
            ConnectionStatus::Reconnecting,
            ConnectionStatus::Connecting,
            ConnectionStatus::Live,
        ]
    );
    assert!((snapshots[0].price(Ticker::Microsoft) - 103.0).abs() < f64::EPSILON);
    assert!((snapshots[1].price(Ticker::Apple) - 152.0).abs() < f64::EPSILON);
    assert!((snapshots[1].price(Ticker::Amazon) - 131.0).abs() < f64::EPSILON);
    assert_eq!(feed.price_events(), 11);
    assert!((board.portfolio_value() - 11_520.0).abs() < 1e-9);

    feed.cancel().await;
    assert_eq!(supervisor.current_status(), ConnectionStatus::Disconnected);
}

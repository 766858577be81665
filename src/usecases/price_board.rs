//! Price Board - Dashboard Facade
//!
//! Consumes status changes and complete price snapshots, keeps the
//! long-lived price table, values the user's portfolio and submits
//! trades at the last known price. Anything a UI would show as a toast
//! is returned as a `Notice` and logged.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::account::{PriceTable, TradeAction, TradeRequest, UserInformation};
use crate::domain::organization::{Department, Employee};
use crate::domain::status::ConnectionStatus;
use crate::domain::ticker::{PriceSnapshot, Ticker, TickerMap};
use crate::ports::directory::DirectoryApi;
use crate::ports::trading_api::TradingApi;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  Success,
  Info,
  Warn,
  Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub level: NoticeLevel,
  pub summary: String,
  pub detail: String,
}

impl Notice {
  fn new(level: NoticeLevel, summary: &str, detail: impl Into<String>) -> Self {
    let notice = Self {
      level,
      summary: summary.to_string(),
      detail: detail.into(),
    };
    match level {
      NoticeLevel::Success | NoticeLevel::Info => {
        info!(summary = %notice.summary, detail = %notice.detail, "Notice");
      }
      NoticeLevel::Warn | NoticeLevel::Error => {
        warn!(level = ?level, summary = %notice.summary, detail = %notice.detail, "Notice");
      }
    }
    notice
  }
}

/// Dashboard state for one trading user.
pub struct PriceBoard<A: TradingApi, D: DirectoryApi> {
  /// Trading backend.
  api: Arc<A>,
  /// Employee directory.
  directory: Arc<D>,
  user_id: u32,
  user: Option<UserInformation>,
  employee: Option<Employee>,
  department: Option<Department>,
  /// Merged prices from every snapshot so far.
  prices: PriceTable,
  /// Last status seen, for change detection.
  last_status: Option<ConnectionStatus>,
}

impl<A: TradingApi, D: DirectoryApi> PriceBoard<A, D> {
  pub fn new(api: Arc<A>, directory: Arc<D>, user_id: u32) -> Self {
    Self {
      api,
      directory,
      user_id,
      user: None,
      employee: None,
      department: None,
      prices: PriceTable::new(),
      last_status: None,
    }
  }

  pub const fn user_id(&self) -> u32 {
    self.user_id
  }

  pub const fn user(&self) -> Option<&UserInformation> {
    self.user.as_ref()
  }

  pub const fn employee(&self) -> Option<&Employee> {
    self.employee.as_ref()
  }

  pub const fn department(&self) -> Option<&Department> {
    self.department.as_ref()
  }

  pub const fn prices(&self) -> &PriceTable {
    &self.prices
  }

  /// Merge a complete snapshot into the price table.
  pub fn apply_snapshot(&mut self, snapshot: &PriceSnapshot) {
    self.prices.merge(snapshot);
  }

  /// Track a status change; warns when the feed starts reconnecting.
  pub fn on_status(&mut self, status: ConnectionStatus) -> Option<Notice> {
    if self.last_status == Some(status) {
      return None;
    }
    self.last_status = Some(status);

    (status == ConnectionStatus::Reconnecting).then(|| {
      Notice::new(
        NoticeLevel::Warn,
        "Reconnecting",
        "Lost live stock updates; attempting to reconnect...",
      )
    })
  }

  /// Cash plus holdings at known prices; zero before the user is loaded.
  pub fn portfolio_value(&self) -> f64 {
    self
      .user
      .as_ref()
      .map_or(0.0, |user| self.prices.portfolio_value(user))
  }

  pub fn holdings_by_ticker(&self) -> TickerMap<u32> {
    self
      .user
      .as_ref()
      .map(UserInformation::holdings_by_ticker)
      .unwrap_or_default()
  }

  /// Reload the user and the directory records it links to.
  #[instrument(skip(self), fields(user_id = self.user_id))]
  pub async fn refresh_user(&mut self) -> Option<Notice> {
    match self.api.user_information(self.user_id).await {
      Ok(user) => {
        let (employee_id, department_id) = (user.employee_id, user.department_id);
        info!(name = %user.name, balance = user.balance, holdings = user.holdings.len(), "User loaded");
        self.user = Some(user);
        self.employee = match employee_id {
          Some(id) => self.load_employee(id).await,
          None => None,
        };
        self.department = match department_id {
          Some(id) => self.load_department(id).await,
          None => None,
        };
        None
      }
      Err(e) => {
        warn!(error = %e, "Failed to load user");
        self.user = None;
        self.employee = None;
        self.department = None;
        Some(Notice::new(
          NoticeLevel::Error,
          "User Load Failed",
          format!("User {} not found or server error.", self.user_id),
        ))
      }
    }
  }

  /// Submit a one-share trade at the last known price.
  ///
  /// Sells without a holding are rejected locally. After a successful
  /// trade the user is reloaded so balance and holdings are current.
  #[instrument(skip(self), fields(user_id = self.user_id))]
  pub async fn trade(&mut self, ticker: Ticker, action: TradeAction) -> Notice {
    if action == TradeAction::Sell && *self.holdings_by_ticker().get(ticker) < 1 {
      return Notice::new(
        NoticeLevel::Warn,
        "Cannot Sell",
        format!("You don't own any {ticker} shares yet."),
      );
    }

    let request = TradeRequest {
      user_id: self.user_id,
      ticker,
      action,
      quantity: 1,
      price: self.prices.trade_price(ticker),
    };

    let outcome = async {
      let response = self.api.trade(&request).await?;
      let user = self.api.user_information(self.user_id).await?;
      anyhow::Ok((response, user))
    }
    .await;

    match outcome {
      Ok((response, user)) => {
        self.user = Some(user);
        let detail = response
          .message
          .unwrap_or_else(|| format!("{action} {ticker}"));
        Notice::new(NoticeLevel::Success, "Trade Submitted", detail)
      }
      Err(e) => {
        let message = e.to_string();
        let detail = if message.is_empty() {
          "Trade failed.".to_string()
        } else {
          message
        };
        Notice::new(NoticeLevel::Error, "Trade Failed", detail)
      }
    }
  }

  async fn load_employee(&self, id: u32) -> Option<Employee> {
    match self.directory.employee(id).await {
      Ok(employee) => Some(employee),
      Err(e) => {
        warn!(employee_id = id, error = %e, "Failed to load employee data");
        None
      }
    }
  }

  async fn load_department(&self, id: u32) -> Option<Department> {
    match self.directory.department(id).await {
      Ok(department) => Some(department),
      Err(e) => {
        warn!(department_id = id, error = %e, "Failed to load department data");
        None
      }
    }
  }
}

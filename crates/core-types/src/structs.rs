use crate::enums::{PnlType, TradeSide, TradeStatus, WithdrawalAction};
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The authenticated owner of every record.
///
/// Issued by the auth provider; the backend's row-level security scopes
/// every table to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(UserId)
            .map_err(|e| CoreError::InvalidInput("user_id".to_string(), e.to_string()))
    }
}

/// One logged position as it lives in the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub owner: UserId,
    pub asset: String,
    pub side: TradeSide,
    pub leverage: u32,
    pub quantity: Decimal,
    pub open_price: Option<Decimal>,
    pub close_price: Option<Decimal>,
    pub pnl: Decimal,
    pub pnl_type: PnlType,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: String,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Trade {
    /// A trade without a close timestamp is still open and its PnL is advisory.
    pub fn status(&self) -> TradeStatus {
        if self.closed_at.is_some() {
            TradeStatus::Closed
        } else {
            TradeStatus::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() == TradeStatus::Open
    }
}

/// A trade as submitted by the user, before the backend assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrade {
    pub owner: UserId,
    pub asset: String,
    pub side: TradeSide,
    pub leverage: u32,
    pub quantity: Decimal,
    pub open_price: Option<Decimal>,
    pub close_price: Option<Decimal>,
    /// Explicit PnL. When absent it is derived from the prices.
    pub pnl: Option<Decimal>,
    pub pnl_type: PnlType,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: String,
    pub tags: Vec<String>,
}

impl NewTrade {
    /// Checks the submission before anything is persisted.
    ///
    /// The returned error names the field the user has to correct.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.asset.trim().is_empty() {
            return Err(CoreError::MissingField("asset".to_string()));
        }

        let open_price = self
            .open_price
            .ok_or_else(|| CoreError::MissingField("open_price".to_string()))?;
        if open_price <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "open_price".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        if self.quantity <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "quantity".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        if self.leverage == 0 {
            return Err(CoreError::InvalidInput(
                "leverage".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        check_close(self.close_price, self.closed_at, self.opened_at)?;

        if self.pnl.is_none() {
            self.derived_pnl()?;
        }
        Ok(())
    }

    /// PnL from the prices when open, close and quantity are all positive,
    /// otherwise zero. Errors if the product overflows.
    fn derived_pnl(&self) -> Result<Decimal, CoreError> {
        match (self.open_price, self.close_price) {
            (Some(open), Some(close))
                if open > Decimal::ZERO && close > Decimal::ZERO && self.quantity > Decimal::ZERO =>
            {
                self.side.pnl(open, close, self.quantity).ok_or_else(|| {
                    CoreError::InvalidInput(
                        "quantity".to_string(),
                        "is too large to derive the PnL from the prices".to_string(),
                    )
                })
            }
            _ => Ok(Decimal::ZERO),
        }
    }

    /// The PnL to store: the explicit value if given, otherwise derived from
    /// the prices. A submission that failed `validate` resolves to zero.
    pub fn resolved_pnl(&self) -> Decimal {
        match self.pnl {
            Some(pnl) => pnl,
            None => self.derived_pnl().unwrap_or(Decimal::ZERO),
        }
    }

    pub fn normalized_tags(&self) -> Vec<String> {
        normalize_tags(&self.tags)
    }
}

/// Tags trimmed, with blanks and duplicates removed, in first-seen order.
pub fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Shared by create and update: a close price must be positive and a close
/// time cannot precede the open time.
fn check_close(
    close_price: Option<Decimal>,
    closed_at: Option<DateTime<Utc>>,
    opened_at: DateTime<Utc>,
) -> Result<(), CoreError> {
    if close_price.is_some_and(|price| price <= Decimal::ZERO) {
        return Err(CoreError::InvalidInput(
            "close_price".to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    if closed_at.is_some_and(|closed_at| closed_at < opened_at) {
        return Err(CoreError::InvalidInput(
            "close_time".to_string(),
            "cannot be earlier than the open time".to_string(),
        ));
    }
    Ok(())
}

/// A partial update to an existing trade. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeUpdate {
    pub close_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub pnl_type: Option<PnlType>,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TradeUpdate {
    pub fn is_empty(&self) -> bool {
        self == &TradeUpdate::default()
    }

    /// Checks the changes against the stored trade they apply to, with the
    /// same rules as a new submission.
    pub fn validate(&self, trade: &Trade) -> Result<(), CoreError> {
        check_close(self.close_price, self.closed_at, trade.opened_at)
    }

    /// The replacement tags, normalized like those of a new trade.
    pub fn normalized_tags(&self) -> Option<Vec<String>> {
        self.tags.as_deref().map(normalize_tags)
    }
}

/// Per-user preferences. One row per owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub owner: UserId,
    /// Baseline for capital-growth calculations.
    pub starting_capital: Decimal,
    pub notifications: bool,
    pub email_updates: bool,
    pub auto_backup: bool,
    pub theme: String,
}

impl UserSettings {
    /// The values a new user starts with before saving anything.
    pub fn defaults_for(owner: UserId) -> Self {
        Self {
            owner,
            starting_capital: Decimal::ZERO,
            notifications: true,
            email_updates: false,
            auto_backup: true,
            theme: "dark".to_string(),
        }
    }
}

/// The profit-splitting rule. One row per owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartWithdrawalSettings {
    pub owner: UserId,
    pub enabled: bool,
    /// Share of profit (0-100) that must stay invested.
    pub reinvest_percentage: Decimal,
}

impl SmartWithdrawalSettings {
    pub fn defaults_for(owner: UserId) -> Self {
        Self {
            owner,
            enabled: false,
            reinvest_percentage: Decimal::from(50),
        }
    }
}

/// An entry in the append-only withdrawal ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalTransaction {
    pub id: Uuid,
    pub owner: UserId,
    pub amount: Decimal,
    pub action: WithdrawalAction,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    /// Set on REVERT entries: the WITHDRAW entry being offset.
    pub reverts_transaction_id: Option<Uuid>,
}

/// A ledger entry before the backend assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWithdrawalTransaction {
    pub owner: UserId,
    pub amount: Decimal,
    pub action: WithdrawalAction,
    pub description: String,
    pub reverts_transaction_id: Option<Uuid>,
}

/// One sample of the capital curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalPoint {
    pub date: NaiveDate,
    pub capital: Decimal,
}

impl CapitalPoint {
    pub fn new(date: NaiveDate, capital: Decimal) -> Self {
        Self { date, capital }
    }
}

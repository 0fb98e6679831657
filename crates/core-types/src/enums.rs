use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a logged position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// Profit or loss of a position closed at `close_price`, before leverage.
    ///
    /// `None` when the result does not fit in a `Decimal`.
    pub fn pnl(&self, open_price: Decimal, close_price: Decimal, quantity: Decimal) -> Option<Decimal> {
        let move_per_unit = match self {
            TradeSide::Long => close_price.checked_sub(open_price)?,
            TradeSide::Short => open_price.checked_sub(close_price)?,
        };
        move_per_unit.checked_mul(quantity)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Long => "LONG",
            TradeSide::Short => "SHORT",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LONG" => Ok(TradeSide::Long),
            "SHORT" => Ok(TradeSide::Short),
            other => Err(CoreError::InvalidInput(
                "side".to_string(),
                format!("expected LONG or SHORT, got '{}'", other),
            )),
        }
    }
}

/// Whether a trade's PnL has been locked in or is still floating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PnlType {
    Realized,
    #[default]
    Unrealized,
}

/// Derived from the presence of a close timestamp; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Open => f.write_str("OPEN"),
            TradeStatus::Closed => f.write_str("CLOSED"),
        }
    }
}

impl FromStr for TradeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(TradeStatus::Open),
            "CLOSED" => Ok(TradeStatus::Closed),
            other => Err(CoreError::InvalidInput(
                "status".to_string(),
                format!("expected OPEN or CLOSED, got '{}'", other),
            )),
        }
    }
}

/// The kind of entry in the withdrawal ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WithdrawalAction {
    Withdraw,
    Revert,
}

impl fmt::Display for WithdrawalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawalAction::Withdraw => f.write_str("WITHDRAW"),
            WithdrawalAction::Revert => f.write_str("REVERT"),
        }
    }
}

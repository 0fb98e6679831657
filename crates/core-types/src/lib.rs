//! # Tradelog Core Types
//!
//! The shared vocabulary of the journal: trades, per-user settings, the
//! withdrawal ledger and the capital curve sample. Every other crate depends
//! on this one and nothing here knows about storage or presentation.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{PnlType, TradeSide, TradeStatus, WithdrawalAction};
pub use error::CoreError;
pub use structs::{
    CapitalPoint, NewTrade, NewWithdrawalTransaction, SmartWithdrawalSettings, Trade, TradeUpdate,
    UserId, UserSettings, WithdrawalTransaction,
};

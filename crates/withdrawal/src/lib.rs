//! # Tradelog Smart Withdrawal
//!
//! Splits realized profit between what stays invested and what may be taken
//! out, and keeps the append-only withdrawal ledger.
//!
//! - `WithdrawalPolicy` is the pure evaluator: available amount, request checks,
//!   the summary shown to the user.
//! - `SmartWithdrawal` is the service that fetches the inputs and appends
//!   WITHDRAW and REVERT entries.
//!
//! Reverts never delete or edit a ledger row. A REVERT entry carries the id of
//! the withdrawal it offsets, and each withdrawal can be offset once.

pub mod error;
pub mod evaluator;
pub mod service;

pub use error::WithdrawalError;
pub use evaluator::{
    LedgerTotals, WithdrawalPolicy, WithdrawalSummary, revert_target, validate_percentage,
};
pub use service::SmartWithdrawal;

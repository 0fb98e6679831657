use database::DbError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum WithdrawalError {
    #[error("Please enter a valid withdrawal amount (got {0}).")]
    InvalidAmount(Decimal),

    #[error("Withdrawal amount {requested} exceeds available withdrawals ({available:.2} USD).")]
    ExceedsAvailable { requested: Decimal, available: Decimal },

    #[error("Smart withdrawal is disabled. Enable it before withdrawing.")]
    Disabled,

    #[error("Reinvestment percentage must be between 0 and 100 (got {0}).")]
    InvalidPercentage(Decimal),

    #[error("No withdrawal transaction with id {0}.")]
    TransactionNotFound(Uuid),

    #[error("Transaction {0} is a revert entry and cannot itself be reverted.")]
    NotAWithdrawal(Uuid),

    #[error("Withdrawal {0} has already been reverted.")]
    AlreadyReverted(Uuid),

    #[error(transparent)]
    Db(#[from] DbError),
}

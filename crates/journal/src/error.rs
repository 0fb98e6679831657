use analytics::AnalyticsError;
use core_types::CoreError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("No signed-in user. Set session.user_id to record trades or change settings.")]
    NotSignedIn,

    #[error("Nothing to update: no fields were given.")]
    EmptyUpdate,

    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("Failed to export trades: {0}")]
    Export(#[from] serde_json::Error),
}

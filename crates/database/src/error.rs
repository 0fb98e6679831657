use gateway::{GatewayError, Table};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to configure the backend connection: {0}")]
    ConnectionConfigError(String),

    #[error("Table '{table}' is missing. Run the setup SQL for it in the Supabase SQL editor.")]
    SetupRequired { table: Table },

    #[error("Permission denied on table '{table}'. Check the row-level security policies and that you are signed in.")]
    PermissionDenied { table: Table },

    #[error("The requested data was not found in the database.")]
    NotFound,

    #[error("The backend request failed: {0}")]
    Gateway(GatewayError),

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DbError {
    /// True for failures the user fixes by setting up the project, not by retrying.
    pub fn is_setup_problem(&self) -> bool {
        matches!(
            self,
            DbError::SetupRequired { .. } | DbError::ConnectionConfigError(_)
        )
    }
}

impl From<GatewayError> for DbError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RelationMissing { table, .. } => DbError::SetupRequired { table },
            GatewayError::PermissionDenied { table, .. } => DbError::PermissionDenied { table },
            GatewayError::NoRows(_) => DbError::NotFound,
            GatewayError::Configuration(message) => DbError::ConnectionConfigError(message),
            other => DbError::Gateway(other),
        }
    }
}

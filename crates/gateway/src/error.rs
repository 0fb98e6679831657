use crate::table::Table;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway is not configured correctly: {0}")]
    Configuration(String),

    #[error("Failed to send the HTTP request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Table '{table}' does not exist: {message}")]
    RelationMissing { table: Table, message: String },

    #[error("Permission denied on table '{table}': {message}")]
    PermissionDenied { table: Table, message: String },

    #[error("No row matched the request on table '{0}'")]
    NoRows(Table),

    #[error("Failed to deserialize the gateway response: {0}")]
    Deserialization(String),

    #[error("The gateway returned an error (status {status}, code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl GatewayError {
    /// Machine-readable class of the failure, mirroring the backend's codes.
    pub fn class(&self) -> ErrorClass {
        match self {
            GatewayError::Configuration(_) => ErrorClass::Configuration,
            GatewayError::RelationMissing { .. } => ErrorClass::RelationMissing,
            GatewayError::PermissionDenied { .. } => ErrorClass::PermissionDenied,
            GatewayError::NoRows(_) => ErrorClass::NoRows,
            GatewayError::Transport(_)
            | GatewayError::Deserialization(_)
            | GatewayError::Api { .. } => ErrorClass::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Configuration,
    RelationMissing,
    PermissionDenied,
    NoRows,
    Other,
}

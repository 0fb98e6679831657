use crate::error::GatewayError;
use crate::table::Table;
use serde::Deserialize;

/// Postgres: undefined table.
pub const CODE_UNDEFINED_TABLE: &str = "42P01";
/// PostgREST: table not found in the schema cache.
pub const CODE_SCHEMA_CACHE_MISS: &str = "PGRST205";
/// Postgres: insufficient privilege (row-level security rejection).
pub const CODE_INSUFFICIENT_PRIVILEGE: &str = "42501";
/// PostgREST: a single-object request matched zero rows.
pub const CODE_NO_ROWS: &str = "PGRST116";

/// The error body PostgREST returns for every failed request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostgrestErrorResponse {
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl PostgrestErrorResponse {
    /// Maps a failed response onto the gateway's error classes.
    pub fn into_error(self, status: u16, table: Table) -> GatewayError {
        let message = match (&self.details, &self.hint) {
            (Some(details), Some(hint)) => format!("{} ({}; hint: {})", self.message, details, hint),
            (Some(details), None) => format!("{} ({})", self.message, details),
            (None, Some(hint)) => format!("{} (hint: {})", self.message, hint),
            (None, None) => self.message.clone(),
        };

        match self.code.as_deref() {
            Some(CODE_UNDEFINED_TABLE) | Some(CODE_SCHEMA_CACHE_MISS) => {
                GatewayError::RelationMissing { table, message }
            }
            Some(CODE_INSUFFICIENT_PRIVILEGE) => GatewayError::PermissionDenied { table, message },
            Some(CODE_NO_ROWS) => GatewayError::NoRows(table),
            _ if status == 401 || status == 403 => GatewayError::PermissionDenied { table, message },
            _ => GatewayError::Api {
                status,
                code: self.code,
                message,
            },
        }
    }
}

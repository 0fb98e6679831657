//! # Tradelog Database Crate
//!
//! The application-specific interface to the hosted tables. It is the
//! journal's permanent record.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All knowledge of table names, column names and backend error
//!   codes lives here and in `gateway`. Callers deal in `core_types` only.
//! - **Shared gateway:** One `Arc<dyn PersistenceGateway>` is built at startup by
//!   `connect` and handed to each repository.
//! - **Classified errors:** A missing table or a row-level security rejection
//!   surfaces as its own `DbError` variant so the user gets an actionable message.
//!
//! ## Public API
//!
//! - `connect`: builds the gateway client from configuration.
//! - `TradeRepository`, `SettingsRepository`, `WithdrawalRepository`.
//! - `setup_sql`: the DDL to print when a table is missing.
//! - `DbError`: the specific error types that can be returned from this crate.

pub mod connection;
pub mod error;
pub mod repository;
pub mod rows;
pub mod schema;

pub use connection::connect;
pub use error::DbError;
pub use repository::{ClearOutcome, SettingsRepository, TradeRepository, WithdrawalRepository};
pub use schema::setup_sql;

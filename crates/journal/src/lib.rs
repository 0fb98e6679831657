//! # Tradelog Journal
//!
//! The service the front end talks to for everything trade-related: recording
//! and editing trades, searching the journal, exporting it, and loading the
//! dashboard and analytics views.
//!
//! ## Public API
//!
//! - `JournalService`: bound to the session user, built on the repositories.
//! - `TradeQuery`, `SortKey`, `SortOrder`: search, filters and ordering.
//! - `Dashboard`, `SettingsPatch`: dashboard bundle and preference changes.
//! - `JournalError`: The specific error types that can be returned from this crate.

pub mod error;
pub mod query;
pub mod service;

pub use error::JournalError;
pub use query::{SortKey, SortOrder, TradeQuery};
pub use service::{Dashboard, JournalService, SettingsPatch};

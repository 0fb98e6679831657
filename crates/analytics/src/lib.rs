//! # Tradelog Analytics Engine
//!
//! Aggregate statistics over journal trades: profitability, per-asset
//! breakdown, activity and simple risk figures, plus the dashboard summary and
//! the capital curve.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** This crate has no knowledge of external systems. It depends
//!   only on `core-types`.
//! - **Stateless calculation:** The `AnalyticsEngine` takes trades and an explicit
//!   "now" and produces a `PerformanceReport`. Nothing here is persisted.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `PerformanceReport`: The aggregate statistics record.
//! - `TimeWindow`: The 1W/1M/3M/6M/1Y/ALL look-back filter.
//! - `DashboardSummary` and `capital_curve`: the dashboard's derived values.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

pub mod dashboard;
pub mod engine;
pub mod error;
pub mod report;
pub mod window;

pub use dashboard::{DashboardSummary, RECENT_TRADES_LIMIT, capital_curve};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{AssetPerformance, PerformanceReport, TradingFrequency};
pub use window::TimeWindow;

//! # Tradelog Chart Geometry
//!
//! Turns a capital curve into pixel coordinates, axis labels and a trend
//! colour for a line chart. Rendering is left to the caller.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** Depends only on `core-types`; no I/O.
//! - **Degenerate input is a value:** Series that cannot be scaled yield
//!   `ChartGeometry::Insufficient` with a reason instead of an error.
//!
//! ## Public API
//!
//! - `map_samples`: The entry point.
//! - `ChartGeometry`, `ChartLayout`, `InsufficientReason`: its results.
//! - `format_currency`: The compact axis label format.

pub mod format;
pub mod geometry;

pub use format::{format_axis_date, format_currency, whole_dollars};
pub use geometry::{
    ChartGeometry, ChartLayout, DateLabel, InsufficientReason, Margins, PlotPoint, Trend,
    ValueLabel, map_samples,
};

use crate::format::{format_axis_date, format_currency};
use chrono::NaiveDate;
use core_types::CapitalPoint;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::fmt;

const PADDING_RATIO: f64 = 0.15;
const Y_DIVISIONS: usize = 6;
const MAX_X_LABELS: usize = 8;

pub const UP_COLOR: &str = "#10b981";
pub const DOWN_COLOR: &str = "#ef4444";

/// Why a capital series cannot be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientReason {
    NoSamples,
    SingleSample,
    /// Every sample has the same capital.
    FlatCapital,
    /// Every sample falls on the same date.
    SameDate,
    /// The canvas leaves no room inside the margins.
    CanvasTooSmall,
    /// The padded value range collapsed or went negative.
    InvalidRange,
}

impl fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoSamples => "no capital history yet",
            Self::SingleSample => "only one capital sample",
            Self::FlatCapital => "capital has not changed",
            Self::SameDate => "all samples share one date",
            Self::CanvasTooSmall => "canvas is smaller than the chart margins",
            Self::InvalidRange => "capital range cannot be scaled",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn color(&self) -> &'static str {
        match self {
            Self::Up => UP_COLOR,
            Self::Down => DOWN_COLOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    /// The left margin grows with the width of the largest value label, the
    /// right one with the canvas.
    pub fn for_canvas(width: f64, largest_value: f64) -> Self {
        let left = if largest_value >= 1e6 {
            100.0
        } else if largest_value >= 1e5 {
            90.0
        } else if largest_value >= 1e4 {
            85.0
        } else {
            80.0
        };
        let right = if width < 600.0 {
            60.0
        } else if width > 1000.0 {
            100.0
        } else {
            80.0
        };
        Self {
            top: 60.0,
            right,
            bottom: 80.0,
            left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub date: NaiveDate,
    pub capital: Decimal,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueLabel {
    pub value: f64,
    pub text: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateLabel {
    pub date: NaiveDate,
    pub text: String,
    pub x: f64,
}

/// Pixel geometry for a capital line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub padded_min: f64,
    pub padded_max: f64,
    pub points: Vec<PlotPoint>,
    /// `x,y x,y ...`, ready for an SVG polyline.
    pub polyline: String,
    pub y_labels: Vec<ValueLabel>,
    pub x_labels: Vec<DateLabel>,
    pub trend: Trend,
    pub line_color: &'static str,
    pub font_size_px: u32,
    pub current_capital: Decimal,
    pub current_capital_label: String,
}

impl ChartLayout {
    pub fn chart_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn chart_height(&self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ChartGeometry {
    Ready(ChartLayout),
    Insufficient(InsufficientReason),
}

impl ChartGeometry {
    pub fn layout(&self) -> Option<&ChartLayout> {
        match self {
            Self::Ready(layout) => Some(layout),
            Self::Insufficient(_) => None,
        }
    }
}

/// Maps capital samples onto a `width` x `height` canvas.
///
/// Samples may arrive in any order; they are sorted by date first.
pub fn map_samples(samples: &[CapitalPoint], width: u32, height: u32) -> ChartGeometry {
    match build_layout(samples, f64::from(width), f64::from(height)) {
        Ok(layout) => ChartGeometry::Ready(layout),
        Err(reason) => {
            tracing::debug!(samples = samples.len(), %reason, "Capital chart not drawn.");
            ChartGeometry::Insufficient(reason)
        }
    }
}

fn build_layout(samples: &[CapitalPoint], width: f64, height: f64) -> Result<ChartLayout, InsufficientReason> {
    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|p| p.date);

    let (first, last) = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => (first.clone(), last.clone()),
        _ => return Err(InsufficientReason::NoSamples),
    };
    if sorted.len() < 2 {
        return Err(InsufficientReason::SingleSample);
    }

    let values: Vec<f64> = sorted.iter().map(|p| to_f64(p.capital)).collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return Err(InsufficientReason::FlatCapital);
    }

    let day = |date: NaiveDate| (date - first.date).num_days() as f64;
    let span = day(last.date);
    if span <= 0.0 {
        return Err(InsufficientReason::SameDate);
    }

    let largest = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let margins = Margins::for_canvas(width, largest);
    let chart_w = width - margins.left - margins.right;
    let chart_h = height - margins.top - margins.bottom;
    if chart_w <= 0.0 || chart_h <= 0.0 {
        return Err(InsufficientReason::CanvasTooSmall);
    }

    let padded_min = (min - range * PADDING_RATIO).max(0.0);
    let padded_max = max + range * PADDING_RATIO;
    let padded_range = padded_max - padded_min;
    if !padded_range.is_finite() || padded_range <= 0.0 {
        return Err(InsufficientReason::InvalidRange);
    }

    let baseline = height - margins.bottom;
    let x_of = |date: NaiveDate| margins.left + day(date) / span * chart_w;
    let y_of = |value: f64| baseline - (value - padded_min) / padded_range * chart_h;

    let points: Vec<PlotPoint> = sorted
        .iter()
        .zip(&values)
        .map(|(sample, &value)| PlotPoint {
            date: sample.date,
            capital: sample.capital,
            x: x_of(sample.date),
            y: y_of(value),
        })
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();

    let polyline = points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");

    let y_labels = (0..=Y_DIVISIONS)
        .map(|i| {
            let share = i as f64 / Y_DIVISIONS as f64;
            let value = padded_min + padded_range * share;
            ValueLabel {
                value,
                text: format_currency(value),
                y: baseline - share * chart_h,
            }
        })
        .filter(|label| label.y.is_finite())
        .collect();

    let n = sorted.len();
    let label_count = n.min(MAX_X_LABELS);
    let x_labels = (0..label_count)
        .map(|i| &sorted[i * (n - 1) / (label_count - 1)])
        .map(|sample| DateLabel {
            date: sample.date,
            text: format_axis_date(sample.date),
            x: x_of(sample.date),
        })
        .filter(|label| label.x.is_finite())
        .collect();

    let trend = if last.capital >= first.capital {
        Trend::Up
    } else {
        Trend::Down
    };

    Ok(ChartLayout {
        width,
        height,
        margins,
        padded_min,
        padded_max,
        points,
        polyline,
        y_labels,
        x_labels,
        trend,
        line_color: trend.color(),
        font_size_px: if max >= 1e6 { 10 } else { 12 },
        current_capital: last.capital,
        current_capital_label: format_currency(to_f64(last.capital)),
    })
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

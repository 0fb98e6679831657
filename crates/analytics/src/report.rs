use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An asset symbol together with the PnL summed over its trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPerformance {
    pub asset: String,
    pub pnl: Decimal,
}

/// Trades opened within the last 1, 7 and 30 days of "now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingFrequency {
    pub last_day: usize,
    pub last_week: usize,
    pub last_month: usize,
}

/// Aggregate statistics over a set of journal trades.
///
/// This struct is the final output of the `AnalyticsEngine`. It is derived on
/// every request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Profitability
    pub total_pnl: Decimal,
    pub average_win: Decimal,
    /// Mean PnL of losing trades. Zero or negative.
    pub average_loss: Decimal,

    // II. Trade counts
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: Decimal,

    // III. Per-asset breakdown
    pub best_asset: Option<AssetPerformance>,
    pub worst_asset: Option<AssetPerformance>,
    pub asset_distribution: BTreeMap<String, usize>,

    // IV. Activity
    pub trading_frequency: TradingFrequency,

    // V. Risk
    /// Population standard deviation of per-trade PnL.
    pub volatility: Decimal,
    /// Mean PnL over volatility. Not annualized.
    pub sharpe_ratio: Decimal,
    pub max_drawdown_pct: Decimal,
}

impl PerformanceReport {
    /// Creates a new, zeroed-out PerformanceReport.
    /// This is also the result for an empty set of trades.
    pub fn new() -> Self {
        Self {
            total_pnl: Decimal::ZERO,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate_pct: Decimal::ZERO,
            best_asset: None,
            worst_asset: None,
            asset_distribution: BTreeMap::new(),
            trading_frequency: TradingFrequency::default(),
            volatility: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
        }
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}

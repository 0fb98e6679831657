use chrono::{Duration, NaiveDate};
use core_types::{CapitalPoint, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How many trades the dashboard lists.
pub const RECENT_TRADES_LIMIT: usize = 10;

/// The capital overview shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub starting_capital: Decimal,
    /// Sum of PnL over every trade, open or closed.
    pub net_pnl: Decimal,
    pub total_capital: Decimal,
    /// Zero when no positive starting capital is set.
    pub net_pnl_pct: Decimal,
    pub open_positions: usize,
    /// Newest first by open time.
    pub recent_trades: Vec<Trade>,
}

impl DashboardSummary {
    pub fn build(starting_capital: Decimal, trades: &[Trade]) -> Self {
        let net_pnl: Decimal = trades.iter().map(|t| t.pnl).sum();
        let total_capital = starting_capital + net_pnl;
        let net_pnl_pct = if starting_capital > Decimal::ZERO {
            net_pnl / starting_capital * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        let mut recent_trades = trades.to_vec();
        recent_trades.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        recent_trades.truncate(RECENT_TRADES_LIMIT);

        Self {
            starting_capital,
            net_pnl,
            total_capital,
            net_pnl_pct,
            open_positions: trades.iter().filter(|t| t.is_open()).count(),
            recent_trades,
        }
    }
}

/// Builds the capital history fed to the chart.
///
/// Starts at `starting_capital` thirty days before `today`, steps through the
/// trades in open-time order, and ends at the current total on `today`.
pub fn capital_curve(starting_capital: Decimal, trades: &[Trade], today: NaiveDate) -> Vec<CapitalPoint> {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.opened_at);

    let mut points = Vec::with_capacity(ordered.len() + 2);
    points.push(CapitalPoint::new(today - Duration::days(30), starting_capital));

    let mut running = starting_capital;
    for trade in ordered {
        running += trade.pnl;
        points.push(CapitalPoint::new(trade.opened_at.date_naive(), running));
    }

    points.push(CapitalPoint::new(today, running));
    points
}

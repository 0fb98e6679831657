use crate::error::AnalyticsError;
use crate::report::{AssetPerformance, PerformanceReport, TradingFrequency};
use chrono::{DateTime, Duration, Utc};
use core_types::Trade;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A stateless calculator for deriving performance metrics from journal trades.
#[derive(Debug, Default, Clone)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the report against the wall clock.
    pub fn calculate_now(&self, trades: &[Trade]) -> Result<PerformanceReport, AnalyticsError> {
        self.calculate(trades, Utc::now())
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `trades` - The trades to analyze, usually already filtered to a time window.
    ///   Order only matters for the drawdown, which follows the running sum in input order.
    /// * `now` - The instant trading frequency is measured back from.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceReport` or an `AnalyticsError`.
    pub fn calculate(
        &self,
        trades: &[Trade],
        now: DateTime<Utc>,
    ) -> Result<PerformanceReport, AnalyticsError> {
        let mut report = PerformanceReport::new();

        if trades.is_empty() {
            return Ok(report);
        }

        self.calculate_profitability(trades, &mut report);
        self.calculate_asset_breakdown(trades, &mut report);
        self.calculate_frequency(trades, now, &mut report);
        self.calculate_risk(trades, &mut report)?;
        self.calculate_drawdown(trades, &mut report);

        tracing::debug!(
            trades = report.total_trades,
            total_pnl = %report.total_pnl,
            "Performance report calculated."
        );
        Ok(report)
    }

    /// Totals, win rate and the average winner/loser.
    fn calculate_profitability(&self, trades: &[Trade], report: &mut PerformanceReport) {
        report.total_trades = trades.len();

        let mut gross_profit = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;

        for trade in trades {
            report.total_pnl += trade.pnl;

            if trade.pnl > Decimal::ZERO {
                gross_profit += trade.pnl;
                report.winning_trades += 1;
            } else if trade.pnl < Decimal::ZERO {
                gross_loss += trade.pnl;
                report.losing_trades += 1;
            }
        }

        report.win_rate_pct = Decimal::from(report.winning_trades)
            / Decimal::from(report.total_trades)
            * Decimal::ONE_HUNDRED;

        if report.winning_trades > 0 {
            report.average_win = gross_profit / Decimal::from(report.winning_trades);
        }

        // Kept negative.
        if report.losing_trades > 0 {
            report.average_loss = gross_loss / Decimal::from(report.losing_trades);
        }
    }

    /// Best/worst asset by summed PnL and the per-asset trade counts.
    ///
    /// Assets are visited alphabetically and only a strictly better sum replaces
    /// the current pick, so ties go to the alphabetically-first symbol.
    fn calculate_asset_breakdown(&self, trades: &[Trade], report: &mut PerformanceReport) {
        let mut pnl_by_asset: BTreeMap<&str, Decimal> = BTreeMap::new();

        for trade in trades {
            *pnl_by_asset.entry(trade.asset.as_str()).or_insert(Decimal::ZERO) += trade.pnl;
            *report
                .asset_distribution
                .entry(trade.asset.clone())
                .or_insert(0) += 1;
        }

        let mut best: Option<(&str, Decimal)> = None;
        let mut worst: Option<(&str, Decimal)> = None;
        for (&asset, &pnl) in &pnl_by_asset {
            if best.is_none_or(|(_, b)| pnl > b) {
                best = Some((asset, pnl));
            }
            if worst.is_none_or(|(_, w)| pnl < w) {
                worst = Some((asset, pnl));
            }
        }

        let to_performance = |(asset, pnl): (&str, Decimal)| AssetPerformance {
            asset: asset.to_string(),
            pnl,
        };
        report.best_asset = best.map(to_performance);
        report.worst_asset = worst.map(to_performance);
    }

    fn calculate_frequency(&self, trades: &[Trade], now: DateTime<Utc>, report: &mut PerformanceReport) {
        let count_since = |days: i64| {
            let cutoff = now - Duration::days(days);
            trades.iter().filter(|t| t.opened_at >= cutoff).count()
        };

        report.trading_frequency = TradingFrequency {
            last_day: count_since(1),
            last_week: count_since(7),
            last_month: count_since(30),
        };
    }

    /// Population standard deviation of PnL and the mean/stdev ratio.
    fn calculate_risk(&self, trades: &[Trade], report: &mut PerformanceReport) -> Result<(), AnalyticsError> {
        let count = Decimal::from(trades.len());
        let mean = report.total_pnl / count;

        let variance: Decimal = trades
            .iter()
            .map(|t| (t.pnl - mean) * (t.pnl - mean))
            .sum::<Decimal>()
            / count;

        let volatility = variance.sqrt().ok_or_else(|| {
            AnalyticsError::InternalError("Failed to calculate square root for variance".to_string())
        })?;

        report.volatility = volatility;
        report.sharpe_ratio = if volatility > Decimal::ZERO {
            mean / volatility
        } else {
            Decimal::ZERO
        };

        Ok(())
    }

    /// Largest percentage drop of the running PnL sum from a positive peak.
    fn calculate_drawdown(&self, trades: &[Trade], report: &mut PerformanceReport) {
        let mut peak = Decimal::ZERO;
        let mut running = Decimal::ZERO;
        let mut max_drawdown = Decimal::ZERO;

        for trade in trades {
            running += trade.pnl;
            if running > peak {
                peak = running;
            }
            if peak > Decimal::ZERO {
                let drawdown = (peak - running) / peak * Decimal::ONE_HUNDRED;
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }
        }

        report.max_drawdown_pct = max_drawdown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, trade};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        at(2024, 6, 30)
    }

    #[test]
    fn empty_input_yields_a_neutral_report() {
        let report = AnalyticsEngine::new().calculate(&[], now()).unwrap();
        assert_eq!(report, PerformanceReport::default());
        assert!(report.best_asset.is_none());
        assert!(report.worst_asset.is_none());
    }

    #[test]
    fn profitability_of_a_mixed_set() {
        let trades = vec![
            trade("BTC", dec!(100), at(2024, 6, 1)),
            trade("ETH", dec!(-40), at(2024, 6, 2)),
            trade("BTC", dec!(60), at(2024, 6, 3)),
        ];
        let report = AnalyticsEngine::new().calculate(&trades, now()).unwrap();

        assert_eq!(report.total_pnl, dec!(120));
        assert_eq!(report.win_rate_pct.round_dp(2), dec!(66.67));
        assert_eq!(report.average_win, dec!(80));
        assert_eq!(report.average_loss, dec!(-40));
        assert_eq!(report.winning_trades, 2);
        assert_eq!(report.losing_trades, 1);
    }

    #[test]
    fn zero_pnl_trades_count_toward_the_total_only() {
        let trades = vec![
            trade("BTC", dec!(0), at(2024, 6, 1)),
            trade("BTC", dec!(50), at(2024, 6, 2)),
        ];
        let report = AnalyticsEngine::new().calculate(&trades, now()).unwrap();
        assert_eq!(report.total_trades, 2);
        assert_eq!(report.winning_trades, 1);
        assert_eq!(report.losing_trades, 0);
        assert_eq!(report.win_rate_pct, dec!(50));
        assert_eq!(report.average_loss, Decimal::ZERO);
    }

    #[test]
    fn best_and_worst_asset_by_summed_pnl() {
        let trades = vec![
            trade("SOL", dec!(30), at(2024, 6, 1)),
            trade("BTC", dec!(100), at(2024, 6, 1)),
            trade("ETH", dec!(-40), at(2024, 6, 2)),
            trade("BTC", dec!(-20), at(2024, 6, 3)),
        ];
        let report = AnalyticsEngine::new().calculate(&trades, now()).unwrap();

        assert_eq!(
            report.best_asset,
            Some(AssetPerformance { asset: "BTC".to_string(), pnl: dec!(80) })
        );
        assert_eq!(
            report.worst_asset,
            Some(AssetPerformance { asset: "ETH".to_string(), pnl: dec!(-40) })
        );
        assert_eq!(report.asset_distribution["BTC"], 2);
        assert_eq!(report.asset_distribution["SOL"], 1);
    }

    #[test]
    fn asset_ties_go_to_the_alphabetically_first_symbol() {
        let trades = vec![
            trade("XRP", dec!(10), at(2024, 6, 1)),
            trade("ADA", dec!(10), at(2024, 6, 1)),
        ];
        let report = AnalyticsEngine::new().calculate(&trades, now()).unwrap();
        assert_eq!(report.best_asset.unwrap().asset, "ADA");
        assert_eq!(report.worst_asset.unwrap().asset, "ADA");
    }

    #[test]
    fn trading_frequency_counts_back_from_now() {
        let now = now();
        let trades = vec![
            trade("BTC", dec!(1), now - Duration::hours(2)),
            trade("BTC", dec!(1), now - Duration::days(3)),
            trade("BTC", dec!(1), now - Duration::days(20)),
            trade("BTC", dec!(1), now - Duration::days(45)),
        ];
        let report = AnalyticsEngine::new().calculate(&trades, now).unwrap();
        assert_eq!(
            report.trading_frequency,
            TradingFrequency { last_day: 1, last_week: 2, last_month: 3 }
        );
    }

    #[test]
    fn volatility_is_order_invariant() {
        let mut trades = vec![
            trade("BTC", dec!(100), at(2024, 6, 1)),
            trade("BTC", dec!(-40), at(2024, 6, 2)),
            trade("BTC", dec!(60), at(2024, 6, 3)),
            trade("BTC", dec!(20), at(2024, 6, 4)),
        ];
        let engine = AnalyticsEngine::new();
        let forward = engine.calculate(&trades, now()).unwrap();
        trades.reverse();
        let backward = engine.calculate(&trades, now()).unwrap();

        assert_eq!(forward.volatility, backward.volatility);
        // Mean 35, squared deviations 4225 + 5625 + 625 + 225 = 10700, / 4 = 2675.
        assert_eq!(forward.volatility.round_dp(4), dec!(2675).sqrt().unwrap().round_dp(4));
    }

    #[test]
    fn sharpe_ratio_is_zero_without_volatility() {
        let trades = vec![
            trade("BTC", dec!(25), at(2024, 6, 1)),
            trade("ETH", dec!(25), at(2024, 6, 2)),
        ];
        let report = AnalyticsEngine::new().calculate(&trades, now()).unwrap();
        assert_eq!(report.volatility, Decimal::ZERO);
        assert_eq!(report.sharpe_ratio, Decimal::ZERO);
    }

    #[test]
    fn max_drawdown_follows_the_running_sum() {
        let trades = vec![
            trade("BTC", dec!(100), at(2024, 6, 1)),
            trade("BTC", dec!(-50), at(2024, 6, 2)),
            trade("BTC", dec!(30), at(2024, 6, 3)),
        ];
        let report = AnalyticsEngine::new().calculate(&trades, now()).unwrap();
        assert_eq!(report.max_drawdown_pct, dec!(50));
    }

    #[test]
    fn losses_before_any_positive_peak_are_not_drawdown() {
        let trades = vec![
            trade("BTC", dec!(-100), at(2024, 6, 1)),
            trade("BTC", dec!(-50), at(2024, 6, 2)),
        ];
        let report = AnalyticsEngine::new().calculate(&trades, now()).unwrap();
        assert_eq!(report.max_drawdown_pct, Decimal::ZERO);
    }
}

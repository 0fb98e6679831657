//! Terminal tables for the command output.

use analytics::{DashboardSummary, PerformanceReport, TimeWindow};
use chart::{ChartLayout, whole_dollars};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use core_types::{Trade, UserSettings, WithdrawalTransaction};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use withdrawal::WithdrawalSummary;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn pnl_cell(pnl: Decimal) -> Cell {
    let color = if pnl > Decimal::ZERO {
        Color::Green
    } else if pnl < Decimal::ZERO {
        Color::Red
    } else {
        Color::Reset
    };
    Cell::new(money(pnl)).fg(color)
}

fn key_value(rows: Vec<(&str, String)>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}

pub fn trades_table(trades: &[Trade]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "ID", "Asset", "Side", "Lev", "Qty", "Open", "Close", "PnL", "Status", "Opened", "Tags",
    ]);
    for trade in trades {
        table.add_row(vec![
            Cell::new(trade.id),
            Cell::new(&trade.asset),
            Cell::new(trade.side),
            Cell::new(format!("{}x", trade.leverage)),
            Cell::new(trade.quantity),
            Cell::new(trade.open_price.map(money).unwrap_or_default()),
            Cell::new(trade.close_price.map(money).unwrap_or_default()),
            pnl_cell(trade.pnl),
            Cell::new(trade.status()),
            Cell::new(trade.opened_at.format("%Y-%m-%d %H:%M")),
            Cell::new(trade.tags.join(", ")),
        ]);
    }
    table
}

pub fn report_table(window: TimeWindow, report: &PerformanceReport) -> Table {
    let asset = |perf: &Option<analytics::AssetPerformance>| {
        perf.as_ref()
            .map(|p| format!("{} ({})", p.asset, money(p.pnl)))
            .unwrap_or_else(|| "-".to_string())
    };
    let distribution = report
        .asset_distribution
        .iter()
        .map(|(asset, count)| format!("{}: {}", asset, count))
        .collect::<Vec<_>>()
        .join(", ");

    key_value(vec![
        ("Window", window.to_string()),
        ("Total PnL", money(report.total_pnl)),
        (
            "Trades (won / lost)",
            format!(
                "{} ({} / {})",
                report.total_trades, report.winning_trades, report.losing_trades
            ),
        ),
        ("Win rate", format!("{:.1}%", report.win_rate_pct)),
        ("Average win", money(report.average_win)),
        ("Average loss", money(report.average_loss)),
        ("Best asset", asset(&report.best_asset)),
        ("Worst asset", asset(&report.worst_asset)),
        ("Assets traded", distribution),
        (
            "Trades in last 1d / 7d / 30d",
            format!(
                "{} / {} / {}",
                report.trading_frequency.last_day,
                report.trading_frequency.last_week,
                report.trading_frequency.last_month
            ),
        ),
        ("Volatility", money(report.volatility)),
        ("Sharpe ratio", format!("{:.2}", report.sharpe_ratio)),
        ("Max drawdown", format!("{:.2}%", report.max_drawdown_pct)),
    ])
}

pub fn dashboard_table(summary: &DashboardSummary) -> Table {
    let capital = |amount: Decimal| whole_dollars(amount.to_f64().unwrap_or_default());
    key_value(vec![
        ("Starting capital", capital(summary.starting_capital)),
        ("Net PnL", money(summary.net_pnl)),
        ("Total capital", capital(summary.total_capital)),
        ("Growth", format!("{:.2}%", summary.net_pnl_pct)),
        ("Open positions", summary.open_positions.to_string()),
    ])
}

pub fn withdrawal_table(summary: &WithdrawalSummary) -> Table {
    key_value(vec![
        ("Enabled", if summary.enabled { "yes" } else { "no" }.to_string()),
        ("Reinvest", format!("{}%", summary.reinvest_percentage)),
        ("Total profit", money(summary.total_profit)),
        ("Withdrawable share", money(summary.protected_profit)),
        ("Reinvested share", money(summary.reinvest_amount)),
        ("Withdrawn", money(summary.total_withdrawn)),
        ("Reverted", money(summary.total_reverted)),
        ("Net withdrawn", money(summary.net_withdrawn)),
        ("Available", money(summary.available)),
    ])
}

pub fn ledger_table(ledger: &[WithdrawalTransaction]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Time", "Action", "Amount", "Description"]);
    for tx in ledger {
        table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(tx.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(tx.action),
            Cell::new(money(tx.amount)),
            Cell::new(&tx.description),
        ]);
    }
    table
}

pub fn settings_table(settings: &UserSettings) -> Table {
    key_value(vec![
        ("Starting capital", money(settings.starting_capital)),
        ("Notifications", settings.notifications.to_string()),
        ("Email updates", settings.email_updates.to_string()),
        ("Auto backup", settings.auto_backup.to_string()),
        ("Theme", settings.theme.clone()),
    ])
}

pub fn chart_table(layout: &ChartLayout) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Capital", "x", "y"]);
    for point in &layout.points {
        table.add_row(vec![
            Cell::new(point.date),
            Cell::new(money(point.capital)),
            Cell::new(format!("{:.1}", point.x)),
            Cell::new(format!("{:.1}", point.y)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::{PnlType, TradeSide, UserId};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn trade_rows_show_status_and_signed_pnl() {
        let trade = Trade {
            id: Uuid::new_v4(),
            owner: UserId::new(Uuid::nil()),
            asset: "BTC".to_string(),
            side: TradeSide::Long,
            leverage: 3,
            quantity: dec!(0.25),
            open_price: Some(dec!(64000)),
            close_price: None,
            pnl: dec!(-12.5),
            pnl_type: PnlType::Unrealized,
            opened_at: Utc::now(),
            closed_at: None,
            notes: String::new(),
            tags: vec!["swing".to_string()],
            created_at: None,
        };

        let rendered = trades_table(&[trade]).to_string();
        assert!(rendered.contains("OPEN"));
        assert!(rendered.contains("-12.50"));
        assert!(rendered.contains("3x"));
    }

    #[test]
    fn empty_report_prints_placeholders() {
        let rendered = report_table(TimeWindow::All, &PerformanceReport::new()).to_string();
        assert!(rendered.contains("ALL"));
        assert!(rendered.contains("Best asset"));
        assert!(rendered.contains('-'));
    }
}

use crate::cli::{ChartArgs, SettingsCommand, StatsArgs, TradesCommand, WithdrawalCommand};
use crate::render;
use anyhow::{Context, Result, bail};
use chart::ChartGeometry;
use chrono::Utc;
use configuration::ChartConfig;
use core_types::UserId;
use indicatif::{ProgressBar, ProgressStyle};
use journal::{JournalService, TradeQuery};
use withdrawal::SmartWithdrawal;

// ==============================================================================
// Trades
// ==============================================================================

pub async fn handle_trades(command: TradesCommand, journal: &JournalService) -> Result<()> {
    match command {
        TradesCommand::List(args) => {
            let trades = journal.query_trades(&TradeQuery::from(args)).await?;
            if trades.is_empty() {
                println!("No trades found.");
                return Ok(());
            }
            println!("{}", render::trades_table(&trades));
            let total: rust_decimal::Decimal = trades.iter().map(|t| t.pnl).sum();
            println!("{} trades, total PnL {:.2}", trades.len(), total);
        }
        TradesCommand::Add(args) => {
            let trade = journal.record_trade(args.into_new_trade(Utc::now())).await?;
            println!("Recorded trade {} ({} {}, PnL {:.2}).", trade.id, trade.side, trade.asset, trade.pnl);
        }
        TradesCommand::Update(args) => {
            let id = args.id;
            if let Some(trade) = journal.update_trade(id, &args.into_update(Utc::now())).await? {
                println!("Updated trade {} (status {}, PnL {:.2}).", trade.id, trade.status(), trade.pnl);
            }
        }
        TradesCommand::Delete { id } => {
            journal.delete_trade(id).await?;
            println!("Deleted trade {}.", id);
        }
        TradesCommand::Clear { yes } => handle_clear(journal, yes).await?,
        TradesCommand::Export { query, output } => {
            let json = journal.export_json(&TradeQuery::from(query)).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported trades to {}.", path.display());
                }
                None => println!("{}", json),
            }
        }
    }
    Ok(())
}

/// Deletes every trade with a progress bar, then reports any failures.
async fn handle_clear(journal: &JournalService, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("Refusing to delete every trade without --yes.");
    }

    let count = journal.list_trades().await?.len();
    if count == 0 {
        println!("No trades to clear.");
        return Ok(());
    }

    let progress_bar = ProgressBar::new(count as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Deleting trades...");

    let outcome = journal
        .clear_trades(|_, _| progress_bar.inc(1))
        .await?;

    progress_bar.finish_with_message("Done.");
    println!("Deleted {} trades.", outcome.deleted);
    for (id, e) in &outcome.failed {
        eprintln!("Failed to delete trade {}: {}", id, e);
    }
    if !outcome.failed.is_empty() {
        bail!("{} of {} trades could not be deleted.", outcome.failed.len(), count);
    }
    Ok(())
}

// ==============================================================================
// Analytics and charts
// ==============================================================================

pub async fn handle_stats(args: StatsArgs, journal: &JournalService) -> Result<()> {
    let report = journal.analytics_for(args.window, Utc::now()).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::report_table(args.window, &report));
    }
    Ok(())
}

pub async fn handle_dashboard(journal: &JournalService) -> Result<()> {
    let Some(dashboard) = journal.load_dashboard(Utc::now().date_naive()).await? else {
        return Ok(());
    };

    println!("{}", render::dashboard_table(&dashboard.summary));
    if dashboard.summary.recent_trades.is_empty() {
        println!("No trades yet.");
    } else {
        println!("Recent trades:");
        println!("{}", render::trades_table(&dashboard.summary.recent_trades));
    }
    Ok(())
}

pub async fn handle_chart(args: ChartArgs, journal: &JournalService, defaults: &ChartConfig) -> Result<()> {
    let Some(dashboard) = journal.load_dashboard(Utc::now().date_naive()).await? else {
        return Ok(());
    };

    let width = args.width.unwrap_or(defaults.width);
    let height = args.height.unwrap_or(defaults.height);
    let geometry = chart::map_samples(&dashboard.capital_curve, width, height);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&geometry)?);
        return Ok(());
    }
    match geometry {
        ChartGeometry::Ready(layout) => {
            println!("{}", render::chart_table(&layout));
            println!(
                "Current capital {} ({:?}, {}), {} y-axis labels, {} x-axis labels.",
                layout.current_capital_label,
                layout.trend,
                layout.line_color,
                layout.y_labels.len(),
                layout.x_labels.len()
            );
            println!("polyline: {}", layout.polyline);
        }
        ChartGeometry::Insufficient(reason) => println!("Not enough data for a chart: {}.", reason),
    }
    Ok(())
}

// ==============================================================================
// Withdrawals and settings
// ==============================================================================

pub async fn handle_withdrawal(
    command: WithdrawalCommand,
    withdrawals: &SmartWithdrawal,
    owner: &UserId,
) -> Result<()> {
    match command {
        WithdrawalCommand::Status => {
            let summary = withdrawals.summary(owner).await?;
            println!("{}", render::withdrawal_table(&summary));
        }
        WithdrawalCommand::History => {
            let ledger = withdrawals.history(owner).await?;
            if ledger.is_empty() {
                println!("No withdrawals yet.");
            } else {
                println!("{}", render::ledger_table(&ledger));
            }
        }
        WithdrawalCommand::Withdraw { amount } => {
            let tx = withdrawals.withdraw(owner, amount).await?;
            println!("{} (transaction {}).", tx.description, tx.id);
        }
        WithdrawalCommand::Revert { id } => {
            let tx = withdrawals.revert(owner, id).await?;
            println!("{} (transaction {}).", tx.description, tx.id);
        }
        WithdrawalCommand::Configure {
            enable,
            disable,
            reinvest,
        } => {
            let enabled = match (enable, disable) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let settings = withdrawals.configure(owner, enabled, reinvest).await?;
            println!(
                "Smart withdrawal {}, reinvesting {}% of profit.",
                if settings.enabled { "enabled" } else { "disabled" },
                settings.reinvest_percentage
            );
        }
    }
    Ok(())
}

pub async fn handle_settings(command: SettingsCommand, journal: &JournalService) -> Result<()> {
    let settings = match command.into_patch() {
        None => match journal.settings().await? {
            Some(settings) => settings,
            None => return Ok(()),
        },
        Some(patch) => {
            let saved = journal.update_settings(patch).await?;
            println!("Settings saved.");
            saved
        }
    };
    println!("{}", render::settings_table(&settings));
    Ok(())
}

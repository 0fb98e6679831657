use analytics::TimeWindow;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use core_types::{NewTrade, PnlType, TradeSide, TradeStatus, TradeUpdate, UserId};
use journal::{SettingsPatch, SortKey, SortOrder, TradeQuery};
use rust_decimal::Decimal;
use std::path::PathBuf;
use uuid::Uuid;

/// A personal crypto trading journal backed by Supabase.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record, edit and browse trades.
    #[command(subcommand)]
    Trades(TradesCommand),
    /// Performance statistics for a time window.
    Stats(StatsArgs),
    /// Capital overview and the most recent trades.
    Dashboard,
    /// Capital curve geometry for a line chart.
    Chart(ChartArgs),
    /// The smart withdrawal policy and its ledger.
    #[command(subcommand)]
    Withdrawal(WithdrawalCommand),
    /// Account preferences.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

// ==============================================================================
// Trades
// ==============================================================================

#[derive(Subcommand)]
pub enum TradesCommand {
    /// List trades, optionally filtered and sorted.
    List(QueryArgs),
    /// Record a new trade.
    Add(AddTradeArgs),
    /// Change an existing trade.
    Update(UpdateTradeArgs),
    /// Delete one trade.
    Delete {
        id: Uuid,
    },
    /// Delete every trade.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Write the (filtered) trades as JSON.
    Export {
        #[command(flatten)]
        query: QueryArgs,
        /// Output file. Prints to stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
pub struct QueryArgs {
    /// Case-insensitive text matched against asset and notes.
    #[arg(long)]
    pub search: Option<String>,
    /// Only these assets (repeatable).
    #[arg(long = "asset")]
    pub assets: Vec<String>,
    /// LONG or SHORT.
    #[arg(long)]
    pub side: Option<TradeSide>,
    /// OPEN or CLOSED.
    #[arg(long)]
    pub status: Option<TradeStatus>,
    /// open-time, close-time, pnl or asset.
    #[arg(long, default_value = "open-time")]
    pub sort: SortKey,
    /// asc or desc.
    #[arg(long, default_value = "desc")]
    pub order: SortOrder,
}

impl From<QueryArgs> for TradeQuery {
    fn from(args: QueryArgs) -> Self {
        TradeQuery {
            search: args.search,
            assets: args.assets,
            side: args.side,
            status: args.status,
            sort_by: args.sort,
            order: args.order,
        }
    }
}

#[derive(Args)]
pub struct AddTradeArgs {
    /// The traded symbol (e.g., "BTC").
    #[arg(long)]
    pub asset: String,
    /// LONG or SHORT.
    #[arg(long)]
    pub side: TradeSide,
    #[arg(long, default_value_t = 1)]
    pub leverage: u32,
    #[arg(long)]
    pub quantity: Decimal,
    #[arg(long)]
    pub open_price: Decimal,
    #[arg(long)]
    pub close_price: Option<Decimal>,
    /// Explicit PnL. Derived from the prices when omitted.
    #[arg(long, allow_hyphen_values = true)]
    pub pnl: Option<Decimal>,
    /// Mark the PnL as realized.
    #[arg(long)]
    pub realized: bool,
    /// Open time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub opened_at: Option<DateTime<Utc>>,
    /// Close time (RFC 3339). Leave out for an open position.
    #[arg(long)]
    pub closed_at: Option<DateTime<Utc>>,
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Freeform tag (repeatable).
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl AddTradeArgs {
    pub fn into_new_trade(self, now: DateTime<Utc>) -> NewTrade {
        NewTrade {
            // Replaced by the session user when recorded.
            owner: UserId::new(Uuid::nil()),
            asset: self.asset,
            side: self.side,
            leverage: self.leverage,
            quantity: self.quantity,
            open_price: Some(self.open_price),
            close_price: self.close_price,
            pnl: self.pnl,
            pnl_type: if self.realized {
                PnlType::Realized
            } else {
                PnlType::Unrealized
            },
            opened_at: self.opened_at.unwrap_or(now),
            closed_at: self.closed_at,
            notes: self.notes,
            tags: self.tags,
        }
    }
}

#[derive(Args)]
pub struct UpdateTradeArgs {
    pub id: Uuid,
    #[arg(long)]
    pub close_price: Option<Decimal>,
    #[arg(long, allow_hyphen_values = true)]
    pub pnl: Option<Decimal>,
    /// Mark the PnL as realized.
    #[arg(long)]
    pub realized: bool,
    /// Close time (RFC 3339).
    #[arg(long)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Close the trade now.
    #[arg(long, conflicts_with = "closed_at")]
    pub close_now: bool,
    #[arg(long)]
    pub notes: Option<String>,
    /// Replaces the trade's tags (repeatable).
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl UpdateTradeArgs {
    pub fn into_update(self, now: DateTime<Utc>) -> TradeUpdate {
        TradeUpdate {
            close_price: self.close_price,
            pnl: self.pnl,
            pnl_type: self.realized.then_some(PnlType::Realized),
            closed_at: if self.close_now { Some(now) } else { self.closed_at },
            notes: self.notes,
            tags: (!self.tags.is_empty()).then_some(self.tags),
        }
    }
}

// ==============================================================================
// Analytics and charts
// ==============================================================================

#[derive(Args)]
pub struct StatsArgs {
    /// 1W, 1M, 3M, 6M, 1Y or ALL.
    #[arg(long, default_value = "1M")]
    pub window: TimeWindow,
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ChartArgs {
    /// Canvas width in pixels. Defaults to `chart.width`.
    #[arg(long)]
    pub width: Option<u32>,
    /// Canvas height in pixels. Defaults to `chart.height`.
    #[arg(long)]
    pub height: Option<u32>,
    /// Print the full layout as JSON.
    #[arg(long)]
    pub json: bool,
}

// ==============================================================================
// Withdrawals and settings
// ==============================================================================

#[derive(Subcommand)]
pub enum WithdrawalCommand {
    /// Profit split and the amount available now.
    Status,
    /// The withdrawal ledger, newest first.
    History,
    /// Withdraw part of the available profit.
    Withdraw {
        /// Amount in USD.
        amount: Decimal,
    },
    /// Offset an earlier withdrawal.
    Revert {
        id: Uuid,
    },
    /// Change the policy.
    Configure {
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
        /// Share of profit (0-100) that stays invested.
        #[arg(long)]
        reinvest: Option<Decimal>,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the current preferences.
    Show,
    /// Set the starting capital used for growth figures.
    SetCapital {
        amount: Decimal,
    },
    /// Change one or more preferences.
    Set {
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        email_updates: Option<bool>,
        #[arg(long)]
        auto_backup: Option<bool>,
        #[arg(long)]
        theme: Option<String>,
    },
}

impl SettingsCommand {
    /// `None` for `show`.
    pub fn into_patch(self) -> Option<SettingsPatch> {
        match self {
            SettingsCommand::Show => None,
            SettingsCommand::SetCapital { amount } => Some(SettingsPatch {
                starting_capital: Some(amount),
                ..Default::default()
            }),
            SettingsCommand::Set {
                notifications,
                email_updates,
                auto_backup,
                theme,
            } => Some(SettingsPatch {
                starting_capital: None,
                notifications,
                email_updates,
                auto_backup,
                theme,
            }),
        }
    }
}

mod cli;
mod handlers;
mod render;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use configuration::settings::Config;
use database::{DbError, setup_sql};
use journal::{JournalError, JournalService};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use withdrawal::{SmartWithdrawal, WithdrawalError};

/// The main entry point for the tradelog command-line journal.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the config file and real environment still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match configuration::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match init_tracing(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr and to a daily file under `logging.directory`.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(config: &Config) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;

    let file_appender = tracing_appender::rolling::daily(&config.logging.directory, "tradelog.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()?;

    Ok(guard)
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    let Some(owner) = config.session.user_id else {
        println!("No signed-in user (session.user_id is not set), so there is no data to show.");
        return Ok(());
    };

    let gateway = database::connect(config)?;
    let journal = JournalService::new(gateway.clone(), Some(owner));
    let withdrawals = SmartWithdrawal::new(gateway);
    tracing::debug!(owner = %owner, "Session ready.");

    match command {
        Commands::Trades(cmd) => handlers::handle_trades(cmd, &journal).await,
        Commands::Stats(args) => handlers::handle_stats(args, &journal).await,
        Commands::Dashboard => handlers::handle_dashboard(&journal).await,
        Commands::Chart(args) => handlers::handle_chart(args, &journal, &config.chart).await,
        Commands::Withdrawal(cmd) => handlers::handle_withdrawal(cmd, &withdrawals, &owner).await,
        Commands::Settings(cmd) => handlers::handle_settings(cmd, &journal).await,
    }
}

/// Prints the error, plus the setup SQL when a table is missing.
fn report(err: &anyhow::Error) {
    eprintln!("Error: {}", err);

    match db_error(err) {
        Some(DbError::SetupRequired { table }) => {
            eprintln!("\nRun this in the Supabase SQL editor, then try again:\n");
            eprintln!("{}", setup_sql(*table));
        }
        Some(DbError::PermissionDenied { .. }) => {
            eprintln!("Check session.access_token and the table's row-level security policies.");
        }
        _ => {}
    }
}

/// The repository error underneath a command failure, if there is one.
fn db_error(err: &anyhow::Error) -> Option<&DbError> {
    if let Some(db) = err.downcast_ref::<DbError>() {
        return Some(db);
    }
    if let Some(JournalError::Db(db)) = err.downcast_ref::<JournalError>() {
        return Some(db);
    }
    if let Some(WithdrawalError::Db(db)) = err.downcast_ref::<WithdrawalError>() {
        return Some(db);
    }
    None
}

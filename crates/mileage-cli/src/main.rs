use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mileage_cli::cli::commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mileage")]
#[command(author, version, about = "Sync Garmin running activities and report mileage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file path
    #[arg(long, global = true, env = "MILEAGE_DB")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync activities from Garmin Connect
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
    /// Mileage statistics over the local database
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },
}

#[derive(Subcommand)]
enum SyncCommands {
    /// Run one sync pass
    Run {
        /// Ignore activities starting before this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Stop paginating after this many pages
        #[arg(long, default_value = "200")]
        max_pages: u32,
    },
    /// Show local database status
    Status,
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Current and previous calendar month totals
    Monthly,
    /// Trailing 12 ISO weeks
    Weekly,
    /// Last 7 calendar days including today
    Last7days,
    /// Current ISO week to date
    CurrentWeek,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync { command } => match command {
            SyncCommands::Run { from, max_pages } => {
                commands::sync_run(cli.db, from, max_pages).await
            }
            SyncCommands::Status => commands::sync_status(cli.db).await,
        },
        Commands::Stats { command } => match command {
            StatsCommands::Monthly => commands::monthly(cli.db).await,
            StatsCommands::Weekly => commands::weekly(cli.db).await,
            StatsCommands::Last7days => commands::last_7_days(cli.db).await,
            StatsCommands::CurrentWeek => commands::current_week(cli.db).await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", mileage_cli::error::format_user_error(&e));
        std::process::exit(1);
    }
}

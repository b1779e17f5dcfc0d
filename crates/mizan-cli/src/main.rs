//! Mizan CLI - Zakat ledger with Google Drive sync
//!
//! Provides commands for:
//! - Declaring assets, deductions and metal prices
//! - Tracking payments against the computed obligation
//! - Synchronizing the ledger with the user's Drive app-data folder
//! - Resolving sync conflicts, exporting and importing

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;

use commands::{
    auth::AuthCommand, custom::CustomCommand, export::ExportCommand, import::ImportCommand,
    payment::PaymentCommand, set::SetCommand, show::ShowCommand, sync::SyncCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "mizan", version, about = "Zakat calculator and payment tracker")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the calculator summary and tracker progress
    Show(ShowCommand),
    /// Update prices, assets and deductions
    #[command(subcommand)]
    Set(SetCommand),
    /// Manage custom asset rows
    #[command(subcommand)]
    Custom(CustomCommand),
    /// Manage tracked payments
    #[command(subcommand)]
    Payment(PaymentCommand),
    /// Synchronize with Google Drive
    #[command(subcommand)]
    Sync(SyncCommand),
    /// Export the ledger to a JSON file
    Export(ExportCommand),
    /// Import a previously exported JSON file
    Import(ImportCommand),
    /// Session status and sign-out
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Show(cmd) => cmd.execute(format, config).await,
        Commands::Set(cmd) => cmd.execute(format, config).await,
        Commands::Custom(cmd) => cmd.execute(format, config).await,
        Commands::Payment(cmd) => cmd.execute(format, config).await,
        Commands::Sync(cmd) => cmd.execute(format, config).await,
        Commands::Export(cmd) => cmd.execute(format, config).await,
        Commands::Import(cmd) => cmd.execute(format, config).await,
        Commands::Auth(cmd) => cmd.execute(format, config).await,
    }
}

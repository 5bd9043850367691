//! essif CLI — command-line interface for the DID wallet.
//!
//! Subcommands: init, create, list, show.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::WalletConfig;

/// essif — DID wallet for EBSI identities.
#[derive(Parser, Debug)]
#[command(name = "essif", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "essif.toml")]
    config: PathBuf,

    /// Override the wallet store directory.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Create a new DID with its document and keys.
    Create(commands::create::CreateArgs),
    /// List every DID in the wallet.
    List(commands::list::ListArgs),
    /// Show the stored record of a DID, private keys redacted.
    Show(commands::show::ShowArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = WalletConfig::load(&cli.config)?;
    if let Some(store) = cli.store {
        config.storage.path = store;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_tracing(&config);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config, &config),
        Commands::Create(args) => commands::create::run(args, &config),
        Commands::List(args) => commands::list::run(args, &config),
        Commands::Show(args) => commands::show::run(args, &config),
    }
}

fn init_tracing(config: &WalletConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}

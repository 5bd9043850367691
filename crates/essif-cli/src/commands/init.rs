//! `essif init` — Write a default configuration file.

use clap::Args;
use std::path::Path;

use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, path: &Path, config: &WalletConfig) -> anyhow::Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    config.save(path)?;
    tracing::info!(path = %path.display(), "wrote config");
    println!("Wrote {}", path.display());
    println!("  Store: {}", config.storage.path.display());
    Ok(())
}

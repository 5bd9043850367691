//! `essif create` — Create a new DID with its document and keys.

use clap::Args;

use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Print the DID document after creating it.
    #[arg(long)]
    pub document: bool,
}

pub fn run(args: &CreateArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let provisioner = super::open_provisioner(config)?;
    let bucket = provisioner.create()?;

    println!("{}", bucket.did);
    if args.document {
        if let Some(document) = &bucket.document {
            println!("{}", serde_json::to_string_pretty(document)?);
        }
    }
    Ok(())
}

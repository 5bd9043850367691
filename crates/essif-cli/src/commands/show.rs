//! `essif show` — Show the stored record of a DID.

use clap::Args;
use essif_identity::Did;

use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// The DID to show.
    #[arg(long)]
    pub did: String,
}

pub fn run(args: &ShowArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let did = Did::parse(&args.did)?;
    let provisioner = super::open_provisioner(config)?;
    let bucket = provisioner.bucket(&did)?;

    println!("State: {}", bucket.state());
    println!("{}", serde_json::to_string_pretty(&bucket.redacted())?);
    Ok(())
}

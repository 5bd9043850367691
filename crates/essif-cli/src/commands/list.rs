//! `essif list` — List every DID in the wallet.

use clap::Args;

use crate::config::WalletConfig;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Also print the provisioning state of each DID.
    #[arg(short, long)]
    pub long: bool,
}

pub fn run(args: &ListArgs, config: &WalletConfig) -> anyhow::Result<()> {
    let provisioner = super::open_provisioner(config)?;
    let wallet = provisioner.wallet();
    let dids = wallet.try_all_keys()?;

    if dids.is_empty() {
        println!("Wallet is empty.");
        return Ok(());
    }

    for did in dids {
        if args.long {
            match wallet.get_bucket_by_did(&did) {
                Ok(bucket) => println!("{did}  {}", bucket.state()),
                Err(e) => println!("{did}  <unreadable: {e}>"),
            }
        } else {
            println!("{did}");
        }
    }
    Ok(())
}

pub mod create;
pub mod init;
pub mod list;
pub mod show;

use essif_identity::Provisioner;
use essif_wallet::WalletRepository;

use crate::config::WalletConfig;

/// Open the configured wallet for a provisioning command.
pub(crate) fn open_provisioner(config: &WalletConfig) -> anyhow::Result<Provisioner> {
    let wallet = WalletRepository::open(&config.storage.path)?;
    Ok(Provisioner::new(wallet))
}

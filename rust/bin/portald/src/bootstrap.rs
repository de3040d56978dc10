//! Bootstrap — first-start checks before the server accepts traffic.

use crate::config::ServerConfig;

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if let Some(listen) = &config.listen {
        if listen.is_empty() {
            anyhow::bail!("Listen address is empty in configuration.");
        }
    }
    Ok(())
}

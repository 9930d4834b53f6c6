use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use helpup_store::{InMemoryStore, JournalConfig, JournalStore, Store, SyncMode};
use helpup_wallet::WalletConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Journal file backing the store. `None` keeps everything in memory.
    pub journal_path: Option<PathBuf>,
    pub sync_mode: SyncMode,
    pub wallet: WalletConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            journal_path: None,
            sync_mode: SyncMode::default(),
            wallet: WalletConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    /// Open the configured store backend.
    pub fn open_store(&self) -> ServerResult<Arc<dyn Store>> {
        match &self.journal_path {
            Some(path) => {
                let store = JournalStore::open(
                    path,
                    JournalConfig {
                        sync_mode: self.sync_mode,
                    },
                )?;
                Ok(Arc::new(store))
            }
            None => Ok(Arc::new(InMemoryStore::new())),
        }
    }
}

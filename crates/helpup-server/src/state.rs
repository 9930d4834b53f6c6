use std::sync::Arc;

use helpup_store::Store;
use helpup_wallet::{Platform, WalletConfig, WalletError, WalletResult};

use crate::error::ApiError;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    platform: Platform,
    backend: &'static str,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: WalletConfig, backend: &'static str) -> Self {
        Self {
            platform: Platform::new(store, config),
            backend,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Name of the store backend, reported by `/v1/info`.
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn currency(&self) -> &str {
        &self.platform.config().currency_symbol
    }

    /// Run a state-changing call on the blocking pool.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Platform) -> WalletResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(f)
            .await
            .map_err(|e| ApiError::mutation(e, self.currency()))
    }

    /// Run the donation workflow on the blocking pool. Every failure maps
    /// to a 400.
    pub async fn donate<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Platform) -> WalletResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(f)
            .await
            .map_err(|e| ApiError::donation(e, self.currency()))
    }

    /// Run a read on the blocking pool.
    pub async fn lookup<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Platform) -> WalletResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(f)
            .await
            .map_err(|e| ApiError::lookup(e, self.currency()))
    }

    async fn run<T, F>(&self, f: F) -> WalletResult<T>
    where
        F: FnOnce(&Platform) -> WalletResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let platform = self.platform.clone();
        tokio::task::spawn_blocking(move || f(&platform))
            .await
            .map_err(|e| WalletError::Internal(format!("blocking task failed: {e}")))?
    }
}

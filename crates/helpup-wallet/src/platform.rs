use std::sync::Arc;

use helpup_store::Store;

use crate::config::WalletConfig;
use crate::directory::DirectoryService;
use crate::donation::DonationWorkflow;
use crate::query::LedgerQuery;
use crate::wallet::WalletService;

/// Every service wired to one shared store.
#[derive(Clone, Debug)]
pub struct Platform {
    pub wallet: WalletService,
    pub donations: DonationWorkflow,
    pub query: LedgerQuery,
    pub directory: DirectoryService,
}

impl Platform {
    pub fn new(store: Arc<dyn Store>, config: WalletConfig) -> Self {
        let wallet = WalletService::new(store.clone(), config);
        Self {
            donations: DonationWorkflow::new(wallet.clone()),
            query: LedgerQuery::new(store.clone()),
            directory: DirectoryService::new(store),
            wallet,
        }
    }

    pub fn config(&self) -> &WalletConfig {
        self.wallet.config()
    }
}

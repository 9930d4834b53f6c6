//! In-memory store for tests and embedding.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use helpup_types::{
    Campaign, CampaignId, CampaignUpdate, Donation, DonationId, NewCampaign, NewOrganization,
    NewUser, Organization, OrganizationId, OrganizationUpdate, TransactionId, User, UserId,
    WalletTransaction,
};
use tracing::debug;

use crate::batch::{CommitReceipt, WriteBatch};
use crate::error::{StoreError, StoreResult};
use crate::tables::Tables;
use crate::traits::{DirectoryStore, LedgerStore};

/// A [`Tables`] set behind a `RwLock`. Data is lost when the store is
/// dropped.
///
/// Commits take the write lock for the whole plan/apply cycle, so balance
/// checks and balance writes are never interleaved with another commit.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::from_tables(Tables::new())
    }

    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub(crate) fn read_tables(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    pub(crate) fn write_tables(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> StoreResult<u64> {
        Ok(self.read_tables()?.commit_count())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("commits", &self.commit_count().ok())
            .finish()
    }
}

impl DirectoryStore for InMemoryStore {
    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let user = self.write_tables()?.insert_user(user);
        debug!(user = %user.id, "user inserted");
        Ok(user)
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read_tables()?.user(id).cloned())
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read_tables()?.users().cloned().collect())
    }

    fn insert_organization(&self, organization: NewOrganization) -> StoreResult<Organization> {
        self.write_tables()?.insert_organization(organization)
    }

    fn organization(&self, id: OrganizationId) -> StoreResult<Option<Organization>> {
        Ok(self.read_tables()?.organization(id).cloned())
    }

    fn organizations(&self) -> StoreResult<Vec<Organization>> {
        Ok(self.read_tables()?.organizations().cloned().collect())
    }

    fn update_organization(
        &self,
        id: OrganizationId,
        update: &OrganizationUpdate,
    ) -> StoreResult<Organization> {
        self.write_tables()?.update_organization(id, update)
    }

    fn insert_campaign(&self, campaign: NewCampaign) -> StoreResult<Campaign> {
        self.write_tables()?.insert_campaign(campaign)
    }

    fn campaign(&self, id: CampaignId) -> StoreResult<Option<Campaign>> {
        Ok(self.read_tables()?.campaign(id).cloned())
    }

    fn campaigns(&self) -> StoreResult<Vec<Campaign>> {
        Ok(self.read_tables()?.campaigns().cloned().collect())
    }

    fn update_campaign(&self, id: CampaignId, update: &CampaignUpdate) -> StoreResult<Campaign> {
        self.write_tables()?.update_campaign(id, update)
    }
}

impl LedgerStore for InMemoryStore {
    fn commit(&self, batch: &WriteBatch) -> StoreResult<CommitReceipt> {
        let receipt = self.write_tables()?.commit(batch)?;
        debug!(sequence = receipt.sequence, ops = batch.len(), "batch committed");
        Ok(receipt)
    }

    fn transaction(&self, id: TransactionId) -> StoreResult<Option<WalletTransaction>> {
        Ok(self.read_tables()?.transaction(id).cloned())
    }

    fn transactions(&self) -> StoreResult<Vec<WalletTransaction>> {
        Ok(self.read_tables()?.transactions().cloned().collect())
    }

    fn donation(&self, id: DonationId) -> StoreResult<Option<Donation>> {
        Ok(self.read_tables()?.donation(id).cloned())
    }

    fn donations(&self) -> StoreResult<Vec<Donation>> {
        Ok(self.read_tables()?.donations().cloned().collect())
    }
}

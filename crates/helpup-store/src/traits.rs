use helpup_types::{
    Campaign, CampaignId, CampaignUpdate, Donation, DonationId, NewCampaign, NewOrganization,
    NewUser, Organization, OrganizationId, OrganizationUpdate, TransactionId, User, UserId,
    WalletTransaction,
};

use crate::batch::{CommitReceipt, WriteBatch};
use crate::error::StoreResult;

/// Registration and lookup of users, organizations, and campaigns.
///
/// Implementations must be thread-safe and give read-after-write
/// consistency: once an insert returns, every subsequent read sees it.
pub trait DirectoryStore: Send + Sync {
    /// Register a user. The wallet starts at zero.
    fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    /// Returns `Ok(None)` if the user does not exist.
    fn user(&self, id: UserId) -> StoreResult<Option<User>>;

    fn users(&self) -> StoreResult<Vec<User>>;

    /// Register an organization. Fails if a given owner does not exist.
    fn insert_organization(&self, organization: NewOrganization) -> StoreResult<Organization>;

    fn organization(&self, id: OrganizationId) -> StoreResult<Option<Organization>>;

    fn organizations(&self) -> StoreResult<Vec<Organization>>;

    /// Apply a partial edit, including approval status changes.
    fn update_organization(
        &self,
        id: OrganizationId,
        update: &OrganizationUpdate,
    ) -> StoreResult<Organization>;

    /// Create a campaign. Fails if the organization does not exist.
    fn insert_campaign(&self, campaign: NewCampaign) -> StoreResult<Campaign>;

    fn campaign(&self, id: CampaignId) -> StoreResult<Option<Campaign>>;

    fn campaigns(&self) -> StoreResult<Vec<Campaign>>;

    /// Apply a partial edit. The raised total is never changed here.
    fn update_campaign(&self, id: CampaignId, update: &CampaignUpdate) -> StoreResult<Campaign>;

    fn campaigns_for_organization(&self, id: OrganizationId) -> StoreResult<Vec<Campaign>> {
        Ok(self
            .campaigns()?
            .into_iter()
            .filter(|c| c.organization_id == id)
            .collect())
    }
}

/// The wallet ledger: atomic batch commits plus append-only history.
pub trait LedgerStore: Send + Sync {
    /// Commit a batch atomically.
    ///
    /// Every operation is checked before any is applied. On error nothing
    /// has changed. A `Debit` that the (staged) balance does not cover fails
    /// the whole batch with `StoreError::InsufficientBalance`.
    fn commit(&self, batch: &WriteBatch) -> StoreResult<CommitReceipt>;

    fn transaction(&self, id: TransactionId) -> StoreResult<Option<WalletTransaction>>;

    /// All ledger entries in id order.
    fn transactions(&self) -> StoreResult<Vec<WalletTransaction>>;

    fn transactions_for_user(&self, user: UserId) -> StoreResult<Vec<WalletTransaction>> {
        Ok(self
            .transactions()?
            .into_iter()
            .filter(|t| t.user_id == user)
            .collect())
    }

    fn donation(&self, id: DonationId) -> StoreResult<Option<Donation>>;

    /// All donations in id order.
    fn donations(&self) -> StoreResult<Vec<Donation>>;

    fn donations_for_user(&self, user: UserId) -> StoreResult<Vec<Donation>> {
        Ok(self
            .donations()?
            .into_iter()
            .filter(|d| d.user_id == user)
            .collect())
    }

    fn donations_for_campaign(&self, campaign: CampaignId) -> StoreResult<Vec<Donation>> {
        Ok(self
            .donations()?
            .into_iter()
            .filter(|d| d.campaign_id == campaign)
            .collect())
    }
}

/// Everything the wallet services need from a backend.
pub trait Store: DirectoryStore + LedgerStore {}

impl<T: DirectoryStore + LedgerStore + ?Sized> Store for T {}

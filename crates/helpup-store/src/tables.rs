//! The table set shared by every store backend.
//!
//! Commits are split into [`Tables::plan`], which checks every precondition
//! without touching state, and [`Tables::apply`], which cannot fail. Durable
//! backends write their journal between the two.

use std::collections::BTreeMap;

use helpup_types::{
    Balance, Campaign, CampaignId, CampaignUpdate, Donation, DonationId, NewCampaign,
    NewOrganization, NewUser, Organization, OrganizationId, OrganizationUpdate, Total,
    TransactionId, User, UserId, WalletTransaction,
};

use crate::batch::{BatchOp, CommitReceipt, WriteBatch};
use crate::error::{StoreError, StoreResult};

/// All persistent state, keyed by id. Ids are assigned sequentially from 1.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    users: BTreeMap<UserId, User>,
    organizations: BTreeMap<OrganizationId, Organization>,
    campaigns: BTreeMap<CampaignId, Campaign>,
    transactions: BTreeMap<TransactionId, WalletTransaction>,
    donations: BTreeMap<DonationId, Donation>,
    commits: u64,
}

/// A batch whose preconditions have been checked against a [`Tables`].
///
/// Only valid for the state it was planned against; callers must hold the
/// store's write lock from `plan` through `apply`.
#[derive(Debug)]
pub struct PlannedCommit<'b> {
    batch: &'b WriteBatch,
    balances: BTreeMap<UserId, Balance>,
    raised: BTreeMap<CampaignId, Total>,
}

fn next_id<K: Copy + Ord, V>(map: &BTreeMap<K, V>, raw: impl Fn(K) -> u64) -> u64 {
    map.last_key_value().map(|(k, _)| raw(*k) + 1).unwrap_or(1)
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Directory ----

    pub fn insert_user(&mut self, user: NewUser) -> User {
        let id = UserId::new(next_id(&self.users, UserId::get));
        let user = user.into_user(id);
        self.users.insert(id, user.clone());
        user
    }

    pub fn check_organization(&self, organization: &NewOrganization) -> StoreResult<()> {
        if let Some(owner) = organization.owner {
            self.require_user(owner)?;
        }
        Ok(())
    }

    pub fn insert_organization(
        &mut self,
        organization: NewOrganization,
    ) -> StoreResult<Organization> {
        self.check_organization(&organization)?;
        let id = OrganizationId::new(next_id(&self.organizations, OrganizationId::get));
        let organization = organization.into_organization(id);
        self.organizations.insert(id, organization.clone());
        Ok(organization)
    }

    pub fn check_campaign(&self, campaign: &NewCampaign) -> StoreResult<()> {
        if !self.organizations.contains_key(&campaign.organization_id) {
            return Err(StoreError::OrganizationNotFound(campaign.organization_id));
        }
        Ok(())
    }

    pub fn insert_campaign(&mut self, campaign: NewCampaign) -> StoreResult<Campaign> {
        self.check_campaign(&campaign)?;
        let id = CampaignId::new(next_id(&self.campaigns, CampaignId::get));
        let campaign = campaign.into_campaign(id);
        self.campaigns.insert(id, campaign.clone());
        Ok(campaign)
    }

    /// The organization as `update` would leave it.
    pub fn check_organization_update(
        &self,
        id: OrganizationId,
        update: &OrganizationUpdate,
    ) -> StoreResult<Organization> {
        let current = self
            .organizations
            .get(&id)
            .ok_or(StoreError::OrganizationNotFound(id))?;
        Ok(update.applied_to(current))
    }

    pub fn update_organization(
        &mut self,
        id: OrganizationId,
        update: &OrganizationUpdate,
    ) -> StoreResult<Organization> {
        let next = self.check_organization_update(id, update)?;
        self.organizations.insert(id, next.clone());
        Ok(next)
    }

    /// The campaign as `update` would leave it. The raised total is carried
    /// over from the current record.
    pub fn check_campaign_update(
        &self,
        id: CampaignId,
        update: &CampaignUpdate,
    ) -> StoreResult<Campaign> {
        let current = self.require_campaign(id)?;
        Ok(update.applied_to(current)?)
    }

    pub fn update_campaign(
        &mut self,
        id: CampaignId,
        update: &CampaignUpdate,
    ) -> StoreResult<Campaign> {
        let next = self.check_campaign_update(id, update)?;
        self.campaigns.insert(id, next.clone());
        Ok(next)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn organization(&self, id: OrganizationId) -> Option<&Organization> {
        self.organizations.get(&id)
    }

    pub fn organizations(&self) -> impl Iterator<Item = &Organization> {
        self.organizations.values()
    }

    pub fn campaign(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.get(&id)
    }

    pub fn campaigns(&self) -> impl Iterator<Item = &Campaign> {
        self.campaigns.values()
    }

    // ---- Ledger ----

    pub fn transaction(&self, id: TransactionId) -> Option<&WalletTransaction> {
        self.transactions.get(&id)
    }

    pub fn transactions(&self) -> impl Iterator<Item = &WalletTransaction> {
        self.transactions.values()
    }

    pub fn donation(&self, id: DonationId) -> Option<&Donation> {
        self.donations.get(&id)
    }

    pub fn donations(&self) -> impl Iterator<Item = &Donation> {
        self.donations.values()
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Check every operation in `batch` against current state.
    pub fn plan<'b>(&self, batch: &'b WriteBatch) -> StoreResult<PlannedCommit<'b>> {
        if batch.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let mut balances: BTreeMap<UserId, Balance> = BTreeMap::new();
        let mut raised: BTreeMap<CampaignId, Total> = BTreeMap::new();

        for op in batch.ops() {
            match op {
                BatchOp::Credit { user, amount } => {
                    let current = self.staged_balance(&balances, *user)?;
                    balances.insert(*user, current.credit(*amount)?);
                }
                BatchOp::Debit { user, amount } => {
                    let current = self.staged_balance(&balances, *user)?;
                    let next = current.debit(*amount).ok_or(StoreError::InsufficientBalance {
                        user: *user,
                        balance: current,
                        requested: *amount,
                    })?;
                    balances.insert(*user, next);
                }
                BatchOp::AppendTransaction(transaction) => {
                    self.require_user(transaction.user_id)?;
                }
                BatchOp::InsertDonation(donation) => {
                    self.require_user(donation.user_id)?;
                    self.require_campaign(donation.campaign_id)?;
                }
                BatchOp::AddRaised { campaign, amount } => {
                    let current = match raised.get(campaign) {
                        Some(total) => *total,
                        None => self.require_campaign(*campaign)?.total_raised,
                    };
                    raised.insert(*campaign, current.add(*amount)?);
                }
            }
        }

        Ok(PlannedCommit {
            batch,
            balances,
            raised,
        })
    }

    /// Apply a planned batch. Infallible by construction.
    pub fn apply(&mut self, plan: PlannedCommit<'_>) -> CommitReceipt {
        for (id, balance) in &plan.balances {
            if let Some(user) = self.users.get_mut(id) {
                user.wallet_balance = *balance;
                user.version += 1;
            }
        }
        for (id, total) in &plan.raised {
            if let Some(campaign) = self.campaigns.get_mut(id) {
                campaign.total_raised = *total;
            }
        }

        let mut transactions = Vec::new();
        let mut donations = Vec::new();
        for op in plan.batch.ops() {
            match op {
                BatchOp::AppendTransaction(transaction) => {
                    let id = TransactionId::new(next_id(&self.transactions, TransactionId::get));
                    let record = transaction.clone().into_transaction(id);
                    self.transactions.insert(id, record.clone());
                    transactions.push(record);
                }
                BatchOp::InsertDonation(donation) => {
                    let id = DonationId::new(next_id(&self.donations, DonationId::get));
                    let record = donation.clone().into_donation(id);
                    self.donations.insert(id, record.clone());
                    donations.push(record);
                }
                BatchOp::Credit { .. } | BatchOp::Debit { .. } | BatchOp::AddRaised { .. } => {}
            }
        }

        self.commits += 1;
        CommitReceipt {
            sequence: self.commits,
            transactions,
            donations,
            balances: plan.balances,
            campaign_totals: plan.raised,
        }
    }

    /// Plan and apply in one step.
    pub fn commit(&mut self, batch: &WriteBatch) -> StoreResult<CommitReceipt> {
        let plan = self.plan(batch)?;
        Ok(self.apply(plan))
    }

    fn require_user(&self, id: UserId) -> StoreResult<&User> {
        self.users.get(&id).ok_or(StoreError::UserNotFound(id))
    }

    fn require_campaign(&self, id: CampaignId) -> StoreResult<&Campaign> {
        self.campaigns.get(&id).ok_or(StoreError::CampaignNotFound(id))
    }

    fn staged_balance(
        &self,
        staged: &BTreeMap<UserId, Balance>,
        user: UserId,
    ) -> StoreResult<Balance> {
        match staged.get(&user) {
            Some(balance) => Ok(*balance),
            None => Ok(self.require_user(user)?.wallet_balance),
        }
    }
}

//! Read-only projections over the ledger.

use std::sync::Arc;

use helpup_store::Store;
use helpup_types::{
    Amount, Campaign, CampaignId, Donation, DonationId, DonationStats, TransactionId, UserId,
    WalletTransaction,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{WalletError, WalletResult};

/// Funding progress of one campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub campaign: Campaign,
    pub donation_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub progress_percent: Decimal,
    pub funded: bool,
}

/// A campaign whose stored raised total disagrees with its donations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaisedDrift {
    pub campaign: CampaignId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub stored: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub computed: Decimal,
}

/// Result of comparing every campaign's stored total with its donations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub campaigns_checked: u64,
    pub donations_checked: u64,
    pub drift: Vec<RaisedDrift>,
}

impl AuditReport {
    /// Returns `true` if no campaign drifted.
    pub fn is_consistent(&self) -> bool {
        self.drift.is_empty()
    }
}

/// Read side of the wallet ledger.
#[derive(Clone)]
pub struct LedgerQuery {
    store: Arc<dyn Store>,
}

impl LedgerQuery {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn transactions(&self) -> WalletResult<Vec<WalletTransaction>> {
        Ok(self.store.transactions()?)
    }

    /// Ledger entries owned by `user`. Unknown users have none.
    pub fn transactions_for_user(&self, user: UserId) -> WalletResult<Vec<WalletTransaction>> {
        Ok(self.store.transactions_for_user(user)?)
    }

    pub fn transaction(&self, id: TransactionId) -> WalletResult<WalletTransaction> {
        self.store
            .transaction(id)?
            .ok_or(WalletError::TransactionNotFound(id))
    }

    pub fn donations(&self) -> WalletResult<Vec<Donation>> {
        Ok(self.store.donations()?)
    }

    pub fn donation(&self, id: DonationId) -> WalletResult<Donation> {
        self.store
            .donation(id)?
            .ok_or(WalletError::DonationNotFound(id))
    }

    pub fn donations_for_user(&self, user: UserId) -> WalletResult<Vec<Donation>> {
        Ok(self.store.donations_for_user(user)?)
    }

    pub fn donations_for_campaign(&self, campaign: CampaignId) -> WalletResult<Vec<Donation>> {
        Ok(self.store.donations_for_campaign(campaign)?)
    }

    /// Total, count, and mean over every donation record.
    pub fn donation_stats(&self) -> WalletResult<DonationStats> {
        let donations = self.store.donations()?;
        DonationStats::from_amounts(donations.iter().map(|d| d.amount))
            .ok_or_else(|| WalletError::Internal("donation total out of range".into()))
    }

    pub fn campaign_summary(&self, id: CampaignId) -> WalletResult<CampaignSummary> {
        let campaign = self
            .store
            .campaign(id)?
            .ok_or(WalletError::CampaignNotFound(id))?;
        let donation_count = self
            .store
            .donations_for_campaign(id)?
            .iter()
            .filter(|d| d.is_completed())
            .count() as u64;
        Ok(CampaignSummary {
            progress_percent: campaign.progress_percent(),
            funded: campaign.is_funded(),
            donation_count,
            campaign,
        })
    }

    /// Compare each campaign's stored `total_raised` with the sum of its
    /// completed donations.
    pub fn audit(&self) -> WalletResult<AuditReport> {
        let campaigns = self.store.campaigns()?;
        let donations = self.store.donations()?;
        let mut report = AuditReport {
            campaigns_checked: campaigns.len() as u64,
            donations_checked: donations.len() as u64,
            drift: Vec::new(),
        };

        for campaign in campaigns {
            let computed = sum_amounts(
                donations
                    .iter()
                    .filter(|d| d.campaign_id == campaign.id && d.is_completed())
                    .map(|d| d.amount),
            )?;
            let stored = campaign.total_raised.as_decimal();
            if stored != computed {
                tracing::warn!(
                    campaign = %campaign.id,
                    stored = %stored,
                    computed = %computed,
                    "campaign raised total drifted"
                );
                report.drift.push(RaisedDrift {
                    campaign: campaign.id,
                    name: campaign.name,
                    stored,
                    computed,
                });
            }
        }
        Ok(report)
    }
}

impl std::fmt::Debug for LedgerQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerQuery").finish_non_exhaustive()
    }
}

fn sum_amounts(mut amounts: impl Iterator<Item = Amount>) -> WalletResult<Decimal> {
    amounts.try_fold(Decimal::ZERO, |acc, a| {
        acc.checked_add(a.as_decimal())
            .ok_or_else(|| WalletError::Internal("donation total out of range".into()))
    })
}

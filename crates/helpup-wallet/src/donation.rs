//! The donation workflow: balance check, wallet debit, and donation record
//! committed as one unit.

use std::sync::Arc;

use chrono::Utc;
use helpup_store::{Store, StoreError, WriteBatch};
use helpup_types::{
    Balance, CampaignId, Donation, DonationStatus, NewDonation, NewTransaction, TransactionType,
    UserId, WalletTransaction,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{WalletError, WalletResult};
use crate::wallet::{positive_amount, WalletService};

/// A donation request as it arrives from a caller. Every field is optional
/// so that missing input is reported as a validation error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub user_id: Option<UserId>,
    pub campaign_id: Option<CampaignId>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// Everything a successful donation wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationOutcome {
    pub donation: Donation,
    pub transaction: WalletTransaction,
    pub new_balance: Balance,
}

/// Orchestrates a wallet-funded donation.
#[derive(Clone, Debug)]
pub struct DonationWorkflow {
    wallet: WalletService,
}

impl DonationWorkflow {
    pub fn new(wallet: WalletService) -> Self {
        Self { wallet }
    }

    fn store(&self) -> &Arc<dyn Store> {
        self.wallet.store()
    }

    /// Validate an untyped request and process it.
    pub fn process(&self, request: DonationRequest) -> WalletResult<DonationOutcome> {
        let (Some(user), Some(campaign), Some(amount)) =
            (request.user_id, request.campaign_id, request.amount)
        else {
            return Err(WalletError::InvalidArgument(
                "User ID, Campaign ID, and Amount are required".into(),
            ));
        };
        self.process_donation(user, campaign, amount, request.notes)
    }

    /// Debit `amount` from `user` and record a completed donation to
    /// `campaign`.
    ///
    /// The debit, its ledger entry, the donation, and the campaign's raised
    /// total are committed in a single batch. On any error nothing is
    /// written.
    pub fn process_donation(
        &self,
        user: UserId,
        campaign: CampaignId,
        amount: Decimal,
        notes: Option<String>,
    ) -> WalletResult<DonationOutcome> {
        let result = self.try_process(user, campaign, amount, notes);
        if let Err(err) = &result {
            warn!(
                user = %user,
                campaign = %campaign,
                amount = %amount,
                error = %err,
                "donation rejected"
            );
        }
        result
    }

    fn try_process(
        &self,
        user: UserId,
        campaign: CampaignId,
        amount: Decimal,
        notes: Option<String>,
    ) -> WalletResult<DonationOutcome> {
        let amount = positive_amount(amount, "Donation amount must be positive")?;

        if !self
            .wallet
            .has_sufficient_balance(user, amount.as_decimal())?
        {
            return Err(WalletError::InsufficientFunds {
                balance: self.wallet.get_balance(user)?,
                requested: amount,
            });
        }

        let donor = self
            .store()
            .user(user)?
            .ok_or(WalletError::UserNotFound(user))?;
        let target = self
            .store()
            .campaign(campaign)?
            .ok_or(WalletError::CampaignNotFound(campaign))?;

        let now = Utc::now();
        let batch = WriteBatch::new()
            .debit(donor.id, amount)
            .append_transaction(NewTransaction {
                user_id: donor.id,
                amount,
                transaction_type: TransactionType::Donation,
                date: now,
                notes: format!("Donation to campaign: {}", target.name),
            })
            .insert_donation(NewDonation {
                user_id: donor.id,
                campaign_id: target.id,
                amount,
                date: now,
                status: DonationStatus::Completed,
                kind: self.wallet.config().donation_type.clone(),
                notes,
            })
            .add_raised(target.id, amount);

        let mut receipt = self.store().commit(&batch).map_err(|e| match e {
            StoreError::InsufficientBalance { user, balance, .. } => {
                WalletError::Conflict { user, balance }
            }
            other => WalletError::from(other),
        })?;

        let new_balance = receipt
            .balance_of(donor.id)
            .ok_or_else(|| WalletError::Internal("commit did not report a balance".into()))?;
        let transaction = receipt
            .transactions
            .pop()
            .ok_or_else(|| WalletError::Internal("commit did not record a transaction".into()))?;
        let donation = receipt
            .donations
            .pop()
            .ok_or_else(|| WalletError::Internal("commit did not record a donation".into()))?;

        info!(
            donation = %donation.id,
            user = %donor.id,
            campaign = %target.id,
            amount = %amount,
            balance = %new_balance,
            "donation completed"
        );

        Ok(DonationOutcome {
            donation,
            transaction,
            new_balance,
        })
    }
}

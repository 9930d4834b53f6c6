use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use helpup_types::{
    Amount, Balance, CampaignId, Donation, NewDonation, NewTransaction, Total, UserId,
    WalletTransaction,
};

/// A single write inside a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum BatchOp {
    /// Add `amount` to the user's wallet.
    Credit { user: UserId, amount: Amount },
    /// Subtract `amount` from the user's wallet, only if the balance
    /// (as staged by earlier ops in the same batch) covers it.
    Debit { user: UserId, amount: Amount },
    /// Append a ledger entry. The owning user must exist.
    AppendTransaction(NewTransaction),
    /// Insert a donation. Its user and campaign must exist.
    InsertDonation(NewDonation),
    /// Add `amount` to a campaign's stored raised total.
    AddRaised { campaign: CampaignId, amount: Amount },
}

/// An ordered set of writes committed all-or-nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: BatchOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn credit(mut self, user: UserId, amount: Amount) -> Self {
        self.ops.push(BatchOp::Credit { user, amount });
        self
    }

    pub fn debit(mut self, user: UserId, amount: Amount) -> Self {
        self.ops.push(BatchOp::Debit { user, amount });
        self
    }

    pub fn append_transaction(mut self, transaction: NewTransaction) -> Self {
        self.ops.push(BatchOp::AppendTransaction(transaction));
        self
    }

    pub fn insert_donation(mut self, donation: NewDonation) -> Self {
        self.ops.push(BatchOp::InsertDonation(donation));
        self
    }

    pub fn add_raised(mut self, campaign: CampaignId, amount: Amount) -> Self {
        self.ops.push(BatchOp::AddRaised { campaign, amount });
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// What a successful commit wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Monotonic commit counter for the store (1-based).
    pub sequence: u64,
    /// Ledger entries created by the batch, in batch order.
    pub transactions: Vec<WalletTransaction>,
    /// Donations created by the batch, in batch order.
    pub donations: Vec<Donation>,
    /// Post-commit balance of every wallet the batch touched.
    pub balances: BTreeMap<UserId, Balance>,
    /// Post-commit raised total of every campaign the batch touched.
    pub campaign_totals: BTreeMap<CampaignId, Total>,
}

impl CommitReceipt {
    pub fn balance_of(&self, user: UserId) -> Option<Balance> {
        self.balances.get(&user).copied()
    }
}

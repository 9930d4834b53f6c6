use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{TransactionId, UserId};
use crate::money::Amount;

/// Kind of balance-affecting event recorded in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "top-up")]
    TopUp,
    #[serde(rename = "donation")]
    Donation,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopUp => "top-up",
            Self::Donation => "donation",
        }
    }

    /// Returns `true` if this entry increases the wallet balance.
    pub fn is_credit(&self) -> bool {
        matches!(self, Self::TopUp)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable ledger entry. Never updated or deleted once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub amount: Amount,
    pub transaction_type: TransactionType,
    pub date: DateTime<Utc>,
    pub notes: String,
}

/// A ledger entry waiting for the store to assign its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub user_id: UserId,
    pub amount: Amount,
    pub transaction_type: TransactionType,
    pub date: DateTime<Utc>,
    pub notes: String,
}

impl NewTransaction {
    pub fn into_transaction(self, id: TransactionId) -> WalletTransaction {
        WalletTransaction {
            id,
            user_id: self.user_id,
            amount: self.amount,
            transaction_type: self.transaction_type,
            date: self.date,
            notes: self.notes,
        }
    }
}

//! Wallet balance checks, credits, and debits.

use std::sync::Arc;

use chrono::Utc;
use helpup_store::{CommitReceipt, Store, WriteBatch};
use helpup_types::{
    Amount, Balance, NewTransaction, TransactionType, TypeError, UserId, WalletTransaction,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::WalletConfig;
use crate::error::{WalletError, WalletResult};

/// Result of a credit or debit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletReceipt {
    pub new_balance: Balance,
    pub transaction: WalletTransaction,
}

/// Enforces the balance invariants and writes ledger entries.
///
/// Every balance change is committed together with its ledger entry as one
/// write batch, so a balance never moves without a matching record.
#[derive(Clone)]
pub struct WalletService {
    store: Arc<dyn Store>,
    config: WalletConfig,
}

impl WalletService {
    pub fn new(store: Arc<dyn Store>, config: WalletConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Current balance of `user`.
    pub fn get_balance(&self, user: UserId) -> WalletResult<Balance> {
        self.store
            .user(user)?
            .map(|u| u.wallet_balance)
            .ok_or(WalletError::UserNotFound(user))
    }

    /// Returns `true` iff the balance of `user` is at least `amount`.
    pub fn has_sufficient_balance(&self, user: UserId, amount: Decimal) -> WalletResult<bool> {
        Ok(self.get_balance(user)?.covers(amount))
    }

    /// Add `amount` to the wallet and record a `top-up` entry.
    pub fn credit(
        &self,
        user: UserId,
        amount: Decimal,
        note: Option<String>,
    ) -> WalletResult<WalletReceipt> {
        let amount = positive_amount(amount, "Amount must be positive")?;
        if let Some(max) = self.config.max_top_up {
            if amount > max {
                return Err(WalletError::InvalidArgument(format!(
                    "Top-up amount exceeds the maximum of {}{}",
                    self.config.currency_symbol, max
                )));
            }
        }

        let notes = note.unwrap_or_else(|| self.config.default_top_up_note.clone());
        let batch = WriteBatch::new()
            .credit(user, amount)
            .append_transaction(NewTransaction {
                user_id: user,
                amount,
                transaction_type: TransactionType::TopUp,
                date: Utc::now(),
                notes,
            });

        let receipt = self.store.commit(&batch)?;
        let receipt = wallet_receipt(receipt, user)?;
        info!(
            user = %user,
            amount = %amount,
            balance = %receipt.new_balance,
            "wallet credited"
        );
        Ok(receipt)
    }

    /// Subtract `amount` if the balance covers it and record a `donation`
    /// entry.
    pub fn debit(
        &self,
        user: UserId,
        amount: Decimal,
        note: Option<String>,
    ) -> WalletResult<WalletReceipt> {
        let amount = positive_amount(amount, "Amount must be positive")?;
        let notes = note.unwrap_or_else(|| self.config.default_debit_note.clone());
        let batch = WriteBatch::new()
            .debit(user, amount)
            .append_transaction(NewTransaction {
                user_id: user,
                amount,
                transaction_type: TransactionType::Donation,
                date: Utc::now(),
                notes,
            });

        let receipt = match self.store.commit(&batch) {
            Ok(receipt) => receipt,
            Err(e) => {
                let err = WalletError::from(e);
                warn!(user = %user, amount = %amount, error = %err, "wallet debit rejected");
                return Err(err);
            }
        };
        let receipt = wallet_receipt(receipt, user)?;
        info!(
            user = %user,
            amount = %amount,
            balance = %receipt.new_balance,
            "wallet debited"
        );
        Ok(receipt)
    }
}

impl std::fmt::Debug for WalletService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Validate a caller-supplied amount. Non-positive values report `message`.
pub(crate) fn positive_amount(value: Decimal, message: &str) -> WalletResult<Amount> {
    Amount::new(value).map_err(|e| match e {
        TypeError::NonPositiveAmount(_) => WalletError::InvalidArgument(message.to_string()),
        TypeError::TooPrecise { max_scale, .. } => WalletError::InvalidArgument(format!(
            "Amount cannot have more than {max_scale} decimal places"
        )),
        other => WalletError::from(other),
    })
}

fn wallet_receipt(receipt: CommitReceipt, user: UserId) -> WalletResult<WalletReceipt> {
    let new_balance = receipt
        .balance_of(user)
        .ok_or_else(|| WalletError::Internal("commit did not report a balance".into()))?;
    let transaction = receipt
        .transactions
        .into_iter()
        .next()
        .ok_or_else(|| WalletError::Internal("commit did not record a transaction".into()))?;
    Ok(WalletReceipt {
        new_balance,
        transaction,
    })
}

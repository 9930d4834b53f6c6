use helpup_store::StoreError;
use helpup_types::{
    Amount, Balance, CampaignId, DonationId, OrganizationId, TransactionId, TypeError, UserId,
};

/// Broad classification of a [`WalletError`], used by outer layers to pick
/// a status code or exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    InsufficientFunds,
    Conflict,
    Internal,
}

/// Errors produced by wallet, donation, directory, and query operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("User not found with ID: {0}")]
    UserNotFound(UserId),

    #[error("Campaign not found with ID: {0}")]
    CampaignNotFound(CampaignId),

    #[error("Organization not found with ID: {0}")]
    OrganizationNotFound(OrganizationId),

    #[error("Transaction not found with ID: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Donation not found with ID: {0}")]
    DonationNotFound(DonationId),

    #[error("Insufficient wallet balance. Current balance: {balance}, Required: {requested}")]
    InsufficientFunds { balance: Balance, requested: Amount },

    /// The balance check passed but a concurrent debit drained the wallet
    /// before this one committed.
    #[error("Wallet of user {user} changed during the donation. Current balance: {balance}")]
    Conflict { user: UserId, balance: Balance },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::UserNotFound(_)
            | Self::CampaignNotFound(_)
            | Self::OrganizationNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::DonationNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Internal(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Message safe to show to a caller. Internal failures carry no detail;
    /// balances are prefixed with `currency`.
    pub fn public_message(&self, currency: &str) -> String {
        match self {
            Self::InsufficientFunds { balance, requested } => format!(
                "Insufficient wallet balance. Current balance: {currency}{balance}, Required: {currency}{requested}"
            ),
            Self::Conflict { user, balance } => format!(
                "Wallet of user {user} changed during the donation. Current balance: {currency}{balance}"
            ),
            Self::Internal(_) | Self::Store(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for WalletError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound(id) => Self::UserNotFound(id),
            StoreError::CampaignNotFound(id) => Self::CampaignNotFound(id),
            StoreError::OrganizationNotFound(id) => Self::OrganizationNotFound(id),
            StoreError::InsufficientBalance {
                balance, requested, ..
            } => Self::InsufficientFunds { balance, requested },
            StoreError::InvalidValue(e) => Self::InvalidArgument(e.to_string()),
            other => Self::Store(other),
        }
    }
}

impl From<TypeError> for WalletError {
    fn from(err: TypeError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Result alias for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

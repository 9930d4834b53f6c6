use helpup_types::{Amount, Balance, CampaignId, OrganizationId, TypeError, UserId};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user not found with ID: {0}")]
    UserNotFound(UserId),

    #[error("organization not found with ID: {0}")]
    OrganizationNotFound(OrganizationId),

    #[error("campaign not found with ID: {0}")]
    CampaignNotFound(CampaignId),

    /// A conditional debit found the balance too low at commit time.
    #[error("insufficient balance for user {user}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        user: UserId,
        balance: Balance,
        requested: Amount,
    },

    /// A value failed validation, such as a balance above the cap or an
    /// edit that leaves campaign dates out of order.
    #[error("invalid value: {0}")]
    InvalidValue(#[from] TypeError),

    #[error("cannot commit an empty batch")]
    EmptyBatch,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The journal contains a record that cannot be replayed.
    #[error("corrupt journal at offset {offset}: {reason}")]
    CorruptJournal { offset: u64, reason: String },

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

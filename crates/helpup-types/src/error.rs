use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(String),

    #[error("balance cannot be negative, got {0}")]
    NegativeBalance(String),

    #[error("amount {value} has more than {max_scale} decimal places")]
    TooPrecise { value: String, max_scale: u32 },

    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("end date {end} is before start date {start}")]
    DateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

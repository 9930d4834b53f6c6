//! Wallet ledger and donation workflow for HelpUp.
//!
//! This crate owns the business rules on top of `helpup-store`:
//! - [`WalletService`] -- balance checks, top-ups, and debits
//! - [`DonationWorkflow`] -- balance check, debit, ledger entry, donation
//!   record, and campaign total committed as one batch
//! - [`LedgerQuery`] -- read-only projections, donation statistics, and the
//!   raised-total audit
//! - [`DirectoryService`] -- validated registration of users,
//!   organizations, and campaigns
//! - [`Platform`] -- all of the above sharing one store

pub mod config;
pub mod directory;
pub mod donation;
pub mod error;
pub mod platform;
pub mod query;
pub mod wallet;

pub use config::WalletConfig;
pub use directory::DirectoryService;
pub use donation::{DonationOutcome, DonationRequest, DonationWorkflow};
pub use error::{ErrorKind, WalletError, WalletResult};
pub use platform::Platform;
pub use query::{AuditReport, CampaignSummary, LedgerQuery, RaisedDrift};
pub use wallet::{WalletReceipt, WalletService};

//! Foundation types for HelpUp.
//!
//! This crate provides the identifiers, money types, and entity records
//! shared by every other HelpUp crate.
//!
//! # Key Types
//!
//! - [`UserId`], [`CampaignId`], [`OrganizationId`], [`TransactionId`],
//!   [`DonationId`] -- store-assigned numeric identifiers
//! - [`Amount`] -- strictly positive monetary value (at most 2 decimal places)
//! - [`Balance`] -- non-negative wallet balance with checked arithmetic
//! - [`Total`] -- uncapped running sum such as a campaign's raised total
//! - [`User`], [`Organization`], [`Campaign`] -- directory entities
//! - [`WalletTransaction`] -- immutable ledger entry (top-up or donation)
//! - [`Donation`], [`DonationStats`] -- donation records and aggregates

pub mod campaign;
pub mod donation;
pub mod error;
pub mod id;
pub mod money;
pub mod user;
pub mod wallet;

pub use campaign::{
    check_dates, ApprovalStatus, Campaign, CampaignUpdate, NewCampaign, NewOrganization,
    Organization, OrganizationUpdate,
};
pub use donation::{Donation, DonationStats, DonationStatus, NewDonation};
pub use error::TypeError;
pub use id::{CampaignId, DonationId, OrganizationId, TransactionId, UserId};
pub use money::{Amount, Balance, Total, MAX_MONEY, MAX_SCALE};
pub use user::{NewUser, Role, User};
pub use wallet::{NewTransaction, TransactionType, WalletTransaction};

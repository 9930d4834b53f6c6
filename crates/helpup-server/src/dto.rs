//! Request and response bodies. Field names are camelCase and monetary
//! values are JSON numbers.

use helpup_types::{Balance, Donation, UserId, WalletTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use helpup_wallet::DonationRequest;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub success: bool,
    pub donation: Donation,
    pub new_balance: Balance,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance: Balance,
    pub user_id: UserId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpRequest {
    pub user_id: UserId,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpResponse {
    pub success: bool,
    pub transaction: WalletTransaction,
    pub new_balance: Balance,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBalanceRequest {
    pub user_id: UserId,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBalanceResponse {
    pub has_sufficient_balance: bool,
    pub current_balance: Balance,
    #[serde(with = "rust_decimal::serde::float")]
    pub required_amount: Decimal,
    pub user_id: UserId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            service: "helpup-server".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

use helpup_types::Amount;
use serde::{Deserialize, Serialize};

/// Tunables for wallet and donation behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Prefix used when balances appear in messages.
    pub currency_symbol: String,
    /// Ledger note for top-ups submitted without one.
    pub default_top_up_note: String,
    /// Ledger note for direct debits submitted without one.
    pub default_debit_note: String,
    /// `type` recorded on wallet-funded donations.
    pub donation_type: String,
    /// Largest single top-up accepted. `None` means no limit.
    pub max_top_up: Option<Amount>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₱".into(),
            default_top_up_note: "Wallet top-up".into(),
            default_debit_note: "Donation deduction".into(),
            donation_type: "wallet".into(),
            max_top_up: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: WalletConfig = toml::from_str("max_top_up = 5000").unwrap();
        assert_eq!(config.max_top_up, Some(Amount::new(dec!(5000)).unwrap()));
        assert_eq!(config.currency_symbol, "₱");
        assert_eq!(config.donation_type, "wallet");
    }
}

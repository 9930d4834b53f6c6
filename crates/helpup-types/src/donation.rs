use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::id::{CampaignId, DonationId, UserId};
use crate::money::{Amount, Balance, Total};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Completed,
}

/// A transfer of value from a user's wallet to a campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: DonationId,
    pub user_id: UserId,
    pub campaign_id: CampaignId,
    pub amount: Amount,
    pub date: DateTime<Utc>,
    pub status: DonationStatus,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
}

impl Donation {
    pub fn is_completed(&self) -> bool {
        self.status == DonationStatus::Completed
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub user_id: UserId,
    pub campaign_id: CampaignId,
    pub amount: Amount,
    pub date: DateTime<Utc>,
    pub status: DonationStatus,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
}

impl NewDonation {
    pub fn into_donation(self, id: DonationId) -> Donation {
        Donation {
            id,
            user_id: self.user_id,
            campaign_id: self.campaign_id,
            amount: self.amount,
            date: self.date,
            status: self.status,
            kind: self.kind,
            notes: self.notes,
        }
    }
}

/// Aggregate figures over a set of donations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    pub total_amount: Total,
    pub total_count: u64,
    /// Mean donation, rounded to two decimals. Zero when there are none.
    pub average_amount: Balance,
}

impl DonationStats {
    /// Aggregate the given donation amounts.
    ///
    /// The total is not capped; `None` means the decimal range overflowed.
    pub fn from_amounts<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Amount>,
    {
        let mut total = Total::ZERO;
        let mut count = 0u64;
        for amount in amounts {
            total = total.add(amount).ok()?;
            count += 1;
        }
        let average = if count == 0 {
            Balance::ZERO
        } else {
            let mean = (total.as_decimal() / Decimal::from(count)).round_dp(2);
            Balance::new(mean).ok()?
        };
        Some(Self {
            total_amount: total,
            total_count: count,
            average_amount: average,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::MAX_MONEY;
    use rust_decimal_macros::dec;

    fn amounts(values: &[Decimal]) -> Vec<Amount> {
        values.iter().map(|v| Amount::new(*v).unwrap()).collect()
    }

    #[test]
    fn stats_over_three_donations() {
        let stats = DonationStats::from_amounts(amounts(&[dec!(10), dec!(20), dec!(30)])).unwrap();
        assert_eq!(stats.total_amount.as_decimal(), dec!(60));
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.average_amount.as_decimal(), dec!(20));
    }

    #[test]
    fn stats_of_nothing_are_zero() {
        let stats = DonationStats::from_amounts(Vec::new()).unwrap();
        assert_eq!(stats, DonationStats::default());
    }

    #[test]
    fn stats_total_may_exceed_single_amount_cap() {
        let big = Amount::new(MAX_MONEY).unwrap();
        let stats = DonationStats::from_amounts([big, big, Amount::new(dec!(1)).unwrap()]).unwrap();
        assert_eq!(stats.total_amount.as_decimal(), dec!(2_000_000_000_001));
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.average_amount.as_decimal(), dec!(666_666_666_667.00));
    }

    #[test]
    fn average_is_rounded_to_cents() {
        let stats = DonationStats::from_amounts(amounts(&[dec!(10), dec!(10), dec!(10.01)])).unwrap();
        assert_eq!(stats.average_amount.as_decimal(), dec!(10.00));
    }

    #[test]
    fn donation_kind_serializes_as_type() {
        let donation = NewDonation {
            user_id: UserId::new(1),
            campaign_id: CampaignId::new(2),
            amount: Amount::new(dec!(5)).unwrap(),
            date: Utc::now(),
            status: DonationStatus::Completed,
            kind: "wallet".into(),
            notes: None,
        }
        .into_donation(DonationId::new(1));
        let json = serde_json::to_value(&donation).unwrap();
        assert_eq!(json["type"], "wallet");
        assert_eq!(json["status"], "completed");
        assert!(donation.is_completed());
    }
}

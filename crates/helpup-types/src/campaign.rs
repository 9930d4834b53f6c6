use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{CampaignId, OrganizationId, UserId};
use crate::money::{Amount, Total};

/// Review state of an organization's eligibility proof.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(TypeError::UnknownVariant {
                kind: "approval status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub contact_details: Option<String>,
    pub approval_status: ApprovalStatus,
    pub owner: Option<UserId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub name: String,
    pub contact_details: Option<String>,
    pub owner: Option<UserId>,
}

impl NewOrganization {
    pub fn into_organization(self, id: OrganizationId) -> Organization {
        Organization {
            id,
            name: self.name,
            contact_details: self.contact_details,
            approval_status: ApprovalStatus::Pending,
            owner: self.owner,
        }
    }
}

/// Partial edit of an organization. Absent fields keep their value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_details: Option<String>,
    #[serde(default)]
    pub approval_status: Option<ApprovalStatus>,
}

impl OrganizationUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.contact_details.is_none() && self.approval_status.is_none()
    }

    /// The organization as it looks after this edit.
    pub fn applied_to(&self, organization: &Organization) -> Organization {
        let mut next = organization.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(contact) = &self.contact_details {
            next.contact_details = Some(contact.clone());
        }
        if let Some(status) = self.approval_status {
            next.approval_status = status;
        }
        next
    }
}

/// Fails when both dates are set and `end` precedes `start`.
pub fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), TypeError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(TypeError::DateRange { start, end }),
        _ => Ok(()),
    }
}

/// A fundraising goal owned by an organization.
///
/// `total_raised` is maintained in the same commit as each completed
/// donation, so it always equals the sum of the campaign's completed
/// donations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_amount: Amount,
    pub total_raised: Total,
    pub organization_id: OrganizationId,
}

impl Campaign {
    /// Percentage of the target raised so far, rounded to two decimals.
    pub fn progress_percent(&self) -> Decimal {
        let target = self.target_amount.as_decimal();
        (self.total_raised.as_decimal() * Decimal::ONE_HUNDRED / target).round_dp(2)
    }

    /// Returns `true` once the raised total reaches the target.
    pub fn is_funded(&self) -> bool {
        self.total_raised.covers(self.target_amount.as_decimal())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_amount: Amount,
    pub organization_id: OrganizationId,
}

impl NewCampaign {
    pub fn into_campaign(self, id: CampaignId) -> Campaign {
        Campaign {
            id,
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            target_amount: self.target_amount,
            total_raised: Total::ZERO,
            organization_id: self.organization_id,
        }
    }
}

/// Partial edit of a campaign's descriptive fields and target.
///
/// The raised total and owning organization are not editable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_amount: Option<Amount>,
}

impl CampaignUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.target_amount.is_none()
    }

    /// The campaign as it looks after this edit. Fails if the resulting
    /// dates are out of order.
    pub fn applied_to(&self, campaign: &Campaign) -> Result<Campaign, TypeError> {
        let mut next = campaign.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if self.start_date.is_some() {
            next.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            next.end_date = self.end_date;
        }
        if let Some(target) = self.target_amount {
            next.target_amount = target;
        }
        check_dates(next.start_date, next.end_date)?;
        Ok(next)
    }
}

//! Registration and lookup of users, organizations, and campaigns.

use std::sync::Arc;

use helpup_store::Store;
use helpup_types::{
    check_dates, ApprovalStatus, Campaign, CampaignId, CampaignUpdate, NewCampaign,
    NewOrganization, NewUser, Organization, OrganizationId, OrganizationUpdate, User, UserId,
};
use tracing::info;

use crate::error::{WalletError, WalletResult};

/// Thin validation layer over the directory half of the store.
#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn Store>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register a user with an empty wallet.
    pub fn register_user(&self, user: NewUser) -> WalletResult<User> {
        require_text(&user.first_name, "First name")?;
        require_text(&user.last_name, "Last name")?;
        let email = user.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(WalletError::InvalidArgument(format!(
                "Invalid email address: {:?}",
                user.email
            )));
        }

        let user = self.store.insert_user(user)?;
        info!(user = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> WalletResult<User> {
        self.store.user(id)?.ok_or(WalletError::UserNotFound(id))
    }

    pub fn users(&self) -> WalletResult<Vec<User>> {
        Ok(self.store.users()?)
    }

    /// Register an organization. A given owner must already exist.
    pub fn register_organization(
        &self,
        organization: NewOrganization,
    ) -> WalletResult<Organization> {
        require_text(&organization.name, "Organization name")?;
        let organization = self.store.insert_organization(organization)?;
        info!(organization = %organization.id, "organization registered");
        Ok(organization)
    }

    pub fn organization(&self, id: OrganizationId) -> WalletResult<Organization> {
        self.store
            .organization(id)?
            .ok_or(WalletError::OrganizationNotFound(id))
    }

    pub fn organizations(&self) -> WalletResult<Vec<Organization>> {
        Ok(self.store.organizations()?)
    }

    /// Edit an organization's details or approval status.
    pub fn update_organization(
        &self,
        id: OrganizationId,
        update: OrganizationUpdate,
    ) -> WalletResult<Organization> {
        if update.is_empty() {
            return Err(WalletError::InvalidArgument("Nothing to update".into()));
        }
        if let Some(name) = &update.name {
            require_text(name, "Organization name")?;
        }
        let organization = self.store.update_organization(id, &update)?;
        info!(
            organization = %organization.id,
            status = ?organization.approval_status,
            "organization updated"
        );
        Ok(organization)
    }

    /// Approve or reject an organization.
    pub fn set_approval_status(
        &self,
        id: OrganizationId,
        status: ApprovalStatus,
    ) -> WalletResult<Organization> {
        self.update_organization(
            id,
            OrganizationUpdate {
                approval_status: Some(status),
                ..OrganizationUpdate::default()
            },
        )
    }

    /// Create a campaign with nothing raised yet.
    pub fn create_campaign(&self, campaign: NewCampaign) -> WalletResult<Campaign> {
        require_text(&campaign.name, "Campaign name")?;
        check_dates(campaign.start_date, campaign.end_date)?;
        let campaign = self.store.insert_campaign(campaign)?;
        info!(
            campaign = %campaign.id,
            organization = %campaign.organization_id,
            target = %campaign.target_amount,
            "campaign created"
        );
        Ok(campaign)
    }

    pub fn campaign(&self, id: CampaignId) -> WalletResult<Campaign> {
        self.store
            .campaign(id)?
            .ok_or(WalletError::CampaignNotFound(id))
    }

    pub fn campaigns(&self) -> WalletResult<Vec<Campaign>> {
        Ok(self.store.campaigns()?)
    }

    /// Edit a campaign's name, description, dates, or target. The raised
    /// total is left alone.
    pub fn update_campaign(&self, id: CampaignId, update: CampaignUpdate) -> WalletResult<Campaign> {
        if update.is_empty() {
            return Err(WalletError::InvalidArgument("Nothing to update".into()));
        }
        if let Some(name) = &update.name {
            require_text(name, "Campaign name")?;
        }
        let campaign = self.store.update_campaign(id, &update)?;
        info!(campaign = %campaign.id, target = %campaign.target_amount, "campaign updated");
        Ok(campaign)
    }

    pub fn campaigns_for_organization(&self, id: OrganizationId) -> WalletResult<Vec<Campaign>> {
        self.organization(id)?;
        Ok(self.store.campaigns_for_organization(id)?)
    }
}

impl std::fmt::Debug for DirectoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryService").finish_non_exhaustive()
    }
}

fn require_text(value: &str, field: &str) -> WalletResult<()> {
    if value.trim().is_empty() {
        return Err(WalletError::InvalidArgument(format!("{field} is required")));
    }
    Ok(())
}

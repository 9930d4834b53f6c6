use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use helpup_types::{
    Campaign, CampaignId, CampaignUpdate, Donation, DonationId, DonationStats, NewCampaign,
    NewOrganization, NewUser, Organization, OrganizationId, OrganizationUpdate, TransactionId,
    User, UserId, WalletTransaction,
};
use helpup_wallet::{AuditReport, CampaignSummary};
use serde_json::json;

use crate::dto::{
    BalanceResponse, CheckBalanceRequest, CheckBalanceResponse, DonationRequest,
    DonationResponse, HealthResponse, TopUpRequest, TopUpResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

type JsonBody<T> = Result<Json<T>, JsonRejection>;
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "helpup-server",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.backend(),
        "currency": state.currency(),
    }))
}

// ---- Donations ----

pub async fn process_donation(
    State(state): State<AppState>,
    body: JsonBody<DonationRequest>,
) -> ApiResult<DonationResponse> {
    let Json(request) = body?;
    let outcome = state
        .donate(move |p| p.donations.process(request))
        .await?;
    Ok(Json(DonationResponse {
        success: true,
        donation: outcome.donation,
        new_balance: outcome.new_balance,
        message: "Donation successful!".into(),
    }))
}

pub async fn donation_stats(State(state): State<AppState>) -> ApiResult<DonationStats> {
    state.lookup(|p| p.query.donation_stats()).await.map(Json)
}

pub async fn list_donations(State(state): State<AppState>) -> ApiResult<Vec<Donation>> {
    state.lookup(|p| p.query.donations()).await.map(Json)
}

pub async fn get_donation(
    State(state): State<AppState>,
    Path(id): Path<DonationId>,
) -> ApiResult<Donation> {
    state.lookup(move |p| p.query.donation(id)).await.map(Json)
}

pub async fn donations_by_user(
    State(state): State<AppState>,
    Path(user): Path<UserId>,
) -> ApiResult<Vec<Donation>> {
    state
        .lookup(move |p| p.query.donations_for_user(user))
        .await
        .map(Json)
}

pub async fn donations_by_campaign(
    State(state): State<AppState>,
    Path(campaign): Path<CampaignId>,
) -> ApiResult<Vec<Donation>> {
    state
        .lookup(move |p| p.query.donations_for_campaign(campaign))
        .await
        .map(Json)
}

// ---- Wallet ----

pub async fn wallet_balance(
    State(state): State<AppState>,
    Path(user): Path<UserId>,
) -> ApiResult<BalanceResponse> {
    let balance = state.lookup(move |p| p.wallet.get_balance(user)).await?;
    Ok(Json(BalanceResponse {
        balance,
        user_id: user,
    }))
}

pub async fn top_up(
    State(state): State<AppState>,
    body: JsonBody<TopUpRequest>,
) -> ApiResult<TopUpResponse> {
    let Json(request) = body?;
    let receipt = state
        .mutate(move |p| p.wallet.credit(request.user_id, request.amount, request.notes))
        .await?;
    Ok(Json(TopUpResponse {
        success: true,
        transaction: receipt.transaction,
        new_balance: receipt.new_balance,
        message: "Top-up successful!".into(),
    }))
}

pub async fn check_balance(
    State(state): State<AppState>,
    body: JsonBody<CheckBalanceRequest>,
) -> ApiResult<CheckBalanceResponse> {
    let Json(request) = body?;
    let user = request.user_id;
    let current_balance = state.mutate(move |p| p.wallet.get_balance(user)).await?;
    Ok(Json(CheckBalanceResponse {
        has_sufficient_balance: current_balance.covers(request.amount),
        current_balance,
        required_amount: request.amount,
        user_id: user,
    }))
}

pub async fn list_transactions(
    State(state): State<AppState>,
) -> ApiResult<Vec<WalletTransaction>> {
    state.lookup(|p| p.query.transactions()).await.map(Json)
}

pub async fn transactions_by_user(
    State(state): State<AppState>,
    Path(user): Path<UserId>,
) -> ApiResult<Vec<WalletTransaction>> {
    state
        .lookup(move |p| p.query.transactions_for_user(user))
        .await
        .map(Json)
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
) -> ApiResult<WalletTransaction> {
    state.lookup(move |p| p.query.transaction(id)).await.map(Json)
}

// ---- Directory ----

pub async fn create_user(
    State(state): State<AppState>,
    body: JsonBody<NewUser>,
) -> ApiResult<User> {
    let Json(user) = body?;
    state
        .mutate(move |p| p.directory.register_user(user))
        .await
        .map(Json)
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    state.lookup(|p| p.directory.users()).await.map(Json)
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> ApiResult<User> {
    state.lookup(move |p| p.directory.user(id)).await.map(Json)
}

pub async fn create_organization(
    State(state): State<AppState>,
    body: JsonBody<NewOrganization>,
) -> ApiResult<Organization> {
    let Json(organization) = body?;
    state
        .mutate(move |p| p.directory.register_organization(organization))
        .await
        .map(Json)
}

pub async fn list_organizations(State(state): State<AppState>) -> ApiResult<Vec<Organization>> {
    state.lookup(|p| p.directory.organizations()).await.map(Json)
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
) -> ApiResult<Organization> {
    state.lookup(move |p| p.directory.organization(id)).await.map(Json)
}

pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
    body: JsonBody<OrganizationUpdate>,
) -> ApiResult<Organization> {
    let Json(update) = body?;
    state
        .mutate(move |p| p.directory.update_organization(id, update))
        .await
        .map(Json)
}

pub async fn create_campaign(
    State(state): State<AppState>,
    body: JsonBody<NewCampaign>,
) -> ApiResult<Campaign> {
    let Json(campaign) = body?;
    state
        .mutate(move |p| p.directory.create_campaign(campaign))
        .await
        .map(Json)
}

pub async fn list_campaigns(State(state): State<AppState>) -> ApiResult<Vec<Campaign>> {
    state.lookup(|p| p.directory.campaigns()).await.map(Json)
}

pub async fn campaigns_by_organization(
    State(state): State<AppState>,
    Path(organization): Path<OrganizationId>,
) -> ApiResult<Vec<Campaign>> {
    state
        .lookup(move |p| p.directory.campaigns_for_organization(organization))
        .await
        .map(Json)
}

pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
    body: JsonBody<CampaignUpdate>,
) -> ApiResult<Campaign> {
    let Json(update) = body?;
    state
        .mutate(move |p| p.directory.update_campaign(id, update))
        .await
        .map(Json)
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
) -> ApiResult<CampaignSummary> {
    state
        .lookup(move |p| p.query.campaign_summary(id))
        .await
        .map(Json)
}

pub async fn audit_campaigns(State(state): State<AppState>) -> ApiResult<AuditReport> {
    state.lookup(|p| p.query.audit()).await.map(Json)
}

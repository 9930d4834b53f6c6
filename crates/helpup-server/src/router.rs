use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all HelpUp endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // donations
        .route("/donations", get(handler::list_donations))
        .route("/donations/process", post(handler::process_donation))
        .route("/donations/stats", get(handler::donation_stats))
        .route("/donations/user/:user_id", get(handler::donations_by_user))
        .route(
            "/donations/campaign/:campaign_id",
            get(handler::donations_by_campaign),
        )
        .route("/donations/:id", get(handler::get_donation))
        // wallet
        .route("/wallet-transactions", get(handler::list_transactions))
        .route(
            "/wallet-transactions/balance/:user_id",
            get(handler::wallet_balance),
        )
        .route("/wallet-transactions/top-up", post(handler::top_up))
        .route(
            "/wallet-transactions/check-balance",
            post(handler::check_balance),
        )
        .route(
            "/wallet-transactions/user/:user_id",
            get(handler::transactions_by_user),
        )
        .route("/wallet-transactions/:id", get(handler::get_transaction))
        // directory
        .route(
            "/users",
            get(handler::list_users).post(handler::create_user),
        )
        .route("/users/:id", get(handler::get_user))
        .route(
            "/organizations",
            get(handler::list_organizations).post(handler::create_organization),
        )
        .route(
            "/organizations/:id",
            get(handler::get_organization).put(handler::update_organization),
        )
        .route(
            "/campaigns",
            get(handler::list_campaigns).post(handler::create_campaign),
        )
        .route("/campaigns/audit", get(handler::audit_campaigns))
        .route(
            "/campaigns/organization/:organization_id",
            get(handler::campaigns_by_organization),
        )
        .route(
            "/campaigns/:id",
            get(handler::get_campaign).put(handler::update_campaign),
        )
}

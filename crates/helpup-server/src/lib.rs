//! HTTP server for HelpUp.
//!
//! Exposes the wallet, donation, and directory services as a JSON API under
//! `/api`, plus `/v1/health` and `/v1/info`. Store calls run on tokio's
//! blocking pool.

pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use router::build_router;
pub use server::HelpupServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use helpup_store::InMemoryStore;
    use helpup_wallet::WalletConfig;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(InMemoryStore::new()),
            WalletConfig::default(),
            "memory",
        );
        build_router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Donor with `balance` in the wallet and one campaign. Returns
    /// `(user_id, campaign_id)`.
    async fn seed(app: &Router, balance: f64) -> (u64, u64) {
        let (status, user) = send(
            app,
            "POST",
            "/api/users",
            Some(json!({
                "firstName": "Ana",
                "lastName": "Reyes",
                "email": "ana@example.org",
                "role": "donor"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let user_id = user["id"].as_u64().unwrap();

        let (status, org) = send(
            app,
            "POST",
            "/api/organizations",
            Some(json!({ "name": "Bayanihan Relief" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, campaign) = send(
            app,
            "POST",
            "/api/campaigns",
            Some(json!({
                "name": "Typhoon Relief",
                "description": "Food packs",
                "targetAmount": 1000,
                "organizationId": org["id"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let campaign_id = campaign["id"].as_u64().unwrap();

        if balance > 0.0 {
            let (status, _) = send(
                app,
                "POST",
                "/api/wallet-transactions/top-up",
                Some(json!({ "userId": user_id, "amount": balance })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        (user_id, campaign_id)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send(&app(), "GET", "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (status, body) = send(&app(), "GET", "/v1/info", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "helpup-server");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn donation_succeeds_and_updates_balance() {
        let app = app();
        let (user, campaign) = seed(&app, 100.0).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/donations/process",
            Some(json!({
                "userId": user,
                "campaignId": campaign,
                "amount": 40,
                "notes": "Padayon"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["newBalance"], 60.0);
        assert_eq!(body["message"], "Donation successful!");
        assert_eq!(body["donation"]["status"], "completed");
        assert_eq!(body["donation"]["type"], "wallet");
        assert_eq!(body["donation"]["amount"], 40.0);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/wallet-transactions/balance/{user}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"], 60.0);
        assert_eq!(body["userId"], user);

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/wallet-transactions/user/{user}"),
            None,
        )
        .await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["transactionType"], "donation");
        assert_eq!(entries[1]["notes"], "Donation to campaign: Typhoon Relief");

        let (_, body) = send(&app, "GET", &format!("/api/campaigns/{campaign}"), None).await;
        assert_eq!(body["campaign"]["totalRaised"], 40.0);
        assert_eq!(body["donationCount"], 1);
    }

    #[tokio::test]
    async fn insufficient_balance_is_a_bad_request() {
        let app = app();
        let (user, campaign) = seed(&app, 30.0).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/donations/process",
            Some(json!({ "userId": user, "campaignId": campaign, "amount": 40 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "Insufficient wallet balance. Current balance: ₱30.00, Required: ₱40.00"
        );

        let (_, body) = send(&app, "GET", "/api/donations", None).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_and_incomplete_requests_are_rejected() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/donations/process")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            "/api/donations/process",
            Some(json!({ "userId": 1, "amount": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User ID, Campaign ID, and Amount are required");

        let (status, body) = send(
            &app,
            "POST",
            "/api/wallet-transactions/top-up",
            Some(json!({ "userId": 1, "amount": -5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn check_balance_reports_shortfall() {
        let app = app();
        let (user, _) = seed(&app, 25.5).await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/wallet-transactions/check-balance",
            Some(json!({ "userId": user, "amount": 30 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasSufficientBalance"], false);
        assert_eq!(body["currentBalance"], 25.5);
        assert_eq!(body["requiredAmount"], 30.0);
        assert_eq!(body["userId"], user);
    }

    #[tokio::test]
    async fn missing_resources_are_not_found() {
        let app = app();
        for uri in [
            "/api/users/42",
            "/api/campaigns/42",
            "/api/donations/42",
            "/api/wallet-transactions/42",
            "/api/wallet-transactions/balance/42",
            "/api/organizations/42",
            "/api/campaigns/organization/42",
        ] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["success"], false, "{uri}");
        }
    }

    #[tokio::test]
    async fn stats_and_audit() {
        let app = app();
        let (user, campaign) = seed(&app, 100.0).await;
        for amount in [10, 20, 30] {
            let (status, _) = send(
                &app,
                "POST",
                "/api/donations/process",
                Some(json!({ "userId": user, "campaignId": campaign, "amount": amount })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, "GET", "/api/donations/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalAmount"], 60.0);
        assert_eq!(body["totalCount"], 3);
        assert_eq!(body["averageAmount"], 20.0);

        let (status, body) = send(&app, "GET", "/api/campaigns/audit", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["campaignsChecked"], 1);
        assert!(body["drift"].as_array().unwrap().is_empty());

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/donations/campaign/{campaign}"),
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn organization_approval_and_its_campaigns() {
        let app = app();
        let (_, campaign) = seed(&app, 0.0).await;
        let (_, body) = send(&app, "GET", &format!("/api/campaigns/{campaign}"), None).await;
        let org = body["campaign"]["organizationId"].as_u64().unwrap();

        let (status, body) = send(&app, "GET", &format!("/api/organizations/{org}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["approvalStatus"], "pending");

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/organizations/{org}"),
            Some(json!({ "approvalStatus": "approved" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["approvalStatus"], "approved");
        assert_eq!(body["name"], "Bayanihan Relief");

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/organizations/{org}"),
            Some(json!({ "approvalStatus": "suspended" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/campaigns/organization/{org}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let campaigns = body.as_array().unwrap();
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0]["id"], campaign);
    }

    #[tokio::test]
    async fn campaign_update_keeps_raised_total() {
        let app = app();
        let (user, campaign) = seed(&app, 100.0).await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/donations/process",
            Some(json!({ "userId": user, "campaignId": campaign, "amount": 25 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/campaigns/{campaign}"),
            Some(json!({
                "name": "Typhoon Relief 2026",
                "targetAmount": 5000,
                "startDate": "2026-07-01",
                "endDate": "2026-09-30"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Typhoon Relief 2026");
        assert_eq!(body["description"], "Food packs");
        assert_eq!(body["targetAmount"], 5000.0);
        assert_eq!(body["totalRaised"], 25.0);
        assert_eq!(body["endDate"], "2026-09-30");

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/campaigns/{campaign}"),
            Some(json!({ "endDate": "2026-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(
            &app,
            "PUT",
            "/api/campaigns/99",
            Some(json!({ "name": "Ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, "GET", &format!("/api/campaigns/{campaign}"), None).await;
        assert_eq!(body["campaign"]["name"], "Typhoon Relief 2026");
        assert_eq!(body["progressPercent"], 0.5);
    }
}

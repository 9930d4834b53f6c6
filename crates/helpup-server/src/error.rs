use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use helpup_wallet::{ErrorKind, WalletError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("store error: {0}")]
    Store(#[from] helpup_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// An error rendered as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Failure of a state-changing request: every business error is a 400.
    pub fn mutation(err: WalletError, currency: &str) -> Self {
        Self::from_wallet(err, currency, StatusCode::BAD_REQUEST)
    }

    /// Failure of the donation endpoint: always a 400. Internal failures
    /// are logged and reported with the generic message.
    pub fn donation(err: WalletError, currency: &str) -> Self {
        if err.is_internal() {
            tracing::error!(error = ?err, "internal error during donation");
        }
        Self::bad_request(err.public_message(currency))
    }

    /// Failure of a read: missing resources are a 404.
    pub fn lookup(err: WalletError, currency: &str) -> Self {
        Self::from_wallet(err, currency, StatusCode::NOT_FOUND)
    }

    fn from_wallet(err: WalletError, currency: &str, not_found: StatusCode) -> Self {
        let status = match err.kind() {
            ErrorKind::NotFound => not_found,
            ErrorKind::Internal => {
                tracing::error!(error = ?err, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorKind::InvalidArgument | ErrorKind::InsufficientFunds | ErrorKind::Conflict => {
                StatusCode::BAD_REQUEST
            }
        };
        Self::new(status, err.public_message(currency))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}

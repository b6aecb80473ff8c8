use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use notekeeper_auth_types::token::TokenError;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// API error variants. `kind()` is the wire code clients switch on.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request")]
    Validation(Vec<FieldError>),
    #[error("no fields to update")]
    NoFieldsToUpdate,
    #[error("invalid code")]
    InvalidCode,
    #[error("code already used")]
    AlreadyUsed,
    #[error("code expired")]
    Expired,
    #[error("invalid google token")]
    InvalidGoogleToken,
    #[error("Missing Authorization header")]
    MissingAuthorization,
    #[error("Invalid or expired token")]
    InvalidOrExpired,
    #[error("not found")]
    NotFound,
    #[error("google sign-in is not configured")]
    GoogleNotConfigured,
    /// A dependency failure re-labelled with the route's own 500 code.
    #[error("internal error")]
    Failed {
        kind: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NoFieldsToUpdate => "no_fields_to_update",
            Self::InvalidCode => "invalid_code",
            Self::AlreadyUsed => "already_used",
            Self::Expired => "expired",
            Self::InvalidGoogleToken => "invalid_google_token",
            Self::MissingAuthorization => "missing_authorization",
            Self::InvalidOrExpired => "invalid_or_expired",
            Self::NotFound => "not_found",
            Self::GoogleNotConfigured => "google_not_configured",
            Self::Failed { kind, .. } => *kind,
            Self::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::NoFieldsToUpdate
            | Self::InvalidCode
            | Self::AlreadyUsed
            | Self::Expired
            | Self::InvalidGoogleToken => StatusCode::BAD_REQUEST,
            Self::MissingAuthorization | Self::InvalidOrExpired => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::GoogleNotConfigured | Self::Failed { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Re-label an unexpected failure with a route-specific code. Other variants pass through.
    pub fn or_failed(self, kind: &'static str) -> Self {
        match self {
            Self::Internal(source) => Self::Failed { kind, source },
            other => other,
        }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

/// Signing can only fail on missing key material or an encoder fault; both are server-side.
impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        Self::Internal(anyhow::Error::new(e).context("sign session token"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::field("body", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Only 5xx are logged here; TraceLayer records every request.
        // The anyhow chain goes to the log, never to the client.
        match &self {
            Self::Failed { kind, source } => {
                tracing::error!(error = ?source, kind = *kind, "request failed");
            }
            Self::Internal(e) => tracing::error!(error = ?e, kind = "internal", "internal error"),
            Self::GoogleNotConfigured => {
                tracing::error!(kind = "google_not_configured", "GOOGLE_CLIENT_ID is not set");
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(details) = &self {
            body["details"] = serde_json::json!(details);
        }
        (status, axum::Json(body)).into_response()
    }
}

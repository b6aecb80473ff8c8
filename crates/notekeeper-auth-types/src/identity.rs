//! Caller identity placed in request extensions by the session middleware.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use serde::Serialize;

use notekeeper_domain::id::UserId;

use crate::token::SessionClaims;

/// Verified identity of the caller, derived from session token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
}

impl TryFrom<SessionClaims> for Identity {
    type Error = uuid::Error;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: claims.sub.parse()?,
            email: claims.email,
            name: claims.name,
        })
    }
}

/// Return the token of an `Authorization: Bearer <token>` header.
///
/// `None` when the header is absent, not valid UTF-8, uses another scheme, or
/// carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Rejection of the [`Identity`] extractor: 401 `missing_authorization`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingIdentity;

#[derive(Serialize)]
struct MissingIdentityBody {
    error: &'static str,
    message: &'static str,
}

impl IntoResponse for MissingIdentity {
    fn into_response(self) -> Response {
        let body = MissingIdentityBody {
            error: "missing_authorization",
            message: "Missing Authorization header",
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Extracts the [`Identity`] inserted by the session middleware.
///
/// Rejects with [`MissingIdentity`] if the route is not behind the middleware.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = MissingIdentity;

    // Clone out of the extensions synchronously so the returned future is 'static.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<Identity>().cloned();
        async move { identity.ok_or(MissingIdentity) }
    }
}

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use notekeeper_auth_types::identity::{Identity, bearer_token};
use notekeeper_auth_types::token::TokenKeys;

use crate::error::ApiError;

/// Require a valid session token and expose the caller as an [`Identity`] extension.
///
/// No store lookup happens here; a token stays valid until it expires.
pub async fn require_session(
    State(tokens): State<TokenKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::MissingAuthorization)?;
    let identity = tokens.verify_identity(token).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        ApiError::InvalidOrExpired
    })?;
    req.extensions_mut().insert::<Identity>(identity);
    Ok(next.run(req).await)
}

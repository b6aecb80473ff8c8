//! Session token signing and verification.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Default session lifetime (7 days).
pub const SESSION_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Errors returned by [`TokenKeys`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret is not configured")]
    MissingSecret,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to encode token")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload of a session token.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `email` | custom | lower-cased email |
/// | `name` | custom, optional | display name at sign-in time |
/// | `iat` | `iat` | issued at, seconds since epoch |
/// | `exp` | `exp` | expiration, seconds since epoch |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iat: u64,
    pub exp: u64,
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub exp: u64,
}

/// HS256 key material for session tokens.
///
/// The secret is optional so the process can start without one; every
/// [`sign`](Self::sign) then fails with [`TokenError::MissingSecret`] and every
/// [`verify`](Self::verify) fails the same way.
#[derive(Clone)]
pub struct TokenKeys {
    secret: Option<Arc<str>>,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("configured", &self.is_configured())
            .finish()
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl TokenKeys {
    /// An empty string counts as unset.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(Arc::from),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    fn secret(&self) -> Result<&[u8], TokenError> {
        self.secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or(TokenError::MissingSecret)
    }

    /// Sign a session token for `identity`, valid for `ttl` from now.
    pub fn sign(&self, identity: &Identity, ttl: Duration) -> Result<SignedToken, TokenError> {
        let iat = now_secs();
        let claims = SessionClaims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            iat,
            exp: iat + ttl.as_secs(),
        };
        let token = self.sign_claims(&claims)?;
        Ok(SignedToken {
            token,
            exp: claims.exp,
        })
    }

    /// Sign arbitrary claims as-is. `exp` is not adjusted.
    pub fn sign_claims(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let secret = self.secret()?;
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(TokenError::Encode)
    }

    /// Validate signature and expiry, returning the raw claims.
    ///
    /// Validation: HS256 only, `exp` checked with zero leeway, `sub` and `exp` required.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let secret = self.secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        Ok(data.claims)
    }

    /// [`verify`](Self::verify) and convert the claims into an [`Identity`].
    pub fn verify_identity(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = self.verify(token)?;
        Identity::try_from(claims).map_err(|_| TokenError::Malformed)
    }
}

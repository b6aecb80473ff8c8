//! Session helpers for HTTP tests.
//!
//! Protected routes require `Authorization: Bearer <token>`. `MockSession` signs a
//! real token with the test secret so requests pass the session middleware.

use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

use notekeeper_auth_types::identity::Identity;
use notekeeper_auth_types::token::{SESSION_TOKEN_TTL, TokenKeys};
use notekeeper_domain::id::UserId;

use crate::TEST_JWT_SECRET;

/// Identity to authenticate test requests as.
pub struct MockSession {
    pub identity: Identity,
}

impl MockSession {
    pub fn new(user_id: Uuid, email: &str) -> Self {
        Self {
            identity: Identity {
                user_id: UserId(user_id),
                email: email.to_owned(),
                name: None,
            },
        }
    }

    /// Keys matching the ones tests should put in the service state.
    pub fn keys() -> TokenKeys {
        TokenKeys::new(Some(TEST_JWT_SECRET.to_owned()))
    }

    pub fn token(&self) -> String {
        Self::keys()
            .sign(&self.identity, SESSION_TOKEN_TTL)
            .expect("test secret is configured")
            .token
    }

    /// `Authorization` header carrying a valid bearer token.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token()))
            .expect("JWT is a valid header value");
        (AUTHORIZATION, value)
    }
}

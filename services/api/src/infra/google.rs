use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::repository::GoogleVerifier;
use crate::domain::types::GooglePayload;
use crate::error::ApiError;

const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Google rotates its signing keys roughly daily.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Minimum gap between refetches triggered by an unknown `kid`.
const JWKS_MISS_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

struct CachedKeys {
    fetched_at: Instant,
    keys: JwkSet,
}

/// Verifies Google ID tokens against Google's published JWKS.
#[derive(Clone)]
pub struct GoogleJwksVerifier {
    client: Client,
    certs_url: String,
    cache: Arc<RwLock<Option<CachedKeys>>>,
}

impl Default for GoogleJwksVerifier {
    fn default() -> Self {
        Self::new(GOOGLE_CERTS_URL.to_owned())
    }
}

impl GoogleJwksVerifier {
    pub fn new(certs_url: String) -> Self {
        Self {
            client: Client::new(),
            certs_url,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    async fn fetch_keys(&self) -> Result<JwkSet, ApiError> {
        let keys = self
            .client
            .get(&self.certs_url)
            .send()
            .await
            .context("fetch google certs")?
            .error_for_status()
            .context("google certs endpoint returned an error")?
            .json::<JwkSet>()
            .await
            .context("decode google certs")?;
        Ok(keys)
    }

    /// Decoding key for `kid`.
    ///
    /// The key set is refetched when older than [`JWKS_CACHE_TTL`], or when `kid` is
    /// unknown and the last fetch is older than [`JWKS_MISS_REFETCH_INTERVAL`].
    /// Only one request fetches at a time; the others wait on the write lock.
    async fn key_for(&self, kid: &str) -> Result<Option<DecodingKey>, ApiError> {
        if let Some(lookup) = lookup_cached(self.cache.read().await.as_ref(), kid) {
            return lookup;
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed the set while this one waited.
        if let Some(lookup) = lookup_cached(cache.as_ref(), kid) {
            return lookup;
        }

        let keys = self.fetch_keys().await?;
        let fresh = cache.insert(CachedKeys {
            fetched_at: Instant::now(),
            keys,
        });
        decoding_key(fresh.keys.find(kid))
    }
}

/// Answer from the cache alone, or `None` when a refetch is due.
fn lookup_cached(
    cached: Option<&CachedKeys>,
    kid: &str,
) -> Option<Result<Option<DecodingKey>, ApiError>> {
    let cached = cached?;
    let age = cached.fetched_at.elapsed();
    if age >= JWKS_CACHE_TTL {
        return None;
    }
    match cached.keys.find(kid) {
        Some(jwk) => Some(decoding_key(Some(jwk))),
        None if age < JWKS_MISS_REFETCH_INTERVAL => Some(Ok(None)),
        None => None,
    }
}

fn decoding_key(jwk: Option<&Jwk>) -> Result<Option<DecodingKey>, ApiError> {
    let key = jwk
        .map(DecodingKey::from_jwk)
        .transpose()
        .context("build google decoding key")?;
    Ok(key)
}

impl GoogleVerifier for GoogleJwksVerifier {
    async fn verify(
        &self,
        id_token: &str,
        client_id: &str,
    ) -> Result<Option<GooglePayload>, ApiError> {
        let Ok(header) = decode_header(id_token) else {
            return Ok(None);
        };
        let Some(kid) = header.kid else {
            return Ok(None);
        };
        let Some(key) = self.key_for(&kid).await? else {
            tracing::debug!(kid = %kid, "google token signed with unknown key");
            return Ok(None);
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        match decode::<GoogleClaims>(id_token, &key, &validation) {
            Ok(data) => Ok(Some(GooglePayload {
                email: data.claims.email,
                name: data.claims.name,
                picture: data.claims.picture,
            })),
            Err(e) => {
                tracing::debug!(error = %e, "google token rejected");
                Ok(None)
            }
        }
    }
}

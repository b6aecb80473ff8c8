use std::time::Duration;

use anyhow::Context as _;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_EMAIL_FROM: &str = "no-reply@example.com";

/// API configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for session tokens. Sign-in and session checks fail without it.
    pub jwt_secret: Option<String>,
    /// OAuth client id Google ID tokens must be issued for.
    pub google_client_id: Option<String>,
    /// Resend API key. Without it OTP codes are only logged.
    pub resend_api_key: Option<String>,
    /// Sender address for OTP emails. Env var: `EMAIL_FROM`.
    pub email_from: String,
    /// Allowed CORS origins from comma-separated `CLIENT_ORIGIN`. Empty allows any origin.
    pub client_origins: Vec<String>,
    /// TCP port to listen on (default 5000). Env var: `PORT`.
    pub port: u16,
    /// Interval of the expired-OTP purge task. Env var: `OTP_PURGE_INTERVAL_SECS`.
    pub otp_purge_interval: Option<Duration>,
    /// Apply pending migrations before serving. Env var: `RUN_MIGRATIONS`.
    pub run_migrations: bool,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| var(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let port = get("PORT")
            .map(|v| v.parse::<u16>().with_context(|| format!("invalid PORT {v:?}")))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let otp_purge_interval = get("OTP_PURGE_INTERVAL_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .with_context(|| format!("invalid OTP_PURGE_INTERVAL_SECS {v:?}"))
            })
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let run_migrations = get("RUN_MIGRATIONS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let client_origins = get("CLIENT_ORIGIN")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            jwt_secret: get("JWT_SECRET"),
            google_client_id: get("GOOGLE_CLIENT_ID"),
            resend_api_key: get("RESEND_API_KEY"),
            email_from: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_owned()),
            client_origins,
            port,
            otp_purge_interval,
            run_migrations,
        })
    }
}

use anyhow::Context as _;
use chrono::{Duration as ChronoDuration, Utc};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use notekeeper_api::config::ApiConfig;
use notekeeper_api::domain::types::OTP_PURGE_GRACE_SECS;
use notekeeper_api::infra::db::DbOtpChallengeRepository;
use notekeeper_api::infra::email::EmailNotifier;
use notekeeper_api::infra::google::GoogleJwksVerifier;
use notekeeper_api::router::build_router;
use notekeeper_api::state::AppState;
use notekeeper_api::usecase::otp::OtpService;
use notekeeper_api_migration::Migrator;
use notekeeper_auth_types::token::TokenKeys;
use notekeeper_core::health::Uptime;
use notekeeper_core::middleware::cors_layer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    notekeeper_core::tracing::init_tracing();
    let uptime = Uptime::start();

    let config = ApiConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("failed to run migrations")?;
        info!("migrations applied");
    }

    let tokens = TokenKeys::new(config.jwt_secret.clone());
    if !tokens.is_configured() {
        warn!("JWT_SECRET is not set; sign-in and session checks will fail");
    }

    let mailer =
        EmailNotifier::from_config(config.resend_api_key.clone(), config.email_from.clone());
    if mailer.is_dev() {
        info!("RESEND_API_KEY is not set; OTP codes are written to the log");
    }
    if config.google_client_id.is_none() {
        info!("GOOGLE_CLIENT_ID is not set; Google sign-in is disabled");
    }

    if let Some(interval) = config.otp_purge_interval {
        spawn_otp_purge(DbOtpChallengeRepository { db: db.clone() }, interval);
    }

    let state = AppState {
        db,
        tokens,
        google_client_id: config.google_client_id.clone(),
        mailer,
        google: GoogleJwksVerifier::default(),
        uptime,
    };

    let router = build_router(state).layer(cors_layer(&config.client_origins));
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("notekeeper api listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

/// Periodically delete OTP challenges that expired more than a day ago.
fn spawn_otp_purge(challenges: DbOtpChallengeRepository, every: std::time::Duration) {
    let otp = OtpService { challenges };
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - ChronoDuration::seconds(OTP_PURGE_GRACE_SECS);
            match otp.purge_expired(cutoff).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "purged expired otp challenges"),
                Err(e) => warn!(error = ?e, "otp purge failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

use std::time::Instant;

use axum::{Json, extract::State};
use serde::Serialize;

/// Process start time, exposed to the health handler through `FromRef`.
#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    started_at: Instant,
}

impl Uptime {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Seconds since the process started.
    pub uptime: f64,
}

/// Handler for `GET /health`: liveness check with uptime.
pub async fn health(State(uptime): State<Uptime>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        uptime: uptime.seconds(),
    })
}

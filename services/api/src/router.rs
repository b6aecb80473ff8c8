use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use notekeeper_core::health::health;
use notekeeper_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{google_sign_in, request_otp, verify_otp},
    notes::{create_note, delete_note, list_notes, update_note},
};
use crate::middleware::require_session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let notes = Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{id}", put(update_note).delete(delete_note))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        // Health
        .route("/health", get(health))
        // Auth
        .route("/auth/request-otp", post(request_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/google", post(google_sign_in))
        // Notes
        .merge(notes)
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}

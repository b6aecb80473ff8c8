pub mod auth;
pub mod notes;

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json` extractor whose rejection is a `validation_error` on the `body` field.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

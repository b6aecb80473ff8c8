//! HTTP plumbing shared by Notekeeper services: tracing, request ids, CORS,
//! health reporting and wire-format helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;

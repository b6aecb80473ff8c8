//! Domain types shared across Notekeeper crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod email;
pub mod id;
pub mod user;

//! Session types shared by the API service and its tests.
//!
//! Provides signed session tokens and the `Identity` extractor.

pub mod identity;
pub mod token;

//! sea-orm entities for the Notekeeper API store.

pub mod notes;
pub mod otp_challenges;
pub mod users;

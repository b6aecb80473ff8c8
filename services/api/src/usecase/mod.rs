pub mod note;
pub mod otp;
pub mod sign_in;

//! User domain types.

use serde::{Deserialize, Serialize};

/// How a user last signed in.
///
/// Wire format: lower-case string (`"email"` or `"google"`), both in JSON and in the
/// `users.provider` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Email,
    Google,
}

impl AuthProvider {
    /// Convert from the stored string. Returns `None` for unknown values.
    pub fn from_str_value(v: &str) -> Option<Self> {
        match v {
            "email" => Some(Self::Email),
            "google" => Some(Self::Google),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Google => "google",
        }
    }
}

use chrono::{DateTime, Duration, Utc};
use rand::RngExt;

use notekeeper_domain::email::Email;
use notekeeper_domain::id::OtpChallengeId;

use crate::domain::repository::OtpChallengeRepository;
use crate::domain::types::{OTP_LEN, OTP_TTL_SECS, OtpChallenge};
use crate::error::ApiError;

/// Six digits, each drawn uniformly from 0-9. Leading zeros are kept.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Issues, checks and consumes one-time email codes.
pub struct OtpService<R: OtpChallengeRepository> {
    pub challenges: R,
}

impl<R: OtpChallengeRepository> OtpService<R> {
    /// Persist a fresh code for `email` and return it for delivery.
    ///
    /// Earlier outstanding codes for the same email stay valid.
    pub async fn request_code(&self, email: &Email) -> Result<String, ApiError> {
        let now = Utc::now();
        let challenge = OtpChallenge {
            id: OtpChallengeId::generate(),
            email: email.as_str().to_owned(),
            code: generate_code(),
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            consumed: false,
            created_at: now,
        };
        self.challenges.create(&challenge).await?;
        Ok(challenge.code)
    }

    /// Check `code` against the newest matching challenge and consume it.
    ///
    /// Rejections, in priority order: `InvalidCode`, `AlreadyUsed`, `Expired`.
    pub async fn verify_code(&self, email: &Email, code: &str) -> Result<(), ApiError> {
        let challenge = self
            .challenges
            .find_latest(email.as_str(), code)
            .await?
            .ok_or(ApiError::InvalidCode)?;

        if challenge.consumed {
            return Err(ApiError::AlreadyUsed);
        }
        if challenge.is_expired_at(Utc::now()) {
            return Err(ApiError::Expired);
        }

        // A concurrent verify of the same code may have consumed it since the read.
        if !self.challenges.consume(challenge.id).await? {
            return Err(ApiError::AlreadyUsed);
        }
        Ok(())
    }

    /// Delete challenges that expired before `cutoff`.
    pub async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        self.challenges.delete_expired_before(cutoff).await
    }
}

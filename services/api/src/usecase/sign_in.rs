use notekeeper_auth_types::identity::Identity;
use notekeeper_auth_types::token::{SESSION_TOKEN_TTL, TokenKeys};
use notekeeper_domain::email::Email;
use notekeeper_domain::user::AuthProvider;

use crate::domain::repository::{
    GoogleVerifier, OtpChallengeRepository, OtpMailer, UserRepository,
};
use crate::domain::types::{SignInProfile, User};
use crate::error::{ApiError, FieldError};
use crate::usecase::otp::OtpService;

/// Shortest code accepted before the store is consulted.
const MIN_CODE_LEN: usize = 4;

/// Shortest Google ID token accepted before verification is attempted.
const MIN_ID_TOKEN_LEN: usize = 10;

/// Collects field errors so a request reports every bad field at once.
#[derive(Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn email(&mut self, raw: &str) -> Option<Email> {
        match Email::parse(raw) {
            Ok(email) => Some(email),
            Err(e) => {
                self.errors.push(FieldError::new("email", e.to_string()));
                None
            }
        }
    }

    fn min_len(&mut self, field: &'static str, value: &str, min: usize, message: &str) {
        if value.chars().count() < min {
            self.errors.push(FieldError::new(field, message));
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ApiError> {
        match value {
            Some(v) if self.errors.is_empty() => Ok(v),
            _ => Err(ApiError::Validation(self.errors)),
        }
    }
}

/// Result of a successful sign-in.
#[derive(Debug)]
pub struct SignInOutput {
    pub token: String,
    pub user: User,
}

fn issue_session(tokens: &TokenKeys, user: User) -> Result<SignInOutput, ApiError> {
    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
        name: user.name.clone().filter(|n| !n.is_empty()),
    };
    let signed = tokens.sign(&identity, SESSION_TOKEN_TTL)?;
    Ok(SignInOutput {
        token: signed.token,
        user,
    })
}

// ── RequestOtp ───────────────────────────────────────────────────────────────

pub struct RequestOtpInput {
    pub email: String,
    pub name: String,
}

pub struct RequestOtpUseCase<R: OtpChallengeRepository, M: OtpMailer> {
    pub otp: OtpService<R>,
    pub mailer: M,
}

impl<R: OtpChallengeRepository, M: OtpMailer> RequestOtpUseCase<R, M> {
    /// Issue a code and hand it to the mailer. The code never leaves through the response.
    pub async fn execute(&self, input: RequestOtpInput) -> Result<(), ApiError> {
        let mut checks = Checks::default();
        let email = checks.email(&input.email);
        checks.min_len("name", &input.name, 1, "name_required");
        let email = checks.finish(email)?;

        let code = self.otp.request_code(&email).await?;
        self.mailer.send_otp(email.as_str(), &code).await?;
        tracing::info!(email = %email, "otp issued");
        Ok(())
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub code: String,
    pub name: String,
}

pub struct VerifyOtpUseCase<R: OtpChallengeRepository, U: UserRepository> {
    pub otp: OtpService<R>,
    pub users: U,
    pub tokens: TokenKeys,
}

impl<R: OtpChallengeRepository, U: UserRepository> VerifyOtpUseCase<R, U> {
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<SignInOutput, ApiError> {
        let mut checks = Checks::default();
        let email = checks.email(&input.email);
        checks.min_len("code", &input.code, MIN_CODE_LEN, "code_too_short");
        checks.min_len("name", &input.name, 1, "name_required");
        let email = checks.finish(email)?;

        self.otp.verify_code(&email, &input.code).await?;

        let user = self
            .users
            .upsert_on_sign_in(&SignInProfile {
                email,
                name: input.name,
                avatar_url: None,
                provider: AuthProvider::Email,
            })
            .await?;

        issue_session(&self.tokens, user)
    }
}

// ── GoogleSignIn ─────────────────────────────────────────────────────────────

pub struct GoogleSignInInput {
    pub id_token: String,
}

pub struct GoogleSignInUseCase<G: GoogleVerifier, U: UserRepository> {
    pub verifier: G,
    pub users: U,
    pub tokens: TokenKeys,
    /// OAuth client id the token audience must match. `None` disables Google sign-in.
    pub client_id: Option<String>,
}

impl<G: GoogleVerifier, U: UserRepository> GoogleSignInUseCase<G, U> {
    pub async fn execute(&self, input: GoogleSignInInput) -> Result<SignInOutput, ApiError> {
        let mut checks = Checks::default();
        checks.min_len("idToken", &input.id_token, MIN_ID_TOKEN_LEN, "id_token_too_short");
        checks.finish(Some(()))?;

        let client_id = self
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ApiError::GoogleNotConfigured)?;

        let payload = self
            .verifier
            .verify(&input.id_token, client_id)
            .await?
            .ok_or(ApiError::InvalidGoogleToken)?;

        let raw_email = payload.email.ok_or(ApiError::InvalidGoogleToken)?;
        // Google vouches for the address; a failed parse means the claim is unusable.
        let email = Email::parse(&raw_email).map_err(|_| ApiError::InvalidGoogleToken)?;

        let user = self
            .users
            .upsert_on_sign_in(&SignInProfile {
                email,
                name: payload.name.unwrap_or_default(),
                avatar_url: Some(payload.picture.unwrap_or_default()),
                provider: AuthProvider::Google,
            })
            .await?;

        issue_session(&self.tokens, user)
    }
}

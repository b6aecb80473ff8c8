use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use notekeeper_domain::user::AuthProvider;

use crate::domain::types::User;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::state::AppState;
use crate::usecase::otp::OtpService;
use crate::usecase::sign_in::{
    GoogleSignInInput, GoogleSignInUseCase, RequestOtpInput, RequestOtpUseCase, SignInOutput,
    VerifyOtpInput, VerifyOtpUseCase,
};

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub provider: AuthProvider,
    #[serde(serialize_with = "notekeeper_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "notekeeper_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            provider: user.provider,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<SignInOutput> for SessionResponse {
    fn from(out: SignInOutput) -> Self {
        Self {
            token: out.token,
            user: out.user.into(),
        }
    }
}

// ── POST /auth/request-otp ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

pub async fn request_otp(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RequestOtpRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let usecase = RequestOtpUseCase {
        otp: OtpService {
            challenges: state.otp_repo(),
        },
        mailer: state.mailer.clone(),
    };
    usecase
        .execute(RequestOtpInput {
            email: body.email,
            name: body.name,
        })
        .await
        .map_err(|e| e.or_failed("failed_to_send_otp"))?;
    Ok(Json(OkResponse::ok()))
}

// ── POST /auth/verify-otp ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyOtpRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let usecase = VerifyOtpUseCase {
        otp: OtpService {
            challenges: state.otp_repo(),
        },
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    };
    let out = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            code: body.code,
            name: body.name,
        })
        .await
        .map_err(|e| e.or_failed("verification_failed"))?;
    Ok(Json(out.into()))
}

// ── POST /auth/google ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInRequest {
    #[serde(default)]
    pub id_token: String,
}

pub async fn google_sign_in(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GoogleSignInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let usecase = GoogleSignInUseCase {
        verifier: state.google.clone(),
        users: state.user_repo(),
        tokens: state.tokens.clone(),
        client_id: state.google_client_id.clone(),
    };
    let out = usecase
        .execute(GoogleSignInInput {
            id_token: body.id_token,
        })
        .await
        .map_err(|e| e.or_failed("google_auth_failed"))?;
    Ok(Json(out.into()))
}

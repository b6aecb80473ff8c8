use chrono::Utc;

use notekeeper_api::error::ApiError;
use notekeeper_api::usecase::otp::OtpService;
use notekeeper_api::usecase::sign_in::{
    GoogleSignInInput, GoogleSignInUseCase, RequestOtpInput, RequestOtpUseCase, VerifyOtpInput,
    VerifyOtpUseCase,
};
use notekeeper_auth_types::token::TokenKeys;
use notekeeper_domain::user::AuthProvider;
use notekeeper_testing::auth::MockSession;

use crate::helpers::{
    MockGoogleVerifier, MockMailer, MockOtpRepo, MockUserRepo, google_payload, test_challenge,
};

const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";
const ID_TOKEN: &str = "header.payload.signature";

fn request_usecase(
    repo: &MockOtpRepo,
    mailer: &MockMailer,
) -> RequestOtpUseCase<MockOtpRepo, MockMailer> {
    RequestOtpUseCase {
        otp: OtpService {
            challenges: repo.clone(),
        },
        mailer: mailer.clone(),
    }
}

fn verify_usecase(
    repo: &MockOtpRepo,
    users: &MockUserRepo,
) -> VerifyOtpUseCase<MockOtpRepo, MockUserRepo> {
    VerifyOtpUseCase {
        otp: OtpService {
            challenges: repo.clone(),
        },
        users: users.clone(),
        tokens: MockSession::keys(),
    }
}

fn google_usecase(
    verifier: MockGoogleVerifier,
    users: &MockUserRepo,
) -> GoogleSignInUseCase<MockGoogleVerifier, MockUserRepo> {
    GoogleSignInUseCase {
        verifier,
        users: users.clone(),
        tokens: MockSession::keys(),
        client_id: Some(CLIENT_ID.to_owned()),
    }
}

fn verify_input(email: &str, code: &str, name: &str) -> VerifyOtpInput {
    VerifyOtpInput {
        email: email.to_owned(),
        code: code.to_owned(),
        name: name.to_owned(),
    }
}

fn validation_fields(err: ApiError) -> Vec<&'static str> {
    match err {
        ApiError::Validation(details) => details.into_iter().map(|d| d.field).collect(),
        other => panic!("expected Validation, got {other:?}"),
    }
}

// ── RequestOtpUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_mail_issued_code_to_normalized_address() {
    let repo = MockOtpRepo::empty();
    let mailer = MockMailer::new();

    request_usecase(&repo, &mailer)
        .execute(RequestOtpInput {
            email: "A@X.com".into(),
            name: "Ann".into(),
        })
        .await
        .unwrap();

    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "a@x.com");
    assert_eq!(sent[0].1, repo.all()[0].code);
}

#[tokio::test]
async fn should_report_every_invalid_request_field() {
    let repo = MockOtpRepo::empty();
    let mailer = MockMailer::new();

    let err = request_usecase(&repo, &mailer)
        .execute(RequestOtpInput {
            email: "not-an-email".into(),
            name: String::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(validation_fields(err), vec!["email", "name"]);
    assert!(repo.all().is_empty());
    assert!(mailer.last_code().is_none());
}

#[tokio::test]
async fn should_surface_mailer_failure_as_internal() {
    let repo = MockOtpRepo::empty();
    let mailer = MockMailer::failing();

    let err = request_usecase(&repo, &mailer)
        .execute(RequestOtpInput {
            email: "a@x.com".into(),
            name: "Ann".into(),
        })
        .await
        .unwrap_err()
        .or_failed("failed_to_send_otp");

    assert_eq!(err.kind(), "failed_to_send_otp");
}

// ── VerifyOtpUseCase ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_in_with_requested_code() {
    let repo = MockOtpRepo::empty();
    let mailer = MockMailer::new();
    let users = MockUserRepo::empty();

    request_usecase(&repo, &mailer)
        .execute(RequestOtpInput {
            email: "a@x.com".into(),
            name: "Ann".into(),
        })
        .await
        .unwrap();
    let code = mailer.last_code().unwrap();

    let out = verify_usecase(&repo, &users)
        .execute(verify_input("a@x.com", &code, "Ann"))
        .await
        .unwrap();

    assert_eq!(out.user.email, "a@x.com");
    assert_eq!(out.user.name.as_deref(), Some("Ann"));
    assert_eq!(out.user.provider, AuthProvider::Email);

    let claims = MockSession::keys().verify(&out.token).unwrap();
    assert_eq!(claims.sub, out.user.id.to_string());
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.name.as_deref(), Some("Ann"));
    assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
}

#[tokio::test]
async fn should_reject_reuse_of_verified_code() {
    let repo = MockOtpRepo::with(vec![test_challenge("a@x.com", "123456", Utc::now())]);
    let users = MockUserRepo::empty();
    let usecase = verify_usecase(&repo, &users);

    usecase
        .execute(verify_input("a@x.com", "123456", "Ann"))
        .await
        .unwrap();
    let err = usecase
        .execute(verify_input("a@x.com", "123456", "Ann"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "already_used");
}

#[tokio::test]
async fn should_keep_user_id_and_refresh_name_on_repeat_sign_in() {
    let repo = MockOtpRepo::with(vec![
        test_challenge("a@x.com", "111111", Utc::now()),
        test_challenge("a@x.com", "222222", Utc::now()),
    ]);
    let users = MockUserRepo::empty();
    let usecase = verify_usecase(&repo, &users);

    let first = usecase
        .execute(verify_input("a@x.com", "111111", "Ann"))
        .await
        .unwrap();
    let second = usecase
        .execute(verify_input("A@X.COM", "222222", "Annie"))
        .await
        .unwrap();

    assert_eq!(first.user.id, second.user.id);
    assert_eq!(second.user.name.as_deref(), Some("Annie"));
    assert_eq!(users.all().len(), 1);
}

#[tokio::test]
async fn should_reject_short_code_before_lookup() {
    let repo = MockOtpRepo::empty();
    let users = MockUserRepo::empty();

    let err = verify_usecase(&repo, &users)
        .execute(verify_input("a@x.com", "123", "Ann"))
        .await
        .unwrap_err();

    assert_eq!(validation_fields(err), vec!["code"]);
}

#[tokio::test]
async fn should_return_invalid_code_for_unknown_code() {
    let repo = MockOtpRepo::empty();
    let users = MockUserRepo::empty();

    let err = verify_usecase(&repo, &users)
        .execute(verify_input("a@x.com", "999999", "Ann"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "invalid_code");
    assert!(users.all().is_empty());
}

#[tokio::test]
async fn should_fail_sign_in_without_signing_secret() {
    let repo = MockOtpRepo::with(vec![test_challenge("a@x.com", "123456", Utc::now())]);
    let users = MockUserRepo::empty();
    let usecase = VerifyOtpUseCase {
        otp: OtpService {
            challenges: repo.clone(),
        },
        users: users.clone(),
        tokens: TokenKeys::new(None),
    };

    let err = usecase
        .execute(verify_input("a@x.com", "123456", "Ann"))
        .await
        .unwrap_err()
        .or_failed("verification_failed");

    assert_eq!(err.kind(), "verification_failed");
    assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

// ── GoogleSignInUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_in_with_google_profile() {
    let users = MockUserRepo::empty();
    let verifier = MockGoogleVerifier::Accept(google_payload(
        "Bob@Gmail.com",
        Some("Bob"),
        Some("https://example.com/bob.png"),
    ));

    let out = google_usecase(verifier, &users)
        .execute(GoogleSignInInput {
            id_token: ID_TOKEN.into(),
        })
        .await
        .unwrap();

    assert_eq!(out.user.email, "bob@gmail.com");
    assert_eq!(out.user.name.as_deref(), Some("Bob"));
    assert_eq!(
        out.user.avatar_url.as_deref(),
        Some("https://example.com/bob.png")
    );
    assert_eq!(out.user.provider, AuthProvider::Google);
    let claims = MockSession::keys().verify(&out.token).unwrap();
    assert_eq!(claims.sub, out.user.id.to_string());
}

#[tokio::test]
async fn should_store_empty_profile_fields_when_google_omits_them() {
    let users = MockUserRepo::empty();
    let verifier = MockGoogleVerifier::Accept(google_payload("bob@gmail.com", None, None));

    let out = google_usecase(verifier, &users)
        .execute(GoogleSignInInput {
            id_token: ID_TOKEN.into(),
        })
        .await
        .unwrap();

    assert_eq!(out.user.name.as_deref(), Some(""));
    assert_eq!(out.user.avatar_url.as_deref(), Some(""));
    let claims = MockSession::keys().verify(&out.token).unwrap();
    assert!(claims.name.is_none());
}

#[tokio::test]
async fn should_switch_existing_email_user_to_google() {
    let repo = MockOtpRepo::with(vec![test_challenge("a@x.com", "123456", Utc::now())]);
    let users = MockUserRepo::empty();
    let email_user = verify_usecase(&repo, &users)
        .execute(verify_input("a@x.com", "123456", "Ann"))
        .await
        .unwrap()
        .user;

    let verifier = MockGoogleVerifier::Accept(google_payload("a@x.com", Some("Ann G"), None));
    let google_user = google_usecase(verifier, &users)
        .execute(GoogleSignInInput {
            id_token: ID_TOKEN.into(),
        })
        .await
        .unwrap()
        .user;

    assert_eq!(google_user.id, email_user.id);
    assert_eq!(google_user.provider, AuthProvider::Google);
    assert_eq!(google_user.name.as_deref(), Some("Ann G"));
    assert_eq!(users.all().len(), 1);
}

#[tokio::test]
async fn should_reject_short_id_token() {
    let users = MockUserRepo::empty();
    let verifier = MockGoogleVerifier::Accept(google_payload("bob@gmail.com", None, None));

    let err = google_usecase(verifier, &users)
        .execute(GoogleSignInInput {
            id_token: "short".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(validation_fields(err), vec!["idToken"]);
}

#[tokio::test]
async fn should_require_google_client_id() {
    let users = MockUserRepo::empty();
    let usecase = GoogleSignInUseCase {
        verifier: MockGoogleVerifier::Accept(google_payload("bob@gmail.com", None, None)),
        users: users.clone(),
        tokens: MockSession::keys(),
        client_id: None,
    };

    let err = usecase
        .execute(GoogleSignInInput {
            id_token: ID_TOKEN.into(),
        })
        .await
        .unwrap_err()
        .or_failed("google_auth_failed");

    assert_eq!(err.kind(), "google_not_configured");
    assert!(users.all().is_empty());
}

#[tokio::test]
async fn should_reject_token_google_does_not_accept() {
    let users = MockUserRepo::empty();

    let err = google_usecase(MockGoogleVerifier::Reject, &users)
        .execute(GoogleSignInInput {
            id_token: ID_TOKEN.into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "invalid_google_token");
}

#[tokio::test]
async fn should_reject_google_token_without_email() {
    let users = MockUserRepo::empty();
    let mut payload = google_payload("unused@x.com", Some("Bob"), None);
    payload.email = None;

    let err = google_usecase(MockGoogleVerifier::Accept(payload), &users)
        .execute(GoogleSignInInput {
            id_token: ID_TOKEN.into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "invalid_google_token");
    assert!(users.all().is_empty());
}

#[tokio::test]
async fn should_relabel_verifier_outage() {
    let users = MockUserRepo::empty();

    let err = google_usecase(MockGoogleVerifier::Unavailable, &users)
        .execute(GoogleSignInInput {
            id_token: ID_TOKEN.into(),
        })
        .await
        .unwrap_err()
        .or_failed("google_auth_failed");

    assert_eq!(err.kind(), "google_auth_failed");
}

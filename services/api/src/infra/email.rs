use anyhow::Context as _;
use reqwest::Client;
use serde::Serialize;

use crate::domain::repository::OtpMailer;
use crate::error::ApiError;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const OTP_SUBJECT: &str = "Your OTP Code";

fn otp_html(code: &str) -> String {
    format!("<p>Your OTP code is <strong>{code}</strong>. It expires in 10 minutes.</p>")
}

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

/// Sends OTP emails through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            from,
        }
    }
}

impl OtpMailer for ResendMailer {
    async fn send_otp(&self, to: &str, code: &str) -> Result<(), ApiError> {
        let body = ResendEmail {
            from: &self.from,
            to: [to],
            subject: OTP_SUBJECT,
            html: otp_html(code),
        };
        self.client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("send otp email")?
            .error_for_status()
            .context("email provider rejected otp email")?;
        Ok(())
    }
}

/// Development mailer: writes the code to the log instead of sending it.
#[derive(Clone, Default)]
pub struct LogMailer;

impl OtpMailer for LogMailer {
    async fn send_otp(&self, to: &str, code: &str) -> Result<(), ApiError> {
        tracing::info!("OTP for {to}: {code}");
        Ok(())
    }
}

/// Mailer chosen at startup from configuration.
#[derive(Clone)]
pub enum EmailNotifier {
    Resend(ResendMailer),
    Log(LogMailer),
}

impl EmailNotifier {
    /// Resend when an API key is configured, log-only otherwise.
    pub fn from_config(api_key: Option<String>, from: String) -> Self {
        match api_key {
            Some(key) => Self::Resend(ResendMailer::new(key, from)),
            None => Self::Log(LogMailer),
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Log(_))
    }
}

impl OtpMailer for EmailNotifier {
    async fn send_otp(&self, to: &str, code: &str) -> Result<(), ApiError> {
        match self {
            Self::Resend(m) => m.send_otp(to, code).await,
            Self::Log(m) => m.send_otp(to, code).await,
        }
    }
}

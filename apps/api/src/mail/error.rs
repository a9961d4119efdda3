//! Error types for outgoing mail

use thiserror::Error;

/// Result type for mail operations
pub type MailResult<T> = Result<T, MailError>;

/// Errors that can occur while obtaining a token or sending a message
#[derive(Debug, Error)]
pub enum MailError {
    /// OAuth2 refresh-token exchange failed
    #[error("OAuth2 token refresh failed: {0}")]
    TokenRefresh(String),

    /// SMTP server rejected the credentials
    #[error("SMTP authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Connection or command timed out
    #[error("SMTP operation timed out: {0}")]
    Timeout(String),

    /// Provider sending quota or rate limit hit
    #[error("Sending quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Connection failed
    #[error("Failed to connect to SMTP server: {0}")]
    ConnectionFailed(String),

    /// Failed to send message
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    /// Invalid email address
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Message building error
    #[error("Failed to build message: {0}")]
    MessageBuildError(String),
}

impl MailError {
    /// Message safe to show to the person who submitted the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            MailError::TokenRefresh(_) | MailError::AuthenticationFailed(_) => {
                "Authentication error with email service. Please contact the site administrator."
            }
            MailError::Timeout(_) => "Email service timed out. Please try again later.",
            MailError::QuotaExceeded(_) => {
                "Email sending limit reached. Please try again tomorrow."
            }
            _ => "Failed to send email. Please try again later.",
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            MailError::TokenRefresh(_) | MailError::AuthenticationFailed(_)
        )
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        let detail = e.to_string();
        let code = e.status().map(|c| c.to_string());
        classify(&detail, code.as_deref(), e.is_timeout())
    }
}

/// Maps raw SMTP failure details onto a variant.
fn classify(detail: &str, code: Option<&str>, timed_out: bool) -> MailError {
    let lower = detail.to_lowercase();
    let detail = detail.to_string();

    if timed_out || lower.contains("timed out") || lower.contains("timeout") {
        return MailError::Timeout(detail);
    }
    if lower.contains("quota") || lower.contains("limit") {
        return MailError::QuotaExceeded(detail);
    }
    if matches!(code, Some("530" | "534" | "535")) || lower.contains("authentication") {
        return MailError::AuthenticationFailed(detail);
    }
    if code.is_none() && lower.contains("connection") {
        return MailError::ConnectionFailed(detail);
    }
    MailError::SendFailed(detail)
}

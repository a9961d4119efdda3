//! Outgoing mail: message model, Gmail OAuth2 tokens and SMTP delivery.

pub mod error;
pub mod message;
pub mod oauth;
pub mod smtp;

use async_trait::async_trait;

pub use error::{MailError, MailResult};
pub use message::{Addressee, OutgoingMessage};
pub use smtp::GmailMailer;

/// Delivers a single message.
///
/// Carried in `AppState` as `Arc<dyn Mailer>` so handlers never depend on a
/// concrete transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> MailResult<()>;
}

//! Gmail SMTP transport with XOAUTH2

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    transport::smtp::authentication::{Credentials, Mechanism},
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::{info, warn};

use super::message::build_lettre_message;
use super::oauth::GmailTokenProvider;
use super::{MailError, MailResult, Mailer, OutgoingMessage};
use crate::config::GmailConfig;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends mail as the configured Gmail account.
pub struct GmailMailer {
    host: String,
    port: u16,
    sender_email: String,
    tokens: GmailTokenProvider,
}

impl GmailMailer {
    pub fn new(config: &GmailConfig) -> MailResult<Self> {
        Ok(Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            sender_email: config.sender_email.clone(),
            tokens: GmailTokenProvider::new(config)?,
        })
    }

    fn transport(&self, access_token: String) -> MailResult<AsyncSmtpTransport<Tokio1Executor>> {
        // lettre's Xoauth2 mechanism takes the bare access token and
        // builds the SASL string itself
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
                .map_err(|e| MailError::ConnectionFailed(e.to_string()))?
                .port(self.port)
                .timeout(Some(SMTP_TIMEOUT))
                .credentials(Credentials::new(self.sender_email.clone(), access_token))
                .authentication(vec![Mechanism::Xoauth2])
                .build(),
        )
    }
}

#[async_trait]
impl Mailer for GmailMailer {
    async fn send(&self, message: OutgoingMessage) -> MailResult<()> {
        let lettre_message = build_lettre_message(&message)?;
        let access_token = self.tokens.access_token().await?;

        info!(subject = %message.subject, recipients = message.to.len(), "Sending email via SMTP with XOAUTH2");

        let result = self
            .transport(access_token)?
            .send(lettre_message)
            .await
            .map_err(MailError::from);

        if let Err(ref e) = result {
            if e.is_auth() {
                warn!("SMTP rejected the access token, dropping cached token");
                self.tokens.invalidate().await;
            }
        }

        result?;
        info!("Email sent successfully");
        Ok(())
    }
}

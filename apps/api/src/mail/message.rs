//! Outgoing message model and conversion to lettre

use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    Address, Message,
};

use super::{MailError, MailResult};

/// An address with an optional display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressee {
    pub address: String,
    pub name: Option<String>,
}

impl Addressee {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    /// Set the display name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn to_mailbox(&self) -> MailResult<Mailbox> {
        let address: Address = self
            .address
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("{}: {}", self.address, e)))?;
        if let Some(name) = self.name.as_deref().filter(|n| n.chars().any(char::is_control)) {
            return Err(MailError::InvalidAddress(format!(
                "display name for {} contains control characters: {name:?}",
                self.address
            )));
        }
        Ok(Mailbox::new(self.name.clone(), address))
    }
}

/// Email message to send
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub from: Addressee,
    pub to: Vec<Addressee>,
    pub reply_to: Option<Addressee>,
    pub subject: String,
    /// Plain text body
    pub text_body: Option<String>,
    /// HTML body
    pub html_body: Option<String>,
}

impl OutgoingMessage {
    pub fn new(from: Addressee, subject: impl Into<String>) -> Self {
        Self {
            from,
            to: Vec::new(),
            reply_to: None,
            subject: subject.into(),
            text_body: None,
            html_body: None,
        }
    }

    /// Add a To recipient
    pub fn to(mut self, addressee: Addressee) -> Self {
        self.to.push(addressee);
        self
    }

    pub fn reply_to(mut self, addressee: Addressee) -> Self {
        self.reply_to = Some(addressee);
        self
    }

    /// Set the plain text body
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Set the HTML body
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }
}

/// Build a lettre Message from OutgoingMessage
pub fn build_lettre_message(msg: &OutgoingMessage) -> MailResult<Message> {
    if msg.to.is_empty() {
        return Err(MailError::MessageBuildError(
            "message has no recipients".to_string(),
        ));
    }

    let mut builder = Message::builder()
        .from(msg.from.to_mailbox()?)
        .subject(&msg.subject);

    for to in &msg.to {
        builder = builder.to(to.to_mailbox()?);
    }

    if let Some(ref reply_to) = msg.reply_to {
        builder = builder.reply_to(reply_to.to_mailbox()?);
    }

    let text_part = |body: &str| {
        SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
    };
    let html_part = |body: &str| {
        SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
    };

    let body = match (&msg.text_body, &msg.html_body) {
        (Some(text), Some(html)) => MultiPart::alternative()
            .singlepart(text_part(text))
            .singlepart(html_part(html)),
        (Some(text), None) => MultiPart::alternative().singlepart(text_part(text)),
        (None, Some(html)) => MultiPart::alternative().singlepart(html_part(html)),
        (None, None) => MultiPart::alternative().singlepart(text_part("")),
    };

    builder
        .multipart(body)
        .map_err(|e| MailError::MessageBuildError(e.to_string()))
}

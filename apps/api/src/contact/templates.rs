// Outgoing email templates for the contact form.
// HTML bodies only ever interpolate escaped user input.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::GmailConfig;
use crate::contact::models::ContactSubmission;
use crate::contact::validation::escape_html;
use crate::extract::ClientMeta;
use crate::mail::{Addressee, OutgoingMessage};

const CONTACT_FORM_SENDER_NAME: &str = "Portfolio Contact Form";
pub const AUTO_REPLY_SUBJECT: &str = "Thank you for your message";

/// Notification to the site owner about a new submission.
/// Replies go straight back to the submitter.
pub fn owner_notification(
    gmail: &GmailConfig,
    submission: &ContactSubmission,
    client: &ClientMeta,
    received_at: DateTime<Utc>,
) -> OutgoingMessage {
    let timestamp = received_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let received_on = received_at.format("%B %-d, %Y at %H:%M UTC").to_string();
    let ip = client.forwarded_for_display();
    let user_agent = client.user_agent_display();

    let text = format!(
        "Name: {name}\nEmail: {email}\n\nMessage:\n{message}\n\n---\nTimestamp: {timestamp}\nIP: {ip}\nUser-Agent: {user_agent}\n",
        name = submission.name,
        email = submission.email,
        message = submission.message,
    );

    let name = escape_html(&submission.name);
    let email = escape_html(&submission.email);
    let message = escape_html(&submission.message);
    let ip = escape_html(ip);
    let user_agent = escape_html(user_agent);

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #eaeaea; border-radius: 8px; box-shadow: 0 4px 8px rgba(0,0,0,0.1);">
  <div style="text-align: center; margin-bottom: 20px; padding-bottom: 20px; border-bottom: 1px solid #eaeaea;">
    <h2 style="color: #333; margin: 0;">New Contact Form Submission</h2>
    <p style="color: #666; font-size: 14px; margin: 5px 0 0;">Received on {received_on}</p>
  </div>
  <div style="margin-bottom: 25px;">
    <h3 style="color: #444; margin-bottom: 10px; font-size: 18px;">Contact Details</h3>
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> <a href="mailto:{email}" style="color: #0070f3; text-decoration: none;">{email}</a></p>
  </div>
  <div style="background-color: #f9f9f9; padding: 20px; border-radius: 6px; margin-bottom: 25px;">
    <h3 style="color: #444; margin-top: 0; margin-bottom: 10px; font-size: 18px;">Message</h3>
    <p style="white-space: pre-wrap; margin: 0; line-height: 1.6;">{message}</p>
  </div>
  <div style="font-size: 12px; color: #777; background-color: #f0f0f0; padding: 10px; border-radius: 6px;">
    <p style="margin: 0 0 5px;"><strong>Additional Information:</strong></p>
    <p style="margin: 0 0 3px;">Timestamp: {timestamp}</p>
    <p style="margin: 0 0 3px;">IP: {ip}</p>
    <p style="margin: 0 0 3px;">User-Agent: {user_agent}</p>
    <p style="margin: 10px 0 0;">This is an automated message from your portfolio website contact form.</p>
  </div>
</div>"#
    );

    OutgoingMessage::new(
        Addressee::new(&gmail.sender_email).named(CONTACT_FORM_SENDER_NAME),
        format!("Portfolio Contact: {}", submission.name),
    )
    .to(Addressee::new(&gmail.recipient_email))
    .reply_to(Addressee::new(&submission.email).named(&submission.name))
    .text(text)
    .html(html)
}

/// Acknowledgement sent back to the person who filled in the form.
pub fn auto_reply(
    gmail: &GmailConfig,
    owner_name: &str,
    submission: &ContactSubmission,
) -> OutgoingMessage {
    let text = format!(
        "Hello {name},\n\n\
         Thank you for contacting me through my portfolio website. I've received your message and will review it soon.\n\n\
         I typically respond within 1-2 business days. If your matter is urgent, please let me know.\n\n\
         Best regards,\n{owner_name}\n",
        name = submission.name,
    );

    let name = escape_html(&submission.name);
    let owner = escape_html(owner_name);

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #eaeaea; border-radius: 8px; box-shadow: 0 4px 8px rgba(0,0,0,0.1);">
  <div style="text-align: center; margin-bottom: 20px;">
    <h2 style="color: #333;">Thank You for Your Message</h2>
  </div>
  <div style="line-height: 1.6; color: #444;">
    <p>Hello {name},</p>
    <p>Thank you for contacting me through my portfolio website. I've received your message and will review it soon.</p>
    <p>I typically respond within 1-2 business days. If your matter is urgent, please let me know.</p>
    <p style="margin-top: 25px;">Best regards,<br>{owner}</p>
  </div>
  <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #eaeaea; font-size: 12px; color: #777; text-align: center;">
    <p>This is an automated response. Please do not reply directly to this email.</p>
  </div>
</div>"#
    );

    OutgoingMessage::new(
        Addressee::new(&gmail.sender_email).named(owner_name),
        AUTO_REPLY_SUBJECT,
    )
    .to(Addressee::new(&submission.email).named(&submission.name))
    .text(text)
    .html(html)
}

/// Message sent by `send-test-email` to confirm the OAuth2 mail setup.
pub fn diagnostic_message(gmail: &GmailConfig, to: &str, sent_at: DateTime<Utc>) -> OutgoingMessage {
    let timestamp = sent_at.to_rfc3339_opts(SecondsFormat::Secs, true);

    OutgoingMessage::new(
        Addressee::new(&gmail.sender_email).named(CONTACT_FORM_SENDER_NAME),
        "Test Email from Portfolio Contact Form",
    )
    .to(Addressee::new(to))
    .text(format!(
        "This is a test email sent at {timestamp} to verify the Gmail OAuth2 configuration.\n\n\
         If you received this, the contact form can send mail."
    ))
    .html(format!(
        "<h2>Test Email</h2>\
         <p>This is a test email sent at {timestamp} to verify the Gmail OAuth2 configuration.</p>\
         <p>If you received this, the contact form can send mail.</p>"
    ))
}

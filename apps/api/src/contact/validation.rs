use once_cell::sync::Lazy;
use regex::Regex;

use crate::contact::models::{ContactFormData, ContactSubmission};
use crate::errors::AppError;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 1000;
pub const EMAIL_MAX: usize = 320;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern is valid")
});

/// Script tags, `javascript:` URLs, inline event handlers (`onclick=`), and `data:` URLs.
static SUSPICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)<script\b.*?</script>",
        r"(?i)javascript:",
        r"(?i)on\w+=",
        r"(?i)data:",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("suspicious pattern is valid"))
    .collect()
});

/// Validates an email address format.
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= EMAIL_MAX
        && EMAIL_RE.is_match(email)
        && email.parse::<lettre::Address>().is_ok()
}

/// Length check (trimmed minimum, raw maximum, in characters) plus a scan for
/// markup that has no business in a contact message.
pub fn is_valid_input(input: &str, min_len: usize, max_len: usize) -> bool {
    if input.trim().chars().count() < min_len || input.chars().count() > max_len {
        return false;
    }
    !SUSPICIOUS_PATTERNS.iter().any(|re| re.is_match(input))
}

/// Escapes text for interpolation into an HTML email body, then trims it.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '\\' => out.push_str("&#92;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out.trim().to_string()
}

/// Runs every contact-form check in order, returning the first failure.
pub fn validate_submission(form: ContactFormData) -> Result<ContactSubmission, AppError> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

    let (Some(name), Some(email), Some(message)) = (
        non_empty(form.name),
        non_empty(form.email),
        non_empty(form.message),
    ) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    // The name ends up in mail headers, so line breaks are never allowed
    if !is_valid_input(&name, NAME_MIN, NAME_MAX) || name.trim().chars().any(char::is_control) {
        return Err(AppError::Validation(format!(
            "Name must be between {NAME_MIN} and {NAME_MAX} characters and contain no malicious content"
        )));
    }

    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }

    if !is_valid_input(&message, MESSAGE_MIN, MESSAGE_MAX) {
        return Err(AppError::Validation(format!(
            "Message must be between {MESSAGE_MIN} and {MESSAGE_MAX} characters and contain no malicious content"
        )));
    }

    Ok(ContactSubmission {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        message: message.trim().to_string(),
    })
}

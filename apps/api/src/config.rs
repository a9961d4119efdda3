use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gmail: GmailConfig,
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Signs the auto-reply and appears as its From name.
    pub owner_name: String,
    pub contact_rate_limit: u32,
    pub contact_rate_window: Duration,
    pub summary_rate_limit: u32,
    pub summary_rate_window: Duration,
    /// Origin of the static site. `None` means permissive CORS.
    pub allowed_origin: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

/// Gmail OAuth2 + SMTP settings.
#[derive(Debug, Clone)]
pub struct GmailConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub sender_email: String,
    pub recipient_email: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// OAuth2 token endpoint the refresh token is exchanged at.
    pub token_url: String,
}

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Reads `.env.local`, then `.env`. Both are optional and `.env.local` wins.
fn load_env_files() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_env_files();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = get("GEMINI_API_KEY")
            .or_else(|| get("GOOGLE_GENAI_API_KEY"))
            .context(
                "Required environment variable 'GEMINI_API_KEY' (or 'GOOGLE_GENAI_API_KEY') is not set",
            )?;

        Ok(Config {
            gmail: GmailConfig::from_lookup(&get)?,
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL")
                .unwrap_or_else(|| llm_client::DEFAULT_MODEL.to_string()),
            owner_name: get("SITE_OWNER_NAME")
                .unwrap_or_else(|| "David Morgan-Gumm".to_string()),
            contact_rate_limit: parse_or(&get, "CONTACT_RATE_LIMIT", 5)?,
            contact_rate_window: Duration::from_secs(parse_or(
                &get,
                "CONTACT_RATE_WINDOW_SECS",
                3600,
            )?),
            summary_rate_limit: parse_or(&get, "SUMMARY_RATE_LIMIT", 20)?,
            summary_rate_window: Duration::from_secs(parse_or(
                &get,
                "SUMMARY_RATE_WINDOW_SECS",
                3600,
            )?),
            allowed_origin: get("ALLOWED_ORIGIN"),
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

impl GmailConfig {
    /// Mail settings only. Used by commands that never touch the LLM.
    pub fn from_env() -> Result<Self> {
        load_env_files();
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(GmailConfig {
            client_id: require(&get, "GMAIL_CLIENT_ID")?,
            client_secret: require(&get, "GMAIL_CLIENT_SECRET")?,
            refresh_token: require(&get, "GMAIL_REFRESH_TOKEN")?,
            sender_email: require(&get, "GMAIL_SENDER_EMAIL")?,
            recipient_email: require(&get, "GMAIL_RECIPIENT_EMAIL")?,
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            smtp_port: parse_or(&get, "SMTP_PORT", 587)?,
            token_url: get("GMAIL_TOKEN_URL").unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
        })
    }
}

fn require<F>(get: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
pub fn test_config() -> Config {
    let vars = required_vars();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test config must be complete")
}

#[cfg(test)]
fn required_vars() -> std::collections::HashMap<&'static str, &'static str> {
    std::collections::HashMap::from([
        ("GMAIL_CLIENT_ID", "client-id.apps.googleusercontent.com"),
        ("GMAIL_CLIENT_SECRET", "client-secret"),
        ("GMAIL_REFRESH_TOKEN", "1//refresh-token"),
        ("GMAIL_SENDER_EMAIL", "sender@gmail.com"),
        ("GMAIL_RECIPIENT_EMAIL", "owner@example.com"),
        ("GEMINI_API_KEY", "gemini-key"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn build(vars: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = build(&required_vars()).unwrap();
        assert_eq!(config.gmail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.gmail.smtp_port, 587);
        assert_eq!(config.contact_rate_limit, 5);
        assert_eq!(config.contact_rate_window, Duration::from_secs(3600));
        assert_eq!(config.summary_rate_limit, 20);
        assert_eq!(config.port, 8080);
        assert_eq!(config.gemini_model, llm_client::DEFAULT_MODEL);
        assert!(config.allowed_origin.is_none());
    }

    #[test]
    fn test_missing_required_var_names_it() {
        let mut vars = required_vars();
        vars.remove("GMAIL_REFRESH_TOKEN");
        let err = build(&vars).unwrap_err();
        assert!(err.to_string().contains("GMAIL_REFRESH_TOKEN"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = required_vars();
        vars.insert("GMAIL_SENDER_EMAIL", "   ");
        assert!(build(&vars).is_err());
    }

    #[test]
    fn test_genai_key_fallback() {
        let mut vars = required_vars();
        vars.remove("GEMINI_API_KEY");
        vars.insert("GOOGLE_GENAI_API_KEY", "fallback-key");
        assert_eq!(build(&vars).unwrap().gemini_api_key, "fallback-key");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut vars = required_vars();
        vars.insert("PORT", "eighty");
        let err = build(&vars).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_mail_config_needs_no_llm_key() {
        let mut vars = required_vars();
        vars.remove("GEMINI_API_KEY");
        assert!(build(&vars).is_err());

        let gmail =
            GmailConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(gmail.sender_email, "sender@gmail.com");
        assert_eq!(gmail.token_url, GOOGLE_TOKEN_URL);
    }

    #[test]
    fn test_mail_config_still_requires_gmail_vars() {
        let mut vars = required_vars();
        vars.remove("GMAIL_CLIENT_SECRET");
        let err = GmailConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("GMAIL_CLIENT_SECRET"));
    }

    #[test]
    fn test_rate_limit_overrides() {
        let mut vars = required_vars();
        vars.insert("CONTACT_RATE_LIMIT", "2");
        vars.insert("CONTACT_RATE_WINDOW_SECS", "60");
        let config = build(&vars).unwrap();
        assert_eq!(config.contact_rate_limit, 2);
        assert_eq!(config.contact_rate_window, Duration::from_secs(60));
    }
}

use serde::{Deserialize, Serialize};

/// Raw form payload. Fields are optional so a missing field surfaces as
/// "Missing required fields" rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct ContactFormData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A submission that passed validation. Values are trimmed but not escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactFormResponse {
    pub success: bool,
    pub message: String,
}

impl ContactFormResponse {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: "Email sent successfully".to_string(),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const SUMMARY_MIN: usize = 50;
pub const SUMMARY_MAX: usize = 1000;
pub const KEYWORDS_MIN: usize = 3;
pub const KEYWORDS_MAX: usize = 200;
pub const SKILLS_MIN: usize = 3;
pub const SKILLS_MAX: usize = 200;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveSummaryInput {
    /// The self-summary paragraph to be improved.
    pub summary: String,
    /// Relevant industry keywords to consider.
    pub industry_keywords: String,
    /// Comma-separated skills to highlight.
    pub skills: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImproveSummaryOutput {
    pub improved_summary: String,
}

impl ImproveSummaryInput {
    /// Checks field lengths: minimums on trimmed text, maximums on raw text.
    pub fn validate(&self) -> Result<(), AppError> {
        check_len(
            &self.summary,
            SUMMARY_MIN,
            SUMMARY_MAX,
            "Summary must be at least 50 characters long.",
            "Summary must be at most 1000 characters long.",
        )?;
        check_len(
            &self.industry_keywords,
            KEYWORDS_MIN,
            KEYWORDS_MAX,
            "Please provide some industry keywords.",
            "Keywords are too long.",
        )?;
        check_len(
            &self.skills,
            SKILLS_MIN,
            SKILLS_MAX,
            "Please list some skills.",
            "Skills list is too long.",
        )
    }
}

fn check_len(
    value: &str,
    min: usize,
    max: usize,
    too_short: &str,
    too_long: &str,
) -> Result<(), AppError> {
    if value.trim().chars().count() < min {
        return Err(AppError::Validation(too_short.to_string()));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(too_long.to_string()));
    }
    Ok(())
}

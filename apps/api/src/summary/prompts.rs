// Summary tool LLM prompt templates.

use crate::summary::models::ImproveSummaryInput;

pub const IMPROVE_SUMMARY_SYSTEM: &str = "\
You are an AI assistant that helps improve self-summary paragraphs based on industry keywords and skills. \
Never invent employers, titles, credentials, or achievements that the original summary does not mention.";

/// Builds the user prompt in one pass so user text is never re-scanned for placeholders.
pub fn improve_summary_prompt(input: &ImproveSummaryInput) -> String {
    format!(
        r#"Analyze the following self-summary paragraph and suggest improvements by incorporating the provided industry keywords and skills. The improved summary should be concise, engaging, and tailored to the specified industry.

Self-Summary:
{summary}

Industry Keywords:
{keywords}

Skills:
{skills}

OUTPUT SCHEMA (return exactly this structure):
{{
  "improvedSummary": "string"
}}"#,
        summary = input.summary.trim(),
        keywords = input.industry_keywords.trim(),
        skills = input.skills.trim(),
    )
}

//! Summary improver: pluggable backend for the AI self-summary tool.
//!
//! `AppState` holds an `Arc<dyn SummaryImprover>`; production uses the Gemini-backed
//! `LlmSummaryImprover`.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::summary::models::{ImproveSummaryInput, ImproveSummaryOutput};
use crate::summary::prompts::{improve_summary_prompt, IMPROVE_SUMMARY_SYSTEM};

#[async_trait]
pub trait SummaryImprover: Send + Sync {
    async fn improve(&self, input: &ImproveSummaryInput) -> Result<ImproveSummaryOutput, AppError>;
}

pub struct LlmSummaryImprover(pub LlmClient);

#[async_trait]
impl SummaryImprover for LlmSummaryImprover {
    async fn improve(&self, input: &ImproveSummaryInput) -> Result<ImproveSummaryOutput, AppError> {
        let system = format!("{IMPROVE_SUMMARY_SYSTEM} {JSON_ONLY_SYSTEM}");
        let prompt = improve_summary_prompt(input);

        let output: ImproveSummaryOutput = self
            .0
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Failed to improve summary: {e}")))?;

        finalize(output)
    }
}

/// Trims the model output and rejects an empty answer.
fn finalize(output: ImproveSummaryOutput) -> Result<ImproveSummaryOutput, AppError> {
    let improved_summary = output.improved_summary.trim().to_string();
    if improved_summary.is_empty() {
        return Err(AppError::Llm(
            "Model returned an empty improved summary".to_string(),
        ));
    }
    Ok(ImproveSummaryOutput { improved_summary })
}

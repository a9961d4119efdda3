// AI self-summary improvement tool.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod handlers;
pub mod improver;
pub mod models;
pub mod prompts;

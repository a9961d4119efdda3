use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::ClientMeta;
use crate::rate_limit::RateDecision;
use crate::state::AppState;
use crate::summary::improver::SummaryImprover;
use crate::summary::models::{ImproveSummaryInput, ImproveSummaryOutput};

/// POST /api/improve-summary
pub async fn handle_improve_summary(
    State(state): State<AppState>,
    client: ClientMeta,
    payload: Result<Json<ImproveSummaryInput>, JsonRejection>,
) -> Result<Json<ImproveSummaryOutput>, AppError> {
    if let RateDecision::Limited { retry_after } = state.summary_limiter.check(&client.ip) {
        warn!(ip = %client.ip, "Summary tool rate limit exceeded");
        return Err(AppError::RateLimited { retry_after });
    }

    let Json(input) = payload.map_err(|rejection| {
        warn!("Rejected summary payload: {rejection}");
        AppError::Validation("Invalid request body".to_string())
    })?;
    input.validate()?;

    info!(
        summary_chars = input.summary.chars().count(),
        "Improving self-summary"
    );
    let output = state.summary_improver.improve(&input).await?;
    Ok(Json(output))
}

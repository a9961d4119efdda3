use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::contact::models::{ContactFormData, ContactFormResponse};
use crate::contact::templates::{auto_reply, owner_notification};
use crate::contact::validation::validate_submission;
use crate::errors::AppError;
use crate::extract::ClientMeta;
use crate::mail::Mailer;
use crate::rate_limit::RateDecision;
use crate::state::AppState;

/// POST /api/contact
pub async fn handle_contact(
    State(state): State<AppState>,
    client: ClientMeta,
    payload: Result<Json<ContactFormData>, JsonRejection>,
) -> Result<Json<ContactFormResponse>, AppError> {
    if let RateDecision::Limited { retry_after } = state.contact_limiter.check(&client.ip) {
        warn!(ip = %client.ip, "Contact form rate limit exceeded");
        return Err(AppError::RateLimited { retry_after });
    }

    let Json(form) = payload.map_err(|rejection| {
        warn!("Rejected contact payload: {rejection}");
        AppError::Validation("Invalid request body".to_string())
    })?;

    let submission = validate_submission(form)?;
    let received_at = Utc::now();

    let notification = owner_notification(&state.config.gmail, &submission, &client, received_at);
    let reply = auto_reply(&state.config.gmail, &state.config.owner_name, &submission);

    info!("Sending notification email to site owner...");
    state.mailer.send(notification).await?;

    info!("Sending auto-reply to user...");
    state.mailer.send(reply).await?;

    Ok(Json(ContactFormResponse::sent()))
}


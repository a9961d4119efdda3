use std::sync::Arc;

use crate::config::Config;
use crate::mail::Mailer;
use crate::rate_limit::RateLimiter;
use crate::summary::improver::SummaryImprover;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Outgoing mail. Default: GmailMailer (OAuth2 + SMTP).
    pub mailer: Arc<dyn Mailer>,
    /// AI summary backend. Default: LlmSummaryImprover.
    pub summary_improver: Arc<dyn SummaryImprover>,
    pub contact_limiter: Arc<RateLimiter>,
    pub summary_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        config: Config,
        mailer: Arc<dyn Mailer>,
        summary_improver: Arc<dyn SummaryImprover>,
    ) -> Self {
        let contact_limiter = Arc::new(RateLimiter::new(
            config.contact_rate_limit,
            config.contact_rate_window,
        ));
        let summary_limiter = Arc::new(RateLimiter::new(
            config.summary_rate_limit,
            config.summary_rate_window,
        ));

        Self {
            config,
            mailer,
            summary_improver,
            contact_limiter,
            summary_limiter,
        }
    }
}

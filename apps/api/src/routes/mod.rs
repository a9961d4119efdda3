pub mod health;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::Config;
use crate::contact::handlers as contact;
use crate::errors::AppError;
use crate::state::AppState;
use crate::summary::handlers as summary;

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/contact",
            post(contact::handle_contact).fallback(method_not_allowed),
        )
        .route(
            "/api/improve-summary",
            post(summary::handle_improve_summary).fallback(method_not_allowed),
        )
        .with_state(state)
}

/// Restricts CORS to the configured site origin, or stays permissive when none is set.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let Some(origin) = config.allowed_origin.as_deref() else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE]),
        Err(e) => {
            warn!("ALLOWED_ORIGIN is not a valid header value ({e}), falling back to permissive CORS");
            CorsLayer::permissive()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header::RETRY_AFTER, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::test_config;
    use crate::mail::message::build_lettre_message;
    use crate::mail::{MailError, MailResult, Mailer, OutgoingMessage};
    use crate::summary::improver::SummaryImprover;
    use crate::summary::models::{ImproveSummaryInput, ImproveSummaryOutput};

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMessage>>,
        fail_with: Option<fn() -> MailError>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: OutgoingMessage) -> MailResult<()> {
            if let Some(make_err) = self.fail_with {
                return Err(make_err());
            }
            build_lettre_message(&message)?;
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    struct CannedImprover(Option<&'static str>);

    #[async_trait]
    impl SummaryImprover for CannedImprover {
        async fn improve(
            &self,
            _input: &ImproveSummaryInput,
        ) -> Result<ImproveSummaryOutput, AppError> {
            match self.0 {
                Some(text) => Ok(ImproveSummaryOutput {
                    improved_summary: text.to_string(),
                }),
                None => Err(AppError::Llm("model unavailable".to_string())),
            }
        }
    }

    fn app_with(config: Config, mailer: Arc<RecordingMailer>, improver: CannedImprover) -> Router {
        build_router(AppState::new(config, mailer, Arc::new(improver)))
    }

    fn app(mailer: Arc<RecordingMailer>) -> Router {
        app_with(test_config(), mailer, CannedImprover(Some("Improved.")))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .header("user-agent", "integration-test")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn valid_contact() -> Value {
        json!({
            "name": "John Doe",
            "email": "test@example.com",
            "message": "This is a test message that is long enough to pass validation."
        })
    }

    fn valid_summary() -> Value {
        json!({
            "summary": "I am a backend engineer who builds reliable distributed services.",
            "industryKeywords": "fintech, payments",
            "skills": "Rust, PostgreSQL, Kafka"
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_contact_sends_notification_then_auto_reply() {
        let mailer = Arc::new(RecordingMailer::default());
        let response = app(mailer.clone())
            .oneshot(post_json("/api/contact", valid_contact()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"success": true, "message": "Email sent successfully"})
        );

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to[0].address, "owner@example.com");
        assert_eq!(sent[0].subject, "Portfolio Contact: John Doe");
        assert_eq!(
            sent[0].reply_to.as_ref().map(|r| r.address.as_str()),
            Some("test@example.com")
        );
        assert!(sent[0]
            .text_body
            .as_deref()
            .unwrap()
            .contains("User-Agent: integration-test"));
        assert_eq!(sent[1].to[0].address, "test@example.com");
        assert_eq!(sent[1].subject, "Thank you for your message");
    }

    #[tokio::test]
    async fn test_contact_missing_fields() {
        let mailer = Arc::new(RecordingMailer::default());
        let response = app(mailer.clone())
            .oneshot(post_json(
                "/api/contact",
                json!({"name": "John Doe", "email": "test@example.com"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": "Missing required fields"})
        );
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contact_invalid_email() {
        let mut body = valid_contact();
        body["email"] = json!("invalid-email");
        let response = app(Arc::default())
            .oneshot(post_json("/api/contact", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn test_contact_script_in_message_rejected() {
        let mut body = valid_contact();
        body["message"] = json!("Hello there <script>alert('x')</script>");
        let response = app(Arc::default())
            .oneshot(post_json("/api/contact", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Message must be between 10 and 1000 characters and contain no malicious content"
        );
    }

    #[tokio::test]
    async fn test_contact_name_with_line_break_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut body = valid_contact();
        body["name"] = json!("John\r\nBcc: evil@attacker.com");
        let response = app(mailer.clone())
            .oneshot(post_json("/api/contact", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": false,
                "message": "Name must be between 2 and 50 characters and contain no malicious content"
            })
        );
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contact_malformed_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(Arc::default()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_contact_rate_limited_per_ip() {
        let mut config = test_config();
        config.contact_rate_limit = 1;
        let router = app_with(config, Arc::default(), CannedImprover(Some("x")));

        let first = router
            .clone()
            .oneshot(post_json("/api/contact", valid_contact()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .clone()
            .oneshot(post_json("/api/contact", valid_contact()))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(RETRY_AFTER));
        assert_eq!(
            body_json(second).await,
            json!({"success": false, "message": "Too many requests. Please try again later."})
        );
    }

    #[tokio::test]
    async fn test_contact_rate_limit_applies_before_validation() {
        let mut config = test_config();
        config.contact_rate_limit = 1;
        let router = app_with(config, Arc::default(), CannedImprover(Some("x")));

        router
            .clone()
            .oneshot(post_json("/api/contact", json!({})))
            .await
            .unwrap();
        let response = router
            .oneshot(post_json("/api/contact", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_contact_get_not_allowed() {
        let response = app(Arc::default())
            .oneshot(Request::get("/api/contact").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": "Method Not Allowed"})
        );
    }

    #[tokio::test]
    async fn test_contact_mail_timeout_reported() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::default(),
            fail_with: Some(|| MailError::Timeout("connection timed out".to_string())),
        });
        let response = app(mailer)
            .oneshot(post_json("/api/contact", valid_contact()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "Email service timed out. Please try again later."
        );
        assert!(body["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_contact_token_failure_reported_as_auth() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::default(),
            fail_with: Some(|| MailError::TokenRefresh("invalid_grant".to_string())),
        });
        let response = app(mailer)
            .oneshot(post_json("/api/contact", valid_contact()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["message"],
            "Authentication error with email service. Please contact the site administrator."
        );
    }

    #[tokio::test]
    async fn test_improve_summary_ok() {
        let response = app(Arc::default())
            .oneshot(post_json("/api/improve-summary", valid_summary()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"improvedSummary": "Improved."})
        );
    }

    #[tokio::test]
    async fn test_improve_summary_validation() {
        let mut body = valid_summary();
        body["summary"] = json!("Too short");
        let response = app(Arc::default())
            .oneshot(post_json("/api/improve-summary", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Summary must be at least 50 characters long."
        );
    }

    #[tokio::test]
    async fn test_improve_summary_llm_failure() {
        let router = app_with(test_config(), Arc::default(), CannedImprover(None));
        let response = router
            .oneshot(post_json("/api/improve-summary", valid_summary()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["message"],
            "Failed to improve summary. Please try again."
        );
    }

    #[tokio::test]
    async fn test_improve_summary_get_not_allowed() {
        let response = app(Arc::default())
            .oneshot(
                Request::get("/api/improve-summary")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/contact")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap()
    }

    fn cors_app(allowed_origin: Option<&str>) -> Router {
        let mut config = test_config();
        config.allowed_origin = allowed_origin.map(str::to_string);
        let cors = cors_layer(&config);
        app_with(config, Arc::default(), CannedImprover(Some("x"))).layer(cors)
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = cors_app(Some("https://example.dev"))
            .oneshot(preflight("https://example.dev"))
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "https://example.dev"
        );
        let methods = headers
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("POST"));
        assert!(methods.contains("GET"));
        assert!(headers
            .get("access-control-allow-headers")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("content-type"));
    }

    #[tokio::test]
    async fn test_cors_ignores_other_origins() {
        let response = cors_app(Some("https://example.dev"))
            .oneshot(preflight("https://evil.test"))
            .await
            .unwrap();
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_permissive_without_origin() {
        let response = cors_app(None)
            .oneshot(preflight("https://anywhere.test"))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}

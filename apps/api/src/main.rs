mod config;
mod contact;
mod errors;
mod extract;
mod llm_client;
mod mail;
mod rate_limit;
mod routes;
mod state;
mod summary;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, GmailConfig};
use crate::llm_client::LlmClient;
use crate::mail::{GmailMailer, Mailer};
use crate::rate_limit::RateLimiter;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;
use crate::summary::improver::LlmSummaryImprover;

#[derive(Parser, Debug)]
#[command(name = "portfolio-api")]
#[command(about = "Backend for the portfolio contact form and AI summary tool")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Send a diagnostic email to verify the Gmail OAuth2 setup
    SendTestEmail {
        /// Recipient; defaults to GMAIL_RECIPIENT_EMAIL
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            // Load configuration first (fails on missing required env vars)
            let config = Config::from_env()?;
            init_tracing(&config.rust_log);
            serve(config).await
        }
        Command::SendTestEmail { to } => {
            // Only the GMAIL_* settings are needed here
            let gmail = GmailConfig::from_env()?;
            init_tracing("info");
            send_test_email(gmail, to).await
        }
    }
}

/// Initialize structured logging. `RUST_LOG`, when set, replaces the default filter.
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},tower_http={level}",
                env!("CARGO_CRATE_NAME")
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize mail transport
    let mailer = GmailMailer::new(&config.gmail).context("Failed to set up Gmail transport")?;
    info!("Mail transport initialized (smtp: {}:{})", config.gmail.smtp_host, config.gmail.smtp_port);

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
        .context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState::new(
        config.clone(),
        Arc::new(mailer),
        Arc::new(LlmSummaryImprover(llm)),
    );

    spawn_pruner(state.contact_limiter.clone(), "contact");
    spawn_pruner(state.summary_limiter.clone(), "summary");

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Evicts expired rate-limit entries once per window.
fn spawn_pruner(limiter: Arc<RateLimiter>, name: &'static str) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window().max(Duration::from_secs(1)));
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = limiter.prune_expired();
            debug!(
                limiter = name,
                removed,
                remaining = limiter.len(),
                "Pruned rate-limit entries"
            );
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn send_test_email(gmail: GmailConfig, to: Option<String>) -> Result<()> {
    let to = to.unwrap_or_else(|| gmail.recipient_email.clone());
    info!("Sending test email from {} to {to}", gmail.sender_email);

    let mailer = GmailMailer::new(&gmail).context("Failed to set up Gmail transport")?;
    let message = contact::templates::diagnostic_message(&gmail, &to, chrono::Utc::now());

    mailer
        .send(message)
        .await
        .context("Test email failed; check the GMAIL_* credentials and that the Gmail API is enabled")?;

    info!("Test email sent successfully to {to}");
    Ok(())
}

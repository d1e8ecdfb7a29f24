//! Interactions Worker - example application on top of the receiver.
//!
//! Answers the `beep` slash command with an ephemeral `Boop!` and exposes a
//! health endpoint next to the interactions route.

use anyhow::{Context, Result};
use axum::routing::get;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use interactions::web::health;
use interactions::{
    Config, Interaction, InteractionResponse, InteractionServer, InteractionType, ResponseHandle,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("interactions_worker_starting");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let port = config.port;
    info!(
        port = port,
        route = %config.route,
        client_id = %config.client_id,
        max_body_bytes = config.max_body_bytes,
        request_timeout_ms = config.request_timeout_ms,
        signature_max_age = ?config.signature_max_age,
        "config_loaded"
    );

    let server = InteractionServer::new(config, handle_interaction)
        .context("Invalid interactions configuration")?
        .on_ready(|addr| info!(address = %addr, "ready"));

    let app = server.routes().route("/health", get(health));

    let handle = server
        .start_with(app, port)
        .await
        .context("Failed to start server")?;

    shutdown_signal().await;

    handle.close().await.context("Server error")?;

    info!("interactions_worker_shutdown_complete");

    Ok(())
}

fn handle_interaction(interaction: Interaction, response: ResponseHandle) {
    if interaction.kind != InteractionType::ApplicationCommand {
        warn!(interaction_type = u64::from(interaction.kind), "interaction_unhandled");
        return;
    }

    match interaction.command_name() {
        Some("beep") => {
            if let Err(e) = response.respond(&InteractionResponse::message("Boop!").ephemeral()) {
                warn!(error = %e, "beep_reply_failed");
            }
        }
        other => warn!(command = ?other, "command_unhandled"),
    }
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("interactions_worker_shutting_down");
}

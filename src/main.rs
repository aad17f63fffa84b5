//! This project is split in 2 main modules:
//!
//! - [gateway] (IQPro processor client)
//! - [checkout] (HTTP surface used by the Apple Pay widget)
#![doc = include_str!("../README.md")]

use std::net::{Ipv4Addr, SocketAddrV4};

use anyhow::Context;
use axum::Router;
use tracing_subscriber::EnvFilter;

/// Browser facing endpoints
///
/// This module defines the request types, validation and handlers the checkout page talks to.
mod checkout;
mod config;
mod cors;
/// Gateway integration implementation
///
/// This module defines the types and methods to communicate with the payment processor. In this case it is IQPro
mod gateway;
mod state;
#[cfg(test)]
mod testing;

fn app(state: state::AppState, origins: &config::AllowedOrigins) -> Router {
    Router::new()
        .nest("/api", checkout::api::router())
        .layer(cors::cors_layer(origins))
        .layer(axum::middleware::from_fn(cors::preflight_no_content))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .init();

    match dotenvy::dotenv() {
        Ok(p) => tracing::info!(path = %p.display(), "Loaded environment variables from .env file"),
        Err(e) => tracing::warn!("Failed to load environment variables from .env: {e}"),
    };
    let config = config::Config::from_env().context("invalid configuration")?;
    let credentials = &config.credentials;
    if credentials.api_key.is_none() {
        tracing::warn!("{} is not set, transactions will be rejected", config::API_KEY_VAR);
    }
    if credentials.apple_pay_key_id.is_none() {
        tracing::warn!(
            "{} is not set, Apple Pay tokens will be rejected",
            config::APPLE_PAY_KEY_ID_VAR
        );
    }
    tracing::info!(
        api_url = %credentials.api_base_url,
        transaction_path = %credentials.transaction_path,
        timeout = ?config.timeout,
        "Gateway configured"
    );

    let gate = gateway::IqProGateway::new(config.credentials.clone(), config.timeout)
        .context("failed to build http client")?;
    let app = app(state::AppState::new(gate), &config.allowed_origins);

    let listener =
        tokio::net::TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port))
            .await
            .with_context(|| format!("failed to bind port {}", config.port))?;

    tracing::info!("Serving on port {}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

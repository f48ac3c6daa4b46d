//! # Groth16 Proof Converter - HTTP Service
//!
//! Converts snarkjs Groth16 proofs and verification keys into the flattened
//! format consumed by the o1js-blobstream verifier.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin converter-server
//!
//! # Custom port, JSON logs
//! CONVERTER_PORT=8080 CONVERTER_JSON_LOGS=true cargo run --bin converter-server
//!
//! # With a config file
//! CONVERTER_CONFIG=converter.toml cargo run --bin converter-server
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Detailed server status
//! - `POST /api/v1/convert` - Convert a proof, public inputs and verification key
//! - `POST /api/v1/validate` - Check inputs without producing artifacts

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use proof_converter::config::Config;
use proof_converter::logging::init_logging;
use proof_converter::routes::create_routes;
use proof_converter::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.log_level, config.json_logs);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        enforce_field_range = config.enforce_field_range,
        "Starting Groth16 Proof Converter"
    );

    // Create application state
    let state = AppState::new(config.converter_config());

    // Build router
    let app = create_routes(state)
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config
        .socket_addr()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;
    info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the CORS layer from the configured origins
fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allows_any_origin() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(cors.allow_origin(origins))
}

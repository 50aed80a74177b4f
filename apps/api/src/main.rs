mod analysis;
mod config;
mod errors;
mod inference_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{Text2TextGenerator, ZeroShotClassifier};
use crate::config::Config;
use crate::inference_client::InferenceClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Classifier v{}", env!("CARGO_PKG_VERSION"));

    // Initialize inference client (shared by both models)
    if config.hf_api_token.is_none() {
        warn!("HF_API_TOKEN is not set; inference calls will be anonymous and rate limited");
    }
    let inference = InferenceClient::new(
        config.inference_base_url.clone(),
        config.hf_api_token.clone(),
    )
    .context("Failed to build inference HTTP client")?;
    info!("Inference client initialized ({})", config.inference_base_url);

    let classifier = Arc::new(ZeroShotClassifier::new(
        inference.clone(),
        config.classifier_model.clone(),
    ));
    let generator = Arc::new(Text2TextGenerator::new(
        inference,
        config.generator_model.clone(),
    ));
    info!(
        "Models: classifier={} generator={}",
        config.classifier_model, config.generator_model
    );
    info!(
        "Limits: preview={} chars, excerpt={} chars, feedback={} tokens, queue={}",
        config.limits.preview_chars,
        config.limits.excerpt_chars,
        config.limits.max_feedback_tokens,
        config.analysis_queue_size
    );

    let state = AppState::new(config.clone(), classifier, generator);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

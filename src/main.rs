use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod hub;
mod inference;
mod responder;

use api::AppState;
use config::Config;
use inference::InferenceService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🚀 Starting mentAI support server...");

    // -----------------------------
    // Configuration + model load
    // -----------------------------
    let config = Config::from_env()?;
    println!("🧠 Backend: {} ({})", config.backend, config.model_id);

    let infer = Arc::new(InferenceService::from_config(&config)?);

    let state = AppState { infer };

    // -----------------------------
    // Router
    // -----------------------------
    let app = Router::new()
        .merge(api::router())
        // CORS for frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);

    println!("🌐 HTTP listening on http://{addr}");
    println!("💬 Predict endpoint at http://{addr}/predict");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

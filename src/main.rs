use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use leaf_doctor::{app, config::Config, download::ensure_model_file, model::Engine, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env();
    info!("Leaf doctor v{}", env!("CARGO_PKG_VERSION"));
    info!("Model path: {}", config.model_path.display());

    if let Some(model_url) = &config.model_url {
        if let Err(err) = ensure_model_file(&config.model_path, model_url).await {
            warn!("Could not fetch model: {}", err);
        }
    }

    // Loaded before the listener exists, so no request can race initialization.
    let engine = Engine::load(&config.model_path);
    if !engine.is_ready() {
        warn!("Serving without a model; /predict will answer 500");
    }

    let shared_state = Arc::new(AppState::new(engine));
    let router = app(shared_state, config.body_limit_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on http://{}", addr);
    axum::Server::bind(&addr)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

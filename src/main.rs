use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sommelier_avatar::{config::Config, constants::RAG_BACKEND_URL, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sommelier_avatar=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    if config.heygen_api_key.is_none() {
        error!("HEYGEN_API_KEY is not set; access tokens cannot be issued");
    }

    let state = Arc::new(AppState::new(&config));

    // Sessions whose client vanished without stopping them.
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweeper.sessions.ttl() / 2);
        loop {
            interval.tick().await;
            for session in sweeper.sessions.purge_expired().await {
                info!("Stopping idle avatar session {:?}", session);
                session.stop().await;
            }
        }
    });

    let app = routes::create_router(state, &config.public_dir).layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("🚀 Avatar proxy running at http://{}", config.bind_addr);
    info!("Forwarding chat to {}", RAG_BACKEND_URL);
    axum::serve(listener, app).await?;
    Ok(())
}

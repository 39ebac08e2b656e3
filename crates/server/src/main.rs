mod error;
mod routes;
mod state;

use anyhow::Context;
use axum::Router;
use services::services::gemini_api::GeminiApiClient;
use state::AppState;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:nureach.db".to_string());
    let pool = db::connect(&database_url)
        .await
        .context("failed to open database")?;

    let gemini = GeminiApiClient::from_env().context("failed to configure generation client")?;
    let state = AppState::new(pool, gemini);

    let app = Router::new()
        .nest("/api", routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .context("failed to bind listener")?;
    info!(port = port, "Server listening");

    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}

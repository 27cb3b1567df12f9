use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use accessboard_api::accessibility::GlyphMetrics;
use accessboard_api::config::Config;
use accessboard_api::preferences::{FileStorage, PreferenceStore};
use accessboard_api::routes::build_router;
use accessboard_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "accessboard_api={level},{bin}={level}",
                level = &config.rust_log,
                bin = env!("CARGO_CRATE_NAME"),
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AccessBoard API v{}", env!("CARGO_PKG_VERSION"));

    // Preference record, persisted as a flat key/value JSON file
    let storage = FileStorage::open(&config.preferences_path);
    info!("Preferences file: {}", storage.path().display());
    let preferences = Arc::new(PreferenceStore::load(Box::new(storage)));

    let glyphs = config.glyph_source();
    info!("Glyph source: {}", glyphs.name());

    let state = AppState {
        config: config.clone(),
        preferences,
        glyphs,
        glyph_metrics: GlyphMetrics::default(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

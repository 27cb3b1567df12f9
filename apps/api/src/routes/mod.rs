pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::accessibility::handlers as overlay;
use crate::preferences::handlers as prefs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Preference store
        .route(
            "/api/v1/preferences",
            get(prefs::handle_get_preferences).patch(prefs::handle_update_preferences),
        )
        .route(
            "/api/v1/preferences/reading",
            patch(prefs::handle_update_reading),
        )
        .route(
            "/api/v1/preferences/reading/reset",
            post(prefs::handle_reset_reading),
        )
        .route("/api/v1/preferences/styles", get(prefs::handle_get_styles))
        // Overlay helpers
        .route("/api/v1/fingerspell", post(overlay::handle_fingerspell))
        .route("/api/v1/overlay/place", post(overlay::handle_place))
        .route("/api/v1/glyphs/:letter", get(overlay::handle_get_glyph))
        .with_state(state)
}

use std::sync::Arc;

use crate::accessibility::{GlyphMetrics, GlyphSource};
use crate::config::Config;
use crate::preferences::PreferenceStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The single process-wide preference record.
    pub preferences: Arc<PreferenceStore>,
    /// Pluggable glyph source. Default: Wikimedia Commons with a self-hosted fallback.
    pub glyphs: Arc<dyn GlyphSource>,
    /// Cell geometry for overlay size estimates.
    pub glyph_metrics: GlyphMetrics,
}

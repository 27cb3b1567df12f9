//! Glyph Image Source: maps an `A`-`Z` letter to a hand-sign image URI.
//!
//! Images are best-effort: each glyph loads independently on the client, so a
//! failed letter never blocks the rest of the overlay.

use std::sync::Arc;

use tracing::debug;

/// Resolves fingerspelling glyph images by letter.
///
/// Carried in `AppState` as `Arc<dyn GlyphSource>`.
pub trait GlyphSource: Send + Sync {
    /// Image URI for an uppercase ASCII letter, `None` if this source has none.
    fn resolve(&self, letter: char) -> Option<String>;

    /// Label reported by the glyph endpoint.
    fn name(&self) -> &'static str;
}

/// Alternative text for a glyph image.
pub fn glyph_alt(letter: char) -> String {
    format!("ASL letter {letter} (Gallaudet)")
}

fn is_glyph_letter(letter: char) -> bool {
    letter.is_ascii_uppercase()
}

// ────────────────────────────────────────────────────────────────────────────
// Wikimedia Commons
// ────────────────────────────────────────────────────────────────────────────

const COMMONS_FILE_PATH: &str = "https://commons.wikimedia.org/wiki/Special:FilePath";

/// Raw SVGs from Wikimedia Commons via `Special:FilePath`.
#[derive(Debug, Clone, Default)]
pub struct CommonsGlyphSource;

impl GlyphSource for CommonsGlyphSource {
    fn resolve(&self, letter: char) -> Option<String> {
        is_glyph_letter(letter)
            .then(|| format!("{COMMONS_FILE_PATH}/Sign_language_{letter}.svg"))
    }

    fn name(&self) -> &'static str {
        "commons"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Self-hosted table
// ────────────────────────────────────────────────────────────────────────────

/// Self-hosted copies served next to the app, e.g. `/static/asl/a.svg`.
#[derive(Debug, Clone)]
pub struct LocalGlyphTable {
    table: Vec<String>,
}

impl LocalGlyphTable {
    pub fn new(base_path: &str) -> Self {
        let base = base_path.trim_end_matches('/');
        let table = ('A'..='Z')
            .map(|c| format!("{base}/{}.svg", c.to_ascii_lowercase()))
            .collect();
        Self { table }
    }
}

impl GlyphSource for LocalGlyphTable {
    fn resolve(&self, letter: char) -> Option<String> {
        if !is_glyph_letter(letter) {
            return None;
        }
        self.table.get((letter as u8 - b'A') as usize).cloned()
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback chain
// ────────────────────────────────────────────────────────────────────────────

/// Tries `primary`, then `fallback`.
pub struct FallbackGlyphSource {
    primary: Arc<dyn GlyphSource>,
    fallback: Arc<dyn GlyphSource>,
}

impl FallbackGlyphSource {
    pub fn new(primary: Arc<dyn GlyphSource>, fallback: Arc<dyn GlyphSource>) -> Self {
        Self { primary, fallback }
    }
}

impl GlyphSource for FallbackGlyphSource {
    fn resolve(&self, letter: char) -> Option<String> {
        self.primary.resolve(letter).or_else(|| {
            debug!(
                "glyph {letter} missing from {}, using {}",
                self.primary.name(),
                self.fallback.name()
            );
            self.fallback.resolve(letter)
        })
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::accessibility::fingerspell::{bounded_text, render, sign_letter, Fingerspelling};
use crate::accessibility::glyphs::glyph_alt;
use crate::accessibility::placement::{place, Point};
use crate::dom::Size;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct FingerspellRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct FingerspellResponse {
    #[serde(flatten)]
    pub spelling: Fingerspelling,
    /// Estimated panel box, for the shell's first placement.
    pub panel: Size,
}

/// POST /api/v1/fingerspell
pub async fn handle_fingerspell(
    State(state): State<AppState>,
    Json(req): Json<FingerspellRequest>,
) -> Json<FingerspellResponse> {
    let spelling = render(&bounded_text(&req.text), state.glyphs.as_ref());
    let panel = state.glyph_metrics.estimate(&spelling);
    Json(FingerspellResponse { spelling, panel })
}

#[derive(Deserialize)]
pub struct PlaceRequest {
    pub panel: Size,
    pub pointer: Point,
    pub viewport: Size,
}

/// POST /api/v1/overlay/place
pub async fn handle_place(Json(req): Json<PlaceRequest>) -> Result<Json<Point>, AppError> {
    let dims = [
        req.panel.width,
        req.panel.height,
        req.viewport.width,
        req.viewport.height,
    ];
    if dims.iter().any(|d| !d.is_finite() || *d < 0.0) {
        return Err(AppError::Validation(
            "panel and viewport dimensions must be finite and non-negative".to_string(),
        ));
    }
    if !req.pointer.x.is_finite() || !req.pointer.y.is_finite() {
        return Err(AppError::Validation("pointer must be finite".to_string()));
    }
    Ok(Json(place(req.panel, req.pointer, req.viewport)))
}

#[derive(Serialize)]
pub struct GlyphResponse {
    pub letter: char,
    pub src: String,
    pub alt: String,
    pub source: &'static str,
}

/// GET /api/v1/glyphs/:letter
pub async fn handle_get_glyph(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<GlyphResponse>, AppError> {
    let mut chars = raw.chars();
    let ch = match (chars.next(), chars.next()) {
        (Some(ch), None) => ch,
        _ => {
            return Err(AppError::Validation(format!(
                "expected a single letter, got '{raw}'"
            )))
        }
    };
    // Same folding as the renderer: accents stripped, uppercased.
    let not_found = || AppError::NotFound(format!("No glyph for '{raw}'"));
    let letter = sign_letter(ch).ok_or_else(not_found)?;
    let src = state.glyphs.resolve(letter).ok_or_else(not_found)?;
    Ok(Json(GlyphResponse {
        letter,
        src,
        alt: glyph_alt(letter),
        source: state.glyphs.name(),
    }))
}

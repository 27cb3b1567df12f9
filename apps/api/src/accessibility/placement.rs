//! Overlay Positioning: where the floating panel goes relative to the pointer.
//!
//! Pure arithmetic; the caller supplies the single bounding-box read.

use serde::{Deserialize, Serialize};

use crate::dom::Size;

/// Gap between the pointer and the panel.
pub const POINTER_PADDING: f32 = 12.0;
/// Minimum distance kept from every viewport edge.
pub const EDGE_MARGIN: f32 = 8.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Places a `panel` near `pointer` inside `viewport`.
///
/// Default is bottom-right of the pointer. Each axis flips to the other side
/// when the panel would cross `viewport - EDGE_MARGIN`, then the result is
/// clamped so the panel keeps `EDGE_MARGIN` from the edges. The top/left margin
/// wins when the panel is larger than the viewport.
pub fn place(panel: Size, pointer: Point, viewport: Size) -> Point {
    Point {
        x: place_axis(pointer.x, panel.width, viewport.width),
        y: place_axis(pointer.y, panel.height, viewport.height),
    }
}

fn place_axis(pointer: f32, extent: f32, viewport: f32) -> f32 {
    let mut pos = pointer + POINTER_PADDING;
    if pos + extent > viewport - EDGE_MARGIN {
        pos = pointer - extent - POINTER_PADDING;
    }
    let max = viewport - EDGE_MARGIN - extent;
    if pos > max {
        pos = max;
    }
    pos.max(EDGE_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1000.0, 800.0);
    const PANEL: Size = Size::new(200.0, 100.0);

    #[test]
    fn test_default_is_bottom_right_with_padding() {
        let at = place(PANEL, Point::new(100.0, 100.0), VIEWPORT);
        assert_eq!(at, Point::new(112.0, 112.0));
    }

    #[test]
    fn test_bottom_right_corner_flips_above_and_left() {
        let at = place(PANEL, Point::new(1000.0, 800.0), VIEWPORT);
        assert_eq!(at, Point::new(788.0, 688.0));
        assert!(at.x + PANEL.width <= 992.0);
        assert!(at.y + PANEL.height <= 792.0);
    }

    #[test]
    fn test_flip_only_on_overflowing_axis() {
        let at = place(PANEL, Point::new(900.0, 50.0), VIEWPORT);
        assert_eq!(at, Point::new(688.0, 62.0));
    }

    #[test]
    fn test_clamps_to_top_left_margin() {
        // Panel too tall to fit either above or below a pointer near the top.
        let tall = Size::new(200.0, 790.0);
        let at = place(tall, Point::new(5.0, 5.0), VIEWPORT);
        assert_eq!(at.x, 17.0);
        assert_eq!(at.y, EDGE_MARGIN);
    }

    #[test]
    fn test_never_crosses_right_or_bottom_margin_when_panel_fits() {
        for px in (0..=1000).step_by(50) {
            for py in (0..=800).step_by(50) {
                let at = place(PANEL, Point::new(px as f32, py as f32), VIEWPORT);
                assert!(at.x >= EDGE_MARGIN && at.y >= EDGE_MARGIN);
                assert!(at.x + PANEL.width <= VIEWPORT.width - EDGE_MARGIN);
                assert!(at.y + PANEL.height <= VIEWPORT.height - EDGE_MARGIN);
            }
        }
    }

    #[test]
    fn test_oversized_panel_pins_to_margin() {
        let huge = Size::new(2000.0, 2000.0);
        let at = place(huge, Point::new(500.0, 400.0), VIEWPORT);
        assert_eq!(at, Point::new(EDGE_MARGIN, EDGE_MARGIN));
    }
}

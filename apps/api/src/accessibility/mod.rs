// Hover-driven accessibility overlay engine
// Implements: readable-node location, hover speech, fingerspelling overlay, overlay
// placement, and the session controller that coordinates them over a document.

pub mod announcer;
pub mod fingerspell;
pub mod glyphs;
pub mod handlers;
pub mod hover;
pub mod locator;
pub mod page;
pub mod placement;
pub mod speech;

pub use fingerspell::GlyphMetrics;
pub use glyphs::{CommonsGlyphSource, FallbackGlyphSource, GlyphSource, LocalGlyphTable};

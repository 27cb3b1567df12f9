//! Fingerspelling Renderer: hovered text as a row of per-letter hand signs.
//!
//! `render` is pure: text in, glyph structure out. `materialize` turns that
//! structure into overlay nodes and swaps them into the panel in one step so
//! the previous target's content never shows half-replaced.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::accessibility::glyphs::{glyph_alt, GlyphSource};
use crate::dom::{Document, DomError, NodeId, Size};

pub const MAX_WORDS: usize = 20;
pub const MAX_LETTERS_PER_WORD: usize = 20;
/// Hover text is cut to this many characters before rendering.
pub const MAX_OVERLAY_CHARS: usize = 240;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LetterCell {
    Glyph {
        letter: char,
        src: String,
        alt: String,
    },
    /// Digits, punctuation, and anything without a hand sign.
    Literal { text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGroup {
    pub cells: Vec<LetterCell>,
}

impl WordGroup {
    pub fn glyph_letters(&self) -> Vec<char> {
        self.cells
            .iter()
            .filter_map(|c| match c {
                LetterCell::Glyph { letter, .. } => Some(*letter),
                LetterCell::Literal { .. } => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerspelling {
    pub words: Vec<WordGroup>,
}

impl Fingerspelling {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Cuts `text` to at most `MAX_OVERLAY_CHARS` characters after trimming.
pub fn bounded_text(text: &str) -> String {
    text.trim().chars().take(MAX_OVERLAY_CHARS).collect()
}

/// Builds the fingerspelling structure for `text`.
///
/// Whitespace runs collapse, at most `MAX_WORDS` words and
/// `MAX_LETTERS_PER_WORD` characters per word are kept. Whitespace-only input
/// yields no word groups.
pub fn render(text: &str, glyphs: &dyn GlyphSource) -> Fingerspelling {
    let words = text
        .split_whitespace()
        .take(MAX_WORDS)
        .map(|word| WordGroup {
            cells: word
                .chars()
                .take(MAX_LETTERS_PER_WORD)
                .map(|ch| letter_cell(ch, glyphs))
                .collect(),
        })
        .collect();
    Fingerspelling { words }
}

fn letter_cell(ch: char, glyphs: &dyn GlyphSource) -> LetterCell {
    let literal = || LetterCell::Literal {
        text: ch.to_string(),
    };
    let Some(letter) = sign_letter(ch) else {
        return literal();
    };
    match glyphs.resolve(letter) {
        Some(src) => LetterCell::Glyph {
            letter,
            src,
            alt: glyph_alt(letter),
        },
        None => literal(),
    }
}

/// Strips accents and marks, uppercases, and returns the letter only when the
/// result is exactly one `A`-`Z` character (`é` → `E`, `ß` → none).
pub fn sign_letter(ch: char) -> Option<char> {
    let mut letters = ch
        .nfd()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase);
    match (letters.next(), letters.next()) {
        (Some(letter), None) if letter.is_ascii_uppercase() => Some(letter),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Overlay materialization
// ────────────────────────────────────────────────────────────────────────────

/// Cell geometry used to estimate the panel's box before the browser lays
/// it out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub cell_width: f32,
    pub cell_height: f32,
    pub word_gap: f32,
    pub padding: f32,
    pub max_width: f32,
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self {
            cell_width: 32.0,
            cell_height: 40.0,
            word_gap: 12.0,
            padding: 8.0,
            max_width: 360.0,
        }
    }
}

impl GlyphMetrics {
    /// Greedy word wrap of the glyph rows inside `max_width`.
    pub fn estimate(&self, spelling: &Fingerspelling) -> Size {
        if spelling.is_empty() {
            return Size::default();
        }
        let inner_max = self.max_width - 2.0 * self.padding;
        let mut rows = 1u32;
        let mut row_width = 0.0_f32;
        let mut widest = 0.0_f32;

        for word in &spelling.words {
            let word_width = (word.cells.len() as f32 * self.cell_width).min(inner_max);
            let gap = if row_width > 0.0 { self.word_gap } else { 0.0 };
            if row_width > 0.0 && row_width + gap + word_width > inner_max {
                rows += 1;
                row_width = word_width;
            } else {
                row_width += gap + word_width;
            }
            widest = widest.max(row_width);
        }

        Size::new(
            widest + 2.0 * self.padding,
            rows as f32 * self.cell_height + (rows - 1) as f32 * self.word_gap / 2.0
                + 2.0 * self.padding,
        )
    }
}

/// Builds `div.asl-container > div.asl-word > span.asl-letter > img.asl-img`
/// off-document, then replaces the panel's children with it and records the
/// estimated panel size. The previous content is released.
pub fn materialize(
    doc: &mut Document,
    panel: NodeId,
    spelling: &Fingerspelling,
    metrics: &GlyphMetrics,
) -> Result<(), DomError> {
    let container = doc.create_element("div");
    doc.add_class(container, "asl-container");

    for word in &spelling.words {
        let word_el = doc.create_child(container, "div");
        doc.add_class(word_el, "asl-word");
        for cell in &word.cells {
            let span = doc.create_child(word_el, "span");
            doc.add_class(span, "asl-letter");
            match cell {
                LetterCell::Glyph { src, alt, .. } => {
                    let img = doc.create_child(span, "img");
                    doc.add_class(img, "asl-img");
                    doc.set_attribute(img, "src", src);
                    doc.set_attribute(img, "alt", alt);
                    doc.set_attribute(img, "loading", "lazy");
                }
                LetterCell::Literal { text } => doc.set_text_content(span, text),
            }
        }
    }

    if let Err(e) = doc.replace_children(panel, vec![container]) {
        doc.remove(container);
        return Err(e);
    }
    doc.set_layout_size(panel, metrics.estimate(spelling));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::glyphs::{CommonsGlyphSource, GlyphSource, LocalGlyphTable};

    fn letters(spelling: &Fingerspelling) -> Vec<Vec<char>> {
        spelling.words.iter().map(WordGroup::glyph_letters).collect()
    }

    #[test]
    fn test_hi_there_yields_two_word_groups() {
        let out = render("Hi there", &CommonsGlyphSource);
        assert_eq!(
            letters(&out),
            vec![vec!['H', 'I'], vec!['T', 'H', 'E', 'R', 'E']]
        );
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(render("   \t\n ", &CommonsGlyphSource).is_empty());
        assert!(render("", &CommonsGlyphSource).is_empty());
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let out = render("  Rust \n\n  jobs ", &CommonsGlyphSource);
        assert_eq!(out.words.len(), 2);
    }

    #[test]
    fn test_accents_are_stripped_to_base_letter() {
        let out = render("Café", &CommonsGlyphSource);
        assert_eq!(letters(&out), vec![vec!['C', 'A', 'F', 'E']]);
    }

    #[test]
    fn test_digits_and_punctuation_render_literally() {
        let out = render("5yrs!", &CommonsGlyphSource);
        let cells = &out.words[0].cells;
        assert_eq!(cells.len(), 5);
        assert_eq!(
            cells[0],
            LetterCell::Literal {
                text: "5".to_string()
            }
        );
        assert_eq!(
            cells[4],
            LetterCell::Literal {
                text: "!".to_string()
            }
        );
        assert_eq!(out.words[0].glyph_letters(), vec!['Y', 'R', 'S']);
    }

    #[test]
    fn test_sign_letter_rejects_multi_letter_uppercase() {
        assert_eq!(sign_letter('ß'), None);
        assert_eq!(sign_letter('ñ'), Some('N'));
        assert_eq!(sign_letter('Ж'), None);
    }

    #[test]
    fn test_word_and_letter_caps() {
        let long_word = "a".repeat(50);
        let many_words = vec!["go"; 40].join(" ");
        assert_eq!(
            render(&long_word, &CommonsGlyphSource).words[0].cells.len(),
            MAX_LETTERS_PER_WORD
        );
        assert_eq!(
            render(&many_words, &CommonsGlyphSource).words.len(),
            MAX_WORDS
        );
    }

    #[test]
    fn test_glyph_cells_carry_alt_text() {
        let out = render("A", &LocalGlyphTable::new("/static/asl"));
        assert_eq!(
            out.words[0].cells[0],
            LetterCell::Glyph {
                letter: 'A',
                src: "/static/asl/a.svg".to_string(),
                alt: "ASL letter A (Gallaudet)".to_string(),
            }
        );
    }

    /// Table with no image for `Q`.
    struct MissingQ;

    impl GlyphSource for MissingQ {
        fn resolve(&self, letter: char) -> Option<String> {
            (letter != 'Q').then(|| format!("/g/{}.svg", letter.to_ascii_lowercase()))
        }

        fn name(&self) -> &'static str {
            "missing-q"
        }
    }

    #[test]
    fn test_unresolved_letter_degrades_to_literal() {
        let out = render("quiz Qa jobs", &MissingQ);
        assert_eq!(out.words.len(), 3);
        assert_eq!(
            out.words[0].cells[0],
            LetterCell::Literal {
                text: "q".to_string()
            }
        );
        assert_eq!(out.words[0].glyph_letters(), vec!['U', 'I', 'Z']);
        assert_eq!(
            out.words[1].cells[0],
            LetterCell::Literal {
                text: "Q".to_string()
            }
        );
        assert_eq!(
            out.words[1].cells[1],
            LetterCell::Glyph {
                letter: 'A',
                src: "/g/a.svg".to_string(),
                alt: "ASL letter A (Gallaudet)".to_string(),
            }
        );
        assert_eq!(out.words[2].glyph_letters(), vec!['J', 'O', 'B', 'S']);
    }

    #[test]
    fn test_repeated_materialize_reuses_nodes() {
        let mut doc = Document::default();
        let body = doc.body();
        let panel = doc.create_child(body, "div");
        let metrics = GlyphMetrics::default();
        let spelling = render("Hi there", &CommonsGlyphSource);

        materialize(&mut doc, panel, &spelling, &metrics).unwrap();
        let settled = doc.node_count();
        for _ in 0..20 {
            materialize(&mut doc, panel, &spelling, &metrics).unwrap();
        }
        assert_eq!(doc.node_count(), settled);
    }

    #[test]
    fn test_materialize_into_text_node_fails_cleanly() {
        let mut doc = Document::default();
        let body = doc.body();
        let text = doc.create_text("not a panel");
        doc.append_child(body, text).unwrap();
        let before = doc.node_count();

        let spelling = render("Hi", &CommonsGlyphSource);
        assert!(materialize(&mut doc, text, &spelling, &GlyphMetrics::default()).is_err());
        assert_eq!(doc.node_count(), before);
    }

    #[test]
    fn test_bounded_text_caps_characters() {
        let text = format!("  {}  ", "é".repeat(300));
        assert_eq!(bounded_text(&text).chars().count(), MAX_OVERLAY_CHARS);
    }

    #[test]
    fn test_materialize_replaces_previous_content() {
        let mut doc = Document::default();
        let panel = doc.create_element("div");
        let body = doc.body();
        doc.append_child(body, panel).unwrap();
        let metrics = GlyphMetrics::default();

        materialize(&mut doc, panel, &render("old text", &CommonsGlyphSource), &metrics).unwrap();
        let first_container = doc.children(panel)[0];
        materialize(&mut doc, panel, &render("Hi there", &CommonsGlyphSource), &metrics).unwrap();

        assert_eq!(doc.children(panel).len(), 1);
        assert!(!doc.is_connected(first_container));
        let container = doc.children(panel)[0];
        assert!(doc.has_class(container, "asl-container"));
        let words = doc.children(container).to_vec();
        assert_eq!(words.len(), 2);
        let imgs: Vec<_> = doc
            .descendants(words[0])
            .into_iter()
            .filter(|n| doc.tag(*n) == Some("img"))
            .collect();
        assert_eq!(imgs.len(), 2);
        assert_eq!(doc.attribute(imgs[0], "loading"), Some("lazy"));
        assert_eq!(doc.attribute(imgs[1], "alt"), Some("ASL letter I (Gallaudet)"));
    }

    #[test]
    fn test_estimate_wraps_long_rows() {
        let metrics = GlyphMetrics::default();
        let one_row = metrics.estimate(&render("Hi", &CommonsGlyphSource));
        assert_eq!(one_row, Size::new(2.0 * 32.0 + 16.0, 40.0 + 16.0));

        let wrapped = metrics.estimate(&render("engineer engineer engineer", &CommonsGlyphSource));
        assert!(wrapped.width <= metrics.max_width);
        assert!(wrapped.height > one_row.height);
    }
}

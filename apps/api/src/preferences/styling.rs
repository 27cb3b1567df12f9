//! Projection of the preference record onto the document root: class
//! toggles and `--readease-*` custom properties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::Document;
use crate::preferences::models::{Preferences, Theme};

pub const CONTRAST_CLASS: &str = "a11y-contrast";
pub const CVD_CLASS: &str = "a11y-cvd";
pub const DYSLEXIC_CLASS: &str = "a11y-dyslexic";
pub const DARK_CLASS: &str = "dark";

/// Every class this module owns on `<html>`.
const MANAGED_CLASSES: &[&str] = &[CONTRAST_CLASS, CVD_CLASS, DYSLEXIC_CLASS, DARK_CLASS];

pub const FONT_SIZE_VAR: &str = "--readease-font-size";
pub const LINE_HEIGHT_VAR: &str = "--readease-line-height";
pub const LETTER_SPACING_VAR: &str = "--readease-letter-spacing";
pub const WORD_SPACING_VAR: &str = "--readease-word-spacing";

/// Set by the pre-reading-mode letter spacing control; pinned to zero on mount
/// so stale inline values cannot fight the `--readease-*` properties.
pub const LEGACY_LETTER_SPACING_VAR: &str = "--a11y-letter-spacing";

const MANAGED_VARIABLES: &[&str] = &[
    FONT_SIZE_VAR,
    LINE_HEIGHT_VAR,
    LETTER_SPACING_VAR,
    WORD_SPACING_VAR,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootStyling {
    /// Classes that should be present on `<html>`; other managed classes are removed.
    pub classes: Vec<String>,
    /// Custom properties to set; other managed properties are removed.
    pub variables: BTreeMap<String, String>,
}

impl From<&Preferences> for RootStyling {
    fn from(prefs: &Preferences) -> Self {
        let mut classes = Vec::new();
        if prefs.contrast {
            classes.push(CONTRAST_CLASS.to_string());
        }
        if prefs.cvd {
            classes.push(CVD_CLASS.to_string());
        }
        if prefs.read_easy {
            classes.push(DYSLEXIC_CLASS.to_string());
        }
        if prefs.theme == Theme::Dark {
            classes.push(DARK_CLASS.to_string());
        }

        let mut variables = BTreeMap::new();
        if prefs.read_easy {
            let r = prefs.reading;
            variables.insert(FONT_SIZE_VAR.to_string(), format!("{}%", r.font_size));
            variables.insert(LINE_HEIGHT_VAR.to_string(), format!("{}", r.line_height));
            variables.insert(LETTER_SPACING_VAR.to_string(), format!("{}em", r.letter_spacing));
            variables.insert(WORD_SPACING_VAR.to_string(), format!("{}em", r.word_spacing));
        }

        Self { classes, variables }
    }
}

pub fn reset_legacy_letter_spacing(doc: &mut Document) {
    let root = doc.root();
    doc.set_style(root, LEGACY_LETTER_SPACING_VAR, "0em");
}

impl RootStyling {
    pub fn apply(&self, doc: &mut Document) {
        let root = doc.root();
        for class in MANAGED_CLASSES {
            let on = self.classes.iter().any(|c| c == class);
            doc.toggle_class(root, class, on);
        }
        for var in MANAGED_VARIABLES {
            match self.variables.get(*var) {
                Some(value) => doc.set_style(root, var, value),
                None => doc.remove_style(root, var),
            }
        }
    }
}

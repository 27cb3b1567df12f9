use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Reading mode
// ────────────────────────────────────────────────────────────────────────────

pub const FONT_SIZE_RANGE: (f32, f32) = (80.0, 150.0);
pub const LINE_HEIGHT_RANGE: (f32, f32) = (1.2, 2.0);
pub const LETTER_SPACING_RANGE: (f32, f32) = (0.0, 0.3);
pub const WORD_SPACING_RANGE: (f32, f32) = (0.0, 0.15);

/// Dyslexia-friendly typography. Persisted as camelCase JSON; missing fields
/// take their defaults, so older records merge over the current defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingSettings {
    /// Percent of the base font size, 80-150.
    pub font_size: f32,
    /// Unitless multiplier, 1.2-2.0.
    pub line_height: f32,
    /// em, 0-0.3.
    pub letter_spacing: f32,
    /// em, 0-0.15.
    pub word_spacing: f32,
}

impl Default for ReadingSettings {
    fn default() -> Self {
        Self {
            font_size: 100.0,
            line_height: 1.65,
            letter_spacing: 0.02,
            word_spacing: 0.08,
        }
    }
}

impl ReadingSettings {
    /// Pulls every field into its documented range; non-finite values reset
    /// to the default for that field.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            font_size: clamp_or(self.font_size, FONT_SIZE_RANGE, d.font_size),
            line_height: clamp_or(self.line_height, LINE_HEIGHT_RANGE, d.line_height),
            letter_spacing: clamp_or(self.letter_spacing, LETTER_SPACING_RANGE, d.letter_spacing),
            word_spacing: clamp_or(self.word_spacing, WORD_SPACING_RANGE, d.word_spacing),
        }
    }
}

fn clamp_or(value: f32, (lo, hi): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

/// Partial reading-mode update; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPatch {
    pub font_size: Option<f32>,
    pub line_height: Option<f32>,
    pub letter_spacing: Option<f32>,
    pub word_spacing: Option<f32>,
}

impl ReadingPatch {
    pub fn apply(&self, current: ReadingSettings) -> ReadingSettings {
        ReadingSettings {
            font_size: self.font_size.unwrap_or(current.font_size),
            line_height: self.line_height.unwrap_or(current.line_height),
            letter_spacing: self.letter_spacing.unwrap_or(current.letter_spacing),
            word_spacing: self.word_spacing.unwrap_or(current.word_spacing),
        }
        .clamped()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Theme
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Full record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub contrast: bool,
    pub tts: bool,
    pub tts_hover: bool,
    pub sign_hover: bool,
    /// Color-vision-deficiency friendly palette.
    pub cvd: bool,
    pub theme: Theme,
    /// Reading mode on/off; on by default.
    pub read_easy: bool,
    pub reading: ReadingSettings,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            contrast: false,
            tts: false,
            tts_hover: false,
            sign_hover: false,
            cvd: false,
            theme: Theme::System,
            read_easy: true,
            reading: ReadingSettings::default(),
        }
    }
}

impl Preferences {
    /// Hover reading needs both the TTS master switch and the hover switch.
    pub fn speech_hover_active(&self) -> bool {
        self.tts && self.tts_hover
    }
}

/// Partial toggle update; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub contrast: Option<bool>,
    pub tts: Option<bool>,
    pub tts_hover: Option<bool>,
    pub sign_hover: Option<bool>,
    pub cvd: Option<bool>,
    pub theme: Option<Theme>,
    pub read_easy: Option<bool>,
}

impl PreferencesPatch {
    pub fn apply(&self, current: &Preferences) -> Preferences {
        Preferences {
            contrast: self.contrast.unwrap_or(current.contrast),
            tts: self.tts.unwrap_or(current.tts),
            tts_hover: self.tts_hover.unwrap_or(current.tts_hover),
            sign_hover: self.sign_hover.unwrap_or(current.sign_hover),
            cvd: self.cvd.unwrap_or(current.cvd),
            theme: self.theme.unwrap_or(current.theme),
            read_easy: self.read_easy.unwrap_or(current.read_easy),
            reading: current.reading,
        }
    }
}

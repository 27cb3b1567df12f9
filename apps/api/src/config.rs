use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::accessibility::{CommonsGlyphSource, FallbackGlyphSource, GlyphSource, LocalGlyphTable};

/// Where fingerspelling glyph images come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSourceKind {
    /// Wikimedia Commons, falling back to the self-hosted table.
    Commons,
    /// Self-hosted table only.
    Local,
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub preferences_path: PathBuf,
    pub glyph_source: GlyphSourceKind,
    pub glyph_base_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let glyph_source = match get("GLYPH_SOURCE").as_deref().unwrap_or("commons") {
            "commons" => GlyphSourceKind::Commons,
            "local" => GlyphSourceKind::Local,
            other => bail!("GLYPH_SOURCE must be 'commons' or 'local', got '{other}'"),
        };

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            preferences_path: get("PREFERENCES_PATH")
                .unwrap_or_else(|| "a11y-preferences.json".to_string())
                .into(),
            glyph_source,
            glyph_base_path: get("GLYPH_BASE_PATH").unwrap_or_else(|| "/static/asl".to_string()),
        })
    }

    pub fn glyph_source(&self) -> Arc<dyn GlyphSource> {
        let local = Arc::new(LocalGlyphTable::new(&self.glyph_base_path));
        match self.glyph_source {
            GlyphSourceKind::Commons => {
                Arc::new(FallbackGlyphSource::new(Arc::new(CommonsGlyphSource), local))
            }
            GlyphSourceKind::Local => local,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.preferences_path, PathBuf::from("a11y-preferences.json"));
        assert_eq!(config.glyph_source, GlyphSourceKind::Commons);
        assert_eq!(config.glyph_source().name(), "commons");
    }

    #[test]
    fn test_local_glyph_source_uses_base_path() {
        let config =
            config_from(&[("GLYPH_SOURCE", "local"), ("GLYPH_BASE_PATH", "/assets/signs")]).unwrap();
        let source = config.glyph_source();
        assert_eq!(source.name(), "local");
        assert_eq!(source.resolve('B').as_deref(), Some("/assets/signs/b.svg"));
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("GLYPH_SOURCE", "ftp")]).is_err());
    }
}

use anyhow::{bail, Context, Result};

use crate::layout::FontFamily;
use crate::render::canvas::Color;
use crate::render::theme::{Margins, ThemeOverrides, ThemePreset};

/// How wrapped text is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMeasure {
    /// Character budget from an average glyph width. Fast, a little loose.
    CharBudget,
    /// Per-glyph advance widths from the base-14 metric tables.
    Metrics,
}

/// Application configuration loaded from environment variables.
/// Every variable is optional; a present but malformed value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub render_timeout_secs: u64,
    pub photo_size_px: u32,
    pub text_measure: TextMeasure,
    pub default_preset: ThemePreset,
    pub theme_overrides: ThemeOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            render_timeout_secs: 30,
            photo_size_px: 360,
            text_measure: TextMeasure::CharBudget,
            default_preset: ThemePreset::Slate,
            theme_overrides: ThemeOverrides::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => defaults.port,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            None => defaults.max_upload_bytes,
        };

        let render_timeout_secs = match get("RENDER_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("RENDER_TIMEOUT_SECS must be a whole number of seconds")?,
            None => defaults.render_timeout_secs,
        };
        if render_timeout_secs == 0 {
            bail!("RENDER_TIMEOUT_SECS must be greater than zero");
        }

        let photo_size_px = match get("PHOTO_SIZE_PX") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .context("PHOTO_SIZE_PX must be a pixel count")?,
            None => defaults.photo_size_px,
        };
        if !(32..=2048).contains(&photo_size_px) {
            bail!("PHOTO_SIZE_PX must be between 32 and 2048, got {photo_size_px}");
        }

        let text_measure = match get("TEXT_MEASURE").as_deref().map(str::trim) {
            None | Some("char-budget") => TextMeasure::CharBudget,
            Some("metrics") => TextMeasure::Metrics,
            Some(other) => {
                bail!("TEXT_MEASURE must be 'char-budget' or 'metrics', got '{other}'")
            }
        };

        let default_preset = match get("THEME_PRESET") {
            Some(v) => ThemePreset::parse(&v)
                .with_context(|| format!("THEME_PRESET '{v}' is not a known theme"))?,
            None => defaults.default_preset,
        };

        let theme_overrides = ThemeOverrides {
            primary_color: color_var(&get, "THEME_PRIMARY_COLOR")?,
            background_color: color_var(&get, "THEME_BACKGROUND_COLOR")?,
            text_color: color_var(&get, "THEME_TEXT_COLOR")?,
            margins: match get("THEME_MARGINS") {
                Some(v) => Some(Margins::parse(&v).with_context(|| {
                    format!("THEME_MARGINS '{v}' must be four non-negative numbers: top,left,right,bottom")
                })?),
                None => None,
            },
            sidebar_width: match get("THEME_SIDEBAR_WIDTH") {
                Some(v) => {
                    let width = v
                        .trim()
                        .parse::<f32>()
                        .context("THEME_SIDEBAR_WIDTH must be a number of points")?;
                    if !(width.is_finite() && (80.0..=360.0).contains(&width)) {
                        bail!("THEME_SIDEBAR_WIDTH must be between 80 and 360 points");
                    }
                    Some(width)
                }
                None => None,
            },
            font_family: match get("THEME_FONT_FAMILY") {
                Some(v) => Some(FontFamily::parse(&v).with_context(|| {
                    format!("THEME_FONT_FAMILY '{v}' must be helvetica, times or courier")
                })?),
                None => None,
            },
        };

        Ok(Config {
            port,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes,
            render_timeout_secs,
            photo_size_px,
            text_measure,
            default_preset,
            theme_overrides,
        })
    }
}

fn color_var(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Color>> {
    match get(key) {
        Some(v) => Color::parse_hex(&v)
            .map(Some)
            .with_context(|| format!("{key} '{v}' must be a #rrggbb color")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 10_485_760);
        assert_eq!(config.render_timeout_secs, 30);
        assert_eq!(config.photo_size_px, 360);
        assert_eq!(config.text_measure, TextMeasure::CharBudget);
        assert_eq!(config.default_preset, ThemePreset::Slate);
        assert_eq!(config.theme_overrides, ThemeOverrides::default());
    }

    #[test]
    fn test_theme_overrides_parsed() {
        let config = config_from(&[
            ("THEME_PRESET", "ocean"),
            ("THEME_PRIMARY_COLOR", "#112233"),
            ("THEME_MARGINS", "30,20,20,40"),
            ("THEME_FONT_FAMILY", "times"),
            ("TEXT_MEASURE", "metrics"),
        ])
        .unwrap();
        assert_eq!(config.default_preset, ThemePreset::Ocean);
        assert_eq!(
            config.theme_overrides.primary_color,
            Some(Color::rgb(0x11, 0x22, 0x33))
        );
        assert_eq!(config.theme_overrides.font_family, Some(FontFamily::Times));
        assert!(config.theme_overrides.margins.is_some());
        assert_eq!(config.text_measure, TextMeasure::Metrics);
    }

    #[test]
    fn test_invalid_values_fail_startup() {
        for (key, value) in [
            ("PORT", "not-a-port"),
            ("THEME_PRIMARY_COLOR", "blue"),
            ("THEME_MARGINS", "10,10"),
            ("THEME_PRESET", "neon"),
            ("TEXT_MEASURE", "exact"),
            ("RENDER_TIMEOUT_SECS", "0"),
            ("PHOTO_SIZE_PX", "4"),
            ("THEME_SIDEBAR_WIDTH", "12"),
            ("THEME_FONT_FAMILY", "comic sans"),
        ] {
            assert!(
                config_from(&[(key, value)]).is_err(),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  "), ("THEME_PRIMARY_COLOR", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.theme_overrides.primary_color, None);
    }
}

//! Visual theme: palette, page geometry, margins, sidebar width and font family.
//!
//! Themes are built once at startup (presets plus any environment overrides) and shared
//! read-only between renders.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{FontFace, FontFamily};
use crate::render::canvas::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Margins {
    /// Parses `top,left,right,bottom`.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<f32> = value
            .split(',')
            .map(|p| p.trim().parse::<f32>().ok())
            .collect::<Option<Vec<_>>>()?;
        match parts.as_slice() {
            [top, left, right, bottom]
                if parts.iter().all(|v| v.is_finite() && *v >= 0.0) =>
            {
                Some(Margins {
                    top: *top,
                    left: *left,
                    right: *right,
                    bottom: *bottom,
                })
            }
            _ => None,
        }
    }
}

/// The four template variants. They share geometry and differ only in palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreset {
    Slate,
    Ocean,
    Forest,
    Crimson,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 4] = [
        ThemePreset::Slate,
        ThemePreset::Ocean,
        ThemePreset::Forest,
        ThemePreset::Crimson,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slate" => Some(ThemePreset::Slate),
            "ocean" => Some(ThemePreset::Ocean),
            "forest" => Some(ThemePreset::Forest),
            "crimson" => Some(ThemePreset::Crimson),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreset::Slate => "slate",
            ThemePreset::Ocean => "ocean",
            ThemePreset::Forest => "forest",
            ThemePreset::Crimson => "crimson",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub preset: ThemePreset,
    /// Header band, section headings and rules.
    pub primary_color: Color,
    /// Sidebar panel.
    pub background_color: Color,
    /// Body copy.
    pub text_color: Color,
    pub margins: Margins,
    pub sidebar_width: f32,
    pub font_family: FontFamily,
    pub page: PageSize,
}

impl Theme {
    pub fn from_preset(preset: ThemePreset) -> Self {
        let (primary, background, text) = match preset {
            ThemePreset::Slate => (
                Color::rgb(0x2c, 0x3e, 0x50),
                Color::rgb(0xec, 0xf0, 0xf1),
                Color::rgb(0x33, 0x33, 0x33),
            ),
            ThemePreset::Ocean => (
                Color::rgb(0x1f, 0x5f, 0x8b),
                Color::rgb(0xe8, 0xf1, 0xf8),
                Color::rgb(0x2b, 0x2f, 0x33),
            ),
            ThemePreset::Forest => (
                Color::rgb(0x2e, 0x5e, 0x4e),
                Color::rgb(0xea, 0xf2, 0xee),
                Color::rgb(0x2f, 0x33, 0x30),
            ),
            ThemePreset::Crimson => (
                Color::rgb(0x8e, 0x24, 0x2f),
                Color::rgb(0xf6, 0xec, 0xed),
                Color::rgb(0x33, 0x2d, 0x2e),
            ),
        };

        Theme {
            preset,
            primary_color: primary,
            background_color: background,
            text_color: text,
            margins: Margins {
                top: 28.0,
                left: 24.0,
                right: 30.0,
                bottom: 40.0,
            },
            sidebar_width: 190.0,
            font_family: FontFamily::Helvetica,
            page: PageSize::A4,
        }
    }

    pub fn with_overrides(mut self, overrides: &ThemeOverrides) -> Self {
        if let Some(color) = overrides.primary_color {
            self.primary_color = color;
        }
        if let Some(color) = overrides.background_color {
            self.background_color = color;
        }
        if let Some(color) = overrides.text_color {
            self.text_color = color;
        }
        if let Some(margins) = overrides.margins {
            self.margins = margins;
        }
        if let Some(width) = overrides.sidebar_width {
            self.sidebar_width = width;
        }
        if let Some(family) = overrides.font_family {
            self.font_family = family;
        }
        self
    }

    pub fn regular(&self) -> FontFace {
        FontFace::regular(self.font_family)
    }

    pub fn bold(&self) -> FontFace {
        FontFace::bold(self.font_family)
    }

    /// Secondary copy (subtitles, continuation labels).
    pub fn muted_text_color(&self) -> Color {
        self.text_color.mix(Color::WHITE, 0.35)
    }

    /// Title line inside the header band.
    pub fn header_subtitle_color(&self) -> Color {
        self.primary_color.mix(Color::WHITE, 0.75)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_preset(ThemePreset::Slate)
    }
}

/// Optional per-deployment replacements for preset values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeOverrides {
    pub primary_color: Option<Color>,
    pub background_color: Option<Color>,
    pub text_color: Option<Color>,
    pub margins: Option<Margins>,
    pub sidebar_width: Option<f32>,
    pub font_family: Option<FontFamily>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_share_geometry() {
        let slate = Theme::from_preset(ThemePreset::Slate);
        for preset in ThemePreset::ALL {
            let theme = Theme::from_preset(preset);
            assert_eq!(theme.page, PageSize::A4);
            assert_eq!(theme.margins, slate.margins);
            assert!((theme.sidebar_width - slate.sidebar_width).abs() < 1e-6);
        }
    }

    #[test]
    fn test_preset_parse_roundtrip() {
        for preset in ThemePreset::ALL {
            assert_eq!(ThemePreset::parse(preset.as_str()), Some(preset));
        }
        assert_eq!(ThemePreset::parse(" Ocean "), Some(ThemePreset::Ocean));
        assert_eq!(ThemePreset::parse("neon"), None);
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let overrides = ThemeOverrides {
            primary_color: Some(Color::rgb(1, 2, 3)),
            sidebar_width: Some(210.0),
            ..Default::default()
        };
        let base = Theme::from_preset(ThemePreset::Forest);
        let theme = base.clone().with_overrides(&overrides);
        assert_eq!(theme.primary_color, Color::rgb(1, 2, 3));
        assert!((theme.sidebar_width - 210.0).abs() < 1e-6);
        assert_eq!(theme.background_color, base.background_color);
        assert_eq!(theme.font_family, base.font_family);
    }

    #[test]
    fn test_margins_parse() {
        let m = Margins::parse("30, 20,20 ,40").unwrap();
        assert_eq!(
            m,
            Margins {
                top: 30.0,
                left: 20.0,
                right: 20.0,
                bottom: 40.0
            }
        );
        assert!(Margins::parse("30,20,20").is_none());
        assert!(Margins::parse("a,b,c,d").is_none());
        assert!(Margins::parse("30,-1,20,40").is_none());
    }
}

//! The drawing surface the renderer targets.
//!
//! The renderer decides *what* goes *where* and *when a page ends*; a `Canvas` only knows how
//! to put rectangles, strings and the photo asset onto the current page and encode the result.

use serde::{Deserialize, Serialize};

use crate::errors::CanvasError;
use crate::layout::font_metrics::FontFace;
use crate::render::photo::CircularAsset;

// ────────────────────────────────────────────────────────────────────────────
// Geometry and color
// ────────────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in points, origin at the bottom-left corner of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// 8-bit sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear blend toward `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn mix(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgb(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
        )
    }

    /// Channels scaled to 0.0..=1.0.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse_hex(&value).ok_or_else(|| format!("invalid color '{value}', expected #rrggbb"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canvas capability
// ────────────────────────────────────────────────────────────────────────────

/// Six primitives, nothing more. `y` is the text baseline for `draw_text`.
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), CanvasError>;

    fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font: FontFace,
        size: f32,
        color: Color,
    ) -> Result<(), CanvasError>;

    fn measure_text_width(&self, text: &str, font: FontFace, size: f32) -> f32;

    fn draw_image(&mut self, asset: &CircularAsset, rect: Rect) -> Result<(), CanvasError>;

    fn new_page(&mut self) -> Result<(), CanvasError>;

    fn finish(self) -> Result<Vec<u8>, CanvasError>
    where
        Self: Sized;
}

// ────────────────────────────────────────────────────────────────────────────
// Test canvases
// ────────────────────────────────────────────────────────────────────────────

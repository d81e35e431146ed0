//! Turns an uploaded photo into the round, bordered portrait drawn in the header band.
//!
//! Pipeline: decode → RGBA (transparent areas flattened onto white) → center-crop to a
//! square on the shorter side → Lanczos3 resize to `size_px` → circular alpha mask →
//! ring border composited over the edge → PNG.
//!
//! Any failure falls back to a generated placeholder silhouette that goes through the same
//! mask and ring, so callers always get an asset unless even the placeholder fails to encode.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::errors::PhotoError;

/// Width of the ring drawn around the portrait, in pixels.
pub const BORDER_WIDTH_PX: f32 = 6.0;

/// Ring color.
pub const BORDER_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

const PLACEHOLDER_BACKGROUND: Rgba<u8> = Rgba([0xd5, 0xdb, 0xe0, 255]);
const PLACEHOLDER_FIGURE: Rgba<u8> = Rgba([0x9a, 0xa5, 0xb1, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    Photo,
    Placeholder,
}

/// Square RGBA portrait: transparent outside the inscribed circle, opaque inside, with a
/// ring border near the edge. Keeps both the pixels (for embedding) and the PNG encoding.
#[derive(Debug, Clone)]
pub struct CircularAsset {
    pub size_px: u32,
    pub source: AssetSource,
    pixels: RgbaImage,
    png: Vec<u8>,
}

impl CircularAsset {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == AssetSource::Placeholder
    }
}

/// Builds the portrait asset, exactly `size_px` × `size_px`, falling back to the placeholder
/// when the photo is absent or unusable. Returns `None` when `size_px` is zero or the
/// placeholder itself cannot be produced.
pub fn make_circular_asset(photo: Option<&[u8]>, size_px: u32) -> Option<CircularAsset> {
    match try_circular_asset(photo, size_px) {
        Ok(asset) => Some(asset),
        Err(PhotoError::Missing) => {
            debug!("No photo supplied, using placeholder portrait");
            placeholder_asset(size_px)
        }
        Err(e) => {
            warn!(error = %e, "Photo processing failed, using placeholder portrait");
            placeholder_asset(size_px)
        }
    }
}

/// The strict variant: reports why the photo could not be used.
pub fn try_circular_asset(photo: Option<&[u8]>, size_px: u32) -> Result<CircularAsset, PhotoError> {
    let bytes = photo.filter(|b| !b.is_empty()).ok_or(PhotoError::Missing)?;
    if size_px == 0 {
        return Err(PhotoError::ZeroSize);
    }
    let mut rgba = image::load_from_memory(bytes)?.to_rgba8();

    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(PhotoError::EmptyImage { width, height });
    }
    flatten_onto_white(&mut rgba);

    let side = width.min(height);
    let left = (width - side) / 2;
    let top = (height - side) / 2;
    let square = imageops::crop_imm(&rgba, left, top, side, side).to_image();

    let resized = imageops::resize(&square, size_px, size_px, FilterType::Lanczos3);

    finish_asset(resized, AssetSource::Photo)
}

/// Generated neutral silhouette used whenever no usable photo exists.
pub fn placeholder_asset(size_px: u32) -> Option<CircularAsset> {
    if size_px == 0 {
        warn!("Portrait size is zero, omitting photo");
        return None;
    }
    let s = size_px as f32;
    let (head_cx, head_cy, head_r) = (0.5 * s, 0.38 * s, 0.18 * s);
    let (body_cx, body_cy, body_rx, body_ry) = (0.5 * s, 0.95 * s, 0.34 * s, 0.30 * s);

    let img = RgbaImage::from_fn(size_px, size_px, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        let in_head = (px - head_cx).powi(2) + (py - head_cy).powi(2) <= head_r * head_r;
        let in_body =
            ((px - body_cx) / body_rx).powi(2) + ((py - body_cy) / body_ry).powi(2) <= 1.0;
        if in_head || in_body {
            PLACEHOLDER_FIGURE
        } else {
            PLACEHOLDER_BACKGROUND
        }
    });

    match finish_asset(img, AssetSource::Placeholder) {
        Ok(asset) => Some(asset),
        Err(e) => {
            warn!(error = %e, "Placeholder portrait could not be built, omitting photo");
            None
        }
    }
}

fn finish_asset(mut img: RgbaImage, source: AssetSource) -> Result<CircularAsset, PhotoError> {
    apply_circle_mask(&mut img);
    composite_ring(&mut img);

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| PhotoError::Encode(e.to_string()))?;

    Ok(CircularAsset {
        size_px: img.width(),
        source,
        pixels: img,
        png,
    })
}

fn flatten_onto_white(img: &mut RgbaImage) {
    for p in img.pixels_mut() {
        if p.0[3] < 255 {
            let a = p.0[3] as f32 / 255.0;
            let inv = 1.0 - a;
            for c in 0..3 {
                p.0[c] = (p.0[c] as f32 * a + 255.0 * inv).round() as u8;
            }
            p.0[3] = 255;
        }
    }
}

/// Distance from the square's center to the center of pixel (x, y).
fn center_distance(x: u32, y: u32, size: u32) -> f32 {
    let c = size as f32 / 2.0;
    let dx = x as f32 + 0.5 - c;
    let dy = y as f32 + 0.5 - c;
    (dx * dx + dy * dy).sqrt()
}

/// Alpha = 255 inside the inscribed circle, 0 outside.
fn apply_circle_mask(img: &mut RgbaImage) {
    let size = img.width().min(img.height());
    let radius = size as f32 / 2.0;
    for (x, y, p) in img.enumerate_pixels_mut() {
        p.0[3] = if center_distance(x, y, size) <= radius {
            255
        } else {
            0
        };
    }
}

/// Alpha-blends an anti-aliased ring of `BORDER_WIDTH_PX` over the image, centered just
/// inside the mask edge.
fn composite_ring(img: &mut RgbaImage) {
    let size = img.width().min(img.height());
    let half_width = BORDER_WIDTH_PX / 2.0;
    let ring_radius = size as f32 / 2.0 - half_width - 1.0;

    for (x, y, p) in img.enumerate_pixels_mut() {
        let d = center_distance(x, y, size);
        let coverage = (half_width + 0.5 - (d - ring_radius).abs()).clamp(0.0, 1.0);
        if coverage > 0.0 {
            *p = blend_over(BORDER_COLOR, coverage, *p);
        }
    }
}

/// Porter-Duff "source over" with the source scaled by `coverage`.
fn blend_over(src: Rgba<u8>, coverage: f32, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = (src.0[3] as f32 / 255.0) * coverage;
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let v = (src.0[i] as f32 * sa + dst.0[i] as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ])
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

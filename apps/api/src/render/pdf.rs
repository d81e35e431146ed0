//! PDF implementation of the `Canvas` capability.
//!
//! Pages are collected as content streams while the renderer draws; `finish` assigns object
//! ids, embeds fonts and images and serializes everything in one go. Text uses the base-14
//! faces with WinAnsi encoding, so nothing is embedded except the portrait.

use pdf_writer::{Content, Filter, Name, Pdf, Rect as PdfRect, Ref, Str, TextStr};

use crate::errors::CanvasError;
use crate::layout::{get_metrics, FontFace};
use crate::render::canvas::{Canvas, Color, Rect};
use crate::render::photo::CircularAsset;
use crate::render::theme::PageSize;

const PRODUCER: &str = concat!("vitae-api ", env!("CARGO_PKG_VERSION"));
const DEFLATE_LEVEL: u8 = 6;

struct EmbeddedImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Vec<u8>,
}

pub struct PdfCanvas {
    page_size: PageSize,
    title: String,
    finished_pages: Vec<Content>,
    current: Content,
    /// Faces in first-use order; index `i` is resource `/F{i+1}`.
    fonts: Vec<FontFace>,
    /// Index `i` is resource `/Im{i+1}`.
    images: Vec<EmbeddedImage>,
}

impl PdfCanvas {
    pub fn new(page_size: PageSize) -> Self {
        PdfCanvas {
            page_size,
            title: String::new(),
            finished_pages: Vec::new(),
            current: Content::new(),
            fonts: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Document title written to the info dictionary.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn font_resource(&mut self, face: FontFace) -> String {
        let index = match self.fonts.iter().position(|f| *f == face) {
            Some(index) => index,
            None => {
                self.fonts.push(face);
                self.fonts.len() - 1
            }
        };
        format!("F{}", index + 1)
    }
}

fn ensure_finite(op: &'static str, values: &[f32]) -> Result<(), CanvasError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CanvasError::InvalidGeometry { op })
    }
}

impl Canvas for PdfCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), CanvasError> {
        if !rect.is_finite() {
            return Err(CanvasError::InvalidGeometry { op: "fill_rect" });
        }
        let [r, g, b] = color.to_unit();
        self.current
            .save_state()
            .set_fill_rgb(r, g, b)
            .rect(rect.x, rect.y, rect.width, rect.height)
            .fill_nonzero()
            .restore_state();
        Ok(())
    }

    fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font: FontFace,
        size: f32,
        color: Color,
    ) -> Result<(), CanvasError> {
        ensure_finite("draw_text", &[x, y, size])?;
        if text.is_empty() {
            return Ok(());
        }
        let resource = self.font_resource(font);
        let encoded = encode_win_ansi(text);
        let [r, g, b] = color.to_unit();
        self.current
            .save_state()
            .set_fill_rgb(r, g, b)
            .begin_text()
            .set_font(Name(resource.as_bytes()), size)
            .next_line(x, y)
            .show(Str(&encoded))
            .end_text()
            .restore_state();
        Ok(())
    }

    fn measure_text_width(&self, text: &str, font: FontFace, size: f32) -> f32 {
        get_metrics(&font).text_width(text, size)
    }

    fn draw_image(&mut self, asset: &CircularAsset, rect: Rect) -> Result<(), CanvasError> {
        if !rect.is_finite() {
            return Err(CanvasError::InvalidGeometry { op: "draw_image" });
        }
        let pixels = asset.pixels();
        let (width, height) = pixels.dimensions();
        let raw = pixels.as_raw();
        if width == 0 || height == 0 || raw.len() != (width as usize) * (height as usize) * 4 {
            return Err(CanvasError::ImageData { width, height });
        }

        let mut rgb = Vec::with_capacity(raw.len() / 4 * 3);
        let mut alpha = Vec::with_capacity(raw.len() / 4);
        for px in raw.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        self.images.push(EmbeddedImage {
            width,
            height,
            rgb,
            alpha,
        });

        let name = format!("Im{}", self.images.len());
        self.current
            .save_state()
            .transform([rect.width, 0.0, 0.0, rect.height, rect.x, rect.y])
            .x_object(Name(name.as_bytes()))
            .restore_state();
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), CanvasError> {
        let done = std::mem::replace(&mut self.current, Content::new());
        self.finished_pages.push(done);
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, CanvasError> {
        let PdfCanvas {
            page_size,
            title,
            mut finished_pages,
            current,
            fonts,
            images,
        } = self;
        finished_pages.push(current);

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        let font_refs: Vec<(String, Ref)> = fonts
            .iter()
            .enumerate()
            .map(|(i, face)| {
                let id = alloc();
                pdf.type1_font(id)
                    .base_font(Name(face.base_font_name().as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                (format!("F{}", i + 1), id)
            })
            .collect();

        let mut image_refs: Vec<(String, Ref)> = Vec::with_capacity(images.len());
        for (i, img) in images.iter().enumerate() {
            let image_id = alloc();
            let mask_id = alloc();

            let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&img.alpha, DEFLATE_LEVEL);
            let mut mask = pdf.image_xobject(mask_id, &compressed_alpha);
            mask.filter(Filter::FlateDecode);
            mask.width(img.width as i32);
            mask.height(img.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            drop(mask);

            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&img.rgb, DEFLATE_LEVEL);
            let mut xobj = pdf.image_xobject(image_id, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(img.width as i32);
            xobj.height(img.height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            xobj.s_mask(mask_id);
            drop(xobj);

            image_refs.push((format!("Im{}", i + 1), image_id));
        }

        let mut page_ids = Vec::with_capacity(finished_pages.len());
        for content in finished_pages {
            let page_id = alloc();
            let content_id = alloc();

            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, DEFLATE_LEVEL);
            pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

            let mut page = pdf.page(page_id);
            page.media_box(PdfRect::new(0.0, 0.0, page_size.width, page_size.height))
                .parent(pages_id)
                .contents(content_id);
            {
                let mut resources = page.resources();
                if !font_refs.is_empty() {
                    let mut dict = resources.fonts();
                    for (name, id) in &font_refs {
                        dict.pair(Name(name.as_bytes()), *id);
                    }
                }
                if !image_refs.is_empty() {
                    let mut dict = resources.x_objects();
                    for (name, id) in &image_refs {
                        dict.pair(Name(name.as_bytes()), *id);
                    }
                }
            }
            drop(page);
            page_ids.push(page_id);
        }

        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);
        pdf.catalog(catalog_id).pages(pages_id);

        let mut info = pdf.document_info(info_id);
        if !title.is_empty() {
            info.title(TextStr(&title));
        }
        info.producer(TextStr(PRODUCER));
        drop(info);

        Ok(pdf.finish())
    }
}

/// Encodes `text` for a WinAnsi (cp1252) simple font. Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\t' => b' ',
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

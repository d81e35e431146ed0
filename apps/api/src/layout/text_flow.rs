//! Text wrapping for the renderer.
//!
//! Two strategies sit behind the `TextFlow` trait:
//! - `CharBudgetFlow` estimates a per-line character budget from the column width and font
//!   size (`max(30, floor(width / (size × 0.55)))`) and packs words greedily against it.
//!   This is the default and the one the layout constants are tuned for.
//! - `MetricFlow` packs words against the static glyph-width tables instead.
//!
//! Both split on explicit newlines first, emit one blank line per empty paragraph, break only
//! at whitespace and never split a word: a word longer than the budget gets its own line.

use crate::layout::font_metrics::{get_metrics, FontFace, FontFamily};

/// Average glyph advance as a fraction of the font size.
pub const AVG_CHAR_WIDTH_RATIO: f32 = 0.55;

/// Lower bound on the estimated character budget.
pub const MIN_CHAR_BUDGET: usize = 30;

/// A display-ready line plus the vertical advance to apply after drawing it.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub leading: f32,
}

impl WrappedLine {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Line-breaking strategy used by the renderer.
///
/// Implementations must be deterministic: identical arguments yield identical lines.
pub trait TextFlow: Send + Sync {
    fn wrap(&self, text: &str, max_width: f32, font_size: f32, leading: f32) -> Vec<WrappedLine>;
}

/// Greedy packing against an estimated character budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharBudgetFlow;

/// Greedy packing against glyph-width tables for one font family (regular weight).
#[derive(Debug, Clone, Copy)]
pub struct MetricFlow {
    pub face: FontFace,
}

impl MetricFlow {
    pub fn new(family: FontFamily) -> Self {
        MetricFlow {
            face: FontFace::regular(family),
        }
    }
}

/// Estimated number of characters that fit in `max_width` at `font_size`.
pub fn char_budget(max_width: f32, font_size: f32) -> usize {
    if font_size <= 0.0 || !max_width.is_finite() || !font_size.is_finite() {
        return MIN_CHAR_BUDGET;
    }
    let estimate = (max_width / (font_size * AVG_CHAR_WIDTH_RATIO)).floor();
    if estimate.is_finite() && estimate > MIN_CHAR_BUDGET as f32 {
        estimate as usize
    } else {
        MIN_CHAR_BUDGET
    }
}

impl TextFlow for CharBudgetFlow {
    fn wrap(&self, text: &str, max_width: f32, font_size: f32, leading: f32) -> Vec<WrappedLine> {
        let budget = char_budget(max_width, font_size) as f32;
        flow_paragraphs(text, leading, |line: &str| line.chars().count() as f32, budget, 1.0)
    }
}

impl TextFlow for MetricFlow {
    fn wrap(&self, text: &str, max_width: f32, font_size: f32, leading: f32) -> Vec<WrappedLine> {
        let metrics = get_metrics(&self.face);
        flow_paragraphs(
            text,
            leading,
            |word: &str| metrics.text_width(word, font_size),
            max_width,
            metrics.space_width * font_size,
        )
    }
}

/// Shared paragraph loop. `measure` returns the extent of a word in the same unit as `limit`;
/// `space` is the extent of the separator inserted between two words.
fn flow_paragraphs<F>(
    text: &str,
    leading: f32,
    measure: F,
    limit: f32,
    space: f32,
) -> Vec<WrappedLine>
where
    F: Fn(&str) -> f32,
{
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut current = String::new();
        let mut current_extent = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_extent = measure(word);
            if current.is_empty() {
                current.push_str(word);
                current_extent = word_extent;
            } else if current_extent + space + word_extent <= limit {
                current.push(' ');
                current.push_str(word);
                current_extent += space + word_extent;
            } else {
                lines.push(WrappedLine {
                    text: std::mem::take(&mut current),
                    leading,
                });
                current.push_str(word);
                current_extent = word_extent;
            }
        }

        // An empty (or whitespace-only) paragraph still produces one blank line.
        lines.push(WrappedLine {
            text: current,
            leading,
        });
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

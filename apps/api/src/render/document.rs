//! Resume layout: turns a `ResumeDocument` into positioned drawing commands across pages.
//!
//! # Page structure
//! - Page 1: a tall header band (portrait, name, title) above two columns.
//! - Continuation pages: a compact header band carrying the name, same two columns.
//! - Sidebar (contact, skills, languages, hobbies) sits on a tinted panel on the left; the
//!   main column (profile, work experience, education) fills the rest.
//!
//! # Pagination
//! Each column owns a `LayoutCursor` and the index of the page it is writing on. Columns are
//! laid out one after the other (header, sidebar, main) into a per-page command list; when a
//! column runs out of room it moves to the next page, creating it with its chrome if no
//! column has reached it yet, and resets only its own cursor. Column heights are never
//! balanced. Once layout is done the pages are replayed onto the canvas in order.
//!
//! Experience entries are atomic: the break check runs between entries, never inside one,
//! so an unusually long entry can run past the bottom margin.

use tracing::{debug, info, warn};

use crate::errors::RenderError;
use crate::layout::{CursorState, FontFace, LayoutCursor, TextFlow, WrappedLine};
use crate::models::resume::{suggested_filename, ExperienceEntry, ResumeDocument};
use crate::render::canvas::{Canvas, Color, Rect};
use crate::render::photo::{make_circular_asset, CircularAsset};
use crate::render::theme::Theme;

// ────────────────────────────────────────────────────────────────────────────
// Geometry and typography
// ────────────────────────────────────────────────────────────────────────────

pub const HEADER_BAND_HEIGHT: f32 = 150.0;
pub const CONTINUATION_BAND_HEIGHT: f32 = 56.0;

const PHOTO_DISPLAY_PT: f32 = 104.0;
const PHOTO_GAP: f32 = 22.0;
const COLUMN_GUTTER: f32 = 22.0;
const SIDEBAR_INNER_PAD: f32 = 14.0;

const NAME_MAX_SIZE: f32 = 26.0;
const NAME_MIN_SIZE: f32 = 16.0;
const TITLE_SIZE: f32 = 13.0;
const TITLE_MIN_SIZE: f32 = 9.0;
const TITLE_LEADING: f32 = 16.0;
const TITLE_MAX_LINES: usize = 2;
const CONTINUATION_NAME_SIZE: f32 = 14.0;
const PAGE_LABEL_SIZE: f32 = 9.0;

const HEADING_SIZE: f32 = 11.5;
const HEADING_RULE_OFFSET: f32 = 5.0;
const HEADING_RULE_THICKNESS: f32 = 1.2;
const HEADING_AFTER_RULE: f32 = 14.0;
const SECTION_GAP: f32 = 14.0;

const BODY_SIZE: f32 = 10.0;
const BODY_LEADING: f32 = 14.0;
const SIDEBAR_SIZE: f32 = 9.5;
const SIDEBAR_LEADING: f32 = 13.0;

const ENTRY_TITLE_SIZE: f32 = 11.0;
const ENTRY_TITLE_LEADING: f32 = 14.0;
const SUBTITLE_SIZE: f32 = 9.5;
const SUBTITLE_LEADING: f32 = 12.5;
const SUBTITLE_MIN_GAP: f32 = 12.0;
const BULLET_SIZE: f32 = 9.5;
const BULLET_LEADING: f32 = 12.5;
const BULLET_INDENT: f32 = 11.0;
const BULLET_GLYPH: &str = "•";
const ENTRY_GAP: f32 = 10.0;

/// Room that must remain before another wrapped line is started.
const LINE_RESERVE: f32 = 60.0;
/// Room that must remain before a section heading, so headings are not orphaned.
const HEADING_RESERVE: f32 = 80.0;
/// Room that must remain before another experience entry is started.
const ENTRY_RESERVE: f32 = 110.0;

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
    pub used_placeholder: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Page plan
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum DrawOp {
    Rect {
        rect: Rect,
        color: Color,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontFace,
        size: f32,
        color: Color,
    },
    Photo(Rect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Sidebar,
    Main,
}

#[derive(Debug, Clone, Copy)]
struct Column {
    kind: ColumnKind,
    x: f32,
    width: f32,
    page: usize,
    cursor: LayoutCursor,
}

struct Layout<'a, C: Canvas> {
    canvas: &'a C,
    theme: &'a Theme,
    flow: &'a dyn TextFlow,
    name: &'a str,
    pages: Vec<Vec<DrawOp>>,
}

impl<'a, C: Canvas> Layout<'a, C> {
    fn band_height(page: usize) -> f32 {
        if page == 0 {
            HEADER_BAND_HEIGHT
        } else {
            CONTINUATION_BAND_HEIGHT
        }
    }

    fn column_start_y(&self, page: usize) -> f32 {
        self.theme.page.height - Self::band_height(page) - self.theme.margins.top
    }

    fn new_column(&self, kind: ColumnKind) -> Column {
        let theme = self.theme;
        let (x, width) = match kind {
            ColumnKind::Sidebar => (
                theme.margins.left,
                theme.sidebar_width - theme.margins.left - SIDEBAR_INNER_PAD,
            ),
            ColumnKind::Main => {
                let x = theme.sidebar_width + COLUMN_GUTTER;
                (x, theme.page.width - x - theme.margins.right)
            }
        };
        Column {
            kind,
            x,
            width,
            page: 0,
            cursor: LayoutCursor::new(
                self.column_start_y(0),
                theme.margins.bottom,
                theme.page.width,
                theme.page.height,
            ),
        }
    }

    fn measure(&self, text: &str, font: FontFace, size: f32) -> f32 {
        self.canvas.measure_text_width(text, font, size)
    }

    fn push(&mut self, page: usize, op: DrawOp) {
        self.ensure_page(page);
        if let Some(ops) = self.pages.get_mut(page) {
            ops.push(op);
        }
    }

    fn push_text(
        &mut self,
        page: usize,
        x: f32,
        y: f32,
        text: &str,
        font: FontFace,
        size: f32,
        color: Color,
    ) {
        self.push(
            page,
            DrawOp::Text {
                x,
                y,
                text: text.to_string(),
                font,
                size,
                color,
            },
        );
    }

    /// Creates pages up to `page`, each starting with its chrome.
    fn ensure_page(&mut self, page: usize) {
        while self.pages.len() <= page {
            let index = self.pages.len();
            let chrome = self.chrome(index);
            self.pages.push(chrome);
        }
    }

    /// Persistent decoration: header band first, then the sidebar panel and, on
    /// continuation pages, the name and page number inside the band.
    fn chrome(&self, page: usize) -> Vec<DrawOp> {
        let theme = self.theme;
        let band = Self::band_height(page);
        let (w, h) = (theme.page.width, theme.page.height);

        let mut ops = vec![
            DrawOp::Rect {
                rect: Rect::new(0.0, h - band, w, band),
                color: theme.primary_color,
            },
            DrawOp::Rect {
                rect: Rect::new(0.0, 0.0, theme.sidebar_width, h - band),
                color: theme.background_color,
            },
        ];

        if page > 0 {
            let baseline = h - band / 2.0 - CONTINUATION_NAME_SIZE * 0.35;
            let name = self.name.trim();
            if !name.is_empty() {
                ops.push(DrawOp::Text {
                    x: theme.margins.left,
                    y: baseline,
                    text: name.to_string(),
                    font: theme.bold(),
                    size: CONTINUATION_NAME_SIZE,
                    color: Color::WHITE,
                });
            }
            let label = format!("Page {}", page + 1);
            let label_w = self.measure(&label, theme.regular(), PAGE_LABEL_SIZE);
            ops.push(DrawOp::Text {
                x: w - theme.margins.right - label_w,
                y: baseline,
                text: label,
                font: theme.regular(),
                size: PAGE_LABEL_SIZE,
                color: theme.header_subtitle_color(),
            });
        }
        ops
    }

    // ── Cursor handling ─────────────────────────────────────────────────────

    /// Moves `col` to its next page. Only this column's cursor is reset.
    fn take_page_break(&mut self, col: &mut Column, continued: Option<&str>) {
        let overflow = col.cursor.remaining();
        col.page += 1;
        self.ensure_page(col.page);
        col.cursor.reset(self.column_start_y(col.page));
        debug!(
            column = ?col.kind,
            page = col.page + 1,
            section = continued.unwrap_or(""),
            remaining = overflow,
            "Page break"
        );

        if let Some(section) = continued {
            let label = format!("{section} (continued)");
            let color = self.theme.muted_text_color();
            let font = self.theme.bold();
            self.push_text(col.page, col.x, col.cursor.current_y, &label, font, HEADING_SIZE, color);
            col.cursor.advance(HEADING_SIZE + HEADING_AFTER_RULE);
        }
    }

    fn ensure_room(&mut self, col: &mut Column, reserve: f32, continued: Option<&str>) {
        if col.cursor.state(reserve) == CursorState::Exhausted {
            self.take_page_break(col, continued);
        }
    }

    // ── Building blocks ─────────────────────────────────────────────────────

    fn heading(&mut self, col: &mut Column, label: &str) {
        self.ensure_room(col, HEADING_RESERVE, None);
        let theme = self.theme;
        self.push_text(
            col.page,
            col.x,
            col.cursor.current_y,
            &label.to_uppercase(),
            theme.bold(),
            HEADING_SIZE,
            theme.primary_color,
        );
        col.cursor.advance(HEADING_RULE_OFFSET);
        self.push(
            col.page,
            DrawOp::Rect {
                rect: Rect::new(col.x, col.cursor.current_y, col.width, HEADING_RULE_THICKNESS),
                color: theme.primary_color,
            },
        );
        col.cursor.advance(HEADING_AFTER_RULE);
    }

    /// Wrapped paragraph text with a break check before every line after the first.
    fn paragraph(
        &mut self,
        col: &mut Column,
        section: &str,
        text: &str,
        size: f32,
        leading: f32,
    ) {
        let lines = self.flow.wrap(text, col.width, size, leading);
        let font = self.theme.regular();
        let color = self.theme.text_color;
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.ensure_room(col, LINE_RESERVE, Some(section));
            }
            if !line.is_blank() {
                self.push_text(col.page, col.x, col.cursor.current_y, &line.text, font, size, color);
            }
            col.cursor.advance(line.leading);
        }
    }

    fn bullet_lines(&self, text: &str, width: f32, size: f32, leading: f32) -> Vec<WrappedLine> {
        self.flow
            .wrap(text, (width - BULLET_INDENT).max(1.0), size, leading)
            .into_iter()
            .filter(|line| !line.is_blank())
            .collect()
    }

    /// One bullet: glyph on the first line, continuation lines indented to the text.
    fn bullet(&mut self, col: &mut Column, text: &str, size: f32, leading: f32) {
        let lines = self.bullet_lines(text, col.width, size, leading);
        let font = self.theme.regular();
        let color = self.theme.text_color;
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                self.push_text(col.page, col.x, col.cursor.current_y, BULLET_GLYPH, font, size, color);
            }
            self.push_text(
                col.page,
                col.x + BULLET_INDENT,
                col.cursor.current_y,
                &line.text,
                font,
                size,
                color,
            );
            col.cursor.advance(line.leading);
        }
    }

    /// Bulleted list where each item is a unit; breaks are checked between items.
    fn bullet_list(
        &mut self,
        col: &mut Column,
        section: &str,
        items: &[String],
        size: f32,
        leading: f32,
    ) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.ensure_room(col, LINE_RESERVE, Some(section));
            }
            self.bullet(col, item, size, leading);
        }
    }

    // ── Sections ────────────────────────────────────────────────────────────

    fn header(&mut self, doc: &ResumeDocument, photo: Option<&CircularAsset>) {
        self.ensure_page(0);
        let theme = self.theme;
        let h = theme.page.height;
        let band_bottom = h - HEADER_BAND_HEIGHT;

        let mut text_x = theme.margins.left;
        if photo.is_some() {
            let y = band_bottom + (HEADER_BAND_HEIGHT - PHOTO_DISPLAY_PT) / 2.0;
            let rect = Rect::new(theme.margins.left, y, PHOTO_DISPLAY_PT, PHOTO_DISPLAY_PT);
            self.push(0, DrawOp::Photo(rect));
            text_x = rect.x + rect.width + PHOTO_GAP;
        }
        let available = theme.page.width - text_x - theme.margins.right;

        let mut baseline = band_bottom + HEADER_BAND_HEIGHT / 2.0 + 4.0;
        let name = doc.name.trim();
        if !name.is_empty() {
            let mut size = NAME_MAX_SIZE;
            while size > NAME_MIN_SIZE && self.measure(name, theme.bold(), size) > available {
                size -= 1.0;
            }
            self.push_text(0, text_x, baseline, name, theme.bold(), size, Color::WHITE);
            baseline -= size * 0.5 + TITLE_LEADING;
        }

        let title = doc.title.trim();
        if !title.is_empty() {
            let color = theme.header_subtitle_color();
            let (size, lines) = self.fit_title(title, available);
            if lines.len() > TITLE_MAX_LINES {
                warn!(
                    lines = lines.len(),
                    size, "Title needs more than two lines at minimum size"
                );
            }
            for line in &lines {
                self.push_text(0, text_x, baseline, &line.text, theme.regular(), size, color);
                baseline -= line.leading;
            }
        }
    }

    /// Steps the title size down until it wraps to at most two lines. At the minimum size
    /// every line is still returned so no word is lost.
    fn fit_title(&self, title: &str, available: f32) -> (f32, Vec<WrappedLine>) {
        let mut size = TITLE_SIZE;
        loop {
            let leading = TITLE_LEADING * size / TITLE_SIZE;
            let lines = self.flow.wrap(title, available, size, leading);
            if lines.len() <= TITLE_MAX_LINES || size <= TITLE_MIN_SIZE {
                return (size, lines);
            }
            size -= 1.0;
        }
    }

    fn sidebar(&mut self, doc: &ResumeDocument) {
        let mut col = self.new_column(ColumnKind::Sidebar);
        let mut first = true;

        let contact = doc.contact_lines();
        if !contact.is_empty() {
            self.heading(&mut col, "Contact");
            for (i, line) in contact.iter().enumerate() {
                if i > 0 {
                    col.cursor.advance(3.0);
                    self.ensure_room(&mut col, LINE_RESERVE, Some("Contact"));
                }
                self.paragraph(&mut col, "Contact", line, SIDEBAR_SIZE, SIDEBAR_LEADING);
            }
            first = false;
        }

        let lists = [
            ("Skills", doc.skill_items()),
            ("Languages", doc.language_items()),
            ("Hobbies", doc.hobby_items()),
        ];
        for (label, items) in lists.iter() {
            if items.is_empty() {
                continue;
            }
            if !first {
                col.cursor.advance(SECTION_GAP);
            }
            self.heading(&mut col, label);
            self.bullet_list(&mut col, label, items, SIDEBAR_SIZE, SIDEBAR_LEADING);
            first = false;
        }
    }

    fn main_column(&mut self, doc: &ResumeDocument) {
        let mut col = self.new_column(ColumnKind::Main);
        let mut first = true;

        let profile = doc.profile_text.trim();
        if !profile.is_empty() {
            self.heading(&mut col, "Profile");
            self.paragraph(&mut col, "Profile", profile, BODY_SIZE, BODY_LEADING);
            first = false;
        }

        let entries = doc.experience_entries();
        if !entries.is_empty() {
            if !first {
                col.cursor.advance(SECTION_GAP);
            }
            self.heading(&mut col, "Work Experience");
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 && col.cursor.needs_break(ENTRY_RESERVE) {
                    self.take_page_break(&mut col, Some("Work Experience"));
                }
                self.experience_entry(&mut col, entry);
            }
            first = false;
        }

        let education = doc.education_lines();
        if !education.is_empty() {
            if !first {
                col.cursor.advance(SECTION_GAP);
            }
            self.heading(&mut col, "Education");
            self.bullet_list(&mut col, "Education", &education, BODY_SIZE, BODY_LEADING);
        }
    }

    /// Title, subtitle (same band when it fits, wrapped below otherwise), bullets, gap.
    fn experience_entry(&mut self, col: &mut Column, entry: &ExperienceEntry) {
        let theme = self.theme;
        let bold = theme.bold();
        let regular = theme.regular();
        let muted = theme.muted_text_color();

        let title_lines =
            self.flow
                .wrap(entry.title.trim(), col.width, ENTRY_TITLE_SIZE, ENTRY_TITLE_LEADING);
        let subtitle = entry.subtitle.trim();

        let same_band = match title_lines.as_slice() {
            [only] if !subtitle.is_empty() => {
                let title_w = self.measure(&only.text, bold, ENTRY_TITLE_SIZE);
                let sub_w = self.measure(subtitle, regular, SUBTITLE_SIZE);
                (title_w + SUBTITLE_MIN_GAP + sub_w <= col.width).then_some(sub_w)
            }
            _ => None,
        };

        for line in &title_lines {
            self.push_text(
                col.page,
                col.x,
                col.cursor.current_y,
                &line.text,
                bold,
                ENTRY_TITLE_SIZE,
                theme.text_color,
            );
            if let Some(sub_w) = same_band {
                self.push_text(
                    col.page,
                    col.x + col.width - sub_w,
                    col.cursor.current_y,
                    subtitle,
                    regular,
                    SUBTITLE_SIZE,
                    muted,
                );
            }
            col.cursor.advance(line.leading);
        }

        if same_band.is_none() && !subtitle.is_empty() {
            for line in self.flow.wrap(subtitle, col.width, SUBTITLE_SIZE, SUBTITLE_LEADING) {
                if !line.is_blank() {
                    self.push_text(
                        col.page,
                        col.x,
                        col.cursor.current_y,
                        &line.text,
                        regular,
                        SUBTITLE_SIZE,
                        muted,
                    );
                }
                col.cursor.advance(line.leading);
            }
        }

        if !entry.bullets.is_empty() {
            col.cursor.advance(2.0);
        }
        for bullet in &entry.bullets {
            self.bullet(col, bullet, BULLET_SIZE, BULLET_LEADING);
        }
        col.cursor.advance(ENTRY_GAP);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

/// Lays out and draws one resume. Holds only shared read-only state, so one renderer can
/// serve any number of sequential renders.
pub struct DocumentRenderer<'a> {
    theme: &'a Theme,
    flow: &'a dyn TextFlow,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(theme: &'a Theme, flow: &'a dyn TextFlow) -> Self {
        DocumentRenderer { theme, flow }
    }

    /// Renders with an already processed portrait. `photo = None` omits the portrait; the
    /// name moves left but the columns start at the same height either way.
    pub fn render<C: Canvas>(
        &self,
        doc: &ResumeDocument,
        photo: Option<&CircularAsset>,
        mut canvas: C,
    ) -> Result<RenderedDocument, RenderError> {
        let pages = {
            let mut layout = Layout {
                canvas: &canvas,
                theme: self.theme,
                flow: self.flow,
                name: &doc.name,
                pages: Vec::new(),
            };
            layout.header(doc, photo);
            layout.sidebar(doc);
            layout.main_column(doc);
            layout.pages
        };

        for (index, ops) in pages.iter().enumerate() {
            if index > 0 {
                canvas.new_page()?;
            }
            for op in ops {
                match op {
                    DrawOp::Rect { rect, color } => canvas.fill_rect(*rect, *color)?,
                    DrawOp::Text {
                        x,
                        y,
                        text,
                        font,
                        size,
                        color,
                    } => canvas.draw_text(*x, *y, text, *font, *size, *color)?,
                    DrawOp::Photo(rect) => {
                        if let Some(asset) = photo {
                            canvas.draw_image(asset, *rect)?;
                        }
                    }
                }
            }
        }

        let bytes = canvas.finish()?;
        let used_placeholder = photo.map(|p| p.is_placeholder()).unwrap_or(false);
        info!(
            pages = pages.len(),
            bytes = bytes.len(),
            placeholder = used_placeholder,
            "Resume rendered"
        );

        Ok(RenderedDocument {
            bytes,
            filename: suggested_filename(&doc.name, "pdf"),
            page_count: pages.len(),
            used_placeholder,
        })
    }
}

/// Full pipeline: process the photo (falling back to the placeholder), then lay out and draw.
/// The portrait is finished before any layout starts because the header depends on it.
pub fn render_resume<C: Canvas>(
    doc: &ResumeDocument,
    theme: &Theme,
    flow: &dyn TextFlow,
    photo_size_px: u32,
    canvas: C,
) -> Result<RenderedDocument, RenderError> {
    let asset = make_circular_asset(doc.photo.as_deref(), photo_size_px);
    if let Some(portrait) = &asset {
        debug!(
            source = ?portrait.source,
            size_px = portrait.size_px,
            png_bytes = portrait.png().len(),
            "Portrait ready"
        );
    }
    DocumentRenderer::new(theme, flow).render(doc, asset.as_ref(), canvas)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CanvasError;
    use crate::layout::text_flow::{CharBudgetFlow, MetricFlow};
    use crate::render::canvas::testing::{FailingCanvas, Recorded, RecordingCanvas};
    use crate::render::pdf::PdfCanvas;

    /// Canvas wrapper that lets a test inspect what was recorded after `finish`.
    struct Capture<'a>(&'a mut RecordingCanvas);

    impl Canvas for Capture<'_> {
        fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), CanvasError> {
            self.0.fill_rect(rect, color)
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
            self.0.draw_text(x, y, text, font, size, color)
        }
        fn measure_text_width(&self, text: &str, font: FontFace, size: f32) -> f32 {
            self.0.measure_text_width(text, font, size)
        }
        fn draw_image(&mut self, asset: &CircularAsset, rect: Rect) -> Result<(), CanvasError> {
            self.0.draw_image(asset, rect)
        }
        fn new_page(&mut self) -> Result<(), CanvasError> {
            self.0.new_page()
        }
        fn finish(self) -> Result<Vec<u8>, CanvasError> {
            Ok(b"captured".to_vec())
        }
    }

    fn long_bullet(i: usize, j: usize) -> String {
        format!(
            "Delivered improvement {i}.{j} by redesigning the ingestion path, cutting median \
             latency and on-call pages for the platform team"
        )
    }

    fn experiences(count: usize, bullets: usize) -> String {
        (0..count)
            .map(|i| {
                let mut block = format!("Engineer {i}\nCompany {i} - 2019-2021");
                for j in 0..bullets {
                    block.push('\n');
                    block.push_str(&long_bullet(i, j));
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn full_document() -> ResumeDocument {
        ResumeDocument {
            name: "Ada Lovelace".to_string(),
            title: "Analytical Engine Programmer".to_string(),
            profile_text: "Mathematician with a long record of turning mechanical designs into \
                           working programs.\n\nComfortable across hardware and notation."
                .to_string(),
            phone: "+44 20 7946 0000".to_string(),
            email: "ada@example.com".to_string(),
            address: "12 St James's Square, London".to_string(),
            skills: "Rust, Go, Distributed systems, PostgreSQL".to_string(),
            languages: "English, French".to_string(),
            hobbies: "Poetry, Horses".to_string(),
            experiences: experiences(6, 4),
            education: "BSc Mathematics\nMSc Mechanical Computation".to_string(),
            photo: None,
        }
    }

    fn record(doc: &ResumeDocument, theme: &Theme, with_photo: bool) -> RecordingCanvas {
        let mut recording = RecordingCanvas::default();
        let asset = if with_photo {
            make_circular_asset(None, 64)
        } else {
            None
        };
        DocumentRenderer::new(theme, &CharBudgetFlow)
            .render(doc, asset.as_ref(), Capture(&mut recording))
            .unwrap();
        recording
    }

    fn continuation_band(theme: &Theme) -> Recorded {
        Recorded::FillRect(
            Rect::new(
                0.0,
                theme.page.height - CONTINUATION_BAND_HEIGHT,
                theme.page.width,
                CONTINUATION_BAND_HEIGHT,
            ),
            theme.primary_color,
        )
    }

    #[test]
    fn test_six_entries_overflow_to_second_page() {
        let theme = Theme::default();
        let recording = record(&full_document(), &theme, true);
        let pages = recording.pages();
        assert!(pages.len() >= 2, "expected at least 2 pages, got {}", pages.len());
    }

    #[test]
    fn test_continuation_pages_start_with_header_band() {
        let theme = Theme::default();
        let recording = record(&full_document(), &theme, true);
        let pages = recording.pages();
        for (i, page) in pages.iter().enumerate().skip(1) {
            assert_eq!(
                page.first(),
                Some(&continuation_band(&theme)),
                "page {} must begin with the header band",
                i + 1
            );
        }
    }

    #[test]
    fn test_first_page_starts_with_tall_band() {
        let theme = Theme::default();
        let recording = record(&full_document(), &theme, true);
        let first = &recording.pages()[0];
        assert_eq!(
            first.first(),
            Some(&Recorded::FillRect(
                Rect::new(
                    0.0,
                    theme.page.height - HEADER_BAND_HEIGHT,
                    theme.page.width,
                    HEADER_BAND_HEIGHT
                ),
                theme.primary_color
            ))
        );
    }

    #[test]
    fn test_continued_label_drawn_after_break() {
        let theme = Theme::default();
        let recording = record(&full_document(), &theme, true);
        let pages = recording.pages();
        let second_page_texts: Vec<&str> = pages[1]
            .iter()
            .filter_map(|op| match op {
                Recorded::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(
            second_page_texts.contains(&"Work Experience (continued)"),
            "texts on page 2: {second_page_texts:?}"
        );
        assert!(second_page_texts.contains(&"Ada Lovelace"));
        assert!(second_page_texts.contains(&"Page 2"));
    }

    #[test]
    fn test_entries_are_not_split_across_pages() {
        let theme = Theme::default();
        let recording = record(&full_document(), &theme, true);
        let pages = recording.pages();
        // Each entry's bullets are drawn on the page its title is on.
        for (page_index, ops) in pages.iter().enumerate() {
            let titles: Vec<&str> = ops
                .iter()
                .filter_map(|op| match op {
                    Recorded::Text { text, .. } if text.starts_with("Engineer ") => {
                        Some(text.as_str())
                    }
                    _ => None,
                })
                .collect();
            for title in titles {
                let index: usize = title.trim_start_matches("Engineer ").parse().unwrap();
                let marker = format!("improvement {index}.3");
                assert!(
                    ops.iter().any(
                        |op| matches!(op, Recorded::Text { text, .. } if text.contains(&marker))
                    ),
                    "last bullet of {title} should be on page {}",
                    page_index + 1
                );
            }
        }
    }

    #[test]
    fn test_single_page_when_content_is_short() {
        let theme = Theme::default();
        let doc = ResumeDocument {
            name: "Grace Hopper".to_string(),
            experiences: "Engineer\nNavy\nWrote a compiler".to_string(),
            ..Default::default()
        };
        let recording = record(&doc, &theme, false);
        assert_eq!(recording.pages().len(), 1);
        assert!(!recording.ops.contains(&Recorded::NewPage));
    }

    #[test]
    fn test_empty_document_renders_chrome_only() {
        let theme = Theme::default();
        let recording = record(&ResumeDocument::default(), &theme, false);
        let pages = recording.pages();
        assert_eq!(pages.len(), 1);
        assert!(recording.texts().is_empty());
        assert!(pages[0].iter().all(|op| matches!(op, Recorded::FillRect(..))));
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let theme = Theme::default();
        let doc = ResumeDocument {
            name: "Grace Hopper".to_string(),
            skills: "COBOL".to_string(),
            ..Default::default()
        };
        let recording = record(&doc, &theme, false);
        let texts = recording.texts();
        assert!(texts.contains(&"SKILLS"));
        assert!(!texts.contains(&"CONTACT"));
        assert!(!texts.contains(&"PROFILE"));
        assert!(!texts.contains(&"WORK EXPERIENCE"));
        assert!(!texts.contains(&"EDUCATION"));
    }

    #[test]
    fn test_section_order_in_main_column() {
        let theme = Theme::default();
        let mut doc = full_document();
        doc.experiences = experiences(1, 1);
        let recording = record(&doc, &theme, false);
        let texts = recording.texts();
        let pos = |label: &str| texts.iter().position(|t| *t == label).unwrap();
        assert!(pos("CONTACT") < pos("SKILLS"));
        assert!(pos("SKILLS") < pos("LANGUAGES"));
        assert!(pos("LANGUAGES") < pos("HOBBIES"));
        assert!(pos("HOBBIES") < pos("PROFILE"));
        assert!(pos("PROFILE") < pos("WORK EXPERIENCE"));
        assert!(pos("WORK EXPERIENCE") < pos("EDUCATION"));
    }

    #[test]
    fn test_column_start_independent_of_photo() {
        let theme = Theme::default();
        let doc = full_document();
        let first_heading_y = |rec: &RecordingCanvas, label: &str| {
            rec.ops.iter().find_map(|op| match op {
                Recorded::Text { text, y, .. } if text == label => Some(*y),
                _ => None,
            })
        };
        let with_photo = record(&doc, &theme, true);
        let without_photo = record(&doc, &theme, false);
        assert_eq!(
            first_heading_y(&with_photo, "PROFILE"),
            first_heading_y(&without_photo, "PROFILE")
        );
        assert_eq!(
            first_heading_y(&with_photo, "CONTACT"),
            first_heading_y(&without_photo, "CONTACT")
        );
        assert!(with_photo.ops.iter().any(|op| matches!(op, Recorded::Image(_))));
        assert!(!without_photo.ops.iter().any(|op| matches!(op, Recorded::Image(_))));
    }

    #[test]
    fn test_name_shifts_right_of_photo() {
        let theme = Theme::default();
        let doc = full_document();
        let name_x = |rec: &RecordingCanvas| {
            rec.ops.iter().find_map(|op| match op {
                Recorded::Text { text, x, .. } if text == "Ada Lovelace" => Some(*x),
                _ => None,
            })
        };
        let with_photo = name_x(&record(&doc, &theme, true)).unwrap();
        let without_photo = name_x(&record(&doc, &theme, false)).unwrap();
        assert!((without_photo - theme.margins.left).abs() < 1e-3);
        assert!(with_photo > without_photo + PHOTO_DISPLAY_PT);
    }

    /// Header title lines: regular-face text inside the first page's header band.
    fn title_lines(recording: &RecordingCanvas, theme: &Theme) -> Vec<(String, f32)> {
        let band_bottom = theme.page.height - HEADER_BAND_HEIGHT;
        recording.pages()[0]
            .iter()
            .filter_map(|op| match op {
                Recorded::Text { text, y, font, size, .. }
                    if *font == theme.regular() && *y > band_bottom =>
                {
                    Some((text.clone(), *size))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_short_title_keeps_full_size() {
        let theme = Theme::default();
        let recording = record(&full_document(), &theme, true);
        let lines = title_lines(&recording, &theme);
        assert_eq!(lines.len(), 1, "short title should fit one line: {lines:?}");
        assert_eq!(lines[0].0, "Analytical Engine Programmer");
        assert_eq!(lines[0].1, TITLE_SIZE);
    }

    #[test]
    fn test_title_shrinks_to_fit_two_lines() {
        let theme = Theme::default();
        // 17 seven-letter words: three lines at full size beside the portrait.
        let doc = ResumeDocument {
            name: "Ada Lovelace".to_string(),
            title: vec!["abcdefg"; 17].join(" "),
            ..Default::default()
        };
        let recording = record(&doc, &theme, true);
        let lines = title_lines(&recording, &theme);
        assert_eq!(lines.len(), 2, "title should be squeezed into two lines: {lines:?}");
        assert!(lines.iter().all(|(_, size)| *size < TITLE_SIZE && *size >= TITLE_MIN_SIZE));
        let words: usize = lines.iter().map(|(text, _)| text.split_whitespace().count()).sum();
        assert_eq!(words, 17);
    }

    #[test]
    fn test_long_title_keeps_every_word() {
        let theme = Theme::default();
        let title = (0..40).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let doc = ResumeDocument {
            name: "Ada Lovelace".to_string(),
            title: title.clone(),
            ..Default::default()
        };
        let recording = record(&doc, &theme, true);
        let lines = title_lines(&recording, &theme);
        assert!(lines.len() > TITLE_MAX_LINES, "40 words cannot fit two lines: {lines:?}");
        assert!(lines.iter().all(|(_, size)| *size == TITLE_MIN_SIZE));
        let drawn: Vec<&str> = lines.iter().flat_map(|(text, _)| text.split_whitespace()).collect();
        assert_eq!(drawn, title.split_whitespace().collect::<Vec<_>>(), "no title word may be dropped");
    }

    #[test]
    fn test_short_subtitle_is_right_aligned_on_title_band() {
        let theme = Theme::default();
        let doc = ResumeDocument {
            experiences: "Engineer\nAcme - 2020".to_string(),
            ..Default::default()
        };
        let recording = record(&doc, &theme, false);
        let find = |needle: &str| {
            recording.ops.iter().find_map(|op| match op {
                Recorded::Text { text, x, y, size, font } if text == needle => {
                    Some((*x, *y, *size, *font))
                }
                _ => None,
            })
        };
        let (_, title_y, _, _) = find("Engineer").unwrap();
        let (sub_x, sub_y, sub_size, sub_font) = find("Acme - 2020").unwrap();
        assert!((title_y - sub_y).abs() < 1e-3, "subtitle should share the title band");
        let right_edge = sub_x + recording.measure_text_width("Acme - 2020", sub_font, sub_size);
        let main_right = theme.page.width - theme.margins.right;
        assert!((right_edge - main_right).abs() < 0.01, "right edge {right_edge} vs {main_right}");
    }

    #[test]
    fn test_long_subtitle_wraps_below_title() {
        let theme = Theme::default();
        let subtitle = "Very Long Company Name International Holdings Limited - Remote, \
                        Europe and North America - January 2015 to December 2022";
        let doc = ResumeDocument {
            experiences: format!("Principal Engineer\n{subtitle}"),
            ..Default::default()
        };
        let recording = record(&doc, &theme, false);
        let y_of = |pred: &dyn Fn(&str) -> bool| {
            recording.ops.iter().find_map(|op| match op {
                Recorded::Text { text, y, .. } if pred(text) => Some(*y),
                _ => None,
            })
        };
        let title_y = y_of(&|t| t == "Principal Engineer").unwrap();
        let sub_y = y_of(&|t| t.starts_with("Very Long Company")).unwrap();
        assert!(sub_y < title_y, "wrapped subtitle goes below the title");
    }

    #[test]
    fn test_bullet_glyph_only_on_first_line() {
        let theme = Theme::default();
        let doc = ResumeDocument {
            experiences: format!("Engineer\nAcme\n{}", long_bullet(0, 0)),
            ..Default::default()
        };
        let recording = record(&doc, &theme, false);
        let glyphs = recording.texts().iter().filter(|t| **t == BULLET_GLYPH).count();
        let lines = recording
            .texts()
            .iter()
            .filter(|t| t.contains("ingestion") || t.contains("latency") || t.contains("team"))
            .count();
        assert_eq!(glyphs, 1);
        assert!(lines >= 2, "bullet should wrap onto continuation lines");
    }

    #[test]
    fn test_sidebar_break_does_not_move_main_column() {
        let theme = Theme::default();
        let skills: Vec<String> = (0..80).map(|i| format!("Skill number {i}")).collect();
        let doc = ResumeDocument {
            name: "Ada".to_string(),
            skills: skills.join(", "),
            profile_text: "Short profile.".to_string(),
            ..Default::default()
        };
        let recording = record(&doc, &theme, false);
        let pages = recording.pages();
        assert!(pages.len() >= 2, "sidebar overflow should create a page");
        let on_first = |label: &str| {
            pages[0]
                .iter()
                .any(|op| matches!(op, Recorded::Text { text, .. } if text == label))
        };
        assert!(on_first("PROFILE"), "main column must still start on page 1");
        assert!(pages[1].iter().any(
            |op| matches!(op, Recorded::Text { text, .. } if text == "Skills (continued)")
        ));
    }

    #[test]
    fn test_overlong_entry_is_allowed_to_overflow() {
        let theme = Theme::default();
        let doc = ResumeDocument {
            experiences: experiences(1, 60),
            ..Default::default()
        };
        let recording = record(&doc, &theme, false);
        // A single entry never triggers a break, it runs past the bottom margin.
        assert_eq!(recording.pages().len(), 1);
        let lowest = recording
            .ops
            .iter()
            .filter_map(|op| match op {
                Recorded::Text { y, .. } => Some(*y),
                _ => None,
            })
            .fold(f32::INFINITY, f32::min);
        assert!(lowest < theme.margins.bottom);
    }

    #[test]
    fn test_render_is_deterministic() {
        let theme = Theme::default();
        let a = record(&full_document(), &theme, true);
        let b = record(&full_document(), &theme, true);
        assert_eq!(a.ops, b.ops);
    }

    #[test]
    fn test_canvas_failure_is_propagated() {
        let theme = Theme::default();
        let result = DocumentRenderer::new(&theme, &CharBudgetFlow).render(
            &full_document(),
            None,
            FailingCanvas::default(),
        );
        assert!(matches!(
            result,
            Err(RenderError::Canvas(CanvasError::Sink(_)))
        ));
    }

    #[test]
    fn test_render_resume_to_pdf() {
        let theme = Theme::default();
        let mut doc = full_document();
        doc.photo = Some(bytes::Bytes::from_static(b"not an image"));
        let rendered =
            render_resume(&doc, &theme, &CharBudgetFlow, 96, PdfCanvas::new(theme.page)).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF-"));
        assert!(rendered.page_count >= 2);
        assert!(rendered.used_placeholder);
        assert_eq!(rendered.filename, "Ada_Lovelace_Resume.pdf");
    }

    #[test]
    fn test_metric_flow_renders_too() {
        let theme = Theme::default();
        let flow = MetricFlow::new(theme.font_family);
        let mut recording = RecordingCanvas::default();
        let rendered = DocumentRenderer::new(&theme, &flow)
            .render(&full_document(), None, Capture(&mut recording))
            .unwrap();
        assert!(rendered.page_count >= 2);
        assert_eq!(rendered.page_count, recording.pages().len());
    }
}

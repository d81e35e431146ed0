// Rendering: themes, photo processing, the canvas capability, its PDF implementation and
// the document renderer that drives it. The HTTP surface lives in `handlers`.

pub mod canvas;
pub mod document;
pub mod handlers;
pub mod pdf;
pub mod photo;
pub mod theme;

pub use document::render_resume;
pub use pdf::PdfCanvas;
pub use theme::ThemePreset;

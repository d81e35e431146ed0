// Layout primitives: width tables, text wrapping, form-field parsing and column cursors.
// Everything here is pure and synchronous; the renderer composes it.

pub mod blocks;
pub mod cursor;
pub mod font_metrics;
pub mod text_flow;

// Re-export the public API consumed by the renderer and handlers.
pub use blocks::{parse_experience, parse_lines, parse_list};
pub use cursor::{CursorState, LayoutCursor};
pub use font_metrics::{get_metrics, FontFace, FontFamily};
pub use text_flow::{CharBudgetFlow, MetricFlow, TextFlow, WrappedLine};

//! Vertical write position for one column.
//!
//! Coordinates follow the PDF convention: y grows upward, so writing down the page
//! *decreases* `current_y`. A column is `Writable` until its cursor drops below
//! `bottom_margin + reserve`, at which point it is `Exhausted` and stays that way until the
//! renderer takes a page break and calls `reset`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Writable,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub current_y: f32,
    pub bottom_margin: f32,
    pub page_width: f32,
    pub page_height: f32,
}

impl LayoutCursor {
    pub fn new(start_y: f32, bottom_margin: f32, page_width: f32, page_height: f32) -> Self {
        LayoutCursor {
            current_y: start_y,
            bottom_margin,
            page_width,
            page_height,
        }
    }

    /// Moves the cursor down by `delta`. Negative deltas are ignored so the position never
    /// climbs back up within a page.
    pub fn advance(&mut self, delta: f32) {
        if delta > 0.0 {
            self.current_y -= delta;
        }
    }

    /// True when fewer than `reserve` points remain above the bottom margin.
    pub fn needs_break(&self, reserve: f32) -> bool {
        self.current_y < self.bottom_margin + reserve
    }

    pub fn state(&self, reserve: f32) -> CursorState {
        if self.needs_break(reserve) {
            CursorState::Exhausted
        } else {
            CursorState::Writable
        }
    }

    /// Starts the column over on a fresh page.
    pub fn reset(&mut self, new_start_y: f32) {
        self.current_y = new_start_y;
    }

    /// Points left above the bottom margin (negative once the column has overflowed).
    pub fn remaining(&self) -> f32 {
        self.current_y - self.bottom_margin
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

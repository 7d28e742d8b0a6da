#![forbid(unsafe_code)]

//! The drawing surface trait shared by buffers and their clip proxies.
//!
//! Components render through `&mut dyn CellTarget` so the same code can
//! write straight into a [`TerminalBuffer`](crate::TerminalBuffer) or into a
//! clipped/scrolled region of one. Only [`CellTarget::set_cell`] and
//! [`CellTarget::cell`] are required; text, fills and borders are built on
//! top of them.

use tessera_core::geometry::Rect;
use unicode_segmentation::UnicodeSegmentation;

use crate::border::{BorderSides, BorderStyle};
use crate::cell::{Cell, CellStyle};
use crate::text_width::grapheme_width;

/// A writable grid of cells.
pub trait CellTarget {
    /// Writable region in this target's coordinates.
    fn bounds(&self) -> Rect;

    /// Read a cell; `None` outside the target.
    fn cell(&self, x: i32, y: i32) -> Option<&Cell>;

    /// Write a cell; out-of-bounds writes are no-ops.
    fn set_cell(&mut self, x: i32, y: i32, cell: Cell);

    /// Column at which text runs out of room. Wide characters that would
    /// straddle it end a [`set_text`](Self::set_text) call.
    fn column_limit(&self) -> i32 {
        i32::from(self.bounds().right())
    }

    /// Write `text` starting at `(x, y)`, one grapheme cluster per cell.
    ///
    /// Control characters and stray zero-width marks are skipped. The
    /// cursor advances by each cluster's width; writing stops when a wide
    /// cluster would not fit. Returns the column after the last write.
    fn set_text(&mut self, x: i32, y: i32, text: &str, style: &CellStyle) -> i32 {
        let limit = self.column_limit();
        let mut cursor = x;
        for grapheme in text.graphemes(true) {
            let width = grapheme_width(grapheme);
            if width <= 0 {
                continue;
            }
            if cursor >= limit || (width == 2 && cursor + 1 >= limit) {
                break;
            }
            self.set_cell(cursor, y, Cell::new(grapheme).with_style(style));
            cursor += i32::from(width);
        }
        cursor
    }

    /// Fill `rect` with copies of `cell`. Wide fill glyphs step by two.
    fn fill_rect(&mut self, rect: Rect, cell: &Cell) {
        let step = usize::from(cell.width.max(1));
        for y in rect.y..rect.bottom() {
            for x in (rect.x..rect.right()).step_by(step) {
                self.set_cell(i32::from(x), i32::from(y), cell.clone());
            }
        }
    }

    /// Draw the selected edges of a box around `rect`.
    ///
    /// A corner uses its corner glyph only when both adjoining edges are
    /// drawn; otherwise the drawn edge runs through it.
    fn draw_border(
        &mut self,
        rect: Rect,
        style: BorderStyle,
        sides: BorderSides,
        cell_style: &CellStyle,
    ) {
        if rect.is_empty() || sides.is_empty() {
            return;
        }
        let chars = style.chars();
        let glyph = |c: char| Cell::from_char(c).with_style(cell_style);
        let (left, top) = (i32::from(rect.x), i32::from(rect.y));
        let right = i32::from(rect.right()) - 1;
        let bottom = i32::from(rect.bottom()) - 1;

        if sides.contains(BorderSides::TOP) {
            for x in left..=right {
                self.set_cell(x, top, glyph(chars.horizontal));
            }
        }
        if sides.contains(BorderSides::BOTTOM) {
            for x in left..=right {
                self.set_cell(x, bottom, glyph(chars.horizontal));
            }
        }
        if sides.contains(BorderSides::LEFT) {
            for y in top..=bottom {
                self.set_cell(left, y, glyph(chars.vertical));
            }
        }
        if sides.contains(BorderSides::RIGHT) {
            for y in top..=bottom {
                self.set_cell(right, y, glyph(chars.vertical));
            }
        }

        let corners = [
            (left, top, BorderSides::TOP | BorderSides::LEFT, chars.top_left),
            (right, top, BorderSides::TOP | BorderSides::RIGHT, chars.top_right),
            (left, bottom, BorderSides::BOTTOM | BorderSides::LEFT, chars.bottom_left),
            (right, bottom, BorderSides::BOTTOM | BorderSides::RIGHT, chars.bottom_right),
        ];
        for (x, y, needs, c) in corners {
            if sides.contains(needs) {
                self.set_cell(x, y, glyph(c));
            }
        }
    }
}

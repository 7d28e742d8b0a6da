#![forbid(unsafe_code)]

//! Clip and viewport proxies over any [`CellTarget`].
//!
//! - [`ClipBuffer`] restricts writes to a sub-rectangle (dialogs, panels).
//! - [`ViewportBuffer`] additionally translates content coordinates by a
//!   scroll offset, so a scrollable region renders its full content and only
//!   the visible window lands on screen.
//!
//! Both are borrowed views; they own no cells. A wide character is written
//! only if both halves fall inside the clip. Proxies nest: a viewport inside
//! a clipped dialog is `ViewportBuffer<ClipBuffer<TerminalBuffer>>`.

use tessera_core::geometry::Rect;

use crate::cell::Cell;
use crate::target::CellTarget;

/// Writes outside `clip` are dropped.
#[derive(Debug)]
pub struct ClipBuffer<'a, T: CellTarget + ?Sized> {
    inner: &'a mut T,
    clip: Rect,
}

impl<'a, T: CellTarget + ?Sized> ClipBuffer<'a, T> {
    /// Clip `inner` to `clip` (intersected with the inner bounds).
    pub fn new(inner: &'a mut T, clip: Rect) -> Self {
        let clip = clip.intersection(&inner.bounds());
        Self { inner, clip }
    }

    /// Effective clip rectangle.
    pub fn clip(&self) -> Rect {
        self.clip
    }
}

impl<T: CellTarget + ?Sized> CellTarget for ClipBuffer<'_, T> {
    fn bounds(&self) -> Rect {
        self.clip
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        if !self.clip.contains_signed(x, y) {
            return None;
        }
        self.inner.cell(x, y)
    }

    fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if !self.clip.contains_signed(x, y) {
            return;
        }
        if cell.width >= 2 && !self.clip.contains_signed(x + 1, y) {
            return;
        }
        self.inner.set_cell(x, y, cell);
    }
}

/// A scrolled window onto a content plane.
///
/// Content coordinate `(cx, cy)` lands on screen at
/// `(viewport.x + cx - scroll_x, viewport.y + cy - scroll_y)`; anything
/// outside `viewport` is dropped.
#[derive(Debug)]
pub struct ViewportBuffer<'a, T: CellTarget + ?Sized> {
    clip: ClipBuffer<'a, T>,
    origin_x: i32,
    origin_y: i32,
    scroll_x: u16,
    scroll_y: u16,
}

impl<'a, T: CellTarget + ?Sized> ViewportBuffer<'a, T> {
    /// View `inner` through `viewport`, scrolled by `(scroll_x, scroll_y)`.
    pub fn new(inner: &'a mut T, viewport: Rect, scroll_x: u16, scroll_y: u16) -> Self {
        Self {
            clip: ClipBuffer::new(inner, viewport),
            origin_x: i32::from(viewport.x),
            origin_y: i32::from(viewport.y),
            scroll_x,
            scroll_y,
        }
    }

    /// Current scroll offset.
    pub fn scroll(&self) -> (u16, u16) {
        (self.scroll_x, self.scroll_y)
    }

    #[inline]
    fn to_screen(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x - i32::from(self.scroll_x) + self.origin_x,
            y - i32::from(self.scroll_y) + self.origin_y,
        )
    }
}

impl<T: CellTarget + ?Sized> CellTarget for ViewportBuffer<'_, T> {
    /// The visible window, in content coordinates.
    fn bounds(&self) -> Rect {
        let visible = self.clip.clip();
        // Clipping may have trimmed the left/top edge of the viewport.
        let dx = (i32::from(visible.x) - self.origin_x).max(0);
        let dy = (i32::from(visible.y) - self.origin_y).max(0);
        Rect::new(
            self.scroll_x.saturating_add(dx as u16),
            self.scroll_y.saturating_add(dy as u16),
            visible.width,
            visible.height,
        )
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        let (sx, sy) = self.to_screen(x, y);
        self.clip.cell(sx, sy)
    }

    fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        let (sx, sy) = self.to_screen(x, y);
        self.clip.set_cell(sx, sy, cell);
    }
}

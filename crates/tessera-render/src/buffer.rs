#![forbid(unsafe_code)]

//! Terminal buffer grid storage.
//!
//! [`TerminalBuffer`] is a `height × width` grid of [`Cell`]s plus a parallel
//! wide-character occupancy map.
//!
//! # Layout
//!
//! Cells are stored in row-major order: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == wide.len() == width * height`
//! 2. A width-2 head at `(x, y)` is always followed by its continuation at
//!    `(x + 1, y)`, and both have `wide[i] == true`.
//! 3. No other cell has `wide[i] == true`.
//! 4. Overwriting either half of a wide pair resets both halves to blank
//!    before the new cell lands.
//!
//! Coordinates are signed: clipping and scrolling routinely produce negative
//! positions, which read as `None` and write as no-ops.

use tessera_core::geometry::{Rect, Size};

use crate::cell::Cell;
use crate::diff::BufferDiff;
use crate::target::CellTarget;

/// A 2D grid of terminal cells with wide-character tracking.
///
/// # Example
///
/// ```
/// use tessera_render::{CellStyle, CellTarget, TerminalBuffer};
///
/// let mut buffer = TerminalBuffer::new(10, 1);
/// buffer.set_text(0, 0, "日本", &CellStyle::default());
/// assert_eq!(buffer.get(0, 0).map(|c| c.width), Some(2));
/// assert!(buffer.get(1, 0).is_some_and(|c| c.is_continuation()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    wide: Vec<bool>,
}

impl TerminalBuffer {
    /// Create a blank buffer. Zero-sized buffers are allowed and ignore writes.
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::blank(); len],
            wide: vec![false; len],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounding rect at the origin.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row of cells, or `None` if `y` is out of bounds.
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(&self.cells[start..start + self.width as usize])
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Read a cell; `None` outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Whether `(x, y)` is half of a wide character.
    #[inline]
    pub fn is_wide_at(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.wide[i])
    }

    /// Reset the wide pair covering `idx` (if any) to two blank cells.
    fn clear_wide_pair(&mut self, idx: usize) {
        if !self.wide[idx] {
            return;
        }
        let head = if self.cells[idx].continuation {
            idx - 1
        } else {
            idx
        };
        for i in [head, head + 1] {
            self.cells[i] = Cell::blank();
            self.wide[i] = false;
        }
    }

    /// Write a cell.
    ///
    /// - Out of bounds: no-op.
    /// - Width 2 without room for the second half: dropped entirely.
    /// - Any wide pair under either target cell is cleared first.
    /// - Continuation cells cannot be written directly; they are created
    ///   alongside their head.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if cell.continuation {
            return;
        }
        let is_wide = cell.width >= 2;
        if is_wide && x + 1 >= i32::from(self.width) {
            return;
        }

        self.clear_wide_pair(idx);
        if is_wide {
            self.clear_wide_pair(idx + 1);
            let cont = Cell::continuation_of(&cell);
            self.cells[idx] = cell.with_width(2);
            self.cells[idx + 1] = cont;
            self.wide[idx] = true;
            self.wide[idx + 1] = true;
        } else {
            self.cells[idx] = cell;
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::blank());
        self.wide.fill(false);
    }

    /// Change dimensions, keeping the overlapping region.
    ///
    /// Wide characters whose second half would fall outside the new width
    /// are dropped.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        let old = std::mem::replace(self, Self::new(width, height));
        let keep_w = old.width.min(width);
        let keep_h = old.height.min(height);
        for y in 0..keep_h {
            for x in 0..keep_w {
                let Some(cell) = old.get(i32::from(x), i32::from(y)) else {
                    continue;
                };
                if cell.continuation {
                    continue;
                }
                // `set_cell` drops heads that no longer fit.
                self.set_cell(i32::from(x), i32::from(y), cell.clone());
            }
        }
    }

    /// Cells of `self` that differ from `previous`, in row-major order.
    ///
    /// Positions outside `previous` always count as changed.
    pub fn diff(&self, previous: &TerminalBuffer) -> Vec<BufferDiff> {
        let _span = tessera_core::debug_span!(
            target: tessera_core::logging::TARGET_RENDER,
            "buffer_diff",
            width = self.width,
            height = self.height
        );
        let _guard = _span.enter();

        let same_shape = self.width == previous.width && self.height == previous.height;
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y as usize * self.width as usize + x as usize;
                let cell = &self.cells[idx];
                let unchanged = if same_shape {
                    previous.cells[idx] == *cell
                } else {
                    previous.get(i32::from(x), i32::from(y)) == Some(cell)
                };
                if !unchanged {
                    out.push(BufferDiff::new(x, y, cell.clone()));
                }
            }
        }
        out
    }

    /// Every cell as a diff entry, in row-major order.
    pub fn all_cells(&self) -> Vec<BufferDiff> {
        let width = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| BufferDiff::new((i % width) as u16, (i / width) as u16, cell.clone()))
            .collect()
    }

    /// Become an exact copy of `other`, reusing allocations.
    pub fn copy_from(&mut self, other: &TerminalBuffer) {
        self.clone_from(other);
    }

    /// Cells that show something.
    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }

    /// Approximate heap footprint of the grid.
    pub fn memory_bytes(&self) -> usize {
        let glyph_spill: usize = self
            .cells
            .iter()
            .map(|c| c.glyph.as_str().len().saturating_sub(12))
            .sum();
        self.cells.len() * std::mem::size_of::<Cell>() + self.wide.len() + glyph_spill
    }

    /// Row as plain text, skipping continuation cells.
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| {
                row.iter()
                    .filter(|c| !c.continuation)
                    .map(|c| c.glyph.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl CellTarget for TerminalBuffer {
    fn bounds(&self) -> Rect {
        TerminalBuffer::bounds(self)
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.get(x, y)
    }

    fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        TerminalBuffer::set_cell(self, x, y, cell);
    }

    fn column_limit(&self) -> i32 {
        i32::from(self.width)
    }
}

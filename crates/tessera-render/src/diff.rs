#![forbid(unsafe_code)]

//! Diff entries between two frames.
//!
//! [`TerminalBuffer::diff`](crate::buffer::TerminalBuffer::diff) scans both
//! grids row-major and yields one [`BufferDiff`] per differing cell, already
//! sorted by `(y, x)`. The output stage may group them into [`ChangeRun`]s so
//! it positions the cursor once per run instead of once per cell.
//!
//! ```
//! use tessera_render::{CellTarget, CellStyle, TerminalBuffer, coalesce_runs};
//!
//! let previous = TerminalBuffer::new(10, 2);
//! let mut current = TerminalBuffer::new(10, 2);
//! current.set_text(3, 1, "abc", &CellStyle::default());
//!
//! let diff = current.diff(&previous);
//! assert_eq!(diff.len(), 3);
//! assert_eq!(coalesce_runs(&diff).len(), 1);
//! ```

use crate::cell::Cell;

/// One cell that differs between the current and previous frame.
///
/// Coordinates are absolute; the cell is fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDiff {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

impl BufferDiff {
    #[inline]
    pub fn new(x: u16, y: u16, cell: Cell) -> Self {
        Self { x, y, cell }
    }
}

/// A contiguous run of changed cells on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    /// Row index.
    pub y: u16,
    /// Start column (inclusive).
    pub x0: u16,
    /// End column (inclusive).
    pub x1: u16,
}

impl ChangeRun {
    #[inline]
    pub const fn new(y: u16, x0: u16, x1: u16) -> Self {
        debug_assert!(x0 <= x1);
        Self { y, x0, x1 }
    }

    /// Number of cells in this run.
    #[inline]
    pub const fn len(&self) -> u16 {
        self.x1 - self.x0 + 1
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x1 < self.x0
    }
}

/// Group row-major sorted diffs into horizontal runs.
///
/// Input order is trusted: diffs must be sorted by `(y, x)`, which is what
/// every diff producer in this crate emits.
pub fn coalesce_runs(diffs: &[BufferDiff]) -> Vec<ChangeRun> {
    let _span = tessera_core::debug_span!(
        target: tessera_core::logging::TARGET_RENDER,
        "coalesce_runs",
        changes = diffs.len()
    );
    let _guard = _span.enter();

    let mut runs = Vec::new();
    let mut iter = diffs.iter().peekable();
    while let Some(first) = iter.next() {
        let (y, x0) = (first.y, first.x);
        let mut x1 = x0;
        while let Some(next) = iter.peek() {
            if next.y != y || Some(next.x) != x1.checked_add(1) {
                break;
            }
            x1 = next.x;
            iter.next();
        }
        runs.push(ChangeRun::new(y, x0, x1));
    }

    tessera_core::trace!(
        target: tessera_core::logging::TARGET_RENDER,
        run_count = runs.len(),
        "runs coalesced"
    );
    runs
}

#![forbid(unsafe_code)]

//! Dual-buffer frame management.
//!
//! [`DualBuffer`] owns the buffer being drawn this frame ("current") and the
//! last frame handed to the terminal ("previous"). Each frame:
//!
//! 1. Components draw into [`DualBuffer::current_mut`].
//! 2. [`DualBuffer::swap_and_get_diff`] diffs current against previous,
//!    records statistics, promotes current to previous, and hands back a
//!    freshly cleared current buffer.
//! 3. The returned [`BufferDiff`] list is the only thing the output stage
//!    sees.
//!
//! Swapping flips an index; no cells are copied.

use std::collections::VecDeque;
use std::time::Instant;

use tessera_core::logging::TARGET_RENDER;

use crate::buffer::TerminalBuffer;
use crate::diff::BufferDiff;

/// Samples kept for the rolling render-time average.
pub const STATS_WINDOW: usize = 60;

/// Per-frame rendering statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderStats {
    /// `width * height` of each buffer.
    pub total_cells: usize,
    /// Cells in the current frame that show something.
    pub non_empty_cells: usize,
    /// Cells in the last diff.
    pub changed_cells: usize,
    /// Approximate footprint of both buffers.
    pub memory_bytes: usize,
    /// Diff time of the last frame.
    pub last_render_ms: f64,
    /// Mean diff time over the last [`STATS_WINDOW`] frames.
    pub average_render_ms: f64,
    /// Frames produced since creation.
    pub frames: u64,
    /// `frames` divided by seconds since creation.
    pub fps: f64,
}

/// Current/previous buffer pair with frame statistics.
#[derive(Debug, Clone)]
pub struct DualBuffer {
    buffers: [TerminalBuffer; 2],
    current: usize,
    stats: RenderStats,
    history: VecDeque<f64>,
    started: Instant,
}

impl DualBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut this = Self {
            buffers: [
                TerminalBuffer::new(width, height),
                TerminalBuffer::new(width, height),
            ],
            current: 0,
            stats: RenderStats::default(),
            history: VecDeque::with_capacity(STATS_WINDOW),
            started: Instant::now(),
        };
        this.refresh_static_stats();
        this
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.current().width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.current().height()
    }

    /// The buffer being drawn this frame.
    #[inline]
    pub fn current(&self) -> &TerminalBuffer {
        &self.buffers[self.current]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut TerminalBuffer {
        &mut self.buffers[self.current]
    }

    /// The last frame handed to the output stage.
    #[inline]
    pub fn previous(&self) -> &TerminalBuffer {
        &self.buffers[1 - self.current]
    }

    #[inline]
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Diff, record, swap, clear.
    ///
    /// After this call the frame just drawn is the display reference and
    /// [`current_mut`](Self::current_mut) is blank.
    pub fn swap_and_get_diff(&mut self) -> Vec<BufferDiff> {
        let _span = tessera_core::debug_span!(
            target: TARGET_RENDER,
            "swap_and_get_diff",
            frame = self.stats.frames
        );
        let _guard = _span.enter();

        let start = Instant::now();
        let diff = self.current().diff(self.previous());
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.stats.changed_cells = diff.len();
        self.stats.non_empty_cells = self.current().non_empty_count();
        self.record_frame(elapsed_ms);

        self.current = 1 - self.current;
        self.buffers[self.current].clear();

        tessera_core::trace!(
            target: TARGET_RENDER,
            changed = diff.len(),
            elapsed_ms,
            "frame swapped"
        );
        diff
    }

    /// Every cell of the current frame as a diff; previous is synced to match.
    ///
    /// Used after a terminal resize or when the screen contents are unknown.
    /// The buffers are not swapped, so drawing may continue on top.
    pub fn force_redraw(&mut self) -> Vec<BufferDiff> {
        let _span = tessera_core::debug_span!(target: TARGET_RENDER, "force_redraw");
        let _guard = _span.enter();

        let start = Instant::now();
        let diff = self.current().all_cells();
        let (cur, prev) = self.split();
        prev.copy_from(cur);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.stats.changed_cells = diff.len();
        self.stats.non_empty_cells = self.current().non_empty_count();
        self.record_frame(elapsed_ms);

        tessera_core::debug!(target: TARGET_RENDER, cells = diff.len(), "forced full redraw");
        diff
    }

    /// Refresh the cell-count fields without touching buffers or history.
    ///
    /// Calling this any number of times in a row yields the same stats.
    pub fn update_stats_only(&mut self) -> &RenderStats {
        let current = self.current();
        let previous = self.previous();
        let changed = current
            .cells()
            .iter()
            .zip(previous.cells())
            .filter(|(a, b)| a != b)
            .count();
        self.stats.changed_cells = changed;
        self.stats.non_empty_cells = self.current().non_empty_count();
        self.refresh_static_stats();
        &self.stats
    }

    /// Resize both buffers and recompute size-derived stats.
    pub fn resize(&mut self, width: u16, height: u16) {
        tessera_core::debug!(target: TARGET_RENDER, width, height, "dual buffer resize");
        for buf in &mut self.buffers {
            buf.resize(width, height);
        }
        self.refresh_static_stats();
        self.stats.non_empty_cells = self.current().non_empty_count();
    }

    fn split(&mut self) -> (&TerminalBuffer, &mut TerminalBuffer) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 { (a, b) } else { (b, a) }
    }

    fn refresh_static_stats(&mut self) {
        self.stats.total_cells = self.current().len();
        self.stats.memory_bytes = self.buffers.iter().map(TerminalBuffer::memory_bytes).sum();
    }

    fn record_frame(&mut self, elapsed_ms: f64) {
        if self.history.len() == STATS_WINDOW {
            self.history.pop_front();
        }
        self.history.push_back(elapsed_ms);
        self.stats.last_render_ms = elapsed_ms;
        self.stats.average_render_ms = self.history.iter().sum::<f64>() / self.history.len() as f64;
        self.stats.frames += 1;
        let secs = self.started.elapsed().as_secs_f64();
        self.stats.fps = if secs > 0.0 {
            self.stats.frames as f64 / secs
        } else {
            0.0
        };
        self.refresh_static_stats();
    }

    /// Number of samples in the rolling window.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellStyle};
    use crate::target::CellTarget;

    fn draw_frame(dual: &mut DualBuffer, text: &str) {
        dual.current_mut().set_text(0, 0, text, &CellStyle::default());
    }

    #[test]
    fn first_frame_diffs_against_blank() {
        let mut dual = DualBuffer::new(5, 1);
        draw_frame(&mut dual, "hi");
        let diff = dual.swap_and_get_diff();
        assert_eq!(diff.len(), 2);
        assert_eq!(dual.stats().changed_cells, 2);
        assert_eq!(dual.stats().non_empty_cells, 2);
        assert_eq!(dual.stats().frames, 1);
    }

    #[test]
    fn swap_promotes_current_and_clears() {
        let mut dual = DualBuffer::new(5, 1);
        draw_frame(&mut dual, "abc");
        dual.swap_and_get_diff();
        assert_eq!(dual.previous().row_text(0), "abc  ");
        assert_eq!(dual.current().row_text(0), "     ");
        assert_eq!(dual.current().non_empty_count(), 0);
    }

    #[test]
    fn identical_redraw_yields_empty_diff() {
        let mut dual = DualBuffer::new(8, 2);
        draw_frame(&mut dual, "same");
        assert_eq!(dual.swap_and_get_diff().len(), 4);
        draw_frame(&mut dual, "same");
        assert!(dual.swap_and_get_diff().is_empty());
    }

    #[test]
    fn undrawn_frame_erases_previous_content() {
        // An empty diff after swap needs the same frame drawn again; a frame
        // left blank erases what was shown.
        let mut dual = DualBuffer::new(4, 1);
        draw_frame(&mut dual, "ab");
        dual.swap_and_get_diff();
        let erase = dual.swap_and_get_diff();
        assert_eq!(erase.len(), 2);
        assert!(erase.iter().all(|d| d.cell == Cell::blank()));
        assert!(dual.swap_and_get_diff().is_empty());
    }

    #[test]
    fn force_redraw_emits_every_cell_and_syncs_previous() {
        let mut dual = DualBuffer::new(3, 3);
        for y in 0..3 {
            dual.current_mut().set_text(0, y, "xyz", &CellStyle::default());
        }
        let full = dual.force_redraw();
        assert_eq!(full.len(), 9);
        assert_eq!(dual.previous(), dual.current());
        assert!(dual.swap_and_get_diff().is_empty());
    }

    #[test]
    fn update_stats_only_is_idempotent() {
        let mut dual = DualBuffer::new(4, 2);
        draw_frame(&mut dual, "ab");
        let first = dual.update_stats_only().clone();
        let second = dual.update_stats_only().clone();
        assert_eq!(first, second);
        assert_eq!(first.changed_cells, 2);
        assert_eq!(first.frames, 0);
        assert_eq!(dual.current().row_text(0), "ab  ");
        assert_eq!(dual.history_len(), 0);
    }

    #[test]
    fn history_is_bounded() {
        let mut dual = DualBuffer::new(2, 1);
        for _ in 0..(STATS_WINDOW + 15) {
            dual.swap_and_get_diff();
        }
        assert_eq!(dual.history_len(), STATS_WINDOW);
        assert_eq!(dual.stats().frames, (STATS_WINDOW + 15) as u64);
        assert!(dual.stats().average_render_ms >= 0.0);
    }

    #[test]
    fn resize_updates_both_buffers_and_totals() {
        let mut dual = DualBuffer::new(2, 2);
        assert_eq!(dual.stats().total_cells, 4);
        let before = dual.stats().memory_bytes;
        dual.resize(10, 5);
        assert_eq!(dual.stats().total_cells, 50);
        assert!(dual.stats().memory_bytes > before);
        assert_eq!(dual.previous().width(), 10);
        assert_eq!(dual.current().height(), 5);
    }
}

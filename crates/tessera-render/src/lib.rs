#![forbid(unsafe_code)]

//! Render kernel: cells, terminal buffers, dual-buffer diffs, and color math.

pub mod border;
pub mod buffer;
pub mod cell;
pub mod clip;
pub mod color;
pub mod diff;
pub mod dual;
pub mod target;
pub mod text_width;

pub use border::{BorderChars, BorderSides, BorderStyle};
pub use buffer::TerminalBuffer;
pub use cell::{Cell, CellStyle, Glyph, PackedRgba, StyleFlags};
pub use clip::{ClipBuffer, ViewportBuffer};
pub use color::{ColorCache, ColorSpace, blend_oklab, lerp_color, parse_color, parse_color_or_default};
pub use diff::{BufferDiff, ChangeRun, coalesce_runs};
pub use dual::{DualBuffer, RenderStats};
pub use target::CellTarget;

#![forbid(unsafe_code)]

//! Core: geometry primitives, cell-coordinate coercion, and the logging facade.

pub mod coord;
pub mod geometry;
pub mod logging;

pub use coord::cell_coord;
pub use geometry::{Rect, Sides, Size};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

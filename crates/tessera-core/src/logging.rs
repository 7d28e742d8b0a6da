#![forbid(unsafe_code)]

//! Logging facade for the render kernel.
//!
//! With the `tracing` feature enabled the usual `tracing` macros are
//! re-exported here (and at the crate root). Without it, the same macro names
//! expand to nothing so hot render paths carry no logging cost.
//!
//! Log targets are grouped per engine so a subscriber can filter, e.g.
//! `RUST_LOG=tessera::dither=debug`.

/// Target for buffer, diff and swap events.
pub const TARGET_RENDER: &str = "tessera::render";
/// Target for the style cascade, animations and transitions.
pub const TARGET_STYLE: &str = "tessera::style";
/// Target for dithering and threshold-matrix loading.
pub const TARGET_DITHER: &str = "tessera::dither";
/// Target for the quadrant compositor.
pub const TARGET_CANVAS: &str = "tessera::canvas";

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Expands to nothing without the `tracing` feature.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing without the `tracing` feature.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing without the `tracing` feature.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing without the `tracing` feature.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing without the `tracing` feature.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Yields an inert span without the `tracing` feature.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::InertSpan
        };
    }

    /// Yields an inert span without the `tracing` feature.
    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::InertSpan
        };
    }
}

/// Stand-in for `tracing::Span` when logging is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct InertSpan;

#[cfg(not(feature = "tracing"))]
impl InertSpan {
    /// Entering an inert span returns an inert guard.
    pub fn enter(&self) -> InertGuard {
        InertGuard
    }
}

/// Guard returned by [`InertSpan::enter`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct InertGuard;

#[cfg(test)]
mod tests {
    #[test]
    fn targets_share_prefix() {
        for target in [
            super::TARGET_RENDER,
            super::TARGET_STYLE,
            super::TARGET_DITHER,
            super::TARGET_CANVAS,
        ] {
            assert!(target.starts_with("tessera::"));
        }
    }

    #[cfg(not(feature = "tracing"))]
    #[test]
    fn disabled_macros_compile_to_nothing() {
        crate::debug!(target: "x", "value {}", 1);
        crate::warn!("warn");
        let span = crate::debug_span!("span", width = 3);
        let _guard = span.enter();
    }
}

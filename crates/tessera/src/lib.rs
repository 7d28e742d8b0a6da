#![forbid(unsafe_code)]

//! Tessera public facade crate.
//!
//! Re-exports the render kernel's crates and defines the component render
//! contract ([`Renderable`]) with a string-keyed [`ComponentRegistry`].
//!
//! # Example
//! ```
//! use tessera::prelude::*;
//!
//! let registry = ComponentRegistry::with_builtins();
//! let mut resolver = StyleResolver::new(Theme::dark());
//! let props = Style::new().with("content", "hi");
//! let element = ElementRef::new("greeting", "text", &[], &props);
//! let style = resolver.resolve(&element, None, &ResolveContext::new(0.0));
//!
//! let mut screen = DualBuffer::new(10, 1);
//! let text = registry.create("text", &props).unwrap();
//! text.render(Rect::new(0, 0, 10, 1), &style, screen.current_mut(), &RenderContext::new(0.0));
//! assert_eq!(screen.swap_and_get_diff().len(), 2);
//! ```

pub mod builtin;
pub mod component;

pub use builtin::{Panel, Text, border, cell_style, padding};
pub use component::{
    Capabilities, ComponentFactory, ComponentRegistry, RegistryError, RenderContext, Renderable,
};

// --- Core re-exports -------------------------------------------------------

pub use tessera_core::{Rect, Sides, Size, cell_coord};

// --- Render re-exports -----------------------------------------------------

pub use tessera_render::{
    BorderSides, BorderStyle, BufferDiff, Cell, CellStyle, CellTarget, ChangeRun, ClipBuffer,
    ColorSpace, DualBuffer, PackedRgba, RenderStats, StyleFlags, TerminalBuffer, ViewportBuffer,
    coalesce_runs,
};

// --- Style re-exports ------------------------------------------------------

pub use tessera_style::{
    ElementRef, LayoutProps, ResolveContext, Style, StyleResolver, StyleSheet, StyleValue, Theme,
    compute_layout_props,
};

// --- Imaging re-exports ----------------------------------------------------

pub use tessera_canvas::{CompositorConfig, PixelCanvas, RgbaFrame};
pub use tessera_dither::{DitherAlgorithm, DitherConfig, Ditherer};

pub use tessera_canvas as canvas;
pub use tessera_core as core;
pub use tessera_dither as dither;
pub use tessera_render as render;
pub use tessera_style as style;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Capabilities, Cell, CellStyle, CellTarget, ComponentRegistry, DualBuffer, ElementRef,
        PackedRgba, Rect, RenderContext, Renderable, ResolveContext, Size, Style, StyleResolver,
        Theme,
    };

    pub use crate::{canvas, core, dither, render, style};
}

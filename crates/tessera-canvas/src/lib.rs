#![forbid(unsafe_code)]

//! Pixel canvas: a drawing layer and an image layer, composited two
//! sub-pixels wide and two tall into Unicode quadrant glyphs.

pub mod canvas;
pub mod quadrant;

pub use canvas::{PixelCanvas, RgbaFrame, SUBPIXELS_PER_CELL};
pub use quadrant::{
    CompositorConfig, DrawPixel, QUADRANT_GLYPHS, QuadrantCell, composite, luma,
};

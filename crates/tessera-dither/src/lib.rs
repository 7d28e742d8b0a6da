#![forbid(unsafe_code)]

//! Color quantization and dithering for terminal image rendering.
//!
//! Every algorithm works in place on interleaved RGBA bytes and quantizes
//! each channel to `2^bits` levels. One-bit output is grayscale: pixels are
//! thresholded on luminance and diffusion carries a single error value for
//! all three channels.
//!
//! # Example
//! ```
//! use tessera_dither::{DitherAlgorithm, DitherConfig, Ditherer};
//!
//! let mut ditherer = Ditherer::new(DitherConfig::new(DitherAlgorithm::FloydSteinberg).with_bits(1));
//! let mut pixels = [128u8, 128, 128, 255].repeat(4);
//! ditherer.dither(&mut pixels, 2, 2);
//! assert!(pixels.chunks_exact(4).all(|p| p[0] == 0 || p[0] == 255));
//! ```

pub mod config;
pub mod diffusion;
pub mod ditherer;
pub mod matrix;
pub mod ordered;
pub mod quantize;

pub use config::{ConfigError, DitherAlgorithm, DitherConfig};
pub use diffusion::{ErrorDiffuser, Kernel, Tap};
pub use ditherer::Ditherer;
pub use matrix::{MatrixCache, MatrixError, ThresholdMatrix, dither_threshold};
pub use ordered::{BAYER_8X8, dither_ordered};
pub use quantize::{Quantizer, luminance, quantize_in_place};

#![forbid(unsafe_code)]

//! Tileable threshold matrices.
//!
//! A [`ThresholdMatrix`] is a square grid of `0..=255` thresholds whose side
//! is a power of two, so lookups tile with `coord & mask`. Matrices come from
//! a grayscale PNG or from the built-in void-and-cluster blue-noise
//! generator; [`MatrixCache`] keeps each one alive after the first load.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, GrayImage, ImageFormat};

use crate::ordered::dither_with_offsets;
use crate::quantize::Quantizer;

/// Side length of the built-in blue-noise matrix.
pub const BLUE_NOISE_SIZE: usize = 64;

/// Gaussian spread used by the void-and-cluster energy filter.
const BLUE_NOISE_SIGMA: f32 = 1.5;

/// Errors raised while building a threshold matrix.
#[derive(Debug)]
pub enum MatrixError {
    Io(std::io::Error),
    Decode(image::ImageError),
    NotSquare(u32, u32),
    NotPowerOfTwo(usize),
    Empty,
}

impl From<std::io::Error> for MatrixError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for MatrixError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err)
    }
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "matrix read error: {err}"),
            Self::Decode(err) => write!(f, "matrix decode error: {err}"),
            Self::NotSquare(w, h) => write!(f, "matrix must be square, got {w}x{h}"),
            Self::NotPowerOfTwo(size) => write!(f, "matrix side {size} is not a power of two"),
            Self::Empty => f.write_str("matrix is empty"),
        }
    }
}

impl std::error::Error for MatrixError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

/// Square power-of-two grid of thresholds. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdMatrix {
    size: usize,
    mask: usize,
    values: Vec<u8>,
}

impl ThresholdMatrix {
    /// Build from row-major values.
    pub fn new(size: usize, values: Vec<u8>) -> Result<Self, MatrixError> {
        if size == 0 || values.is_empty() {
            return Err(MatrixError::Empty);
        }
        if !size.is_power_of_two() {
            return Err(MatrixError::NotPowerOfTwo(size));
        }
        if values.len() != size * size {
            let rows = (values.len() / size) as u32;
            return Err(MatrixError::NotSquare(size as u32, rows));
        }
        Ok(Self {
            size,
            mask: size - 1,
            values,
        })
    }

    pub fn from_luma(image: &GrayImage) -> Result<Self, MatrixError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(MatrixError::Empty);
        }
        if w != h {
            return Err(MatrixError::NotSquare(w, h));
        }
        Self::new(w as usize, image.as_raw().clone())
    }

    /// Color images are reduced to luminance.
    pub fn from_image(image: &DynamicImage) -> Result<Self, MatrixError> {
        Self::from_luma(&image.to_luma8())
    }

    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, MatrixError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        Self::from_image(&image)
    }

    /// Read and decode a PNG from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MatrixError> {
        let bytes = std::fs::read(path)?;
        Self::from_png_bytes(&bytes)
    }

    /// The classic 8×8 Bayer pattern scaled to `0..=255`.
    pub fn bayer8() -> Self {
        let values = crate::ordered::BAYER_8X8
            .iter()
            .flatten()
            .map(|&v| v * 4 + 2)
            .collect();
        Self {
            size: 8,
            mask: 7,
            values,
        }
    }

    /// Generate a blue-noise matrix with the void-and-cluster method.
    ///
    /// Deterministic for a given size. `size` is rounded up to a power of
    /// two (minimum 2).
    pub fn blue_noise(size: usize) -> Self {
        let size = size.max(2).next_power_of_two();
        let ranks = VoidAndCluster::new(size).ranks();
        let n = ranks.len();
        let values = ranks.into_iter().map(|r| (r * 256 / n) as u8).collect();
        Self {
            size,
            mask: size - 1,
            values,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Threshold at `(x, y)`, tiled.
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> u8 {
        self.values[(y & self.mask) * self.size + (x & self.mask)]
    }

    /// Threshold at `(x, y)` centered in `(-0.5, 0.5)`.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> f32 {
        (f32::from(self.value(x, y)) + 0.5) / 256.0 - 0.5
    }
}

/// Dither an RGBA buffer in place against a tiled threshold matrix.
pub fn dither_threshold(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    quantizer: Quantizer,
    matrix: &ThresholdMatrix,
) {
    dither_with_offsets(pixels, width, height, quantizer, |x, y| matrix.offset(x, y));
}

// ── Void and cluster ────────────────────────────────────────────────────

struct VoidAndCluster {
    size: usize,
    /// Toroidal Gaussian weights indexed by `dy * size + dx`.
    kernel: Vec<f32>,
    pattern: Vec<bool>,
    energy: Vec<f32>,
}

impl VoidAndCluster {
    fn new(size: usize) -> Self {
        let two_sigma_sq = 2.0 * BLUE_NOISE_SIGMA * BLUE_NOISE_SIGMA;
        let mut kernel = vec![0.0; size * size];
        for dy in 0..size {
            for dx in 0..size {
                let wx = dx.min(size - dx) as f32;
                let wy = dy.min(size - dy) as f32;
                kernel[dy * size + dx] = (-(wx * wx + wy * wy) / two_sigma_sq).exp();
            }
        }
        Self {
            size,
            kernel,
            pattern: vec![false; size * size],
            energy: vec![0.0; size * size],
        }
    }

    fn toggle(&mut self, index: usize, on: bool) {
        self.pattern[index] = on;
        let sign = if on { 1.0 } else { -1.0 };
        let (px, py) = (index % self.size, index / self.size);
        for y in 0..self.size {
            let dy = (y + self.size - py) & (self.size - 1);
            for x in 0..self.size {
                let dx = (x + self.size - px) & (self.size - 1);
                self.energy[y * self.size + x] += sign * self.kernel[dy * self.size + dx];
            }
        }
    }

    /// Set point with the highest energy.
    fn tightest_cluster(&self) -> Option<usize> {
        self.extreme(true, |a, b| a > b)
    }

    /// Unset point with the lowest energy.
    fn largest_void(&self) -> Option<usize> {
        self.extreme(false, |a, b| a < b)
    }

    fn extreme(&self, set: bool, better: impl Fn(f32, f32) -> bool) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &on) in self.pattern.iter().enumerate() {
            if on != set {
                continue;
            }
            if best.is_none_or(|b| better(self.energy[i], self.energy[b])) {
                best = Some(i);
            }
        }
        best
    }

    fn seed(&mut self) {
        let n = self.size * self.size;
        let target = (n / 10).max(1);
        let mut state: u32 = 0x9E37_79B9;
        let mut placed = 0;
        while placed < target {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let i = state as usize % n;
            if !self.pattern[i] {
                self.toggle(i, true);
                placed += 1;
            }
        }
    }

    /// Move points from clusters into voids until the pattern is stable.
    fn relax(&mut self) {
        for _ in 0..self.pattern.len() {
            let Some(cluster) = self.tightest_cluster() else {
                return;
            };
            self.toggle(cluster, false);
            let Some(void) = self.largest_void() else {
                self.toggle(cluster, true);
                return;
            };
            self.toggle(void, true);
            if void == cluster {
                return;
            }
        }
    }

    /// Rank every position; ranks are a permutation of `0..size²`.
    fn ranks(mut self) -> Vec<usize> {
        let n = self.pattern.len();
        self.seed();
        self.relax();
        let prototype = self.pattern.clone();
        let prototype_energy = self.energy.clone();
        let ones = prototype.iter().filter(|&&on| on).count();
        let mut ranks = vec![0; n];

        // Phase 1: peel clusters off the prototype, highest rank first.
        let mut rank = ones;
        while rank > 0 {
            let Some(cluster) = self.tightest_cluster() else {
                break;
            };
            rank -= 1;
            ranks[cluster] = rank;
            self.toggle(cluster, false);
        }

        // Phases 2 and 3: fill voids from the prototype upward.
        self.pattern = prototype;
        self.energy = prototype_energy;
        let mut rank = ones;
        while rank < n {
            let Some(void) = self.largest_void() else {
                break;
            };
            ranks[void] = rank;
            rank += 1;
            self.toggle(void, true);
        }
        ranks
    }
}

// ── Cache ───────────────────────────────────────────────────────────────

/// Loaded matrices keyed by source path, plus the lazily generated
/// built-in blue noise.
#[derive(Debug, Default)]
pub struct MatrixCache {
    by_path: HashMap<PathBuf, Arc<ThresholdMatrix>>,
    blue_noise: Option<Arc<ThresholdMatrix>>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a matrix once per path. Failures are not cached.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<ThresholdMatrix>, MatrixError> {
        let path = path.as_ref();
        if let Some(matrix) = self.by_path.get(path) {
            return Ok(Arc::clone(matrix));
        }
        let matrix = Arc::new(ThresholdMatrix::load(path)?);
        tracing::debug!(
            target: "tessera::dither",
            path = %path.display(),
            size = matrix.size(),
            "threshold matrix loaded"
        );
        self.by_path.insert(path.to_path_buf(), Arc::clone(&matrix));
        Ok(matrix)
    }

    /// The built-in 64×64 blue-noise matrix, generated on first use.
    pub fn blue_noise(&mut self) -> Arc<ThresholdMatrix> {
        Arc::clone(
            self.blue_noise
                .get_or_insert_with(|| Arc::new(ThresholdMatrix::blue_noise(BLUE_NOISE_SIZE))),
        )
    }

    /// Register a matrix under `path` without touching the filesystem.
    pub fn insert(&mut self, path: impl Into<PathBuf>, matrix: ThresholdMatrix) {
        self.by_path.insert(path.into(), Arc::new(matrix));
    }

    pub fn clear(&mut self) {
        self.by_path.clear();
        self.blue_noise = None;
    }

    /// Number of path-keyed matrices.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(image: GrayImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(ThresholdMatrix::new(0, vec![]), Err(MatrixError::Empty)));
        assert!(matches!(
            ThresholdMatrix::new(3, vec![0; 9]),
            Err(MatrixError::NotPowerOfTwo(3))
        ));
        assert!(matches!(
            ThresholdMatrix::new(4, vec![0; 8]),
            Err(MatrixError::NotSquare(4, 2))
        ));
        let wide = GrayImage::new(4, 2);
        assert!(matches!(
            ThresholdMatrix::from_luma(&wide),
            Err(MatrixError::NotSquare(4, 2))
        ));
    }

    #[test]
    fn lookups_tile_with_mask() {
        let m = ThresholdMatrix::new(2, vec![10, 20, 30, 40]).unwrap();
        assert_eq!(m.value(0, 0), 10);
        assert_eq!(m.value(3, 0), 20);
        assert_eq!(m.value(2, 3), 30);
        assert_eq!(m.value(5, 5), 40);
        assert!(m.offset(0, 0) < 0.0);
    }

    #[test]
    fn decodes_png() {
        let image = GrayImage::from_fn(4, 4, |x, y| image::Luma([(y * 4 + x) as u8 * 16]));
        let m = ThresholdMatrix::from_png_bytes(&png_bytes(image)).unwrap();
        assert_eq!(m.size(), 4);
        assert_eq!(m.value(1, 2), 144);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = ThresholdMatrix::from_png_bytes(b"not a png").unwrap_err();
        assert!(matches!(err, MatrixError::Decode(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ThresholdMatrix::load("/nonexistent/tessera/matrix.png").unwrap_err();
        assert!(matches!(err, MatrixError::Io(_)));
    }

    #[test]
    fn bayer8_spans_full_range() {
        let m = ThresholdMatrix::bayer8();
        assert_eq!(m.size(), 8);
        assert_eq!(m.value(0, 0), 2);
        assert_eq!(m.value(0, 7), 254);
    }

    #[test]
    fn blue_noise_ranks_are_a_permutation() {
        let m = ThresholdMatrix::blue_noise(16);
        assert_eq!(m.size(), 16);
        let mut seen = [false; 256];
        for &v in m.values() {
            assert!(!seen[v as usize], "duplicate threshold {v}");
            seen[v as usize] = true;
        }
        assert_eq!(ThresholdMatrix::blue_noise(16), m);
    }

    #[test]
    fn blue_noise_rounds_size_up() {
        assert_eq!(ThresholdMatrix::blue_noise(5).size(), 8);
        assert_eq!(ThresholdMatrix::blue_noise(0).size(), 2);
    }

    #[test]
    fn cache_shares_entries() {
        let mut cache = MatrixCache::new();
        assert!(cache.is_empty());
        cache.insert("/virtual/bayer.png", ThresholdMatrix::bayer8());
        let a = cache.load("/virtual/bayer.png").unwrap();
        let b = cache.load("/virtual/bayer.png").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.load("/nonexistent/tessera.png").is_err());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}

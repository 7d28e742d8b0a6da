#![forbid(unsafe_code)]

//! Per-channel quantization to `2^bits` levels.

/// Lowest supported bit depth. One bit is grayscale black/white.
pub const MIN_BITS: u8 = 1;
/// Highest supported bit depth (no quantization).
pub const MAX_BITS: u8 = 8;

/// Black/white cut for one-bit output.
pub const MONO_THRESHOLD: f32 = 128.0;

/// Rec. 601 luma.
#[inline]
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Quantization parameters shared by every dithering algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    bits: u8,
    min_alpha: u8,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new(MAX_BITS)
    }
}

impl Quantizer {
    /// `bits` is clamped to `[1, 8]`.
    pub fn new(bits: u8) -> Self {
        Self {
            bits: bits.clamp(MIN_BITS, MAX_BITS),
            min_alpha: 0,
        }
    }

    /// Leave pixels whose opacity is below `threshold` (in `[0, 1]`) untouched.
    #[must_use]
    pub fn with_opacity_skip(mut self, threshold: f32) -> Self {
        let t = if threshold.is_nan() { 0.0 } else { threshold.clamp(0.0, 1.0) };
        self.min_alpha = (t * 255.0).ceil() as u8;
        self
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// One-bit output takes the grayscale path.
    pub fn is_mono(&self) -> bool {
        self.bits == 1
    }

    pub fn levels(&self) -> u32 {
        1 << self.bits
    }

    /// Distance between adjacent output levels.
    pub fn step(&self) -> f32 {
        255.0 / (self.levels() - 1) as f32
    }

    /// Nearest output level for `v` (clamped to `[0, 255]`).
    pub fn quantize(&self, v: f32) -> u8 {
        let v = v.clamp(0.0, 255.0);
        let step = self.step();
        ((v / step).round() * step).round().clamp(0.0, 255.0) as u8
    }

    /// One-bit output for a luminance.
    pub fn mono(&self, lum: f32) -> u8 {
        if lum >= MONO_THRESHOLD { 255 } else { 0 }
    }

    pub fn skips(&self, alpha: u8) -> bool {
        alpha < self.min_alpha
    }
}

/// Quantize every channel without dithering.
pub fn quantize_in_place(pixels: &mut [u8], width: usize, height: usize, quantizer: Quantizer) {
    let rows = usable_rows(pixels, width, height);
    for px in pixels[..rows * width * 4].chunks_exact_mut(4) {
        if quantizer.skips(px[3]) {
            continue;
        }
        if quantizer.is_mono() {
            let lum = luminance(f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
            px[..3].fill(quantizer.mono(lum));
        } else {
            for c in &mut px[..3] {
                *c = quantizer.quantize(f32::from(*c));
            }
        }
    }
}

/// Number of complete rows `pixels` holds, capped at `height`.
pub(crate) fn usable_rows(pixels: &[u8], width: usize, height: usize) -> usize {
    if width == 0 {
        return 0;
    }
    height.min(pixels.len() / (width * 4))
}

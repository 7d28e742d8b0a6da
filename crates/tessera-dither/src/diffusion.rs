#![forbid(unsafe_code)]

//! Error diffusion.
//!
//! One engine runs every kernel: each pixel is quantized and its residual is
//! pushed to not-yet-visited neighbours according to the kernel's taps. Row
//! error buffers live in [`ErrorDiffuser`] and are reused across calls.

use crate::quantize::{Quantizer, luminance, usable_rows};

/// One error-distribution offset. `dy == 0` taps must point right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub dx: i8,
    pub dy: u8,
    pub weight: f32,
}

const fn tap(dx: i8, dy: u8, num: f32, den: f32) -> Tap {
    Tap {
        dx,
        dy,
        weight: num / den,
    }
}

/// A named set of taps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    pub name: &'static str,
    pub taps: &'static [Tap],
}

impl Kernel {
    pub const FLOYD_STEINBERG: Self = Self {
        name: "floyd-steinberg",
        taps: &[
            tap(1, 0, 7.0, 16.0),
            tap(-1, 1, 3.0, 16.0),
            tap(0, 1, 5.0, 16.0),
            tap(1, 1, 1.0, 16.0),
        ],
    };

    /// Atkinson's six taps, each weighted 1/6 so the full residual is kept.
    pub const ATKINSON: Self = Self {
        name: "atkinson",
        taps: &[
            tap(1, 0, 1.0, 6.0),
            tap(2, 0, 1.0, 6.0),
            tap(-1, 1, 1.0, 6.0),
            tap(0, 1, 1.0, 6.0),
            tap(1, 1, 1.0, 6.0),
            tap(0, 2, 1.0, 6.0),
        ],
    };

    /// Three-row Sierra.
    pub const SIERRA: Self = Self {
        name: "sierra",
        taps: &[
            tap(1, 0, 5.0, 32.0),
            tap(2, 0, 3.0, 32.0),
            tap(-2, 1, 2.0, 32.0),
            tap(-1, 1, 4.0, 32.0),
            tap(0, 1, 5.0, 32.0),
            tap(1, 1, 4.0, 32.0),
            tap(2, 1, 2.0, 32.0),
            tap(-1, 2, 2.0, 32.0),
            tap(0, 2, 3.0, 32.0),
            tap(1, 2, 2.0, 32.0),
        ],
    };

    pub const ALL: [Self; 3] = [Self::FLOYD_STEINBERG, Self::ATKINSON, Self::SIERRA];

    /// Deepest row a tap reaches.
    pub fn max_dy(&self) -> usize {
        self.taps.iter().map(|t| t.dy as usize).max().unwrap_or(0)
    }

    /// Horizontal reach in either direction.
    pub fn pad_x(&self) -> usize {
        self.taps
            .iter()
            .map(|t| t.dx.unsigned_abs() as usize)
            .max()
            .unwrap_or(0)
    }

    pub fn weight_sum(&self) -> f32 {
        self.taps.iter().map(|t| t.weight).sum()
    }
}

/// Reusable row-error scratch.
///
/// Rows are `width + 2 * pad` wide, so taps never need bounds checks; the
/// padding columns absorb error that falls off the image edge.
#[derive(Debug, Default, Clone)]
pub struct ErrorDiffuser {
    rows: Vec<Vec<f32>>,
}

impl ErrorDiffuser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Floats currently allocated for scratch rows.
    pub fn scratch_capacity(&self) -> usize {
        self.rows.iter().map(Vec::capacity).sum()
    }

    /// Grow (never shrink) and zero the scratch for one pass.
    fn prepare(&mut self, rows: usize, row_len: usize) {
        if self.rows.len() < rows {
            self.rows.resize_with(rows, Vec::new);
        }
        for row in &mut self.rows[..rows] {
            row.clear();
            row.resize(row_len, 0.0);
        }
    }

    /// Diffuse `pixels` (RGBA) in place.
    ///
    /// `vertical_scale` multiplies every tap with `dy > 0`; `1.0` is the
    /// plain kernel and the stable variants pass the configured decay.
    pub fn dither(
        &mut self,
        pixels: &mut [u8],
        width: usize,
        height: usize,
        quantizer: Quantizer,
        kernel: &Kernel,
        vertical_scale: f32,
    ) {
        let rows = usable_rows(pixels, width, height);
        if rows == 0 {
            return;
        }
        let pad = kernel.pad_x();
        let depth = kernel.max_dy() + 1;
        let row_len = (width + 2 * pad) * 3;
        self.prepare(depth, row_len);
        let buffers = &mut self.rows[..depth];
        let mono = quantizer.is_mono();

        for y in 0..rows {
            for x in 0..width {
                let p = (y * width + x) * 4;
                let px = &mut pixels[p..p + 4];
                if quantizer.skips(px[3]) {
                    continue;
                }
                let e = (x + pad) * 3;
                let current = &buffers[0][e..e + 3];
                let mut residual = [0.0f32; 3];
                if mono {
                    let lum = luminance(
                        f32::from(px[0]) + current[0],
                        f32::from(px[1]) + current[1],
                        f32::from(px[2]) + current[2],
                    )
                    .clamp(0.0, 255.0);
                    let out = quantizer.mono(lum);
                    px[..3].fill(out);
                    residual = [lum - f32::from(out); 3];
                } else {
                    for c in 0..3 {
                        let v = (f32::from(px[c]) + current[c]).clamp(0.0, 255.0);
                        let out = quantizer.quantize(v);
                        px[c] = out;
                        residual[c] = v - f32::from(out);
                    }
                }

                for t in kernel.taps {
                    let weight = if t.dy > 0 {
                        t.weight * vertical_scale
                    } else {
                        t.weight
                    };
                    let tx = (x + pad).wrapping_add_signed(isize::from(t.dx)) * 3;
                    let row = &mut buffers[t.dy as usize][tx..tx + 3];
                    for c in 0..3 {
                        row[c] += residual[c] * weight;
                    }
                }
            }
            buffers.rotate_left(1);
            if let Some(last) = buffers.last_mut() {
                last.fill(0.0);
            }
        }
    }
}

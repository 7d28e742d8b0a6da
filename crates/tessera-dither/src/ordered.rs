#![forbid(unsafe_code)]

//! Ordered dithering with a tiled threshold pattern.
//!
//! Output depends only on pixel value and position, so a static image
//! dithers identically every frame.

use crate::quantize::{Quantizer, luminance, usable_rows};

/// Classic 8×8 Bayer index matrix (values `0..64`).
pub const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Bayer threshold at `(x, y)`, centered in `(-0.5, 0.5)`.
#[inline]
pub fn bayer_offset(x: usize, y: usize) -> f32 {
    (f32::from(BAYER_8X8[y & 7][x & 7]) + 0.5) / 64.0 - 0.5
}

/// Apply a centered threshold pattern to an RGBA buffer in place.
///
/// Each channel gets `offset(x, y) * step` added before quantization; in
/// one-bit mode the offset is scaled to the full range and applied to the
/// pixel's luminance instead.
pub fn dither_with_offsets(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    quantizer: Quantizer,
    offset: impl Fn(usize, usize) -> f32,
) {
    let rows = usable_rows(pixels, width, height);
    let step = quantizer.step();
    for y in 0..rows {
        for x in 0..width {
            let p = (y * width + x) * 4;
            let px = &mut pixels[p..p + 4];
            if quantizer.skips(px[3]) {
                continue;
            }
            let t = offset(x, y);
            if quantizer.is_mono() {
                let lum = luminance(f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
                let out = quantizer.mono(lum + t * 255.0);
                px[..3].fill(out);
            } else {
                for c in &mut px[..3] {
                    *c = quantizer.quantize(f32::from(*c) + t * step);
                }
            }
        }
    }
}

/// Ordered (8×8 Bayer) dithering.
pub fn dither_ordered(pixels: &mut [u8], width: usize, height: usize, quantizer: Quantizer) {
    dither_with_offsets(pixels, width, height, quantizer, bayer_offset);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
        rgba.iter().copied().cycle().take(width * height * 4).collect()
    }

    #[test]
    fn bayer_is_a_permutation() {
        let mut seen = [false; 64];
        for row in BAYER_8X8 {
            for v in row {
                assert!(!seen[v as usize]);
                seen[v as usize] = true;
            }
        }
        assert!(bayer_offset(0, 0) < 0.0 && bayer_offset(7, 7) > 0.0);
    }

    #[test]
    fn mid_gray_one_bit_is_half_white() {
        let mut px = solid(8, 8, [128, 128, 128, 255]);
        dither_ordered(&mut px, 8, 8, Quantizer::new(1));
        let white = px.chunks_exact(4).filter(|p| p[0] == 255).count();
        assert!((30..=34).contains(&white), "white={white}");
        assert!(px.chunks_exact(4).all(|p| p[0] == p[1] && p[1] == p[2] && p[3] == 255));
    }

    #[test]
    fn deterministic_per_position() {
        let mut a = solid(16, 4, [90, 160, 30, 255]);
        let mut b = a.clone();
        dither_ordered(&mut a, 16, 4, Quantizer::new(2));
        dither_ordered(&mut b, 16, 4, Quantizer::new(2));
        assert_eq!(a, b);
        // The pattern tiles every 8 pixels.
        assert_eq!(a[..32], a[32..64]);
    }

    #[test]
    fn eight_bits_keeps_values_close() {
        let mut px = solid(8, 8, [100, 150, 200, 255]);
        dither_ordered(&mut px, 8, 8, Quantizer::new(8));
        for p in px.chunks_exact(4) {
            assert!(p[0].abs_diff(100) <= 1 && p[1].abs_diff(150) <= 1 && p[2].abs_diff(200) <= 1);
        }
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let mut px = solid(2, 1, [128, 128, 128, 0]);
        dither_ordered(&mut px, 2, 1, Quantizer::new(1).with_opacity_skip(0.05));
        assert_eq!(px, solid(2, 1, [128, 128, 128, 0]));
    }
}

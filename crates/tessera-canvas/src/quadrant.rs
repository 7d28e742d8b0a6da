#![forbid(unsafe_code)]

//! 2×2 sub-pixel to quadrant-glyph compositing.
//!
//! Each terminal cell covers four sub-pixels, read in the order top-left,
//! top-right, bottom-left, bottom-right. Every sub-pixel may carry a
//! drawing-layer pixel, an image-layer color, both, or neither. One cell can
//! show only two colors, so [`composite`] picks a foreground set and a
//! background color:
//!
//! 1. Colored drawing pixels over image pixels: drawn positions form the
//!    foreground, the image supplies the background. No quantization.
//! 2. Image only: a luma median split divides the samples into a bright
//!    foreground group and a dark background group, each averaged.
//! 3. Anything else: drawing wins per sub-pixel; the first drawing color is
//!    the foreground and the first exposed image color the background.

use tessera_render::PackedRgba;
use tessera_render::color::{DEFAULT_OPACITY_SKIP_THRESHOLD, blend_oklab_with_threshold};

pub const TOP_LEFT: u8 = 1;
pub const TOP_RIGHT: u8 = 2;
pub const BOTTOM_LEFT: u8 = 4;
pub const BOTTOM_RIGHT: u8 = 8;

const CORNER_BITS: [u8; 4] = [TOP_LEFT, TOP_RIGHT, BOTTOM_LEFT, BOTTOM_RIGHT];

/// Quadrant glyph for each on/off pattern.
pub const QUADRANT_GLYPHS: [char; 16] = [
    ' ', '▘', '▝', '▀', '▖', '▌', '▞', '▛', '▗', '▚', '▐', '▜', '▄', '▙', '▟', '█',
];

/// A drawing-layer sub-pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawPixel {
    #[default]
    Off,
    /// Lit in the terminal's default foreground color.
    Default,
    Color(PackedRgba),
}

impl DrawPixel {
    pub fn is_on(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Explicit, non-transparent color.
    pub fn color(self) -> Option<PackedRgba> {
        match self {
            Self::Color(c) if !c.is_transparent() => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositorConfig {
    /// Image pixels with opacity below this are treated as transparent.
    pub opacity_skip_threshold: f32,
    /// Backdrop for translucent image pixels when the target cell has no
    /// background of its own.
    pub backdrop: PackedRgba,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            opacity_skip_threshold: DEFAULT_OPACITY_SKIP_THRESHOLD,
            backdrop: PackedRgba::BLACK,
        }
    }
}

impl CompositorConfig {
    /// Resolve an image pixel to an opaque color, or `None` when it is
    /// effectively transparent.
    pub fn effective_color(&self, color: PackedRgba, backdrop: PackedRgba) -> Option<PackedRgba> {
        let opacity = f32::from(color.a()) / 255.0;
        if color.is_transparent() || opacity < self.opacity_skip_threshold {
            return None;
        }
        Some(blend_oklab_with_threshold(
            color,
            backdrop,
            opacity,
            self.opacity_skip_threshold,
        ))
    }
}

/// Result of compositing one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadrantCell {
    pub glyph: char,
    /// `None` is the terminal default foreground.
    pub fg: Option<PackedRgba>,
    pub bg: Option<PackedRgba>,
}

/// Perceived brightness, `(R*77 + G*150 + B*29) >> 8`.
#[inline]
pub fn luma(c: PackedRgba) -> u8 {
    ((u32::from(c.r()) * 77 + u32::from(c.g()) * 150 + u32::from(c.b()) * 29) >> 8) as u8
}

fn average(colors: impl Iterator<Item = PackedRgba>) -> Option<PackedRgba> {
    let (mut r, mut g, mut b, mut n) = (0u32, 0u32, 0u32, 0u32);
    for c in colors {
        r += u32::from(c.r());
        g += u32::from(c.g());
        b += u32::from(c.b());
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let avg = |sum: u32| ((sum + n / 2) / n) as u8;
    Some(PackedRgba::rgb(avg(r), avg(g), avg(b)))
}

fn bits_where(pred: impl Fn(usize) -> bool) -> u8 {
    (0..4).filter(|&i| pred(i)).fold(0, |bits, i| bits | CORNER_BITS[i])
}

/// Composite four sub-pixels into one cell.
///
/// `image` holds already-resolved opaque colors (`None` = transparent).
/// Returns `None` for a fully empty cell with no background, which callers
/// skip so the content underneath stays visible.
pub fn composite(draw: [DrawPixel; 4], image: [Option<PackedRgba>; 4]) -> Option<QuadrantCell> {
    let any_drawn = draw.iter().any(|p| p.is_on());
    let any_draw_color = draw.iter().any(|p| p.color().is_some());
    let any_image = image.iter().any(Option::is_some);

    let cell = if any_draw_color && any_image {
        two_color(draw, image)
    } else if !any_drawn && any_image {
        image_only(image)
    } else {
        layered(draw, image)
    };
    (cell.glyph != ' ' || cell.bg.is_some()).then_some(cell)
}

fn first_draw_color(draw: &[DrawPixel; 4]) -> Option<PackedRgba> {
    draw.iter().find_map(|p| p.color())
}

fn first_exposed_image(draw: &[DrawPixel; 4], image: &[Option<PackedRgba>; 4]) -> Option<PackedRgba> {
    (0..4).filter(|&i| !draw[i].is_on()).find_map(|i| image[i])
}

fn two_color(draw: [DrawPixel; 4], image: [Option<PackedRgba>; 4]) -> QuadrantCell {
    let bits = bits_where(|i| draw[i].is_on());
    let bg = first_exposed_image(&draw, &image).or_else(|| image.iter().find_map(|c| *c));
    QuadrantCell {
        glyph: QUADRANT_GLYPHS[usize::from(bits)],
        fg: first_draw_color(&draw),
        bg,
    }
}

fn image_only(image: [Option<PackedRgba>; 4]) -> QuadrantCell {
    if image.iter().any(Option::is_none) {
        // Transparent samples stay empty; the rest share one color.
        let bits = bits_where(|i| image[i].is_some());
        return QuadrantCell {
            glyph: QUADRANT_GLYPHS[usize::from(bits)],
            fg: average(image.iter().flatten().copied()),
            bg: None,
        };
    }
    let colors = image.map(|c| c.unwrap_or(PackedRgba::BLACK));
    let lumas = colors.map(|c| u16::from(luma(c)));
    let mut sorted = lumas;
    sorted.sort_unstable();
    let median = (sorted[1] + sorted[2]) / 2;
    let mut bits = bits_where(|i| lumas[i] > median);
    if bits == 0 || bits == 0b1111 {
        let mean = lumas.iter().sum::<u16>() / 4;
        bits = bits_where(|i| lumas[i] > mean);
    }
    let bright = average((0..4).filter(|&i| bits & CORNER_BITS[i] != 0).map(|i| colors[i]));
    let dark = average((0..4).filter(|&i| bits & CORNER_BITS[i] == 0).map(|i| colors[i]));
    QuadrantCell {
        glyph: QUADRANT_GLYPHS[usize::from(bits)],
        fg: bright,
        bg: dark,
    }
}

fn layered(draw: [DrawPixel; 4], image: [Option<PackedRgba>; 4]) -> QuadrantCell {
    let bits = bits_where(|i| draw[i].is_on());
    QuadrantCell {
        glyph: QUADRANT_GLYPHS[usize::from(bits)],
        fg: first_draw_color(&draw),
        bg: first_exposed_image(&draw, &image),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: PackedRgba = PackedRgba::rgb(255, 0, 0);
    const BLUE: PackedRgba = PackedRgba::rgb(0, 0, 255);
    const OFF: DrawPixel = DrawPixel::Off;

    #[test]
    fn glyph_table_matches_corner_bits() {
        assert_eq!(QUADRANT_GLYPHS[usize::from(TOP_LEFT)], '▘');
        assert_eq!(QUADRANT_GLYPHS[usize::from(TOP_RIGHT)], '▝');
        assert_eq!(QUADRANT_GLYPHS[usize::from(BOTTOM_LEFT)], '▖');
        assert_eq!(QUADRANT_GLYPHS[usize::from(BOTTOM_RIGHT)], '▗');
        assert_eq!(QUADRANT_GLYPHS[usize::from(TOP_LEFT | BOTTOM_RIGHT)], '▚');
        assert_eq!(QUADRANT_GLYPHS[15], '█');
    }

    #[test]
    fn luma_weights() {
        assert_eq!(luma(PackedRgba::WHITE), 255);
        assert_eq!(luma(PackedRgba::BLACK), 0);
        assert_eq!(luma(PackedRgba::rgb(0, 255, 0)), 149);
    }

    #[test]
    fn empty_cell_is_skipped() {
        assert_eq!(composite([OFF; 4], [None; 4]), None);
    }

    #[test]
    fn drawing_over_image_uses_two_colors() {
        let draw = [DrawPixel::Color(RED), OFF, OFF, DrawPixel::Color(RED)];
        let cell = composite(draw, [Some(BLUE); 4]).unwrap();
        assert_eq!(cell.glyph, '▚');
        assert_eq!(cell.fg, Some(RED));
        assert_eq!(cell.bg, Some(BLUE));
    }

    #[test]
    fn image_median_split() {
        let white = PackedRgba::WHITE;
        let dark = PackedRgba::rgb(10, 10, 10);
        let cell = composite([OFF; 4], [Some(white), Some(dark), Some(dark), Some(white)]).unwrap();
        assert_eq!(cell.glyph, '▚');
        assert_eq!(cell.fg, Some(white));
        assert_eq!(cell.bg, Some(dark));
    }

    #[test]
    fn image_split_falls_back_to_mean() {
        let dark = PackedRgba::rgb(20, 20, 20);
        let light = PackedRgba::rgb(200, 200, 200);
        // Median lands on the bright value and leaves the bright group empty.
        let cell = composite([OFF; 4], [Some(dark), Some(light), Some(light), Some(light)]).unwrap();
        assert_eq!(cell.glyph, '▟');
        assert_eq!(cell.fg, Some(light));
        assert_eq!(cell.bg, Some(dark));
    }

    #[test]
    fn uniform_image_is_background_only() {
        let gray = PackedRgba::rgb(90, 90, 90);
        let cell = composite([OFF; 4], [Some(gray); 4]).unwrap();
        assert_eq!(cell.glyph, ' ');
        assert_eq!(cell.bg, Some(gray));
        assert_eq!(cell.fg, None);
    }

    #[test]
    fn partial_image_keeps_transparent_corners_empty() {
        let cell = composite([OFF; 4], [Some(RED), None, None, Some(BLUE)]).unwrap();
        assert_eq!(cell.glyph, '▚');
        assert_eq!(cell.fg, Some(PackedRgba::rgb(128, 0, 128)));
        assert_eq!(cell.bg, None);
    }

    #[test]
    fn default_pixels_over_image_expose_background() {
        let draw = [DrawPixel::Default, DrawPixel::Default, OFF, OFF];
        let image = [Some(RED), Some(RED), Some(BLUE), None];
        let cell = composite(draw, image).unwrap();
        assert_eq!(cell.glyph, '▀');
        assert_eq!(cell.fg, None);
        assert_eq!(cell.bg, Some(BLUE));
    }

    #[test]
    fn drawing_alone_uses_first_color() {
        let draw = [OFF, DrawPixel::Default, DrawPixel::Color(BLUE), DrawPixel::Color(RED)];
        let cell = composite(draw, [None; 4]).unwrap();
        assert_eq!(cell.glyph, '▟');
        assert_eq!(cell.fg, Some(BLUE));
        assert_eq!(cell.bg, None);
    }

    #[test]
    fn translucent_pixels_blend_or_vanish() {
        let config = CompositorConfig::default();
        assert_eq!(config.effective_color(RED.with_alpha(5), PackedRgba::BLACK), None);
        assert_eq!(config.effective_color(RED, PackedRgba::BLACK), Some(RED));
        let half = config
            .effective_color(PackedRgba::WHITE.with_alpha(128), PackedRgba::BLACK)
            .unwrap();
        assert!(half.r() > 0 && half.r() < 255);
        assert_eq!(half.a(), 255);
    }
}

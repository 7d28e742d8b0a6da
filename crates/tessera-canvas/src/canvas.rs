#![forbid(unsafe_code)]

//! Sub-pixel canvas with a drawing layer and an image layer.
//!
//! The canvas is addressed in sub-pixels; every terminal cell covers a
//! 2×2 block of them. Shapes go to the drawing layer, RGBA frames to the
//! image layer, and [`PixelCanvas::render`] composites both into quadrant
//! glyphs.
//!
//! # Example
//!
//! ```
//! use tessera_canvas::{CompositorConfig, PixelCanvas};
//! use tessera_core::Rect;
//! use tessera_render::{CellTarget, TerminalBuffer};
//!
//! let mut canvas = PixelCanvas::new(8, 4);
//! canvas.rect(0, 0, 8, 4);
//!
//! let mut buf = TerminalBuffer::new(4, 2);
//! canvas.render(Rect::new(0, 0, 4, 2), &mut buf, &CompositorConfig::default());
//! assert_eq!(buf.cell(0, 0).map(|c| c.glyph.as_str()), Some("▛"));
//! assert_eq!(buf.cell(1, 0).map(|c| c.glyph.as_str()), Some("▀"));
//! ```

use tessera_core::Rect;
use tessera_dither::Ditherer;
use tessera_render::{Cell, CellTarget, PackedRgba};

use crate::quadrant::{CompositorConfig, DrawPixel, QuadrantCell, composite};

/// Sub-pixel columns and rows per terminal cell.
pub const SUBPIXELS_PER_CELL: u16 = 2;

/// A borrowed interleaved RGBA frame.
#[derive(Debug, Clone, Copy)]
pub struct RgbaFrame<'a> {
    pub width: usize,
    pub height: usize,
    pub pixels: &'a [u8],
}

impl<'a> RgbaFrame<'a> {
    pub fn new(width: usize, height: usize, pixels: &'a [u8]) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Pixel at `(x, y)`; short buffers read as transparent.
    fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        match self.pixels.get(i..i + 4) {
            Some(&[r, g, b, a]) => [r, g, b, a],
            _ => [0; 4],
        }
    }
}

impl<'a> From<&'a image::RgbaImage> for RgbaFrame<'a> {
    fn from(image: &'a image::RgbaImage) -> Self {
        Self::new(image.width() as usize, image.height() as usize, image.as_raw())
    }
}

#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u16,
    height: u16,
    draw: Vec<DrawPixel>,
    /// Straight-alpha colors; alpha 0 is empty.
    image: Vec<PackedRgba>,
}

impl PixelCanvas {
    /// Create a canvas of `width × height` sub-pixels.
    pub fn new(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            draw: vec![DrawPixel::Off; len],
            image: vec![PackedRgba::TRANSPARENT; len],
        }
    }

    /// A canvas covering `area` terminal cells.
    pub fn for_area(area: Rect) -> Self {
        Self::new(
            area.width.saturating_mul(SUBPIXELS_PER_CELL),
            area.height.saturating_mul(SUBPIXELS_PER_CELL),
        )
    }

    /// Sub-pixel dimensions.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Terminal cells needed to show the whole canvas.
    pub fn cell_size(&self) -> (u16, u16) {
        (
            self.width.div_ceil(SUBPIXELS_PER_CELL),
            self.height.div_ceil(SUBPIXELS_PER_CELL),
        )
    }

    pub fn clear(&mut self) {
        self.clear_drawing();
        self.clear_image();
    }

    pub fn clear_drawing(&mut self) {
        self.draw.fill(DrawPixel::Off);
    }

    pub fn clear_image(&mut self) {
        self.image.fill(PackedRgba::TRANSPARENT);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some(y as usize * usize::from(self.width) + x as usize)
    }

    /// Drawing-layer pixel; `Off` outside the canvas.
    pub fn get(&self, x: i32, y: i32) -> DrawPixel {
        self.index(x, y).map_or(DrawPixel::Off, |i| self.draw[i])
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_on()
    }

    /// Image-layer color; transparent outside the canvas.
    pub fn image_pixel(&self, x: i32, y: i32) -> PackedRgba {
        self.index(x, y)
            .map_or(PackedRgba::TRANSPARENT, |i| self.image[i])
    }

    pub fn set_image_pixel(&mut self, x: i32, y: i32, color: PackedRgba) {
        if let Some(i) = self.index(x, y) {
            self.image[i] = color;
        }
    }

    fn plot(&mut self, x: i32, y: i32, pixel: DrawPixel) {
        if let Some(i) = self.index(x, y) {
            self.draw[i] = pixel;
        }
    }

    fn pen(color: Option<PackedRgba>) -> DrawPixel {
        color.map_or(DrawPixel::Default, DrawPixel::Color)
    }

    /// Light a sub-pixel in the default foreground.
    pub fn point(&mut self, x: i32, y: i32) {
        self.plot(x, y, DrawPixel::Default);
    }

    pub fn point_colored(&mut self, x: i32, y: i32, color: PackedRgba) {
        self.plot(x, y, DrawPixel::Color(color));
    }

    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.line_colored(x0, y0, x1, y1, None);
    }

    /// Bresenham line, both endpoints inclusive.
    pub fn line_colored(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Option<PackedRgba>) {
        let pixel = Self::pen(color);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.plot(x, y, pixel);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Rectangle outline of `w × h` sub-pixels.
    pub fn rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.rect_colored(x, y, w, h, None);
    }

    pub fn rect_colored(&mut self, x: i32, y: i32, w: i32, h: i32, color: Option<PackedRgba>) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (x1, y1) = (x + w - 1, y + h - 1);
        self.line_colored(x, y, x1, y, color);
        self.line_colored(x1, y, x1, y1, color);
        self.line_colored(x1, y1, x, y1, color);
        self.line_colored(x, y1, x, y, color);
    }

    pub fn rect_filled(&mut self, x: i32, y: i32, w: i32, h: i32, color: Option<PackedRgba>) {
        let pixel = Self::pen(color);
        for py in y..y.saturating_add(h) {
            for px in x..x.saturating_add(w) {
                self.plot(px, py, pixel);
            }
        }
    }

    /// Midpoint circle outline.
    pub fn circle(&mut self, cx: i32, cy: i32, radius: i32, color: Option<PackedRgba>) {
        let pixel = Self::pen(color);
        if radius <= 0 {
            self.plot(cx, cy, pixel);
            return;
        }
        let (mut x, mut y) = (radius, 0);
        let mut d = 1 - radius;
        while x >= y {
            for (ox, oy) in [(x, y), (y, x)] {
                self.plot(cx + ox, cy + oy, pixel);
                self.plot(cx - ox, cy + oy, pixel);
                self.plot(cx + ox, cy - oy, pixel);
                self.plot(cx - ox, cy - oy, pixel);
            }
            y += 1;
            if d < 0 {
                d += 2 * y + 1;
            } else {
                x -= 1;
                d += 2 * (y - x) + 1;
            }
        }
    }

    /// Scale `frame` (nearest neighbour) into `dest` on the image layer.
    ///
    /// `dest` is in sub-pixels and is clipped to the canvas. When a
    /// [`Ditherer`] is given the scaled pixels are dithered before they are
    /// stored.
    pub fn draw_image(
        &mut self,
        frame: RgbaFrame<'_>,
        dest: Rect,
        ditherer: Option<&mut Ditherer>,
    ) {
        if dest.is_empty() || frame.width == 0 || frame.height == 0 {
            return;
        }
        let (dw, dh) = (usize::from(dest.width), usize::from(dest.height));
        let mut scaled = Vec::with_capacity(dw * dh * 4);
        for y in 0..dh {
            let sy = y * frame.height / dh;
            for x in 0..dw {
                let sx = x * frame.width / dw;
                scaled.extend_from_slice(&frame.pixel(sx, sy));
            }
        }
        if let Some(ditherer) = ditherer {
            ditherer.dither(&mut scaled, dw, dh);
        }
        for (i, px) in scaled.chunks_exact(4).enumerate() {
            let x = i32::from(dest.x) + (i % dw) as i32;
            let y = i32::from(dest.y) + (i / dw) as i32;
            self.set_image_pixel(x, y, PackedRgba::rgba(px[0], px[1], px[2], px[3]));
        }
    }

    /// Composite the cell whose top-left sub-pixel is `(px, py)`.
    fn cell_at(
        &self,
        px: i32,
        py: i32,
        backdrop: PackedRgba,
        config: &CompositorConfig,
    ) -> Option<QuadrantCell> {
        let corners = [(px, py), (px + 1, py), (px, py + 1), (px + 1, py + 1)];
        let draw = corners.map(|(x, y)| self.get(x, y));
        let image =
            corners.map(|(x, y)| config.effective_color(self.image_pixel(x, y), backdrop));
        composite(draw, image)
    }

    /// Write the canvas into `area` of `target`, one cell per 2×2 block.
    ///
    /// Cells with nothing to show are left untouched.
    pub fn render(&self, area: Rect, target: &mut dyn CellTarget, config: &CompositorConfig) {
        if area.is_empty() {
            return;
        }
        let (cols, rows) = self.cell_size();
        let cols = area.width.min(cols);
        let rows = area.height.min(rows);
        let step = i32::from(SUBPIXELS_PER_CELL);

        for cy in 0..rows {
            for cx in 0..cols {
                let x = i32::from(area.x) + i32::from(cx);
                let y = i32::from(area.y) + i32::from(cy);
                let backdrop = target
                    .cell(x, y)
                    .and_then(|c| c.bg)
                    .unwrap_or(config.backdrop);
                let (px, py) = (i32::from(cx) * step, i32::from(cy) * step);
                let Some(q) = self.cell_at(px, py, backdrop, config) else {
                    continue;
                };
                let mut cell = Cell::from_char(q.glyph);
                cell.fg = q.fg;
                cell.bg = q.bg;
                target.set_cell(x, y, cell);
            }
        }
    }
}

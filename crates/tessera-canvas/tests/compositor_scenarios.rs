//! Canvas compositing through the render kernel's buffers and proxies.

use proptest::prelude::*;
use tessera_canvas::{CompositorConfig, DrawPixel, PixelCanvas, QUADRANT_GLYPHS, RgbaFrame, composite};
use tessera_core::Rect;
use tessera_render::{CellTarget, ClipBuffer, DualBuffer, PackedRgba, TerminalBuffer};

const GREEN: PackedRgba = PackedRgba::rgb(0, 200, 0);

fn glyph(buf: &TerminalBuffer, x: i32, y: i32) -> String {
    buf.cell(x, y)
        .map(|c| c.glyph.as_str().to_string())
        .unwrap_or_default()
}

#[test]
fn line_over_image_keeps_both_colors() {
    let mut canvas = PixelCanvas::new(4, 2);
    let sky = [40u8, 60, 200, 255].repeat(8);
    canvas.draw_image(RgbaFrame::new(4, 2, &sky), Rect::new(0, 0, 4, 2), None);
    canvas.line_colored(0, 0, 3, 0, Some(GREEN));

    let mut buf = TerminalBuffer::new(2, 1);
    canvas.render(Rect::new(0, 0, 2, 1), &mut buf, &CompositorConfig::default());
    for x in 0..2 {
        let cell = buf.cell(x, 0).unwrap();
        assert_eq!(cell.glyph.as_str(), "▀");
        assert_eq!(cell.fg, Some(GREEN));
        assert_eq!(cell.bg, Some(PackedRgba::rgb(40, 60, 200)));
    }
}

#[test]
fn translucent_image_blends_over_existing_background() {
    let mut canvas = PixelCanvas::new(2, 2);
    for y in 0..2 {
        for x in 0..2 {
            canvas.set_image_pixel(x, y, PackedRgba::rgba(255, 255, 255, 128));
        }
    }
    let mut buf = TerminalBuffer::new(1, 1);
    buf.set_cell(0, 0, tessera_render::Cell::from_char(' ').with_bg(PackedRgba::BLACK));
    canvas.render(Rect::new(0, 0, 1, 1), &mut buf, &CompositorConfig::default());
    let bg = buf.cell(0, 0).and_then(|c| c.bg).unwrap();
    assert!(bg.r() > 0 && bg.r() < 255, "{bg:?}");

    // Nearly invisible pixels are skipped outright.
    let mut faint = PixelCanvas::new(2, 2);
    faint.set_image_pixel(0, 0, PackedRgba::rgba(255, 255, 255, 10));
    let mut buf = TerminalBuffer::new(1, 1);
    faint.render(Rect::new(0, 0, 1, 1), &mut buf, &CompositorConfig::default());
    assert_eq!(buf.non_empty_count(), 0);
}

#[test]
fn render_through_clip_proxy() {
    let mut canvas = PixelCanvas::new(8, 2);
    canvas.rect_filled(0, 0, 8, 2, None);
    let mut buf = TerminalBuffer::new(4, 1);
    {
        let mut clip = ClipBuffer::new(&mut buf, Rect::new(1, 0, 2, 1));
        canvas.render(Rect::new(0, 0, 4, 1), &mut clip, &CompositorConfig::default());
    }
    assert_eq!(glyph(&buf, 0, 0), " ");
    assert_eq!(glyph(&buf, 1, 0), "█");
    assert_eq!(glyph(&buf, 2, 0), "█");
    assert_eq!(glyph(&buf, 3, 0), " ");
}

#[test]
fn redrawing_the_same_canvas_produces_no_diff() {
    let mut canvas = PixelCanvas::new(10, 6);
    canvas.circle(5, 3, 2, Some(GREEN));
    let mut dual = DualBuffer::new(5, 3);
    let area = Rect::new(0, 0, 5, 3);

    canvas.render(area, dual.current_mut(), &CompositorConfig::default());
    assert!(!dual.swap_and_get_diff().is_empty());
    canvas.render(area, dual.current_mut(), &CompositorConfig::default());
    assert!(dual.swap_and_get_diff().is_empty());
}

fn draw_pixel() -> impl Strategy<Value = DrawPixel> {
    prop_oneof![
        Just(DrawPixel::Off),
        Just(DrawPixel::Default),
        any::<(u8, u8, u8)>().prop_map(|(r, g, b)| DrawPixel::Color(PackedRgba::rgb(r, g, b))),
    ]
}

fn image_pixel() -> impl Strategy<Value = Option<PackedRgba>> {
    prop::option::of(any::<(u8, u8, u8)>().prop_map(|(r, g, b)| PackedRgba::rgb(r, g, b)))
}

proptest! {
    #[test]
    fn drawn_corners_are_always_foreground(
        draw in prop::array::uniform4(draw_pixel()),
        image in prop::array::uniform4(image_pixel()),
    ) {
        let cell = composite(draw, image);
        if draw.iter().any(|p| p.is_on()) {
            let cell = cell.unwrap();
            let bits = QUADRANT_GLYPHS.iter().position(|&g| g == cell.glyph).unwrap();
            for (i, p) in draw.iter().enumerate() {
                prop_assert_eq!(bits & (1 << i) != 0, p.is_on());
            }
        } else if image.iter().all(Option::is_none) {
            prop_assert!(cell.is_none());
        }
    }

    #[test]
    fn image_only_colors_come_from_samples(image in prop::array::uniform4(image_pixel())) {
        if let Some(cell) = composite([DrawPixel::Off; 4], image) {
            let samples: Vec<PackedRgba> = image.iter().flatten().copied().collect();
            let lo = |f: fn(PackedRgba) -> u8| samples.iter().map(|&c| f(c)).min().unwrap_or(0);
            let hi = |f: fn(PackedRgba) -> u8| samples.iter().map(|&c| f(c)).max().unwrap_or(255);
            for color in [cell.fg, cell.bg].into_iter().flatten() {
                prop_assert!((lo(PackedRgba::r)..=hi(PackedRgba::r)).contains(&color.r()));
                prop_assert!((lo(PackedRgba::g)..=hi(PackedRgba::g)).contains(&color.g()));
                prop_assert!((lo(PackedRgba::b)..=hi(PackedRgba::b)).contains(&color.b()));
            }
        }
    }
}

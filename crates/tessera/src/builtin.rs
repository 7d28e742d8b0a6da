#![forbid(unsafe_code)]

//! Built-in components and the bridge from resolved styles to cell styles.

use tessera_core::{Rect, Sides, Size};
use tessera_render::text_width::display_width;
use tessera_render::{
    BorderSides, BorderStyle, Cell, CellStyle, CellTarget, ClipBuffer, StyleFlags,
};
use tessera_style::Style;

use crate::component::{Capabilities, ComponentFactory, RenderContext, Renderable};

pub(crate) const BUILTINS: [(&str, Capabilities, ComponentFactory); 2] = [
    ("text", Capabilities::empty(), Text::factory),
    ("panel", Capabilities::CONTAINER, Panel::factory),
];

/// Colors and text flags of a resolved style.
pub fn cell_style(style: &Style) -> CellStyle {
    let mut flags = StyleFlags::empty();
    if style.str("fontWeight") == Some("bold") {
        flags |= StyleFlags::BOLD;
    }
    if style.str("fontStyle") == Some("italic") {
        flags |= StyleFlags::ITALIC;
    }
    if style.str("textDecoration") == Some("underline") {
        flags |= StyleFlags::UNDERLINE;
    }
    if style.bool("dim") == Some(true) {
        flags |= StyleFlags::DIM;
    }
    if style.bool("reverse") == Some(true) {
        flags |= StyleFlags::REVERSE;
    }
    CellStyle {
        fg: style.color("color"),
        bg: style
            .color("background")
            .or_else(|| style.color("backgroundColor")),
        flags,
    }
}

/// Border glyph set and edges requested by `border` and the per-side
/// `borderTop`/`borderRight`/`borderBottom`/`borderLeft` flags.
///
/// A side flag set to `false` removes that edge. Without a usable `border`
/// value, sides flagged `true` get a thin border.
pub fn border(style: &Style) -> Option<(BorderStyle, BorderSides)> {
    const SIDES: [(&str, BorderSides); 4] = [
        ("borderTop", BorderSides::TOP),
        ("borderRight", BorderSides::RIGHT),
        ("borderBottom", BorderSides::BOTTOM),
        ("borderLeft", BorderSides::LEFT),
    ];
    let base = style
        .str("border")
        .filter(|s| *s != "none")
        .and_then(|s| s.parse::<BorderStyle>().ok());
    let (kind, mut sides) = match base {
        Some(kind) => (kind, BorderSides::ALL),
        None => (BorderStyle::Thin, BorderSides::empty()),
    };
    for (key, side) in SIDES {
        match style.bool(key) {
            Some(true) => sides |= side,
            Some(false) => sides -= side,
            None => {}
        }
    }
    (!sides.is_empty()).then_some((kind, sides))
}

/// Resolved `padding` in whole cells. Fractions round to nearest and
/// negative amounts count as zero.
pub fn padding(style: &Style) -> Sides {
    fn cells(v: f32) -> u16 {
        if v.is_finite() && v > 0.0 {
            v.round().min(f32::from(u16::MAX)) as u16
        } else {
            0
        }
    }
    style.spacing("padding").map_or_else(Sides::default, |p| {
        Sides::new(cells(p.top), cells(p.right), cells(p.bottom), cells(p.left))
    })
}

/// One cell for each drawn border edge.
fn border_insets(style: &Style) -> Sides {
    let Some((_, sides)) = border(style) else {
        return Sides::default();
    };
    let edge = |side: BorderSides| u16::from(sides.contains(side));
    Sides::new(
        edge(BorderSides::TOP),
        edge(BorderSides::RIGHT),
        edge(BorderSides::BOTTOM),
        edge(BorderSides::LEFT),
    )
}

/// Plain text, one line per `\n`, drawn inside the padding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub content: String,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    fn factory(props: &Style) -> Box<dyn Renderable> {
        Box::new(Self::new(props.str("content").unwrap_or_default()))
    }
}

impl Renderable for Text {
    fn render(
        &self,
        bounds: Rect,
        style: &Style,
        target: &mut dyn CellTarget,
        _ctx: &RenderContext<'_>,
    ) {
        let cell_style = cell_style(style);
        let content = bounds.inner(padding(style));
        let mut clip = ClipBuffer::new(target, content);
        for (row, line) in self.content.lines().enumerate().take(usize::from(content.height)) {
            let y = i32::from(content.y) + row as i32;
            clip.set_text(i32::from(content.x), y, line, &cell_style);
        }
    }

    fn intrinsic_size(&self, _ctx: &RenderContext<'_>) -> Size {
        let width = self.content.lines().map(display_width).max().unwrap_or(0);
        let height = self.content.lines().count();
        Size::new(
            u16::try_from(width).unwrap_or(u16::MAX),
            u16::try_from(height).unwrap_or(u16::MAX),
        )
    }
}

/// A box with an optional background fill and border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Panel;

impl Panel {
    fn factory(_: &Style) -> Box<dyn Renderable> {
        Box::new(Self)
    }

    /// Area left for children once the border and padding are removed.
    pub fn content_area(bounds: Rect, style: &Style) -> Rect {
        bounds.inner(border_insets(style).plus(padding(style)))
    }
}

impl Renderable for Panel {
    fn render(
        &self,
        bounds: Rect,
        style: &Style,
        target: &mut dyn CellTarget,
        _ctx: &RenderContext<'_>,
    ) {
        let base = cell_style(style);
        let mut clip = ClipBuffer::new(target, bounds);
        if let Some(bg) = base.bg {
            clip.fill_rect(bounds, &Cell::from_char(' ').with_bg(bg));
        }
        if let Some((kind, sides)) = border(style) {
            let mut edge = base;
            if let Some(color) = style.color("borderColor") {
                edge.fg = Some(color);
            }
            clip.draw_border(bounds, kind, sides, &edge);
        }
    }

    fn intrinsic_size(&self, _ctx: &RenderContext<'_>) -> Size {
        Size::new(2, 2)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::CONTAINER
    }
}

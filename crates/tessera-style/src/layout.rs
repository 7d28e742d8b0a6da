#![forbid(unsafe_code)]

//! Layout properties derived from a resolved [`Style`].
//!
//! [`compute_layout_props`] merges, lowest priority first: inherited props
//! (alignment only, see [`LayoutProps::inheritable`]), the element's own
//! props, then values read from the style. Percentages pass through as
//! [`Dimension::Relative`] for the layout engine to resolve.

use crate::value::{Spacing, Style, StyleValue};

/// A size constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    Auto,
    /// Absolute size in cells.
    Cells(f32),
    /// Unparsed relative size such as `"50%"`.
    Relative(String),
}

impl Dimension {
    /// Numbers and numeric strings become cells, `auto` is auto, anything
    /// else passes through unparsed.
    pub fn from_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Number(n) => Some(Self::Cells(*n)),
            StyleValue::Str(s) => Some(Self::parse(s)),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        if t.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else if let Ok(n) = t.parse::<f32>() {
            Self::Cells(n)
        } else {
            Self::Relative(t.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Flex,
    Block,
    None,
}

impl Display {
    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "flex" => Some(Self::Flex),
            "block" => Some(Self::Block),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Main axis of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

impl FlexDirection {
    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "row" => Some(Self::Row),
            "column" => Some(Self::Column),
            "row-reverse" => Some(Self::RowReverse),
            "column-reverse" => Some(Self::ColumnReverse),
            _ => None,
        }
    }

    /// `direction: horizontal | vertical` sugar.
    fn from_direction(s: &str) -> Option<Self> {
        match s.trim() {
            "horizontal" => Some(Self::Row),
            "vertical" => Some(Self::Column),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Relative,
    Absolute,
}

/// Layout inputs for one element. `None` means "not specified".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutProps {
    pub display: Option<Display>,
    pub position: Option<Position>,
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,

    pub flex_direction: Option<FlexDirection>,
    pub flex_wrap: Option<String>,
    pub justify_content: Option<String>,
    pub align_items: Option<String>,
    pub align_content: Option<String>,
    pub gap: Option<f32>,

    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Option<Dimension>,
    pub align_self: Option<String>,

    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub max_height: Option<Dimension>,

    pub padding: Option<Spacing>,
    pub margin: Option<Spacing>,
}

macro_rules! overlay_fields {
    ($dst:ident, $src:ident; $($field:ident),+ $(,)?) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field.clone();
            }
        )+
    };
}

impl LayoutProps {
    /// Copy every specified field of `other` over `self`.
    pub fn overlay(&mut self, other: &LayoutProps) {
        overlay_fields!(self, other;
            display, position, top, right, bottom, left,
            flex_direction, flex_wrap, justify_content, align_items, align_content, gap,
            flex_grow, flex_shrink, flex_basis, align_self,
            width, height, min_width, max_width, min_height, max_height,
            padding, margin,
        );
    }

    /// The subset a child inherits: container alignment and wrapping.
    ///
    /// Size, position, direction, gap, box model, display and flex-item
    /// properties never inherit.
    pub fn inheritable(&self) -> LayoutProps {
        LayoutProps {
            flex_wrap: self.flex_wrap.clone(),
            justify_content: self.justify_content.clone(),
            align_items: self.align_items.clone(),
            align_content: self.align_content.clone(),
            ..LayoutProps::default()
        }
    }

    fn has_container_props(&self) -> bool {
        self.flex_direction.is_some()
            || self.justify_content.is_some()
            || self.align_items.is_some()
            || self.align_content.is_some()
            || self.flex_wrap.is_some()
            || self.gap.is_some()
    }
}

/// Parse the `flex` shorthand into `(grow, shrink, basis)`.
///
/// `"1"` is `1 1 0`, `"none"` is `0 0 auto`, `"auto"` is `1 1 auto`; two or
/// three values follow CSS (`"2 3"`, `"2 30%"`, `"1 1 auto"`).
pub fn parse_flex_shorthand(value: &StyleValue) -> Option<(f32, f32, Dimension)> {
    let text = match value {
        StyleValue::Number(n) => return Some((*n, 1.0, Dimension::Cells(0.0))),
        StyleValue::Str(s) => s.trim(),
        _ => return None,
    };
    match text {
        "none" => return Some((0.0, 0.0, Dimension::Auto)),
        "auto" => return Some((1.0, 1.0, Dimension::Auto)),
        "initial" => return Some((0.0, 1.0, Dimension::Auto)),
        _ => {}
    }
    let parts: Vec<&str> = text.split_whitespace().collect();
    let num = |s: &str| s.parse::<f32>().ok();
    match parts[..] {
        [g] => Some((num(g)?, 1.0, Dimension::Cells(0.0))),
        [g, second] => match num(second) {
            Some(s) => Some((num(g)?, s, Dimension::Cells(0.0))),
            None => Some((num(g)?, 1.0, Dimension::parse(second))),
        },
        [g, s, basis] => Some((num(g)?, num(s)?, Dimension::parse(basis))),
        _ => None,
    }
}

fn string_prop(style: &Style, name: &str) -> Option<String> {
    style.str(name).map(|s| s.trim().to_string())
}

/// Layout properties read directly from `style`.
pub fn style_layout_props(style: &Style) -> LayoutProps {
    let mut props = LayoutProps {
        display: style.str("display").and_then(Display::parse),
        position: style.str("position").and_then(|p| match p.trim() {
            "absolute" => Some(Position::Absolute),
            "relative" => Some(Position::Relative),
            _ => None,
        }),
        top: style.number("top"),
        right: style.number("right"),
        bottom: style.number("bottom"),
        left: style.number("left"),
        flex_wrap: string_prop(style, "flexWrap"),
        justify_content: string_prop(style, "justifyContent"),
        align_items: string_prop(style, "alignItems"),
        align_content: string_prop(style, "alignContent"),
        align_self: string_prop(style, "alignSelf"),
        gap: style.number("gap"),
        padding: style.spacing("padding"),
        margin: style.spacing("margin"),
        ..LayoutProps::default()
    };

    let dim = |name: &str| style.get(name).and_then(Dimension::from_value);
    props.width = dim("width");
    props.height = dim("height");
    props.min_width = dim("minWidth");
    props.max_width = dim("maxWidth");
    props.min_height = dim("minHeight");
    props.max_height = dim("maxHeight");

    if let Some((grow, shrink, basis)) = style.get("flex").and_then(parse_flex_shorthand) {
        props.flex_grow = Some(grow);
        props.flex_shrink = Some(shrink);
        props.flex_basis = Some(basis);
    }
    if let Some(grow) = style.number("flexGrow") {
        props.flex_grow = Some(grow);
    }
    if let Some(shrink) = style.number("flexShrink") {
        props.flex_shrink = Some(shrink);
    }
    if let Some(basis) = dim("flexBasis") {
        props.flex_basis = Some(basis);
    }

    props.flex_direction = style
        .str("flexDirection")
        .and_then(FlexDirection::parse)
        .or_else(|| style.str("direction").and_then(FlexDirection::from_direction));
    props
}

/// Merge inherited, element and style-derived layout props.
///
/// If any flex-container property is set on the element or its style and
/// `display` is not explicitly `none`, `display` becomes `flex`.
pub fn compute_layout_props(
    style: &Style,
    element_props: &LayoutProps,
    inherited: Option<&LayoutProps>,
) -> LayoutProps {
    let mut props = inherited.map(LayoutProps::inheritable).unwrap_or_default();
    props.overlay(element_props);
    let from_style = style_layout_props(style);
    props.overlay(&from_style);

    let declares_container = element_props.has_container_props() || from_style.has_container_props();
    if declares_container && props.display != Some(Display::None) {
        props.display = Some(Display::Flex);
    }
    props
}

#![forbid(unsafe_code)]

//! Theme colors and per-type defaults: the first two cascade layers.

use std::collections::HashMap;

use tessera_render::PackedRgba;

use crate::value::{Spacing, Style};

/// Base text and background colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub foreground: PackedRgba,
    /// `None` leaves the terminal background showing through.
    pub background: Option<PackedRgba>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub const fn new(foreground: PackedRgba, background: Option<PackedRgba>) -> Self {
        Self {
            foreground,
            background,
        }
    }

    /// Light text on the terminal's own background.
    pub const fn dark() -> Self {
        Self::new(PackedRgba::rgb(220, 220, 220), None)
    }

    pub const fn light() -> Self {
        Self::new(PackedRgba::rgb(30, 30, 30), Some(PackedRgba::rgb(250, 250, 250)))
    }

    /// Layer 1 of the cascade.
    ///
    /// Normal weight and style, no decoration, no border, zero padding.
    pub fn default_style(&self) -> Style {
        let mut style = Style::new()
            .with("color", self.foreground)
            .with("fontWeight", "normal")
            .with("fontStyle", "normal")
            .with("textDecoration", "none")
            .with("border", "none")
            .with("padding", Spacing::ZERO);
        if let Some(bg) = self.background {
            style.set("background", bg);
        }
        style
    }
}

/// Element-type defaults (layer 2 of the cascade).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefaults {
    by_kind: HashMap<String, Style>,
}

impl Default for TypeDefaults {
    /// `container`, `dialog` and `tabs` lay out as a flex column.
    fn default() -> Self {
        let column = Style::new()
            .with("display", "flex")
            .with("flexDirection", "column");
        let mut defaults = Self::empty();
        for kind in ["container", "dialog", "tabs"] {
            defaults.set(kind, column.clone());
        }
        defaults
    }
}

impl TypeDefaults {
    pub fn empty() -> Self {
        Self {
            by_kind: HashMap::new(),
        }
    }

    pub fn set(&mut self, kind: impl Into<String>, style: Style) {
        self.by_kind.insert(kind.into(), style);
    }

    pub fn get(&self, kind: &str) -> Option<&Style> {
        self.by_kind.get(kind)
    }
}

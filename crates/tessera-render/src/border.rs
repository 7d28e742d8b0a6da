#![forbid(unsafe_code)]

//! Border glyph tables.
//!
//! Three base line weights (thin, thick, double) plus derived sets that swap
//! corners (rounded) or edge strokes (dashed, dotted), and a plain-ASCII
//! fallback. [`BorderStyle`] selects a table; [`BorderSides`] selects edges.

use std::str::FromStr;

/// Characters used to draw a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    pub const THIN: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    pub const THICK: Self = Self {
        top_left: '┏',
        top_right: '┓',
        bottom_left: '┗',
        bottom_right: '┛',
        horizontal: '━',
        vertical: '┃',
    };

    pub const DOUBLE: Self = Self {
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
        horizontal: '═',
        vertical: '║',
    };

    /// Thin strokes with arc corners.
    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        ..Self::THIN
    };

    /// Thin corners with dashed strokes.
    pub const DASHED: Self = Self {
        horizontal: '╌',
        vertical: '╎',
        ..Self::THIN
    };

    /// Thin corners with dotted strokes.
    pub const DOTTED: Self = Self {
        horizontal: '┈',
        vertical: '┊',
        ..Self::THIN
    };

    pub const ASCII: Self = Self {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        horizontal: '-',
        vertical: '|',
    };
}

/// Named border style, as written in a `border` style property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    Thin,
    Thick,
    Double,
    Rounded,
    Ascii,
    Dashed,
    Dotted,
}

impl BorderStyle {
    /// Glyph table for this style.
    pub const fn chars(self) -> BorderChars {
        match self {
            Self::Thin => BorderChars::THIN,
            Self::Thick => BorderChars::THICK,
            Self::Double => BorderChars::DOUBLE,
            Self::Rounded => BorderChars::ROUNDED,
            Self::Ascii => BorderChars::ASCII,
            Self::Dashed => BorderChars::DASHED,
            Self::Dotted => BorderChars::DOTTED,
        }
    }
}

/// Unrecognized border style name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBorderStyle(pub String);

impl std::fmt::Display for UnknownBorderStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown border style: {}", self.0)
    }
}

impl std::error::Error for UnknownBorderStyle {}

impl FromStr for BorderStyle {
    type Err = UnknownBorderStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thin" | "single" | "solid" | "line" => Ok(Self::Thin),
            "thick" | "heavy" | "bold" => Ok(Self::Thick),
            "double" => Ok(Self::Double),
            "rounded" | "round" => Ok(Self::Rounded),
            "ascii" => Ok(Self::Ascii),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            _ => Err(UnknownBorderStyle(s.to_string())),
        }
    }
}

bitflags::bitflags! {
    /// Which edges of a border to draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BorderSides: u8 {
        const TOP    = 0b0001;
        const RIGHT  = 0b0010;
        const BOTTOM = 0b0100;
        const LEFT   = 0b1000;
        const ALL    = Self::TOP.bits() | Self::RIGHT.bits() | Self::BOTTOM.bits() | Self::LEFT.bits();
    }
}

impl Default for BorderSides {
    fn default() -> Self {
        Self::ALL
    }
}

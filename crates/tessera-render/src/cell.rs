#![forbid(unsafe_code)]

//! Cell types and invariants.
//!
//! A [`Cell`] is one terminal grid position: a glyph (one user-perceived
//! character), optional colors, style flags, and its display width.
//!
//! # Wide characters
//!
//! A width-2 glyph occupies two adjacent cells in the same row. The first
//! cell holds the glyph with `width == 2`; the second is a continuation
//! cell with an empty glyph, `width == 0`, and `continuation == true`.
//! [`TerminalBuffer`](crate::buffer::TerminalBuffer) maintains this pairing.

use smallvec::SmallVec;

use crate::text_width::grapheme_width;

/// UTF-8 bytes of one grapheme cluster, stored inline for common sizes.
///
/// Twelve bytes covers every single code point and most combining sequences;
/// longer ZWJ emoji sequences spill to the heap.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Glyph(SmallVec<[u8; 12]>);

impl Glyph {
    /// The empty glyph used by continuation cells.
    #[inline]
    pub fn empty() -> Self {
        Self(SmallVec::new())
    }

    /// A single space, the content of a cleared cell.
    #[inline]
    pub fn space() -> Self {
        Self::from_char(' ')
    }

    /// Build a glyph from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(SmallVec::from_slice(s.as_bytes()))
    }

    /// Build a glyph from a single character.
    #[inline]
    pub fn from_char(c: char) -> Self {
        let mut bytes = [0u8; 4];
        Self::new(c.encode_utf8(&mut bytes))
    }

    /// The glyph as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ever constructed from `&str`/`char`, so this never falls back.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Whether the glyph holds no characters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the glyph is blank (empty or a single space).
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.0.is_empty() || self.0.as_slice() == b" "
    }

    /// Append a zero-width code point (combining mark, joiner) to this glyph.
    pub fn push_str(&mut self, s: &str) {
        self.0.extend_from_slice(s.as_bytes());
    }
}

impl core::fmt::Debug for Glyph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Glyph({:?})", self.as_str())
    }
}

impl From<&str> for Glyph {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<char> for Glyph {
    fn from(c: char) -> Self {
        Self::from_char(c)
    }
}

/// A compact RGBA color.
///
/// - **Size:** 4 bytes.
/// - **Layout:** `0xRRGGBBAA` (R in bits 31..24, A in bits 7..0).
///
/// Straight (non-premultiplied) alpha. Compositing uses Porter-Duff
/// SourceOver (`src over dst`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Fully transparent (alpha = 0).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white. Also the fallback for malformed color strings.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Whether alpha is zero.
    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a() == 0
    }

    /// Same color with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }

    #[inline]
    const fn div_round_u8(numer: u64, denom: u64) -> u8 {
        let v = (numer + (denom / 2)) / denom;
        if v > 255 { 255 } else { v as u8 }
    }

    /// Porter-Duff SourceOver: `self over dst`, rounded once at the end.
    #[inline]
    pub fn over(self, dst: Self) -> Self {
        let s_a = self.a() as u64;
        if s_a == 255 {
            return self;
        }
        if s_a == 0 {
            return dst;
        }

        let d_a = dst.a() as u64;
        let inv_s_a = 255 - s_a;
        let numer_a = 255 * s_a + d_a * inv_s_a;
        let out_a = Self::div_round_u8(numer_a, 255);

        let channel = |s: u8, d: u8| {
            Self::div_round_u8(
                (s as u64) * s_a * 255 + (d as u64) * d_a * inv_s_a,
                numer_a,
            )
        };

        Self::rgba(
            channel(self.r(), dst.r()),
            channel(self.g(), dst.g()),
            channel(self.b(), dst.b()),
            out_a,
        )
    }
}

bitflags::bitflags! {
    /// Text style flags carried by every cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD      = 0b0000_0001;
        /// Italic text.
        const ITALIC    = 0b0000_0010;
        /// Underlined text.
        const UNDERLINE = 0b0000_0100;
        /// Dim / decreased intensity.
        const DIM       = 0b0000_1000;
        /// Reverse video (swap fg/bg).
        const REVERSE   = 0b0001_0000;
    }
}

/// Colors and flags applied to written text, without the glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CellStyle {
    pub fg: Option<PackedRgba>,
    pub bg: Option<PackedRgba>,
    pub flags: StyleFlags,
}

impl CellStyle {
    /// No colors, no flags.
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn fg(mut self, fg: PackedRgba) -> Self {
        self.fg = Some(fg);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn bg(mut self, bg: PackedRgba) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Add style flags.
    #[must_use]
    pub fn flags(mut self, flags: StyleFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// A single terminal cell.
///
/// Equality covers the glyph, both colors, every style flag, the width and
/// the continuation flag; it is what the diff engine compares.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    /// One user-perceived character, or empty for continuation cells.
    pub glyph: Glyph,
    /// Foreground color; `None` means the terminal default.
    pub fg: Option<PackedRgba>,
    /// Background color; `None` means the terminal default.
    pub bg: Option<PackedRgba>,
    /// Bold/italic/underline/dim/reverse.
    pub flags: StyleFlags,
    /// Display width: 0, 1, or 2.
    pub width: u8,
    /// Second half of a wide character.
    pub continuation: bool,
}

impl Cell {
    /// Create a cell from a grapheme, computing its display width.
    ///
    /// Control characters get width 0; buffers never store them.
    pub fn new(glyph: &str) -> Self {
        Self {
            glyph: Glyph::new(glyph),
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
            width: grapheme_width(glyph).clamp(0, 2) as u8,
            continuation: false,
        }
    }

    /// Create a cell from a single character.
    pub fn from_char(c: char) -> Self {
        let mut bytes = [0u8; 4];
        Self::new(c.encode_utf8(&mut bytes))
    }

    /// The cleared cell: a space with no colors or flags.
    pub fn blank() -> Self {
        Self {
            glyph: Glyph::space(),
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
            width: 1,
            continuation: false,
        }
    }

    /// Continuation cell for the wide character `head`; carries its style so
    /// backgrounds stay contiguous.
    pub fn continuation_of(head: &Cell) -> Self {
        Self {
            glyph: Glyph::empty(),
            fg: head.fg,
            bg: head.bg,
            flags: head.flags,
            width: 0,
            continuation: true,
        }
    }

    /// Override the display width.
    #[must_use]
    pub fn with_width(mut self, width: u8) -> Self {
        self.width = width.min(2);
        self
    }

    /// Set the foreground color.
    #[must_use]
    pub fn with_fg(mut self, fg: PackedRgba) -> Self {
        self.fg = Some(fg);
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Set the style flags.
    #[must_use]
    pub fn with_flags(mut self, flags: StyleFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Apply colors and flags from a [`CellStyle`].
    #[must_use]
    pub fn with_style(mut self, style: &CellStyle) -> Self {
        self.fg = style.fg;
        self.bg = style.bg;
        self.flags = style.flags;
        self
    }

    /// Whether this is the second half of a wide character.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.continuation
    }

    /// Whether this is the first half of a wide character.
    #[inline]
    pub const fn is_wide(&self) -> bool {
        self.width == 2 && !self.continuation
    }

    /// Whether the cell shows nothing: blank glyph, no background, no
    /// visible flags. Continuation cells are never counted as empty content.
    pub fn is_blank(&self) -> bool {
        !self.continuation
            && self.glyph.is_blank()
            && self.bg.is_none()
            && !self.flags.intersects(StyleFlags::UNDERLINE | StyleFlags::REVERSE)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

impl core::fmt::Debug for Cell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("Cell");
        s.field("glyph", &self.glyph.as_str()).field("width", &self.width);
        if self.continuation {
            s.field("continuation", &true);
        }
        if let Some(fg) = self.fg {
            s.field("fg", &format_args!("#{:08x}", fg.0));
        }
        if let Some(bg) = self.bg {
            s.field("bg", &format_args!("#{:08x}", bg.0));
        }
        if !self.flags.is_empty() {
            s.field("flags", &self.flags);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_over(src: PackedRgba, dst: PackedRgba) -> PackedRgba {
        let f = |c: u8| c as f64 / 255.0;
        let (sa, da) = (f(src.a()), f(dst.a()));
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return PackedRgba::TRANSPARENT;
        }
        let ch = |s: u8, d: u8| (f(s) * sa + f(d) * da * (1.0 - sa)) / out_a;
        let to_u8 = |x: f64| (x * 255.0).round().clamp(0.0, 255.0) as u8;
        PackedRgba::rgba(
            to_u8(ch(src.r(), dst.r())),
            to_u8(ch(src.g(), dst.g())),
            to_u8(ch(src.b(), dst.b())),
            to_u8(out_a),
        )
    }

    #[test]
    fn rgb_sets_alpha_to_255() {
        let c = PackedRgba::rgb(1, 2, 3);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (1, 2, 3, 255));
    }

    #[test]
    fn with_alpha_keeps_channels() {
        let c = PackedRgba::rgb(10, 20, 30).with_alpha(7);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (10, 20, 30, 7));
        assert!(PackedRgba::rgb(1, 1, 1).with_alpha(0).is_transparent());
    }

    #[test]
    fn over_shortcuts() {
        let dst = PackedRgba::rgba(9, 8, 7, 200);
        let opaque = PackedRgba::rgba(1, 2, 3, 255);
        assert_eq!(opaque.over(dst), opaque);
        assert_eq!(PackedRgba::TRANSPARENT.over(dst), dst);
    }

    #[test]
    fn over_half_alpha_over_opaque() {
        let src = PackedRgba::rgba(255, 0, 0, 128);
        let dst = PackedRgba::rgba(0, 0, 255, 255);
        assert_eq!(src.over(dst), PackedRgba::rgba(128, 0, 127, 255));
    }

    #[test]
    fn over_matches_reference() {
        let cases = [
            (
                PackedRgba::rgba(200, 10, 10, 64),
                PackedRgba::rgba(10, 200, 10, 128),
            ),
            (
                PackedRgba::rgba(100, 0, 200, 200),
                PackedRgba::rgba(0, 120, 30, 50),
            ),
        ];
        for (src, dst) in cases {
            assert_eq!(src.over(dst), reference_over(src, dst));
        }
    }

    #[test]
    fn glyph_roundtrip() {
        assert_eq!(Glyph::new("日").as_str(), "日");
        assert_eq!(Glyph::from_char('x').as_str(), "x");
        let family = "👨\u{200D}👩\u{200D}👧";
        assert_eq!(Glyph::new(family).as_str(), family);
        assert!(Glyph::empty().is_empty());
        assert!(Glyph::space().is_blank());
    }

    #[test]
    fn cell_width_is_computed() {
        assert_eq!(Cell::from_char('A').width, 1);
        assert_eq!(Cell::from_char('日').width, 2);
        assert_eq!(Cell::new("🎉").width, 2);
        assert_eq!(Cell::new("\u{0301}").width, 0);
        assert_eq!(Cell::from_char('\n').width, 0);
    }

    #[test]
    fn continuation_carries_head_style() {
        let head = Cell::from_char('日').with_bg(PackedRgba::BLACK);
        let cont = Cell::continuation_of(&head);
        assert!(cont.is_continuation());
        assert_eq!(cont.glyph.as_str(), "");
        assert_eq!(cont.width, 0);
        assert_eq!(cont.bg, Some(PackedRgba::BLACK));
    }

    #[test]
    fn equality_covers_every_field() {
        let base = Cell::from_char('a');
        assert_eq!(base, Cell::from_char('a'));
        assert_ne!(base, base.clone().with_flags(StyleFlags::BOLD));
        assert_ne!(base, base.clone().with_fg(PackedRgba::WHITE));
        assert_ne!(base, base.clone().with_width(2));
        let mut cont = base.clone();
        cont.continuation = true;
        assert_ne!(base, cont);
    }

    #[test]
    fn blank_detection() {
        assert!(Cell::blank().is_blank());
        assert!(!Cell::from_char('x').is_blank());
        assert!(!Cell::blank().with_bg(PackedRgba::BLACK).is_blank());
        assert!(!Cell::blank().with_flags(StyleFlags::REVERSE).is_blank());
    }

    #[test]
    fn style_builder() {
        let style = CellStyle::new()
            .fg(PackedRgba::WHITE)
            .bg(PackedRgba::BLACK)
            .flags(StyleFlags::BOLD)
            .flags(StyleFlags::ITALIC);
        let cell = Cell::from_char('x').with_style(&style);
        assert_eq!(cell.fg, Some(PackedRgba::WHITE));
        assert_eq!(cell.flags, StyleFlags::BOLD | StyleFlags::ITALIC);
    }
}

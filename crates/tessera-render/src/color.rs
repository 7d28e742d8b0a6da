#![forbid(unsafe_code)]

//! Color parsing, caching, and perceptual color math.
//!
//! - [`parse_color`] accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`
//!   and CSS named colors; [`parse_color_or_default`] degrades to opaque white.
//! - [`ColorCache`] memoizes string parses (bounded; clears on overflow).
//! - sRGB transfer goes through precomputed tables: 256 entries for
//!   sRGB→linear, 4096 for linear→sRGB.
//! - [`blend_oklab`] and [`lerp_color`] interpolate in perceptual spaces.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::cell::PackedRgba;

/// Opacity below which [`blend_oklab`] leaves the background untouched.
pub const DEFAULT_OPACITY_SKIP_THRESHOLD: f32 = 0.05;

/// Unpacked 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Pack channels into `0xRRGGBBAA`.
#[inline]
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    PackedRgba::rgba(r, g, b, a).0
}

/// Split `0xRRGGBBAA` into channels.
#[inline]
pub const fn unpack_rgba(packed: u32) -> Rgba {
    let c = PackedRgba(packed);
    Rgba {
        r: c.r(),
        g: c.g(),
        b: c.b(),
        a: c.a(),
    }
}

impl From<PackedRgba> for Rgba {
    fn from(c: PackedRgba) -> Self {
        unpack_rgba(c.0)
    }
}

impl From<Rgba> for PackedRgba {
    fn from(c: Rgba) -> Self {
        PackedRgba::rgba(c.r, c.g, c.b, c.a)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Reasons a color string was rejected by [`parse_color`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Empty or whitespace-only input.
    Empty,
    /// `#...` with a bad length or non-hex digit.
    InvalidHex(String),
    /// `rgb(...)`/`rgba(...)` with the wrong arity or a bad component.
    InvalidFunction(String),
    /// Not a known color name.
    UnknownName(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty color string"),
            Self::InvalidHex(s) => write!(f, "invalid hex color: {s}"),
            Self::InvalidFunction(s) => write!(f, "invalid color function: {s}"),
            Self::UnknownName(s) => write!(f, "unknown color name: {s}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

const NAMED_COLORS: &[(&str, PackedRgba)] = &[
    ("aqua", PackedRgba::rgb(0, 255, 255)),
    ("black", PackedRgba::rgb(0, 0, 0)),
    ("blue", PackedRgba::rgb(0, 0, 255)),
    ("brown", PackedRgba::rgb(165, 42, 42)),
    ("coral", PackedRgba::rgb(255, 127, 80)),
    ("crimson", PackedRgba::rgb(220, 20, 60)),
    ("cyan", PackedRgba::rgb(0, 255, 255)),
    ("darkgray", PackedRgba::rgb(169, 169, 169)),
    ("darkgrey", PackedRgba::rgb(169, 169, 169)),
    ("fuchsia", PackedRgba::rgb(255, 0, 255)),
    ("gold", PackedRgba::rgb(255, 215, 0)),
    ("gray", PackedRgba::rgb(128, 128, 128)),
    ("green", PackedRgba::rgb(0, 128, 0)),
    ("grey", PackedRgba::rgb(128, 128, 128)),
    ("indigo", PackedRgba::rgb(75, 0, 130)),
    ("lightgray", PackedRgba::rgb(211, 211, 211)),
    ("lightgrey", PackedRgba::rgb(211, 211, 211)),
    ("lime", PackedRgba::rgb(0, 255, 0)),
    ("magenta", PackedRgba::rgb(255, 0, 255)),
    ("maroon", PackedRgba::rgb(128, 0, 0)),
    ("navy", PackedRgba::rgb(0, 0, 128)),
    ("olive", PackedRgba::rgb(128, 128, 0)),
    ("orange", PackedRgba::rgb(255, 165, 0)),
    ("pink", PackedRgba::rgb(255, 192, 203)),
    ("purple", PackedRgba::rgb(128, 0, 128)),
    ("red", PackedRgba::rgb(255, 0, 0)),
    ("silver", PackedRgba::rgb(192, 192, 192)),
    ("teal", PackedRgba::rgb(0, 128, 128)),
    ("transparent", PackedRgba::TRANSPARENT),
    ("violet", PackedRgba::rgb(238, 130, 238)),
    ("white", PackedRgba::rgb(255, 255, 255)),
    ("yellow", PackedRgba::rgb(255, 255, 0)),
];

/// Look up a CSS color name (case-insensitive).
pub fn named_color(name: &str) -> Option<PackedRgba> {
    let lower = name.to_ascii_lowercase();
    NAMED_COLORS
        .binary_search_by(|(n, _)| n.cmp(&lower.as_str()))
        .ok()
        .map(|i| NAMED_COLORS[i].1)
}

fn hex_nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn parse_hex(digits: &str) -> Option<PackedRgba> {
    let nibbles: Option<Vec<u8>> = digits.bytes().map(hex_nibble).collect();
    let n = nibbles?;
    let pair = |i: usize| (n[i] << 4) | n[i + 1];
    match n.len() {
        3 => Some(PackedRgba::rgb(n[0] * 17, n[1] * 17, n[2] * 17)),
        4 => Some(PackedRgba::rgba(n[0] * 17, n[1] * 17, n[2] * 17, n[3] * 17)),
        6 => Some(PackedRgba::rgb(pair(0), pair(2), pair(4))),
        8 => Some(PackedRgba::rgba(pair(0), pair(2), pair(4), pair(6))),
        _ => None,
    }
}

fn parse_channel(s: &str) -> Option<u8> {
    let s = s.trim();
    if let Some(pct) = s.strip_suffix('%') {
        let v: f32 = pct.trim().parse().ok()?;
        return Some((v.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8);
    }
    let v: f32 = s.parse().ok()?;
    Some(v.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(s: &str) -> Option<u8> {
    let s = s.trim();
    if let Some(pct) = s.strip_suffix('%') {
        let v: f32 = pct.trim().parse().ok()?;
        return Some((v.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8);
    }
    let v: f32 = s.parse().ok()?;
    Some((v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_function(input: &str) -> Option<PackedRgba> {
    let lower = input.to_ascii_lowercase();
    let (has_alpha, rest) = if let Some(rest) = lower.strip_prefix("rgba(") {
        (true, rest)
    } else {
        (false, lower.strip_prefix("rgb(")?)
    };
    let body = rest.strip_suffix(')')?;
    let parts: Vec<&str> = body.split(',').collect();
    match (has_alpha, parts.as_slice()) {
        (_, [r, g, b]) => Some(PackedRgba::rgb(
            parse_channel(r)?,
            parse_channel(g)?,
            parse_channel(b)?,
        )),
        (true, [r, g, b, a]) => Some(PackedRgba::rgba(
            parse_channel(r)?,
            parse_channel(g)?,
            parse_channel(b)?,
            parse_alpha(a)?,
        )),
        _ => None,
    }
}

/// `hsl(h, s%, l%)` and `hsla(h, s%, l%, a)`; hue may carry a `deg` suffix.
fn parse_hsl_function(input: &str) -> Option<PackedRgba> {
    let lower = input.to_ascii_lowercase();
    let (has_alpha, rest) = if let Some(rest) = lower.strip_prefix("hsla(") {
        (true, rest)
    } else {
        (false, lower.strip_prefix("hsl(")?)
    };
    let body = rest.strip_suffix(')')?;
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let percent = |s: &str| -> Option<f32> {
        let v: f32 = s.strip_suffix('%').unwrap_or(s).trim().parse().ok()?;
        Some(v.clamp(0.0, 100.0) / 100.0)
    };
    let (h, sat, light, alpha) = match (has_alpha, parts.as_slice()) {
        (_, [h, s, l]) => (*h, *s, *l, None),
        (true, [h, s, l, a]) => (*h, *s, *l, Some(parse_alpha(a)?)),
        _ => return None,
    };
    let h: f32 = h.strip_suffix("deg").unwrap_or(h).trim().parse().ok()?;
    let color = from_hsl(Hsl {
        h,
        s: percent(sat)?,
        l: percent(light)?,
    });
    Some(alpha.map_or(color, |a| color.with_alpha(a)))
}

/// Parse a color string strictly.
pub fn parse_color(input: &str) -> Result<PackedRgba, ColorParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ColorParseError::Empty);
    }
    if let Some(digits) = s.strip_prefix('#') {
        return parse_hex(digits).ok_or_else(|| ColorParseError::InvalidHex(s.to_string()));
    }
    let lower = s.to_ascii_lowercase();
    if lower.starts_with("rgb(") || lower.starts_with("rgba(") {
        return parse_function(s).ok_or_else(|| ColorParseError::InvalidFunction(s.to_string()));
    }
    if lower.starts_with("hsl(") || lower.starts_with("hsla(") {
        return parse_hsl_function(s)
            .ok_or_else(|| ColorParseError::InvalidFunction(s.to_string()));
    }
    named_color(s).ok_or_else(|| ColorParseError::UnknownName(s.to_string()))
}

/// Parse a color string, falling back to opaque white on malformed input.
pub fn parse_color_or_default(input: &str) -> PackedRgba {
    parse_color(input).unwrap_or(PackedRgba::WHITE)
}

/// Statistics for a [`ColorCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Current number of entries.
    pub size: usize,
    /// Entry count that triggers a clear.
    pub capacity: usize,
}

/// Memoized lenient color parsing (bounded; clears on overflow).
///
/// Owned by whoever resolves styles, never global, so separate resolvers and
/// tests do not observe each other's entries.
#[derive(Debug)]
pub struct ColorCache {
    max_entries: usize,
    map: HashMap<String, PackedRgba>,
    hits: u64,
    misses: u64,
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorCache {
    /// Cache with the default capacity (1024 entries).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Cache with the given maximum entry count (at least 1).
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            max_entries,
            map: HashMap::with_capacity(max_entries.min(256)),
            hits: 0,
            misses: 0,
        }
    }

    /// Resolve a color string, defaulting to white when malformed.
    pub fn resolve(&mut self, input: &str) -> PackedRgba {
        if let Some(&cached) = self.map.get(input) {
            self.hits += 1;
            return cached;
        }
        self.misses += 1;
        let color = parse_color_or_default(input);
        if self.map.len() >= self.max_entries {
            self.map.clear();
        }
        self.map.insert(input.to_string(), color);
        color
    }

    /// Drop all entries and reset counters.
    pub fn clear(&mut self) {
        self.map.clear();
        self.hits = 0;
        self.misses = 0;
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.map.len(),
            capacity: self.max_entries,
        }
    }
}

// ---------------------------------------------------------------------------
// Transfer functions
// ---------------------------------------------------------------------------

const DECODE_STEPS: usize = 4096;

static SRGB_TO_LINEAR: LazyLock<[f32; 256]> = LazyLock::new(|| {
    std::array::from_fn(|i| {
        let c = i as f32 / 255.0;
        if c <= 0.040_45 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    })
});

static LINEAR_TO_SRGB: LazyLock<[u8; DECODE_STEPS]> = LazyLock::new(|| {
    std::array::from_fn(|i| {
        let c = i as f32 / (DECODE_STEPS - 1) as f32;
        let s = if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        };
        (s * 255.0).round().clamp(0.0, 255.0) as u8
    })
});

/// sRGB byte to linear light in `[0, 1]`.
#[inline]
pub fn srgb_to_linear(c: u8) -> f32 {
    SRGB_TO_LINEAR[c as usize]
}

/// Linear light (clamped to `[0, 1]`) to sRGB byte.
#[inline]
pub fn linear_to_srgb(c: f32) -> u8 {
    let idx = (c.clamp(0.0, 1.0) * (DECODE_STEPS - 1) as f32).round() as usize;
    LINEAR_TO_SRGB[idx.min(DECODE_STEPS - 1)]
}

// ---------------------------------------------------------------------------
// Oklab / OKLCH
// ---------------------------------------------------------------------------

/// Oklab: `l` lightness in `[0, 1]`, `a` green–red, `b` blue–yellow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkLab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

/// Polar Oklab: chroma `c` and hue `h` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkLch {
    pub l: f32,
    pub c: f32,
    pub h: f32,
}

impl OkLab {
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            l: self.l + (other.l - self.l) * t,
            a: self.a + (other.a - self.a) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn to_lch(self) -> OkLch {
        let c = (self.a * self.a + self.b * self.b).sqrt();
        let h = self.b.atan2(self.a).to_degrees().rem_euclid(360.0);
        OkLch { l: self.l, c, h }
    }
}

impl OkLch {
    pub fn to_lab(self) -> OkLab {
        let (sin, cos) = self.h.to_radians().sin_cos();
        OkLab {
            l: self.l,
            a: self.c * cos,
            b: self.c * sin,
        }
    }
}

/// sRGB to Oklab (alpha ignored).
pub fn to_oklab(color: PackedRgba) -> OkLab {
    let r = srgb_to_linear(color.r());
    let g = srgb_to_linear(color.g());
    let b = srgb_to_linear(color.b());

    let l = (0.412_221_47 * r + 0.536_332_55 * g + 0.051_445_99 * b).cbrt();
    let m = (0.211_903_5 * r + 0.680_699_5 * g + 0.107_396_96 * b).cbrt();
    let s = (0.088_302_46 * r + 0.281_718_84 * g + 0.629_978_7 * b).cbrt();

    OkLab {
        l: 0.210_454_26 * l + 0.793_617_8 * m - 0.004_072_05 * s,
        a: 1.977_998_5 * l - 2.428_592 * m + 0.450_593_56 * s,
        b: 0.025_904_04 * l + 0.782_771_77 * m - 0.808_675_77 * s,
    }
}

/// Oklab to opaque sRGB, clamping out-of-gamut channels.
pub fn from_oklab(lab: OkLab) -> PackedRgba {
    let l = lab.l + 0.396_337_78 * lab.a + 0.215_803_76 * lab.b;
    let m = lab.l - 0.105_561_35 * lab.a - 0.063_854_17 * lab.b;
    let s = lab.l - 0.089_484_18 * lab.a - 1.291_485_5 * lab.b;
    let (l, m, s) = (l * l * l, m * m * m, s * s * s);

    let r = 4.076_741_7 * l - 3.307_711_6 * m + 0.230_969_94 * s;
    let g = -1.268_438 * l + 2.609_757_4 * m - 0.341_319_38 * s;
    let b = -0.004_196_09 * l - 0.703_418_6 * m + 1.707_614_7 * s;

    PackedRgba::rgb(linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
}

/// Blend `fg` over `bg` at `opacity` in Oklab space; the result is opaque.
///
/// Opacities below [`DEFAULT_OPACITY_SKIP_THRESHOLD`] return `bg` unchanged.
pub fn blend_oklab(fg: PackedRgba, bg: PackedRgba, opacity: f32) -> PackedRgba {
    blend_oklab_with_threshold(fg, bg, opacity, DEFAULT_OPACITY_SKIP_THRESHOLD)
}

/// [`blend_oklab`] with an explicit skip threshold.
pub fn blend_oklab_with_threshold(
    fg: PackedRgba,
    bg: PackedRgba,
    opacity: f32,
    skip_below: f32,
) -> PackedRgba {
    let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
    if opacity < skip_below {
        return bg;
    }
    if opacity >= 1.0 {
        return fg.with_alpha(255);
    }
    from_oklab(to_oklab(bg).lerp(to_oklab(fg), opacity))
}

// ---------------------------------------------------------------------------
// HSL
// ---------------------------------------------------------------------------

/// Hue in degrees, saturation and lightness in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// sRGB to HSL (alpha ignored).
pub fn to_hsl(color: PackedRgba) -> Hsl {
    let r = color.r() as f32 / 255.0;
    let g = color.g() as f32 / 255.0;
    let b = color.b() as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d <= f32::EPSILON {
        return Hsl { h: 0.0, s: 0.0, l };
    }
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    Hsl { h: h * 60.0, s, l }
}

/// HSL to opaque sRGB.
pub fn from_hsl(hsl: Hsl) -> PackedRgba {
    let h = hsl.h.rem_euclid(360.0);
    let s = hsl.s.clamp(0.0, 1.0);
    let l = hsl.l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    PackedRgba::rgb(to_u8(r), to_u8(g), to_u8(b))
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Color space used when interpolating between two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ColorSpace {
    /// Per-channel sRGB lerp.
    #[default]
    Rgb,
    /// HSL with shortest hue path.
    Hsl,
    /// OKLCH with shortest hue path.
    Oklch,
}

#[inline]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    lerp_f32(a as f32, b as f32, t).round().clamp(0.0, 255.0) as u8
}

/// Interpolate hue along the shorter arc.
#[inline]
fn lerp_hue(a: f32, b: f32, t: f32) -> f32 {
    let mut delta = (b - a).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    (a + delta * t).rem_euclid(360.0)
}

/// Interpolate between two colors; `t` is clamped to `[0, 1]`.
///
/// Alpha is always interpolated linearly. Achromatic endpoints borrow the
/// other endpoint's hue so gray-to-color ramps do not swing through the
/// color wheel.
pub fn lerp_color(from: PackedRgba, to: PackedRgba, t: f32, space: ColorSpace) -> PackedRgba {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let alpha = lerp_u8(from.a(), to.a(), t);
    let rgb = match space {
        ColorSpace::Rgb => PackedRgba::rgb(
            lerp_u8(from.r(), to.r(), t),
            lerp_u8(from.g(), to.g(), t),
            lerp_u8(from.b(), to.b(), t),
        ),
        ColorSpace::Hsl => {
            let (mut a, mut b) = (to_hsl(from), to_hsl(to));
            if a.s <= f32::EPSILON {
                a.h = b.h;
            }
            if b.s <= f32::EPSILON {
                b.h = a.h;
            }
            from_hsl(Hsl {
                h: lerp_hue(a.h, b.h, t),
                s: lerp_f32(a.s, b.s, t),
                l: lerp_f32(a.l, b.l, t),
            })
        }
        ColorSpace::Oklch => {
            let (mut a, mut b) = (to_oklab(from).to_lch(), to_oklab(to).to_lch());
            const ACHROMATIC: f32 = 1e-4;
            if a.c < ACHROMATIC {
                a.h = b.h;
            }
            if b.c < ACHROMATIC {
                b.h = a.h;
            }
            from_oklab(
                OkLch {
                    l: lerp_f32(a.l, b.l, t),
                    c: lerp_f32(a.c, b.c, t),
                    h: lerp_hue(a.h, b.h, t),
                }
                .to_lab(),
            )
        }
    };
    rgb.with_alpha(alpha)
}

#![forbid(unsafe_code)]

//! Style property values and the flat property bag.
//!
//! Property names are stored camelCase; [`Style::set`] accepts kebab-case
//! (`border-color`) and normalizes it. Values stay loosely typed, the way
//! they arrive from inline attributes, and are coerced at the point of use:
//! [`Style::number`] parses numeric strings, color properties are resolved
//! to [`PackedRgba`] by the resolver.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use tessera_render::color::{ColorSpace, lerp_color};
use tessera_render::PackedRgba;

use crate::animation::AnimationSpec;
use crate::transition::TransitionSpec;

/// Rejected style value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueParseError {
    /// Not a `<number>ms` / `<number>s` time.
    InvalidTime(String),
    /// Not a recognized timing function.
    InvalidTiming(String),
    /// Not `from`, `to` or a percentage.
    InvalidKeyframeOffset(String),
    /// Not a number.
    InvalidNumber(String),
    /// Not one to four spacing values.
    InvalidSpacing(String),
    /// `animation` shorthand without a keyframes name.
    MissingAnimationName(String),
}

impl fmt::Display for ValueParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTime(s) => write!(f, "invalid time value: {s}"),
            Self::InvalidTiming(s) => write!(f, "invalid timing function: {s}"),
            Self::InvalidKeyframeOffset(s) => write!(f, "invalid keyframe offset: {s}"),
            Self::InvalidNumber(s) => write!(f, "invalid number: {s}"),
            Self::InvalidSpacing(s) => write!(f, "invalid spacing: {s}"),
            Self::MissingAnimationName(s) => write!(f, "animation without a name: {s}"),
        }
    }
}

impl std::error::Error for ValueParseError {}

/// Parse a CSS time (`300ms`, `1.5s`, bare numbers are milliseconds).
pub fn parse_time_ms(s: &str) -> Result<f64, ValueParseError> {
    let t = s.trim();
    let err = || ValueParseError::InvalidTime(s.to_string());
    let (num, scale) = if let Some(ms) = t.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(secs) = t.strip_suffix('s') {
        (secs, 1000.0)
    } else {
        (t, 1.0)
    };
    let v: f64 = num.trim().parse().map_err(|_| err())?;
    if !v.is_finite() || v < 0.0 {
        return Err(err());
    }
    Ok(v * scale)
}

/// Whether a token looks like a time value (`200ms`, `1s`, `.5s`).
pub(crate) fn is_time_token(s: &str) -> bool {
    let t = s.trim();
    let num = t.strip_suffix("ms").or_else(|| t.strip_suffix('s'));
    num.is_some_and(|n| !n.is_empty() && n.parse::<f64>().is_ok())
}

/// Per-side box spacing (padding or margin), in cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spacing {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Spacing {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Parse CSS 1–4 value shorthand (`"1"`, `"1 2"`, `"1 2 3"`, `"1 2 3 4"`).
    pub fn parse(s: &str) -> Result<Self, ValueParseError> {
        let vals: Result<Vec<f32>, _> = s.split_whitespace().map(str::parse::<f32>).collect();
        let vals = vals.map_err(|_| ValueParseError::InvalidSpacing(s.to_string()))?;
        match vals.as_slice() {
            [a] => Ok(Self::all(*a)),
            [v, h] => Ok(Self::new(*v, *h, *v, *h)),
            [t, h, b] => Ok(Self::new(*t, *h, *b, *h)),
            [t, r, b, l] => Ok(Self::new(*t, *r, *b, *l)),
            _ => Err(ValueParseError::InvalidSpacing(s.to_string())),
        }
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        let l = |a: f32, b: f32| a + (b - a) * t;
        Self::new(
            l(self.top, other.top),
            l(self.right, other.right),
            l(self.bottom, other.bottom),
            l(self.left, other.left),
        )
    }
}

/// One style property value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Number(f32),
    Str(String),
    Color(PackedRgba),
    Bool(bool),
    Spacing(Spacing),
    Animation(AnimationSpec),
    Transition(Vec<TransitionSpec>),
}

impl StyleValue {
    /// Numeric view; numeric strings are coerced.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(s) if s == "true" => Some(true),
            Self::Str(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<PackedRgba> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Spacing view: a number applies to every side, strings use the CSS
    /// 1–4 value shorthand.
    pub fn as_spacing(&self) -> Option<Spacing> {
        match self {
            Self::Spacing(s) => Some(*s),
            Self::Number(n) => Some(Spacing::all(*n)),
            Self::Str(s) => Spacing::parse(s).ok(),
            _ => None,
        }
    }
}

impl From<f32> for StyleValue {
    fn from(v: f32) -> Self {
        Self::Number(v)
    }
}

impl From<f64> for StyleValue {
    fn from(v: f64) -> Self {
        Self::Number(v as f32)
    }
}

impl From<i32> for StyleValue {
    fn from(v: i32) -> Self {
        Self::Number(v as f32)
    }
}

impl From<&str> for StyleValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<PackedRgba> for StyleValue {
    fn from(v: PackedRgba) -> Self {
        Self::Color(v)
    }
}

impl From<bool> for StyleValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Spacing> for StyleValue {
    fn from(v: Spacing) -> Self {
        Self::Spacing(v)
    }
}

/// Interpolate between two values at `t ∈ [0, 1]`.
///
/// Numbers, colors and spacings blend; everything else is discrete and
/// flips at the midpoint.
pub fn interpolate(from: &StyleValue, to: &StyleValue, t: f32, space: ColorSpace) -> StyleValue {
    let t = t.clamp(0.0, 1.0);
    match (from, to) {
        (StyleValue::Color(a), StyleValue::Color(b)) => {
            StyleValue::Color(lerp_color(*a, *b, t, space))
        }
        (StyleValue::Spacing(a), StyleValue::Spacing(b)) => StyleValue::Spacing(a.lerp(*b, t)),
        _ => match (from.as_number(), to.as_number()) {
            (Some(a), Some(b)) => StyleValue::Number(a + (b - a) * t),
            _ => {
                if t < 0.5 {
                    from.clone()
                } else {
                    to.clone()
                }
            }
        },
    }
}

/// `border-color` → `borderColor`. Names without dashes pass through.
pub fn camel_case(name: &str) -> Cow<'_, str> {
    if !name.contains('-') {
        return Cow::Borrowed(name);
    }
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// A flat, ordered map of style properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    props: BTreeMap<String, StyleValue>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Style::set`].
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<StyleValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property; kebab-case names are normalized to camelCase.
    pub fn set(&mut self, name: &str, value: impl Into<StyleValue>) {
        self.props.insert(camel_case(name).into_owned(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.props.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<StyleValue> {
        self.props.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    /// Overlay every property of `other` onto `self`.
    pub fn merge(&mut self, other: &Style) {
        for (k, v) in &other.props {
            self.props.insert(k.clone(), v.clone());
        }
    }

    /// Numeric property, coercing numeric strings.
    pub fn number(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(StyleValue::as_number)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(StyleValue::as_str)
    }

    pub fn color(&self, name: &str) -> Option<PackedRgba> {
        self.get(name).and_then(StyleValue::as_color)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(StyleValue::as_bool)
    }

    pub fn spacing(&self, name: &str) -> Option<Spacing> {
        self.get(name).and_then(StyleValue::as_spacing)
    }

    pub(crate) fn insert_raw(&mut self, name: String, value: StyleValue) {
        self.props.insert(name, value);
    }
}

impl<K: AsRef<str>, V: Into<StyleValue>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Style::new();
        for (k, v) in iter {
            style.set(k.as_ref(), v);
        }
        style
    }
}

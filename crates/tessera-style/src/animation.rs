#![forbid(unsafe_code)]

//! Keyframe animations.
//!
//! An [`AnimationSpec`] (from the `animation` property) names a set of
//! [`Keyframes`] registered on the stylesheet and says how to play them.
//! [`animated_style`] turns "milliseconds since the animation started" into
//! the style overlay for that instant.
//!
//! # Timeline
//!
//! ```text
//!  start      +delay                      +delay + duration * iterations
//!    |---------|------|------|------|-----------|
//!     delay     iter 0 iter 1 iter 2   finished
//!    (fill backwards)                 (fill forwards)
//! ```

use tessera_render::color::ColorSpace;

use crate::timing::TimingFunction;
use crate::value::{Style, StyleValue, ValueParseError, interpolate, is_time_token, parse_time_ms};

/// How many times the animation runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IterationCount {
    /// A finite, possibly fractional, count.
    Count(f32),
    Infinite,
}

impl Default for IterationCount {
    fn default() -> Self {
        Self::Count(1.0)
    }
}

/// Playback direction per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationDirection {
    #[default]
    Normal,
    Reverse,
    Alternate,
    AlternateReverse,
}

impl AnimationDirection {
    /// Whether iteration `index` plays backwards.
    pub fn is_reversed(self, index: u64) -> bool {
        let odd = index % 2 == 1;
        match self {
            Self::Normal => false,
            Self::Reverse => true,
            Self::Alternate => odd,
            Self::AlternateReverse => !odd,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Self::Normal),
            "reverse" => Some(Self::Reverse),
            "alternate" => Some(Self::Alternate),
            "alternate-reverse" => Some(Self::AlternateReverse),
            _ => None,
        }
    }
}

/// Which keyframe shows outside the active interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    None,
    Forwards,
    Backwards,
    Both,
}

impl FillMode {
    pub fn fills_forwards(self) -> bool {
        matches!(self, Self::Forwards | Self::Both)
    }

    pub fn fills_backwards(self) -> bool {
        matches!(self, Self::Backwards | Self::Both)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "forwards" => Some(Self::Forwards),
            "backwards" => Some(Self::Backwards),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// A parsed `animation` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    /// Keyframes name.
    pub name: String,
    pub duration_ms: f64,
    pub timing: TimingFunction,
    pub delay_ms: f64,
    pub iterations: IterationCount,
    pub direction: AnimationDirection,
    pub fill_mode: FillMode,
}

impl AnimationSpec {
    /// A one-shot animation with default timing (`ease`, no delay).
    pub fn new(name: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            timing: TimingFunction::default(),
            delay_ms: 0.0,
            iterations: IterationCount::default(),
            direction: AnimationDirection::default(),
            fill_mode: FillMode::default(),
        }
    }

    #[must_use]
    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn iterations(mut self, iterations: IterationCount) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: AnimationDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }

    /// Parse the `animation` shorthand, e.g.
    /// `"pulse 1s ease-in 500ms infinite alternate forwards"`.
    ///
    /// The first time is the duration, the second the delay. Keywords may
    /// appear in any order; the first unrecognized identifier is the name.
    pub fn parse(s: &str) -> Result<Self, ValueParseError> {
        let mut spec = Self::new(String::new(), 0.0);
        let mut times_seen = 0;
        for token in split_top_level(s, ' ') {
            let lower = token.to_ascii_lowercase();
            if is_time_token(&lower) {
                let ms = parse_time_ms(&lower)?;
                if times_seen == 0 {
                    spec.duration_ms = ms;
                } else {
                    spec.delay_ms = ms;
                }
                times_seen += 1;
            } else if TimingFunction::looks_like(&lower) {
                spec.timing = TimingFunction::parse_lenient(&lower);
            } else if lower == "infinite" {
                spec.iterations = IterationCount::Infinite;
            } else if let Ok(n) = lower.parse::<f32>() {
                if !n.is_finite() || n < 0.0 {
                    return Err(ValueParseError::InvalidNumber(token.to_string()));
                }
                spec.iterations = IterationCount::Count(n);
            } else if let Some(dir) = AnimationDirection::parse(&lower) {
                spec.direction = dir;
            } else if let Some(fill) = FillMode::parse(&lower) {
                spec.fill_mode = fill;
            } else if lower == "running" || lower == "paused" {
                tracing::debug!(target: "tessera::style", state = %lower, "ignoring animation play state");
            } else if !spec.name_is_set() {
                spec.name = token.to_string();
            } else {
                tracing::debug!(target: "tessera::style", %token, "ignoring unknown animation token");
            }
        }
        if !spec.name_is_set() {
            return Err(ValueParseError::MissingAnimationName(s.to_string()));
        }
        Ok(spec)
    }

    fn name_is_set(&self) -> bool {
        !self.name.is_empty()
    }

    /// Total active time, or `None` for infinite animations.
    pub fn active_duration_ms(&self) -> Option<f64> {
        match self.iterations {
            IterationCount::Count(n) => Some(self.duration_ms * f64::from(n)),
            IterationCount::Infinite => None,
        }
    }
}

/// Split on `sep` outside parentheses, dropping empty pieces.
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c == sep || (sep == ' ' && c.is_whitespace())) => {
                let piece = s[start..i].trim();
                if !piece.is_empty() {
                    out.push(piece);
                }
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let tail = s[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// One keyframe: a style snapshot at `offset ∈ [0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub offset: f32,
    pub style: Style,
}

/// Parse a keyframe selector: `from`, `to`, or a percentage.
pub fn parse_keyframe_offset(s: &str) -> Result<f32, ValueParseError> {
    let t = s.trim().to_ascii_lowercase();
    let err = || ValueParseError::InvalidKeyframeOffset(s.to_string());
    match t.as_str() {
        "from" => Ok(0.0),
        "to" => Ok(1.0),
        _ => {
            let pct: f32 = t.strip_suffix('%').ok_or_else(err)?.trim().parse().map_err(|_| err())?;
            if !(0.0..=100.0).contains(&pct) {
                return Err(err());
            }
            Ok(pct / 100.0)
        }
    }
}

/// A sorted keyframe list with guaranteed 0 % and 100 % frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    frames: Vec<Keyframe>,
}

impl Keyframes {
    /// Build from `(offset, style)` pairs in any order.
    ///
    /// Missing 0 % / 100 % frames are copied from the first / last frame.
    /// Returns `None` for an empty list.
    pub fn new(frames: impl IntoIterator<Item = (f32, Style)>) -> Option<Self> {
        let mut frames: Vec<Keyframe> = frames
            .into_iter()
            .map(|(offset, style)| Keyframe {
                offset: offset.clamp(0.0, 1.0),
                style,
            })
            .collect();
        frames.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        let first = frames.first()?.clone();
        let last = frames.last()?.clone();
        if first.offset > 0.0 {
            frames.insert(
                0,
                Keyframe {
                    offset: 0.0,
                    style: first.style,
                },
            );
        }
        if last.offset < 1.0 {
            frames.push(Keyframe {
                offset: 1.0,
                style: last.style,
            });
        }
        Some(Self { frames })
    }

    /// Build from CSS-style selectors (`"from"`, `"50%"`, `"to"`).
    pub fn parse<'a>(
        frames: impl IntoIterator<Item = (&'a str, Style)>,
    ) -> Result<Option<Self>, ValueParseError> {
        let parsed: Result<Vec<(f32, Style)>, _> = frames
            .into_iter()
            .map(|(sel, style)| parse_keyframe_offset(sel).map(|o| (o, style)))
            .collect();
        Ok(Self::new(parsed?))
    }

    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    /// Same offsets, every frame's style passed through `f`.
    pub fn map_styles(&self, mut f: impl FnMut(&Style) -> Style) -> Self {
        Self {
            frames: self
                .frames
                .iter()
                .map(|k| Keyframe {
                    offset: k.offset,
                    style: f(&k.style),
                })
                .collect(),
        }
    }

    /// Interpolated style at `progress` (eased; may overshoot `[0, 1]`).
    ///
    /// Properties present in only one of the bracketing frames hold that
    /// frame's value.
    pub fn sample(&self, progress: f32, space: ColorSpace) -> Style {
        let p = progress.clamp(0.0, 1.0);
        // Segment [lo, lo + 1]; overshooting curves extrapolate the outer ones.
        let last_segment = self.frames.len().saturating_sub(2);
        let lo_idx = self.frames[..=last_segment]
            .iter()
            .rposition(|f| f.offset <= p)
            .unwrap_or(0);
        let hi_idx = (lo_idx + 1).min(self.frames.len() - 1);
        let (lo, hi) = (&self.frames[lo_idx], &self.frames[hi_idx]);
        let span = hi.offset - lo.offset;
        let local = if span > f32::EPSILON {
            (progress - lo.offset) / span
        } else {
            1.0
        };

        let mut out = lo.style.clone();
        for (name, to) in hi.style.iter() {
            let value = match lo.style.get(name) {
                Some(from) => interpolate_unclamped(from, to, local, space),
                None => to.clone(),
            };
            out.insert_raw(name.to_string(), value);
        }
        out
    }
}

fn interpolate_unclamped(from: &StyleValue, to: &StyleValue, t: f32, space: ColorSpace) -> StyleValue {
    match (from.as_number(), to.as_number()) {
        (Some(a), Some(b)) => StyleValue::Number(a + (b - a) * t),
        _ => interpolate(from, to, t, space),
    }
}

/// Linear progress at the end of the active interval, before easing.
fn end_position(spec: &AnimationSpec) -> (u64, f32) {
    match spec.iterations {
        IterationCount::Count(n) if n > 0.0 => {
            let whole = n.floor();
            let frac = n - whole;
            if frac > 0.0 {
                (whole as u64, frac)
            } else {
                (whole as u64 - 1, 1.0)
            }
        }
        IterationCount::Count(_) => (0, 0.0),
        IterationCount::Infinite => (0, 1.0),
    }
}

fn directed(spec: &AnimationSpec, iteration: u64, progress: f32) -> f32 {
    if spec.direction.is_reversed(iteration) {
        1.0 - progress
    } else {
        progress
    }
}

/// Phase of an animation at some instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationPhase {
    /// Waiting out the delay.
    Before,
    /// Playing; eased progress.
    Active(f32),
    /// Iterations exhausted.
    Finished,
}

/// Where the animation is `elapsed_ms` after it started.
pub fn animation_phase(spec: &AnimationSpec, elapsed_ms: f64) -> AnimationPhase {
    let local = elapsed_ms - spec.delay_ms;
    if local < 0.0 {
        return AnimationPhase::Before;
    }
    if spec.duration_ms <= 0.0 {
        return AnimationPhase::Finished;
    }
    if let Some(total) = spec.active_duration_ms()
        && local >= total
    {
        return AnimationPhase::Finished;
    }
    let iteration = (local / spec.duration_ms).floor() as u64;
    let progress = ((local % spec.duration_ms) / spec.duration_ms) as f32;
    AnimationPhase::Active(spec.timing.apply(directed(spec, iteration, progress)))
}

/// Style overlay for an animation `elapsed_ms` after it started.
///
/// `None` means the animation contributes nothing at this instant (delay
/// without backwards fill, or finished without forwards fill).
pub fn animated_style(
    keyframes: &Keyframes,
    spec: &AnimationSpec,
    elapsed_ms: f64,
    space: ColorSpace,
) -> Option<Style> {
    match animation_phase(spec, elapsed_ms) {
        AnimationPhase::Before => spec.fill_mode.fills_backwards().then(|| {
            let start = directed(spec, 0, 0.0);
            keyframes.sample(spec.timing.apply(start), space)
        }),
        AnimationPhase::Finished => spec.fill_mode.fills_forwards().then(|| {
            let (iteration, progress) = end_position(spec);
            let end = directed(spec, iteration, progress);
            keyframes.sample(spec.timing.apply(end), space)
        }),
        AnimationPhase::Active(p) => Some(keyframes.sample(p, space)),
    }
}

/// Playback record for one element's animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub spec: AnimationSpec,
    pub start_ms: f64,
    /// Set once the animation ends without a forwards fill; it then
    /// contributes nothing until the declaration changes.
    pub finished: bool,
}

impl AnimationState {
    pub fn new(spec: AnimationSpec, start_ms: f64) -> Self {
        Self {
            spec,
            start_ms,
            finished: false,
        }
    }

    /// Style overlay at `now_ms`, marking the state finished when due.
    pub fn style_at(&mut self, keyframes: &Keyframes, now_ms: f64, space: ColorSpace) -> Option<Style> {
        if self.finished {
            return None;
        }
        let elapsed = now_ms - self.start_ms;
        if !self.spec.fill_mode.fills_forwards()
            && animation_phase(&self.spec, elapsed) == AnimationPhase::Finished
        {
            self.finished = true;
            return None;
        }
        animated_style(keyframes, &self.spec, elapsed, space)
    }
}

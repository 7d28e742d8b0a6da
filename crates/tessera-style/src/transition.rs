#![forbid(unsafe_code)]

//! Property transitions.
//!
//! A `transition` declaration names properties that animate toward their new
//! value when it changes between frames. [`TransitionState`] remembers the
//! previous frame's values for one element and runs the in-flight
//! [`ActiveTransition`]s.

use std::collections::HashMap;

use tessera_render::color::ColorSpace;

use crate::animation::split_top_level;
use crate::timing::TimingFunction;
use crate::value::{Style, StyleValue, ValueParseError, interpolate, is_time_token, parse_time_ms};

/// One entry of a `transition` list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSpec {
    /// camelCase property name, or `all`.
    pub property: String,
    pub duration_ms: f64,
    pub timing: TimingFunction,
    pub delay_ms: f64,
}

impl TransitionSpec {
    pub fn new(property: &str, duration_ms: f64) -> Self {
        Self {
            property: crate::value::camel_case(property).into_owned(),
            duration_ms,
            timing: TimingFunction::default(),
            delay_ms: 0.0,
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

    /// Whether this entry covers `property`.
    pub fn applies_to(&self, property: &str) -> bool {
        self.property == "all" || self.property == property
    }

    /// Parse one entry: `"<property> <duration> [timing] [delay]"`.
    pub fn parse(s: &str) -> Result<Self, ValueParseError> {
        let mut spec = Self::new("all", 0.0);
        let mut times_seen = 0;
        let mut named = false;
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
            } else if !named {
                spec.property = crate::value::camel_case(token).into_owned();
                named = true;
            } else {
                return Err(ValueParseError::InvalidTiming(token.to_string()));
            }
        }
        if !named && times_seen == 0 {
            return Err(ValueParseError::InvalidTime(s.to_string()));
        }
        Ok(spec)
    }

    /// Parse a comma-separated list: `"color 300ms ease, background 1s"`.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, ValueParseError> {
        split_top_level(s, ',').into_iter().map(Self::parse).collect()
    }
}

/// Find the entry governing `property`; later entries win, like CSS.
pub fn spec_for<'a>(specs: &'a [TransitionSpec], property: &str) -> Option<&'a TransitionSpec> {
    specs.iter().rev().find(|s| s.applies_to(property))
}

/// A transition in flight for one property.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTransition {
    pub from: StyleValue,
    pub to: StyleValue,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub timing: TimingFunction,
}

impl ActiveTransition {
    /// Value at `now_ms` and whether the transition has completed.
    pub fn value_at(&self, now_ms: f64, space: ColorSpace) -> (StyleValue, bool) {
        let local = now_ms - self.start_ms - self.delay_ms;
        if local < 0.0 {
            return (self.from.clone(), false);
        }
        if self.duration_ms <= 0.0 || local >= self.duration_ms {
            return (self.to.clone(), true);
        }
        let eased = self.timing.apply((local / self.duration_ms) as f32);
        (interpolate(&self.from, &self.to, eased, space), false)
    }
}

/// Per-element transition tracker.
#[derive(Debug, Clone, Default)]
pub struct TransitionState {
    previous: Style,
    active: HashMap<String, ActiveTransition>,
}

impl TransitionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, property: &str) -> bool {
        self.active.contains_key(property)
    }

    /// Start or re-base transitions for properties that changed since the
    /// previous frame, then remember `target` as the new previous frame.
    ///
    /// An interrupted transition starts from its current interpolated value,
    /// so the property never snaps.
    pub fn detect_changes(
        &mut self,
        specs: &[TransitionSpec],
        target: &Style,
        now_ms: f64,
        space: ColorSpace,
    ) {
        for (name, next) in target.iter() {
            if matches!(name, "animation" | "transition") {
                continue;
            }
            let Some(spec) = spec_for(specs, name) else {
                continue;
            };
            let Some(prev) = self.previous.get(name) else {
                continue;
            };
            if prev == next {
                continue;
            }
            let from = match self.active.get(name) {
                Some(running) => running.value_at(now_ms, space).0,
                None => prev.clone(),
            };
            if spec.duration_ms <= 0.0 && spec.delay_ms <= 0.0 {
                self.active.remove(name);
                continue;
            }
            tracing::trace!(target: "tessera::style", property = name, "transition started");
            self.active.insert(
                name.to_string(),
                ActiveTransition {
                    from,
                    to: next.clone(),
                    start_ms: now_ms,
                    duration_ms: spec.duration_ms,
                    delay_ms: spec.delay_ms,
                    timing: spec.timing,
                },
            );
        }
        // Properties no longer transitioned, or no longer present, stop.
        self.active
            .retain(|name, _| target.contains(name) && spec_for(specs, name).is_some());
        self.previous = target.clone();
    }

    /// Overlay in-flight values onto `style`, dropping finished transitions.
    pub fn apply(&mut self, style: &mut Style, now_ms: f64, space: ColorSpace) {
        self.active.retain(|name, transition| {
            let (value, finished) = transition.value_at(now_ms, space);
            style.insert_raw(name.clone(), value);
            !finished
        });
    }
}

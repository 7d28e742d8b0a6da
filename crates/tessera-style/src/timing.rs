#![forbid(unsafe_code)]

//! CSS timing functions.
//!
//! Maps linear progress `t ∈ [0, 1]` to eased progress. Named curves are the
//! standard CSS cubic-bézier presets; `steps()` produces a staircase.

use std::fmt;
use std::str::FromStr;

use crate::value::ValueParseError;

/// Where a `steps()` function jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPosition {
    /// Jump at the start of each interval (`steps(n, start)`).
    Start,
    /// Jump at the end of each interval (`steps(n, end)`, the default).
    End,
}

/// An easing curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingFunction {
    Linear,
    /// Control points `(x1, y1, x2, y2)`; `x` values are clamped to `[0, 1]`.
    CubicBezier(f32, f32, f32, f32),
    Steps(u32, StepPosition),
}

impl Default for TimingFunction {
    fn default() -> Self {
        Self::EASE
    }
}

impl TimingFunction {
    pub const EASE: Self = Self::CubicBezier(0.25, 0.1, 0.25, 1.0);
    pub const EASE_IN: Self = Self::CubicBezier(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: Self = Self::CubicBezier(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: Self = Self::CubicBezier(0.42, 0.0, 0.58, 1.0);

    /// Eased progress for linear progress `t` (clamped to `[0, 1]`).
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match *self {
            Self::Linear => t,
            Self::CubicBezier(x1, y1, x2, y2) => solve_bezier(x1, y1, x2, y2, t),
            Self::Steps(n, pos) => {
                let n = n.max(1) as f32;
                let step = match pos {
                    StepPosition::Start => (t * n).ceil(),
                    StepPosition::End => (t * n).floor(),
                };
                (step / n).clamp(0.0, 1.0)
            }
        }
    }

    /// Parse leniently: unknown curves are logged and treated as linear.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|err| {
            tracing::debug!(target: "tessera::style", %err, "falling back to linear timing");
            Self::Linear
        })
    }

    /// Whether `s` names a timing function (used by shorthand parsers).
    pub(crate) fn looks_like(s: &str) -> bool {
        let s = s.trim();
        matches!(
            s,
            "linear" | "ease" | "ease-in" | "ease-out" | "ease-in-out" | "step-start" | "step-end"
        ) || s.starts_with("cubic-bezier(")
            || s.starts_with("steps(")
    }
}

/// Evaluate the bézier `y` at the parameter whose `x` equals `x_target`.
fn solve_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x_target: f32) -> f32 {
    if x_target <= 0.0 {
        return 0.0;
    }
    if x_target >= 1.0 {
        return 1.0;
    }
    let (x1, x2) = (x1.clamp(0.0, 1.0), x2.clamp(0.0, 1.0));
    // Polynomial coefficients for B(s) = ((a s + b) s + c) s.
    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;
    let sample_x = |s: f32| ((ax * s + bx) * s + cx) * s;
    let sample_y = |s: f32| ((ay * s + by) * s + cy) * s;
    let slope_x = |s: f32| (3.0 * ax * s + 2.0 * bx) * s + cx;

    // Newton first, bisection if the slope is too flat.
    let mut s = x_target;
    for _ in 0..8 {
        let err = sample_x(s) - x_target;
        if err.abs() < 1e-6 {
            return sample_y(s);
        }
        let d = slope_x(s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= err / d;
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    s = x_target;
    for _ in 0..32 {
        let x = sample_x(s);
        if (x - x_target).abs() < 1e-6 {
            break;
        }
        if x < x_target {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    sample_y(s)
}

fn parse_args(s: &str, name: &str) -> Option<Vec<String>> {
    let inner = s.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split(',').map(|p| p.trim().to_string()).collect())
}

impl FromStr for TimingFunction {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        let err = || ValueParseError::InvalidTiming(s.to_string());
        match t.as_str() {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::EASE),
            "ease-in" => return Ok(Self::EASE_IN),
            "ease-out" => return Ok(Self::EASE_OUT),
            "ease-in-out" => return Ok(Self::EASE_IN_OUT),
            "step-start" => return Ok(Self::Steps(1, StepPosition::Start)),
            "step-end" => return Ok(Self::Steps(1, StepPosition::End)),
            _ => {}
        }
        if let Some(args) = parse_args(&t, "cubic-bezier") {
            let nums: Result<Vec<f32>, _> = args.iter().map(|a| a.parse::<f32>()).collect();
            return match nums.map_err(|_| err())?.as_slice() {
                [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
                    Ok(Self::CubicBezier(*x1, *y1, *x2, *y2))
                }
                _ => Err(err()),
            };
        }
        if let Some(args) = parse_args(&t, "steps") {
            let n: u32 = args
                .first()
                .and_then(|a| a.parse().ok())
                .filter(|n| *n > 0)
                .ok_or_else(err)?;
            let pos = match args.get(1).map(String::as_str) {
                None | Some("end") | Some("jump-end") => StepPosition::End,
                Some("start") | Some("jump-start") => StepPosition::Start,
                Some(_) => return Err(err()),
            };
            if args.len() > 2 {
                return Err(err());
            }
            return Ok(Self::Steps(n, pos));
        }
        Err(err())
    }
}

impl fmt::Display for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::CubicBezier(a, b, c, d) => write!(f, "cubic-bezier({a}, {b}, {c}, {d})"),
            Self::Steps(n, StepPosition::Start) => write!(f, "steps({n}, start)"),
            Self::Steps(n, StepPosition::End) => write!(f, "steps({n}, end)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn endpoints_are_fixed() {
        for tf in [
            TimingFunction::Linear,
            TimingFunction::EASE,
            TimingFunction::EASE_IN,
            TimingFunction::EASE_OUT,
            TimingFunction::EASE_IN_OUT,
        ] {
            assert_eq!(tf.apply(0.0), 0.0, "{tf}");
            assert_eq!(tf.apply(1.0), 1.0, "{tf}");
        }
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        let tf = TimingFunction::EASE_IN_OUT;
        assert!(approx(tf.apply(0.5), 0.5));
        assert!(approx(tf.apply(0.25) + tf.apply(0.75), 1.0));
    }

    #[test]
    fn ease_in_starts_slow() {
        assert!(TimingFunction::EASE_IN.apply(0.25) < 0.25);
        assert!(TimingFunction::EASE_OUT.apply(0.25) > 0.25);
    }

    #[test]
    fn linear_bezier_is_identity() {
        let tf = TimingFunction::CubicBezier(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!(approx(tf.apply(t), t), "t={t}");
        }
    }

    #[test]
    fn steps_staircase() {
        let end = TimingFunction::Steps(4, StepPosition::End);
        assert_eq!(end.apply(0.0), 0.0);
        assert_eq!(end.apply(0.3), 0.25);
        assert_eq!(end.apply(0.99), 0.75);
        assert_eq!(end.apply(1.0), 1.0);
        let start = TimingFunction::Steps(4, StepPosition::Start);
        assert_eq!(start.apply(0.01), 0.25);
        assert_eq!(start.apply(0.0), 0.0);
    }

    #[test]
    fn parse_named_and_functions() {
        assert_eq!("ease".parse(), Ok(TimingFunction::EASE));
        assert_eq!("Linear".parse(), Ok(TimingFunction::Linear));
        assert_eq!(
            "cubic-bezier(0.1, 0.7, 1.0, 0.1)".parse(),
            Ok(TimingFunction::CubicBezier(0.1, 0.7, 1.0, 0.1))
        );
        assert_eq!(
            "steps(3, start)".parse(),
            Ok(TimingFunction::Steps(3, StepPosition::Start))
        );
        assert_eq!("steps(2)".parse(), Ok(TimingFunction::Steps(2, StepPosition::End)));
        assert!("cubic-bezier(2, 0, 0, 1)".parse::<TimingFunction>().is_err());
        assert!("steps(0)".parse::<TimingFunction>().is_err());
        assert!("bounce".parse::<TimingFunction>().is_err());
    }

    #[test]
    fn lenient_parse_falls_back_to_linear() {
        assert_eq!(TimingFunction::parse_lenient("wobble"), TimingFunction::Linear);
        assert_eq!(TimingFunction::parse_lenient("ease-out"), TimingFunction::EASE_OUT);
    }

    #[test]
    fn overshooting_curve_leaves_unit_range() {
        let back = TimingFunction::CubicBezier(0.68, -0.6, 0.32, 1.6);
        assert!(back.apply(0.1) < 0.0);
        assert!(back.apply(0.9) > 1.0);
    }
}

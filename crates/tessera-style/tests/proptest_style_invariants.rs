//! Property-based invariants for timing and animation sampling:
//!
//! 1. Standard easing curves stay within `[0, 1]` and never decrease.
//! 2. `steps(n)` only produces multiples of `1/n`.
//! 3. Linear keyframe sampling stays between the two keyframe values.
//! 4. camelCase normalization is idempotent.

use proptest::prelude::*;
use tessera_render::color::ColorSpace;
use tessera_style::animation::{AnimationSpec, FillMode, IterationCount, Keyframes, animated_style};
use tessera_style::timing::{StepPosition, TimingFunction};
use tessera_style::value::camel_case;
use tessera_style::{AnimationDirection, Style};

fn standard_curve() -> impl Strategy<Value = TimingFunction> {
    prop_oneof![
        Just(TimingFunction::Linear),
        Just(TimingFunction::EASE),
        Just(TimingFunction::EASE_IN),
        Just(TimingFunction::EASE_OUT),
        Just(TimingFunction::EASE_IN_OUT),
    ]
}

fn direction() -> impl Strategy<Value = AnimationDirection> {
    prop_oneof![
        Just(AnimationDirection::Normal),
        Just(AnimationDirection::Reverse),
        Just(AnimationDirection::Alternate),
        Just(AnimationDirection::AlternateReverse),
    ]
}

proptest! {
    #[test]
    fn easing_is_bounded_and_monotonic(tf in standard_curve(), a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (ylo, yhi) = (tf.apply(lo), tf.apply(hi));
        let unit = -1e-4..=1.0 + 1e-4;
        prop_assert!(unit.contains(&ylo) && unit.contains(&yhi));
        prop_assert!(ylo <= yhi + 1e-4, "{tf}: f({lo})={ylo} > f({hi})={yhi}");
    }

    #[test]
    fn steps_are_quantized(n in 1u32..16, t in 0.0f32..=1.0, start in any::<bool>()) {
        let pos = if start { StepPosition::Start } else { StepPosition::End };
        let y = TimingFunction::Steps(n, pos).apply(t) * n as f32;
        prop_assert!((y - y.round()).abs() < 1e-4);
    }

    #[test]
    fn sampled_values_stay_between_keyframes(
        from in -100.0f32..100.0,
        to in -100.0f32..100.0,
        elapsed in 0.0f64..5000.0,
        dir in direction(),
    ) {
        let frames = Keyframes::new([
            (0.0, Style::new().with("x", from)),
            (1.0, Style::new().with("x", to)),
        ]).unwrap_or_else(|| unreachable!());
        let spec = AnimationSpec::new("x", 700.0)
            .timing(TimingFunction::EASE_IN_OUT)
            .iterations(IterationCount::Infinite)
            .direction(dir)
            .fill_mode(FillMode::Both);
        let x = animated_style(&frames, &spec, elapsed, ColorSpace::Rgb)
            .and_then(|s| s.number("x"));
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        let x = x.unwrap_or(f32::NAN);
        prop_assert!(x >= lo - 1e-3 && x <= hi + 1e-3, "x={x} not in [{lo}, {hi}]");
    }

    #[test]
    fn camel_case_is_idempotent(name in "[a-z]{1,6}(-[a-z]{1,6}){0,3}") {
        let once = camel_case(&name).into_owned();
        prop_assert_eq!(camel_case(&once).into_owned(), once.clone());
        prop_assert!(!once.contains('-'));
    }
}

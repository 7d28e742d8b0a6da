//! Property-based invariants for `Rect`:
//!
//! 1. Intersection is commutative.
//! 2. Intersection fits within both inputs.
//! 3. `contains` agrees with `contains_signed` for non-negative points.
//! 4. `inner` never grows past the original rectangle.

use proptest::prelude::*;
use tessera_core::geometry::{Rect, Sides};

fn small_rect() -> impl Strategy<Value = Rect> {
    (0u16..=300, 0u16..=300, 0u16..=300, 0u16..=300)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn intersection_commutative(a in small_rect(), b in small_rect()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn intersection_within_inputs(a in small_rect(), b in small_rect()) {
        let i = a.intersection(&b);
        if !i.is_empty() {
            prop_assert!(i.x >= a.x && i.right() <= a.right());
            prop_assert!(i.y >= b.y && i.bottom() <= b.bottom());
        }
    }

    #[test]
    fn signed_contains_matches_unsigned(r in small_rect(), x in 0u16..700, y in 0u16..700) {
        prop_assert_eq!(r.contains(x, y), r.contains_signed(i32::from(x), i32::from(y)));
    }

    #[test]
    fn inner_stays_within_outer(r in small_rect(), t in 0u16..50, ri in 0u16..50, b in 0u16..50, l in 0u16..50) {
        let inner = r.inner(Sides::new(t, ri, b, l));
        prop_assert!(inner.width <= r.width && inner.height <= r.height);
        prop_assert!(inner.x >= r.x && inner.y >= r.y);
        if !inner.is_empty() {
            prop_assert!(inner.right() <= r.right() && inner.bottom() <= r.bottom());
        }
    }
}

//! Property-based invariants for the render kernel.
//!
//! 1. Packing and unpacking RGBA is lossless.
//! 2. Wide characters always occupy a head + continuation pair, and the
//!    occupancy map agrees with cell contents, after any sequence of writes.
//! 3. Diffing is idempotent: two diffs with no intervening writes agree.
//! 4. After a swap, redrawing the same frame produces an empty diff.

use proptest::prelude::*;
use tessera_render::color::{pack_rgba, unpack_rgba};
use tessera_render::{Cell, CellStyle, CellTarget, DualBuffer, TerminalBuffer};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Text mixing ASCII, CJK, emoji, combining marks and controls.
fn mixed_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "a", "Z", " ", "日", "本", "語", "한", "🎉", "⚡", "e\u{0301}", "\t", "\n", "\u{200D}",
            "Ａ", "x",
        ]),
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

#[derive(Debug, Clone)]
enum Op {
    Text(i32, i32, String),
    Cell(i32, i32, char),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-3i32..14, -1i32..5, mixed_text()).prop_map(|(x, y, s)| Op::Text(x, y, s)),
        4 => (-1i32..13, -1i32..5, prop::sample::select(vec!['a', '日', '🎉', ' ', 'q']))
            .prop_map(|(x, y, c)| Op::Cell(x, y, c)),
        1 => Just(Op::Clear),
    ]
}

fn apply(buf: &mut TerminalBuffer, op: &Op) {
    match op {
        Op::Text(x, y, s) => {
            buf.set_text(*x, *y, s, &CellStyle::default());
        }
        Op::Cell(x, y, c) => buf.set_cell(*x, *y, Cell::from_char(*c)),
        Op::Clear => buf.clear(),
    }
}

fn check_wide_invariant(buf: &TerminalBuffer) -> Result<(), TestCaseError> {
    for y in 0..i32::from(buf.height()) {
        for x in 0..i32::from(buf.width()) {
            let cell = buf.get(x, y).cloned().unwrap_or_default();
            if cell.is_wide() {
                let cont = buf.get(x + 1, y).cloned().unwrap_or_default();
                prop_assert!(cont.is_continuation(), "head at ({x},{y}) lacks continuation");
                prop_assert_eq!(cont.glyph.as_str(), "");
                prop_assert_eq!(cont.width, 0);
                prop_assert!(buf.is_wide_at(x, y) && buf.is_wide_at(x + 1, y));
            } else if cell.is_continuation() {
                let head = buf.get(x - 1, y).cloned().unwrap_or_default();
                prop_assert!(head.is_wide(), "orphan continuation at ({x},{y})");
            } else {
                prop_assert!(!buf.is_wide_at(x, y), "stale occupancy at ({x},{y})");
            }
        }
    }
    Ok(())
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rgba_pack_round_trip(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), a in any::<u8>()) {
        let c = unpack_rgba(pack_rgba(r, g, b, a));
        prop_assert_eq!((c.r, c.g, c.b, c.a), (r, g, b, a));
    }

    #[test]
    fn wide_invariant_holds_after_any_writes(ops in prop::collection::vec(op(), 1..30)) {
        let mut buf = TerminalBuffer::new(12, 4);
        for op in &ops {
            apply(&mut buf, op);
            check_wide_invariant(&buf)?;
        }
    }

    #[test]
    fn wide_invariant_survives_resize(
        ops in prop::collection::vec(op(), 1..12),
        w in 0u16..16,
        h in 0u16..6,
    ) {
        let mut buf = TerminalBuffer::new(12, 4);
        for op in &ops {
            apply(&mut buf, op);
        }
        buf.resize(w, h);
        check_wide_invariant(&buf)?;
    }

    #[test]
    fn diff_is_idempotent(
        before in prop::collection::vec(op(), 0..10),
        after in prop::collection::vec(op(), 0..10),
    ) {
        let mut previous = TerminalBuffer::new(12, 4);
        for op in &before {
            apply(&mut previous, op);
        }
        let mut current = previous.clone();
        for op in &after {
            apply(&mut current, op);
        }
        prop_assert_eq!(current.diff(&previous), current.diff(&previous));
    }

    #[test]
    fn redrawing_same_frame_after_swap_is_empty(frame in prop::collection::vec(op(), 0..10)) {
        let mut dual = DualBuffer::new(12, 4);
        for op in &frame {
            apply(dual.current_mut(), op);
        }
        dual.swap_and_get_diff();
        for op in &frame {
            apply(dual.current_mut(), op);
        }
        prop_assert!(dual.swap_and_get_diff().is_empty());
    }
}

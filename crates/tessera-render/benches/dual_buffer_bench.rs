//! Benchmarks for the dual-buffer frame cycle.
//!
//! Run with: cargo bench -p tessera-render --bench dual_buffer_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tessera_render::{CellStyle, CellTarget, DualBuffer, TerminalBuffer};

const SIZES: [(u16, u16); 3] = [(80, 24), (120, 40), (200, 60)];

fn fill_text(buf: &mut TerminalBuffer, seed: usize) {
    let style = CellStyle::default();
    for y in 0..buf.height() {
        let line = if (y as usize + seed) % 3 == 0 {
            "日本語のテキストと emoji 🎉 mixed with ascii text"
        } else {
            "the quick brown fox jumps over the lazy dog 0123456789"
        };
        buf.set_text(0, i32::from(y), line, &style);
    }
}

fn bench_swap_and_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("dual_buffer/swap_and_get_diff");

    for (w, h) in SIZES {
        group.throughput(Throughput::Elements(u64::from(w) * u64::from(h)));

        let mut unchanged = DualBuffer::new(w, h);
        group.bench_with_input(
            BenchmarkId::new("identical_frames", format!("{w}x{h}")),
            &(),
            |b, _| {
                b.iter(|| {
                    fill_text(unchanged.current_mut(), 0);
                    black_box(unchanged.swap_and_get_diff());
                })
            },
        );

        let mut alternating = DualBuffer::new(w, h);
        let mut seed = 0usize;
        group.bench_with_input(
            BenchmarkId::new("alternating_frames", format!("{w}x{h}")),
            &(),
            |b, _| {
                b.iter(|| {
                    seed = seed.wrapping_add(1);
                    fill_text(alternating.current_mut(), seed);
                    black_box(alternating.swap_and_get_diff());
                })
            },
        );
    }

    group.finish();
}

fn bench_force_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("dual_buffer/force_redraw");
    for (w, h) in SIZES {
        group.throughput(Throughput::Elements(u64::from(w) * u64::from(h)));
        let mut dual = DualBuffer::new(w, h);
        fill_text(dual.current_mut(), 1);
        group.bench_function(BenchmarkId::from_parameter(format!("{w}x{h}")), |b| {
            b.iter(|| black_box(dual.force_redraw()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_swap_and_diff, bench_force_redraw);
criterion_main!(benches);

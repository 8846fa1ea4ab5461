use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pledge_products::{generate_combinations, OptionAxis};

/// `axes` axes of `width` values each.
fn axes(axes: usize, width: usize) -> Vec<OptionAxis> {
    (0..axes)
        .map(|a| OptionAxis::new(format!("Axis{a}"), (0..width).map(|v| format!("V{a}-{v}"))))
        .collect()
}

fn bench_generate_combinations(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_combinations");

    for (n_axes, width) in [(1, 8), (2, 8), (3, 8), (4, 6)] {
        let input = axes(n_axes, width);
        let combos = width.pow(n_axes as u32) as u64;
        group.throughput(Throughput::Elements(combos));
        group.bench_with_input(
            BenchmarkId::new(format!("{n_axes}x{width}"), combos),
            &input,
            |b, input| b.iter(|| generate_combinations(black_box(input))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_generate_combinations);
criterion_main!(benches);

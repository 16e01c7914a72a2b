//! Benchmarks for pairwise overlay and cascaded union.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use planarum::{cascaded_union, overlay, BooleanOp, Coordinate, Geometry, GeometryFactory};

/// Deterministic xorshift stream.
fn next(state: &mut u64) -> f64 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state as f64 / u64::MAX as f64
}

/// Generates a convex-ish polygon with `n` vertices around a center.
fn generate_polygon(f: &GeometryFactory, cx: f64, cy: f64, radius: f64, n: usize) -> Geometry {
    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = i as f64 / n as f64 * 2.0 * std::f64::consts::PI;
        coords.push(Coordinate::new(
            cx + radius * angle.cos(),
            cy + radius * angle.sin(),
        ));
    }
    coords.push(coords[0]);
    f.create_polygon(f.create_linear_ring(coords), vec![])
}

/// Generates randomly placed polygons in a 100 x 100 field.
fn generate_random_polygons(count: usize, seed: u64) -> Vec<Geometry> {
    let f = GeometryFactory::default();
    let mut state = seed;
    let mut polys = Vec::with_capacity(count);
    for _ in 0..count {
        let cx = next(&mut state) * 100.0;
        let cy = next(&mut state) * 100.0;
        let r = next(&mut state) * 3.0 + 0.5;
        polys.push(generate_polygon(&f, cx, cy, r, 12));
    }
    polys
}

fn bench_pairwise_overlay(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairwise_overlay");

    let f = GeometryFactory::default();
    for n in [8, 32, 128] {
        let a = generate_polygon(&f, 0.0, 0.0, 10.0, n);
        let b = generate_polygon(&f, 5.0, 5.0, 10.0, n);
        group.throughput(Throughput::Elements(n as u64));

        for op in [BooleanOp::Intersection, BooleanOp::Union] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", op), n),
                &(&a, &b),
                |bench, (a, b)| bench.iter(|| overlay(black_box(a), black_box(b), op).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_cascaded_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascaded_union");

    for count in [10, 100, 500] {
        let polys = generate_random_polygons(count, 12345);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("random", count), &polys, |b, polys| {
            b.iter(|| cascaded_union(black_box(polys.clone())).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pairwise_overlay, bench_cascaded_union);
criterion_main!(benches);

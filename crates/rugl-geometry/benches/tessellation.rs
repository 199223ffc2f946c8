//! Benchmarks for polyline tessellation

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec2;
use rugl_geometry::{
    BevelJoin, Line, LineCap, LineJoin, MiterDecoration, RoundDecoration, SquareCap,
};

/// A sine wave sampled at `count` points, so every interior point is a turn.
fn wave(count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let x = i as f32 * 4.0;
            Vec2::new(x, (x * 0.1).sin() * 50.0)
        })
        .collect()
}

fn bench_build_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_line");

    let decorations = [
        ("plain", LineJoin::None, LineCap::None),
        ("bevel", LineJoin::Bevel(BevelJoin), LineCap::Square(SquareCap)),
        (
            "round",
            LineJoin::Round(RoundDecoration::default()),
            LineCap::Round(RoundDecoration::default()),
        ),
        (
            "miter",
            LineJoin::Miter(MiterDecoration::default()),
            LineCap::Miter(MiterDecoration::default()),
        ),
    ];

    for size in [10, 100, 1000, 10000] {
        let points = wave(size);
        group.throughput(Throughput::Elements(size as u64));

        for (name, join, cap) in decorations {
            let mut line = Line::new(3.0).with_join(join).with_cap(cap);
            group.bench_with_input(BenchmarkId::new(name, size), &points, |b, points| {
                b.iter(|| {
                    for &p in points {
                        line.add_point(p);
                    }
                    black_box(line.build_line(0.0))
                });
            });
        }
    }

    group.finish();
}

fn bench_build_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_loop");

    for size in [16, 256, 4096] {
        let points: Vec<Vec2> = (0..size)
            .map(|i| Vec2::from_angle(i as f32 / size as f32 * std::f32::consts::TAU) * 100.0)
            .collect();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            let mut line = Line::new(2.0).with_join(LineJoin::Bevel(BevelJoin));
            b.iter(|| {
                for &p in points {
                    line.add_point(p);
                }
                black_box(line.build_loop(0.0))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_line, bench_build_loop);
criterion_main!(benches);

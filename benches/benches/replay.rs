// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for recording, painting, and hit-testing replay groups.
//!
//! The synthetic scene is a grid of square parcels crossed by horizontal
//! roads, which exercises both the polygon and the batched line-string paths.

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use kurbo::{Affine, Point, Rect};
use peniko::Color;
use understory_replay::{
    DrawingContext, Extent, FillStyle, FlatGeometry, HitDetectionContext, ImageId, ReplayGroup,
    ReplayType, StrokeState, StrokeStyle,
};
use understory_replay_vello_cpu::VelloCpuContext;

const CELL: f64 = 10.0;

/// Counts calls without drawing, so painting cost is the interpreter's own.
#[derive(Debug, Default)]
struct Counter {
    calls: u64,
}

impl DrawingContext for Counter {
    fn begin_path(&mut self) {
        self.calls += 1;
    }
    fn close_path(&mut self) {
        self.calls += 1;
    }
    fn move_to(&mut self, _: f64, _: f64) {
        self.calls += 1;
    }
    fn line_to(&mut self, _: f64, _: f64) {
        self.calls += 1;
    }
    fn fill(&mut self) {
        self.calls += 1;
    }
    fn stroke(&mut self) {
        self.calls += 1;
    }
    fn draw_image(&mut self, _: ImageId, _: Rect) {
        self.calls += 1;
    }
    fn set_fill_style(&mut self, _: Color) {
        self.calls += 1;
    }
    fn set_stroke_style(&mut self, _: &StrokeState) {
        self.calls += 1;
    }
}

impl HitDetectionContext for Counter {
    fn probe_alpha(&mut self) -> u8 {
        0
    }
    fn clear_probe(&mut self) {}
}

fn parcel(col: usize, row: usize) -> FlatGeometry {
    let x = col as f64 * CELL;
    let y = row as f64 * CELL;
    let s = CELL * 0.8;
    FlatGeometry::polygon(&[&[(x, y), (x + s, y), (x + s, y + s), (x, y + s)]])
}

fn road(row: usize, side: usize) -> FlatGeometry {
    let y = row as f64 * CELL + CELL * 0.9;
    let points: Vec<(f64, f64)> = (0..=side).map(|i| (i as f64 * CELL, y)).collect();
    FlatGeometry::line_string(&points)
}

fn record<H: HitDetectionContext>(
    side: usize,
    hit_detection_context: H,
) -> ReplayGroup<FlatGeometry, usize, H> {
    let mut group = ReplayGroup::new(hit_detection_context);
    let fill = FillStyle::new(Color::BLACK);
    let stroke = StrokeStyle::new(Color::WHITE, 2.0);
    for row in 0..side {
        let polygons = group.get_replay(Some(0), ReplayType::Polygon);
        polygons.set_fill_stroke_style(Some(&fill), None);
        for col in 0..side {
            polygons.draw_geometry(parcel(col, row), row * side + col);
        }
        let lines = group.get_replay(Some(1), ReplayType::LineString);
        lines.set_fill_stroke_style(None, Some(&stroke));
        lines.draw_geometry(road(row, side), row);
    }
    group.finish();
    group
}

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay/record");
    for side in [16_usize, 64, 128] {
        group.throughput(Throughput::Elements((side * side + side) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
            b.iter(|| black_box(record(side, Counter::default())));
        });
    }
    group.finish();
}

fn bench_paint(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay/paint");
    for side in [16_usize, 64, 128] {
        group.throughput(Throughput::Elements((side * side + side) as u64));

        // Same transform every frame: pixel coordinates come from the cache.
        group.bench_with_input(BenchmarkId::new("cached", side), &side, |b, &side| {
            let mut scene = record(side, Counter::default());
            let mut screen = Counter::default();
            b.iter(|| {
                scene.replay(&mut screen, &Extent::EVERYTHING, Affine::scale(0.5), |_| true);
            });
            black_box(screen.calls);
        });

        // A pan on every frame forces the coordinates to be transformed again.
        group.bench_with_input(BenchmarkId::new("panning", side), &side, |b, &side| {
            let mut scene = record(side, Counter::default());
            let mut screen = Counter::default();
            let mut offset = 0.0;
            b.iter(|| {
                offset += 1.0;
                let transform = Affine::translate((offset, 0.0)) * Affine::scale(0.5);
                scene.replay(&mut screen, &Extent::EVERYTHING, transform, |_| true);
            });
            black_box(screen.calls);
        });
    }
    group.finish();
}

fn bench_hit_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay/hit_detection");
    for side in [16_usize, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
            b.iter_batched(
                || record(side, VelloCpuContext::hit_detection()),
                |mut scene| {
                    let mut hits = 0_usize;
                    scene.for_each_geometry_at_coordinate(
                        &Extent::EVERYTHING,
                        1.0,
                        Point::new(CELL * 0.5, CELL * 0.9),
                        |_| true,
                        |_, _| hits += 1,
                    );
                    black_box(hits);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_record, bench_paint, bench_hit_detection);
criterion_main!(benches);

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end traces of replay groups against the reference context.

use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;
use peniko::color::palette::css::{BLUE, RED};
use understory_replay::{
    Extent, FillStyle, FlatGeometry, Geometry, ImageId, ImageStyle, ReplayGroup, ReplayType,
    StrokeStyle,
};
use understory_replay_ref::{DrawOp, Event, PathOp, RefContext, StateOp};

type Group = ReplayGroup<FlatGeometry, u32, RefContext>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn draws(ctx: &RefContext) -> Vec<DrawOp> {
    ctx.draws().cloned().collect()
}

#[test]
fn line_strings_paint_as_one_batch_per_style() {
    init_logging();
    let mut group = Group::new(RefContext::default());
    let lines = group.get_replay(None, ReplayType::LineString);
    lines.set_fill_stroke_style(None, Some(&StrokeStyle::new(RED, 2.0)));
    lines.draw_geometry(
        FlatGeometry::line_string(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
        1,
    );
    lines.draw_geometry(FlatGeometry::line_string(&[(0.0, 5.0), (5.0, 5.0)]), 2);
    group.finish();

    let mut ctx = RefContext::default();
    group.replay(
        &mut ctx,
        &Extent::EVERYTHING,
        Affine::translate((100.0, 0.0)),
        |_| true,
    );

    let ops = draws(&ctx);
    assert_eq!(ops.len(), 1, "both lines share the batch stroke");
    let DrawOp::Stroke(path) = &ops[0] else {
        panic!("expected a stroke");
    };
    assert_eq!(path.elements().len(), 5);
    let Some(Event::Draw { state, .. }) = ctx.events().last() else {
        panic!("expected the stroke to come last");
    };
    let stroke = state.stroke.as_ref().expect("stroke style applied");
    assert_eq!(stroke.color, RED);
    assert_eq!(stroke.width, 2.0);
}

#[test]
fn polygon_events_follow_the_tape() {
    init_logging();
    let mut group = Group::new(RefContext::default());
    let polygons = group.get_replay(Some(2), ReplayType::Polygon);
    polygons.set_fill_stroke_style(Some(&FillStyle::new(BLUE)), None);
    polygons.draw_geometry(
        FlatGeometry::polygon(&[&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]]),
        7,
    );
    group.finish();

    let mut ctx = RefContext::default();
    group.replay(&mut ctx, &Extent::EVERYTHING, Affine::IDENTITY, |_| true);

    let kinds: Vec<_> = ctx
        .events()
        .iter()
        .map(|event| match event {
            Event::State { op: StateOp::SetFillStyle(_), .. } => "fill-style",
            Event::Path { op: PathOp::BeginPath, .. } => "begin",
            Event::Path { op: PathOp::MoveTo(_), .. } => "move",
            Event::Path { op: PathOp::LineTo(_), .. } => "line",
            Event::Path { op: PathOp::ClosePath, .. } => "close",
            Event::Draw { op: DrawOp::Fill(_), .. } => "fill",
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        ["fill-style", "begin", "move", "line", "line", "line", "line", "close", "fill"]
    );
    let Some(Event::Draw { state, .. }) = ctx.events().last() else {
        panic!("expected the fill to come last");
    };
    assert_eq!(state.fill, BLUE);
}

#[test]
fn images_are_drawn_at_their_anchor() {
    init_logging();
    let mut group = Group::new(RefContext::default());
    let points = group.get_replay(None, ReplayType::Image);
    points.set_image_style(ImageStyle {
        anchor: Point::new(8.0, 16.0),
        size: Size::new(16.0, 16.0),
        image: ImageId(4),
        snap_to_pixel: true,
    });
    points.draw_geometry(FlatGeometry::point(10.25, 20.75), 1);
    group.finish();

    let mut ctx = RefContext::default();
    group.replay(&mut ctx, &Extent::EVERYTHING, Affine::IDENTITY, |_| true);
    assert_eq!(
        draws(&ctx),
        [DrawOp::DrawImage {
            image: ImageId(4),
            dst: Rect::new(2.0, 5.0, 18.0, 21.0),
        }]
    );
}

#[test]
fn hit_detection_reports_topmost_first_and_clears_between_hits() {
    init_logging();
    let mut group = Group::new(RefContext::default());
    for (z, id, origin) in [(0, 1, 0.0), (1, 2, 2.0), (1, 3, 50.0)] {
        let polygons = group.get_replay(Some(z), ReplayType::Polygon);
        polygons.set_fill_stroke_style(Some(&FillStyle::new(Color::BLACK)), None);
        polygons.draw_geometry(
            FlatGeometry::polygon(&[&[
                (origin, origin),
                (origin + 10.0, origin),
                (origin + 10.0, origin + 10.0),
                (origin, origin + 10.0),
            ]]),
            id,
        );
    }
    group.finish();

    let mut hits = Vec::new();
    group.for_each_geometry_at_coordinate(
        &Extent::EVERYTHING,
        0.5,
        Point::new(5.0, 5.0),
        |_| true,
        |_, id| hits.push(*id),
    );
    assert_eq!(hits, [2, 1]);

    let clears = group
        .hit_detection_context()
        .events()
        .iter()
        .filter(|event| matches!(event, Event::ClearProbe))
        .count();
    assert_eq!(clears, 3, "one initial clear and one per hit");
}

#[test]
fn hit_detection_misses_report_nothing() {
    init_logging();
    let mut group = Group::new(RefContext::default());
    let lines = group.get_replay(None, ReplayType::LineString);
    lines.set_fill_stroke_style(None, Some(&StrokeStyle::new(Color::BLACK, 1.0)));
    lines.draw_geometry(FlatGeometry::line_string(&[(0.0, 0.0), (10.0, 0.0)]), 1);
    group.finish();

    let mut hits = 0;
    group.for_each_geometry_at_coordinate(
        &Extent::EVERYTHING,
        1.0,
        Point::new(5.0, 20.0),
        |_| true,
        |_, _| hits += 1,
    );
    assert_eq!(hits, 0);
}

#[test]
fn per_geometry_replay_isolates_each_line() {
    init_logging();
    let mut group = Group::new(RefContext::default());
    let lines = group.get_replay(None, ReplayType::LineString);
    lines.set_fill_stroke_style(None, Some(&StrokeStyle::default()));
    for id in 0..3 {
        let y = f64::from(id);
        lines.draw_geometry(FlatGeometry::line_string(&[(0.0, y), (1.0, y)]), id);
    }
    group.finish();

    let mut ctx = RefContext::default();
    let mut strokes_seen = Vec::new();
    group.replay_per_geometry(
        &mut ctx,
        &Extent::EVERYTHING,
        Affine::IDENTITY,
        |g| g.extent().min_y != 1.0,
        |ctx, _, id| strokes_seen.push((*id, ctx.draws().count())),
    );
    assert_eq!(strokes_seen, [(0, 1), (2, 2)]);
    for op in draws(&ctx) {
        let DrawOp::Stroke(path) = op else {
            panic!("expected only strokes");
        };
        assert_eq!(path.elements().len(), 2);
    }
}

#[test]
fn point_markers_are_hit_inside_their_image_only() {
    init_logging();
    let mut group = Group::new(RefContext::default());
    let markers = group.get_replay(None, ReplayType::Image);
    markers.set_image_style(ImageStyle {
        anchor: Point::new(4.0, 4.0),
        size: Size::new(8.0, 8.0),
        image: ImageId(1),
        snap_to_pixel: false,
    });
    markers.draw_geometry(FlatGeometry::point(20.0, 20.0), 9);
    group.finish();

    let mut hits = Vec::new();
    for at in [Point::new(20.0, 20.0), Point::new(23.0, 17.0), Point::new(26.0, 20.0)] {
        group.for_each_geometry_at_coordinate(
            &Extent::EVERYTHING,
            1.0,
            at,
            |_| true,
            |_, id| hits.push(*id),
        );
    }
    assert_eq!(hits, [9, 9]);
    let images_drawn = group
        .hit_detection_context()
        .draws()
        .filter(|op| matches!(op, DrawOp::DrawImage { image: ImageId(1), .. }))
        .count();
    assert_eq!(images_drawn, 3);
}

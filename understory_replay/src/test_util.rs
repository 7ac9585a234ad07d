// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-crate drawing contexts for unit tests.

use alloc::vec::Vec;

use kurbo::{BezPath, Line, ParamCurve, ParamCurveNearest, Point, Rect, Shape};
use peniko::Color;

use crate::{DrawingContext, HitDetectionContext, ImageId, StrokeState};

/// A context call, in the order it was issued.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    BeginPath,
    ClosePath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Fill,
    Stroke,
    DrawImage(ImageId, Rect),
    SetFillStyle(Color),
    SetStrokeStyle(Color, f64),
    SetLineDash(Vec<f64>),
}

/// Records every call.
#[derive(Debug, Default)]
pub(crate) struct TraceContext {
    pub(crate) calls: Vec<Call>,
}

impl TraceContext {
    pub(crate) fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl DrawingContext for TraceContext {
    fn begin_path(&mut self) {
        self.calls.push(Call::BeginPath);
    }

    fn close_path(&mut self) {
        self.calls.push(Call::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.calls.push(Call::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.calls.push(Call::LineTo(x, y));
    }

    fn fill(&mut self) {
        self.calls.push(Call::Fill);
    }

    fn stroke(&mut self) {
        self.calls.push(Call::Stroke);
    }

    fn draw_image(&mut self, image: ImageId, dst: Rect) {
        self.calls.push(Call::DrawImage(image, dst));
    }

    fn set_fill_style(&mut self, color: Color) {
        self.calls.push(Call::SetFillStyle(color));
    }

    fn set_stroke_style(&mut self, style: &StrokeState) {
        self.calls.push(Call::SetStrokeStyle(style.color, style.width));
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.calls.push(Call::SetLineDash(pattern.to_vec()));
    }
}

/// Geometric stand-in for a 1×1 raster: the probe pixel counts as covered
/// when a fill contains its center, a stroke passes within half the line
/// width of it, or an image rectangle contains it.
///
/// Mirrors the coverage rules of `RefContext` in `understory_replay_ref`;
/// keep the two in step.
#[derive(Debug, Default)]
pub(crate) struct ProbeContext {
    path: BezPath,
    line_width: f64,
    covered: bool,
    pub(crate) probes: usize,
}

const PROBE_CENTER: Point = Point::new(0.5, 0.5);

impl DrawingContext for ProbeContext {
    fn begin_path(&mut self) {
        self.path = BezPath::new();
    }

    fn close_path(&mut self) {
        self.path.close_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.line_to((x, y));
    }

    fn fill(&mut self) {
        if self.path.winding(PROBE_CENTER) != 0 {
            self.covered = true;
        }
    }

    fn stroke(&mut self) {
        let half_width = self.line_width / 2.0;
        let limit = half_width * half_width;
        let hit = self.path.segments().any(|segment| {
            let line = Line::new(segment.start(), segment.end());
            line.nearest(PROBE_CENTER, 0.0).distance_sq <= limit
        });
        if hit {
            self.covered = true;
        }
    }

    fn draw_image(&mut self, _image: ImageId, dst: Rect) {
        if dst.contains(PROBE_CENTER) {
            self.covered = true;
        }
    }

    fn set_fill_style(&mut self, _color: Color) {}

    fn set_stroke_style(&mut self, style: &StrokeState) {
        self.line_width = style.width;
    }
}

impl HitDetectionContext for ProbeContext {
    fn probe_alpha(&mut self) -> u8 {
        self.probes += 1;
        if self.covered { 255 } else { 0 }
    }

    fn clear_probe(&mut self) {
        self.covered = false;
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_replay_ref --heading-base-level=0

//! Understory Replay Reference Context.
//!
//! This crate provides a small, stateful implementation of
//! [`DrawingContext`] and [`HitDetectionContext`] for **call recording and
//! state tracing**.
//!
//! It is intentionally *not* a renderer:
//! - It does **not** rasterize to pixels.
//! - Hit detection is answered geometrically: the probe pixel is covered when
//!   a fill contains the pixel center (nonzero winding), a stroke passes
//!   within half its width of it, or an image rectangle contains it.
//! - It is intended primarily for tests and debugging that want to assert on
//!   the calls a replay issues and the context state at the time of each call.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{BezPath, Line, ParamCurve, ParamCurveNearest, Point, Rect, Shape};
use peniko::Color;
use understory_replay::{DrawingContext, HitDetectionContext, ImageId, LineDash, StrokeState};

/// Center of the single hit-detection pixel.
const PROBE_CENTER: Point = Point::new(0.5, 0.5);

/// Snapshot of the current drawing state inside the context.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextState {
    /// Current fill color.
    pub fill: Color,
    /// Current stroke attributes, if set.
    pub stroke: Option<StrokeState>,
    /// Current dash pattern.
    pub line_dash: LineDash,
    /// Number of path elements in the current path.
    pub path_elements: usize,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: None,
            line_dash: LineDash::new(),
            path_elements: 0,
        }
    }
}

/// Path construction call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathOp {
    /// `begin_path`.
    BeginPath,
    /// `move_to`.
    MoveTo(Point),
    /// `line_to`.
    LineTo(Point),
    /// `close_path`.
    ClosePath,
}

/// Style-changing call.
#[derive(Clone, Debug, PartialEq)]
pub enum StateOp {
    /// `set_fill_style`.
    SetFillStyle(Color),
    /// `set_stroke_style`.
    SetStrokeStyle(StrokeState),
    /// `set_line_dash`.
    SetLineDash(LineDash),
}

/// Call that produces ink.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// `fill` of the given path.
    Fill(BezPath),
    /// `stroke` of the given path.
    Stroke(BezPath),
    /// `draw_image` into the given rectangle.
    DrawImage {
        /// Image drawn.
        image: ImageId,
        /// Destination rectangle in device pixels.
        dst: Rect,
    },
}

/// Event recorded by the reference context.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Path operation and the resulting state snapshot.
    Path {
        /// Path operation that was applied.
        op: PathOp,
        /// Snapshot after applying the operation.
        state: ContextState,
    },
    /// State operation and the resulting state snapshot.
    State {
        /// State operation that was applied.
        op: StateOp,
        /// Snapshot after applying the operation.
        state: ContextState,
    },
    /// Draw operation and the state snapshot used for drawing.
    Draw {
        /// Draw operation that was applied.
        op: DrawOp,
        /// Snapshot at the time of drawing.
        state: ContextState,
    },
    /// The probe pixel was read back.
    Probe {
        /// Alpha that was reported.
        alpha: u8,
    },
    /// The probe pixel was cleared.
    ClearProbe,
}

/// Simple reference implementation of the drawing contexts.
///
/// This context:
/// - Tracks the current path and style state,
/// - Records [`Event`]s in the order calls arrive,
/// - Answers hit-detection probes geometrically.
#[derive(Default, Debug)]
pub struct RefContext {
    events: Vec<Event>,
    path: BezPath,
    state: ContextState,
    covered: bool,
}

impl RefContext {
    /// Returns a slice of recorded events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Returns the current state.
    pub fn state(&self) -> &ContextState {
        &self.state
    }

    /// Returns the current path.
    pub fn current_path(&self) -> &BezPath {
        &self.path
    }

    /// Returns the draw operations recorded so far, in order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawOp> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Draw { op, .. } => Some(op),
            _ => None,
        })
    }

    /// Clears all recorded events but keeps the current state.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn path_op(&mut self, op: PathOp) {
        match op {
            PathOp::BeginPath => self.path = BezPath::new(),
            PathOp::MoveTo(p) => self.path.move_to(p),
            PathOp::LineTo(p) => self.path.line_to(p),
            PathOp::ClosePath => self.path.close_path(),
        }
        self.state.path_elements = self.path.elements().len();
        self.events.push(Event::Path {
            op,
            state: self.state.clone(),
        });
    }

    fn state_op(&mut self, op: StateOp) {
        match &op {
            StateOp::SetFillStyle(color) => self.state.fill = *color,
            StateOp::SetStrokeStyle(stroke) => self.state.stroke = Some(stroke.clone()),
            StateOp::SetLineDash(dash) => self.state.line_dash = dash.clone(),
        }
        self.events.push(Event::State {
            op,
            state: self.state.clone(),
        });
    }

    fn draw_op(&mut self, op: DrawOp) {
        if covers_probe(&op, self.state.stroke.as_ref()) {
            self.covered = true;
        }
        self.events.push(Event::Draw {
            op,
            state: self.state.clone(),
        });
    }
}

fn covers_probe(op: &DrawOp, stroke: Option<&StrokeState>) -> bool {
    match op {
        DrawOp::Fill(path) => path.winding(PROBE_CENTER) != 0,
        DrawOp::Stroke(path) => {
            let half_width = stroke.map_or(0.5, |stroke| stroke.width / 2.0);
            let limit = half_width * half_width;
            path.segments().any(|segment| {
                Line::new(segment.start(), segment.end())
                    .nearest(PROBE_CENTER, 0.0)
                    .distance_sq
                    <= limit
            })
        }
        DrawOp::DrawImage { dst, .. } => dst.contains(PROBE_CENTER),
    }
}

impl DrawingContext for RefContext {
    fn begin_path(&mut self) {
        self.path_op(PathOp::BeginPath);
    }

    fn close_path(&mut self) {
        self.path_op(PathOp::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path_op(PathOp::MoveTo(Point::new(x, y)));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path_op(PathOp::LineTo(Point::new(x, y)));
    }

    fn fill(&mut self) {
        self.draw_op(DrawOp::Fill(self.path.clone()));
    }

    fn stroke(&mut self) {
        self.draw_op(DrawOp::Stroke(self.path.clone()));
    }

    fn draw_image(&mut self, image: ImageId, dst: Rect) {
        self.draw_op(DrawOp::DrawImage { image, dst });
    }

    fn set_fill_style(&mut self, color: Color) {
        self.state_op(StateOp::SetFillStyle(color));
    }

    fn set_stroke_style(&mut self, style: &StrokeState) {
        self.state_op(StateOp::SetStrokeStyle(style.clone()));
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.state_op(StateOp::SetLineDash(pattern.iter().copied().collect()));
    }
}

impl HitDetectionContext for RefContext {
    fn probe_alpha(&mut self) -> u8 {
        let alpha = if self.covered { u8::MAX } else { 0 };
        self.events.push(Event::Probe { alpha });
        alpha
    }

    fn clear_probe(&mut self) {
        self.covered = false;
        self.events.push(Event::ClearProbe);
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filled and stroked polygons.

use peniko::Color;

use crate::{
    FillStyle, Geometry, Instruction, RenderDefaults, Replay, ReplayModes, StrokeState,
    StrokeStyle,
};

#[derive(Clone, Debug, Default)]
struct FillStrokeRecording {
    fill: Option<Color>,
    stroke: Option<StrokeState>,
    current_fill: Option<Color>,
    current_stroke: Option<StrokeState>,
}

/// Records polygons and multi-polygons as closed paths, filled and/or
/// stroked.
#[derive(Clone, Debug)]
pub struct PolygonReplay<G, D> {
    tape: Replay<G, D>,
    defaults: RenderDefaults,
    /// `None` once finished.
    recording: Option<FillStrokeRecording>,
}

impl<G, D> PolygonReplay<G, D> {
    /// An empty replay resolving unset style attributes from `defaults`.
    pub fn new(defaults: RenderDefaults) -> Self {
        Self {
            tape: Replay::new(),
            defaults,
            recording: Some(FillStrokeRecording::default()),
        }
    }

    /// The recorded tape.
    pub fn tape(&self) -> &Replay<G, D> {
        &self.tape
    }

    /// The recorded tape, for replaying.
    pub fn tape_mut(&mut self) -> &mut Replay<G, D> {
        &mut self.tape
    }

    /// Returns `true` once [`PolygonReplay::finish`] has been called.
    pub fn is_finished(&self) -> bool {
        self.recording.is_none()
    }

    /// Set the fill and stroke for subsequent draws.
    ///
    /// Either may be `None`; with both unset, draws are no-ops.
    ///
    /// # Panics
    ///
    /// Panics if the replay has been finished.
    pub fn set_fill_stroke_style(
        &mut self,
        fill: Option<&FillStyle>,
        stroke: Option<&StrokeStyle>,
    ) {
        let fill = fill.map(|fill| self.defaults.resolve_fill(fill));
        let stroke = stroke.map(|stroke| self.defaults.resolve_stroke(stroke));
        let Some(recording) = self.recording.as_mut() else {
            panic!("polygon replay used after finish");
        };
        recording.fill = fill;
        recording.stroke = stroke;
    }

    /// Seal the replay.
    ///
    /// # Panics
    ///
    /// Panics if the replay has already been finished.
    pub fn finish(&mut self) {
        assert!(
            self.recording.take().is_some(),
            "polygon replay finished twice"
        );
    }
}

impl<G: Geometry + Clone, D> PolygonReplay<G, D> {
    /// Record a polygon.
    ///
    /// Does nothing when neither fill nor stroke is set.
    ///
    /// # Panics
    ///
    /// Panics if the replay has been finished.
    pub fn draw_polygon_geometry(&mut self, geometry: G, data: D) {
        self.draw(geometry, data, false);
    }

    /// Record a multi-polygon, each member filled and stroked on its own.
    ///
    /// Does nothing when neither fill nor stroke is set.
    ///
    /// # Panics
    ///
    /// Panics if the replay has been finished.
    pub fn draw_multi_polygon_geometry(&mut self, geometry: G, data: D) {
        self.draw(geometry, data, true);
    }

    fn draw(&mut self, geometry: G, data: D, multi: bool) {
        let Some(recording) = self.recording.as_mut() else {
            panic!("polygon replay used after finish");
        };
        if recording.fill.is_none() && recording.stroke.is_none() {
            return;
        }
        self.tape.extend_extent(&geometry.extent());
        if let Some(fill) = recording.fill
            && recording.current_fill != Some(fill)
        {
            self.tape.push(Instruction::SetFillStyle(fill));
            recording.current_fill = Some(fill);
        }
        if let Some(stroke) = &recording.stroke
            && recording.current_stroke.as_ref() != Some(stroke)
        {
            self.tape.push(Instruction::SetStrokeStyle(stroke.clone()));
            recording.current_stroke = Some(stroke.clone());
        }
        let filled = recording.fill.is_some();
        let stroked = recording.stroke.is_some();

        let begin = self.tape.begin_geometry(geometry.clone());
        let flat = geometry.flat_coordinates();
        let stride = geometry.stride();
        if multi {
            let mut offset = 0;
            for ends in geometry.endss() {
                offset = self.draw_rings(flat, offset, ends, stride, filled, stroked);
            }
        } else {
            self.draw_rings(flat, 0, geometry.ends(), stride, filled, stroked);
        }
        self.tape.end_geometry(begin, geometry, data);
    }

    /// Record one polygon's rings as a single path; returns the offset after
    /// the last ring.
    fn draw_rings(
        &mut self,
        flat: &[f64],
        mut offset: usize,
        ends: &[usize],
        stride: usize,
        filled: bool,
        stroked: bool,
    ) -> usize {
        self.tape.push_begin_path(ReplayModes::all());
        for &end in ends {
            let end_in_tape = self
                .tape
                .append_flat_coordinates(flat, offset, end, stride, true);
            self.tape.push(Instruction::MoveToLineTo { end: end_in_tape });
            self.tape.push(Instruction::ClosePath);
            offset = end;
        }
        if filled {
            self.tape.push(Instruction::Fill);
        }
        if stroked {
            self.tape.push_stroke(ReplayModes::all());
        }
        offset
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroked line strings.
//!
//! Consecutive line strings with the same stroke share one batch path, so a
//! batch replay strokes them all at once. Each geometry additionally gets its
//! own path that only runs per geometry, where hit detection needs its ink
//! in isolation.

use crate::{
    Geometry, Instruction, RenderDefaults, Replay, ReplayModes, StrokeState, StrokeStyle,
};

#[derive(Clone, Debug, Default)]
struct StrokeRecording {
    /// Stroke applied to the next draw.
    pending: Option<StrokeState>,
    /// Stroke most recently written to the tape.
    current: Option<StrokeState>,
    /// Coordinate-buffer length at the last batch stroke.
    last_stroke: usize,
}

/// Records line and multi-line strings as stroked paths.
#[derive(Clone, Debug)]
pub struct LineStringReplay<G, D> {
    tape: Replay<G, D>,
    defaults: RenderDefaults,
    /// `None` once finished.
    recording: Option<StrokeRecording>,
}

impl<G, D> LineStringReplay<G, D> {
    /// An empty replay resolving unset stroke attributes from `defaults`.
    pub fn new(defaults: RenderDefaults) -> Self {
        Self {
            tape: Replay::new(),
            defaults,
            recording: Some(StrokeRecording::default()),
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

    /// Returns `true` once [`LineStringReplay::finish`] has been called.
    pub fn is_finished(&self) -> bool {
        self.recording.is_none()
    }

    fn recording_mut(&mut self) -> &mut StrokeRecording {
        match self.recording.as_mut() {
            Some(recording) => recording,
            None => panic!("line string replay used after finish"),
        }
    }

    /// Set the stroke for subsequent draws; `None` makes them no-ops.
    ///
    /// # Panics
    ///
    /// Panics if the replay has been finished.
    pub fn set_stroke_style(&mut self, stroke: Option<&StrokeStyle>) {
        let pending = stroke.map(|stroke| self.defaults.resolve_stroke(stroke));
        self.recording_mut().pending = pending;
    }

    /// Seal the replay, committing any strokes still pending in the batch
    /// path.
    ///
    /// # Panics
    ///
    /// Panics if the replay has already been finished.
    pub fn finish(&mut self) {
        let Some(recording) = self.recording.take() else {
            panic!("line string replay finished twice");
        };
        if recording.last_stroke != self.tape.coordinates().len() {
            self.tape.push_stroke(ReplayModes::BATCH);
        }
    }
}

impl<G: Geometry + Clone, D> LineStringReplay<G, D> {
    /// Record a line string.
    ///
    /// Does nothing when no stroke is set.
    ///
    /// # Panics
    ///
    /// Panics if the replay has been finished.
    pub fn draw_line_string_geometry(&mut self, geometry: G, data: D) {
        self.draw(geometry, data, false);
    }

    /// Record a multi-line string, one subpath per part.
    ///
    /// Does nothing when no stroke is set.
    ///
    /// # Panics
    ///
    /// Panics if the replay has been finished.
    pub fn draw_multi_line_string_geometry(&mut self, geometry: G, data: D) {
        self.draw(geometry, data, true);
    }

    fn draw(&mut self, geometry: G, data: D, multi: bool) {
        let Some(recording) = self.recording.as_mut() else {
            panic!("line string replay used after finish");
        };
        let Some(pending) = recording.pending.as_ref() else {
            return;
        };
        self.tape.extend_extent(&geometry.extent());
        if recording.current.as_ref() != Some(pending) {
            let len = self.tape.coordinates().len();
            if recording.last_stroke != len {
                self.tape.push_stroke(ReplayModes::BATCH);
                recording.last_stroke = len;
            }
            self.tape.push(Instruction::SetStrokeStyle(pending.clone()));
            self.tape.push_begin_path(ReplayModes::BATCH);
            recording.current = Some(pending.clone());
        }

        let begin = self.tape.begin_geometry(geometry.clone());
        self.tape.push_begin_path(ReplayModes::PER_GEOMETRY);
        let flat = geometry.flat_coordinates();
        let stride = geometry.stride();
        let whole = [flat.len()];
        let ends = if multi { geometry.ends() } else { &whole[..] };
        let mut offset = 0;
        for &end in ends {
            let end_in_tape = self
                .tape
                .append_flat_coordinates(flat, offset, end, stride, false);
            self.tape.push(Instruction::MoveToLineTo { end: end_in_tape });
            offset = end;
        }
        self.tape.push_stroke(ReplayModes::PER_GEOMETRY);
        self.tape.end_geometry(begin, geometry, data);
    }
}

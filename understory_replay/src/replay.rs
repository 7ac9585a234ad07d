// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The instruction tape and its interpreter.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::flat::transform_flat_coordinates_into;
use crate::{DrawingContext, Extent, Instruction, ReplayMode, ReplayModes};

/// Index of a recorded [`Instruction::BeginGeometry`] awaiting its end offsets.
#[derive(Debug)]
#[must_use = "an open geometry must be closed with `end_geometry`"]
pub(crate) struct GeometryBegin(usize);

/// An instruction tape with its shared coordinate buffer.
///
/// Coordinates are stored two per vertex in world space. Replaying maps them
/// through the view transform once and keeps the result until the transform
/// changes or more coordinates are recorded.
#[derive(Clone, Debug)]
pub struct Replay<G, D> {
    instructions: Vec<Instruction<G, D>>,
    coordinates: Vec<f64>,
    pixel_coordinates: Vec<f64>,
    rendered_transform: Option<Affine>,
    transform_passes: usize,
    extent: Extent,
}

impl<G, D> Default for Replay<G, D> {
    fn default() -> Self {
        Self {
            instructions: Vec::new(),
            coordinates: Vec::new(),
            pixel_coordinates: Vec::new(),
            rendered_transform: None,
            transform_passes: 0,
            extent: Extent::EMPTY,
        }
    }
}

impl<G, D> Replay<G, D> {
    /// An empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounding extent of everything recorded, in world coordinates.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The recorded instructions.
    pub fn instructions(&self) -> &[Instruction<G, D>] {
        &self.instructions
    }

    /// The recorded world coordinates, two per vertex.
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Device coordinates from the most recent replay.
    ///
    /// Empty until the tape has been replayed once.
    pub fn pixel_coordinates(&self) -> &[f64] {
        &self.pixel_coordinates
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// How many times the coordinate buffer has been mapped through a view
    /// transform.
    pub fn transform_passes(&self) -> usize {
        self.transform_passes
    }

    /// Copy x and y of every vertex in `flat[offset..end]` into the buffer,
    /// repeating the first vertex if `close` is set.
    ///
    /// Returns the new buffer length.
    pub(crate) fn append_flat_coordinates(
        &mut self,
        flat: &[f64],
        offset: usize,
        end: usize,
        stride: usize,
        close: bool,
    ) -> usize {
        debug_assert!(stride >= 2, "stride must cover at least x and y");
        let start = self.coordinates.len();
        for vertex in flat[offset..end].chunks_exact(stride) {
            self.coordinates.extend_from_slice(&vertex[..2]);
        }
        if close && self.coordinates.len() > start {
            let (x, y) = (self.coordinates[start], self.coordinates[start + 1]);
            self.coordinates.extend_from_slice(&[x, y]);
        }
        self.rendered_transform = None;
        self.coordinates.len()
    }

    /// Open a geometry bracket.
    pub(crate) fn begin_geometry(&mut self, geometry: G) -> GeometryBegin {
        let index = self.instructions.len();
        self.instructions.push(Instruction::BeginGeometry {
            geometry,
            coordinates_end: 0,
            instructions_end: 0,
        });
        GeometryBegin(index)
    }

    /// Close the bracket opened by `begin`, back-patching its end offsets.
    pub(crate) fn end_geometry(&mut self, begin: GeometryBegin, geometry: G, data: D) {
        let coordinates_len = self.coordinates.len();
        let after_end = self.instructions.len() + 1;
        match &mut self.instructions[begin.0] {
            Instruction::BeginGeometry {
                coordinates_end,
                instructions_end,
                ..
            } => {
                *coordinates_end = coordinates_len;
                *instructions_end = after_end;
            }
            _ => panic!("instruction {} is not a BeginGeometry", begin.0),
        }
        self.instructions
            .push(Instruction::EndGeometry { geometry, data });
    }

    pub(crate) fn push(&mut self, instruction: Instruction<G, D>) {
        self.instructions.push(instruction);
    }

    pub(crate) fn push_begin_path(&mut self, modes: ReplayModes) {
        self.push(Instruction::BeginPath(modes));
    }

    pub(crate) fn push_stroke(&mut self, modes: ReplayModes) {
        self.push(Instruction::Stroke(modes));
    }

    pub(crate) fn extend_extent(&mut self, extent: &Extent) {
        self.extent.extend(extent);
    }

    /// Paint every geometry accepted by `filter` in batch mode.
    pub fn replay<C, F>(&mut self, context: &mut C, transform: Affine, filter: F)
    where
        C: DrawingContext + ?Sized,
        F: FnMut(&G) -> bool,
    {
        self.execute(context, transform, filter, ReplayMode::Batch, |_, _, _| {});
    }

    /// Paint every geometry accepted by `filter` in isolation, calling
    /// `callback` with the context after each one is drawn.
    pub fn replay_per_geometry<C, F, K>(
        &mut self,
        context: &mut C,
        transform: Affine,
        filter: F,
        callback: K,
    ) where
        C: DrawingContext + ?Sized,
        F: FnMut(&G) -> bool,
        K: FnMut(&mut C, &G, &D),
    {
        self.execute(context, transform, filter, ReplayMode::PerGeometry, callback);
    }

    fn update_pixel_coordinates(&mut self, transform: Affine) {
        if self.rendered_transform == Some(transform) {
            return;
        }
        log::trace!(
            "transforming {} coordinates for replay",
            self.coordinates.len() / 2
        );
        transform_flat_coordinates_into(
            &self.coordinates,
            2,
            transform,
            &mut self.pixel_coordinates,
        );
        self.rendered_transform = Some(transform);
        self.transform_passes += 1;
    }

    fn execute<C, F, K>(
        &mut self,
        context: &mut C,
        transform: Affine,
        mut filter: F,
        mode: ReplayMode,
        mut on_geometry_end: K,
    ) where
        C: DrawingContext + ?Sized,
        F: FnMut(&G) -> bool,
        K: FnMut(&mut C, &G, &D),
    {
        self.update_pixel_coordinates(transform);
        let pixel = &self.pixel_coordinates;
        let instructions = &self.instructions;
        let mut i = 0;
        let mut d = 0;
        while i < instructions.len() {
            match &instructions[i] {
                Instruction::BeginGeometry {
                    geometry,
                    coordinates_end,
                    instructions_end,
                } => {
                    assert!(
                        *instructions_end > i,
                        "geometry opened at instruction {i} was never ended"
                    );
                    if filter(geometry) {
                        i += 1;
                    } else {
                        d = *coordinates_end;
                        i = *instructions_end;
                    }
                }
                Instruction::BeginPath(modes) => {
                    if modes.runs_in(mode) {
                        context.begin_path();
                    }
                    i += 1;
                }
                Instruction::ClosePath => {
                    context.close_path();
                    i += 1;
                }
                Instruction::DrawImage {
                    end,
                    anchor,
                    size,
                    image,
                    snap_to_pixel,
                } => {
                    for point in pixel[d..*end].chunks_exact(2) {
                        let mut origin = Point::new(point[0] - anchor.x, point[1] - anchor.y);
                        if *snap_to_pixel {
                            origin = (origin + Vec2::new(0.5, 0.5)).floor();
                        }
                        context.draw_image(*image, Rect::from_origin_size(origin, *size));
                    }
                    d = *end;
                    i += 1;
                }
                Instruction::EndGeometry { geometry, data } => {
                    if mode == ReplayMode::PerGeometry {
                        on_geometry_end(context, geometry, data);
                    }
                    i += 1;
                }
                Instruction::Fill => {
                    context.fill();
                    i += 1;
                }
                Instruction::MoveToLineTo { end } => {
                    let mut points = pixel[d..*end].chunks_exact(2);
                    if let Some(first) = points.next() {
                        context.move_to(first[0], first[1]);
                    }
                    for point in points {
                        context.line_to(point[0], point[1]);
                    }
                    d = *end;
                    i += 1;
                }
                Instruction::SetFillStyle(color) => {
                    context.set_fill_style(*color);
                    i += 1;
                }
                Instruction::SetStrokeStyle(state) => {
                    context.set_stroke_style(state);
                    context.set_line_dash(&state.line_dash);
                    i += 1;
                }
                Instruction::Stroke(modes) => {
                    if modes.runs_in(mode) {
                        context.stroke();
                    }
                    i += 1;
                }
            }
        }
        assert_eq!(
            d,
            pixel.len(),
            "replay consumed {d} of {} pixel coordinates",
            pixel.len()
        );
        assert_eq!(
            i,
            instructions.len(),
            "replay stopped at instruction {i} of {}",
            instructions.len()
        );
    }
}

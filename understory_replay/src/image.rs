// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point symbols drawn as images.

use crate::{Geometry, ImageStyle, Instruction, Replay};

/// Records point and multi-point geometries as image blits.
#[derive(Clone, Debug)]
pub struct ImageReplay<G, D> {
    tape: Replay<G, D>,
    image: Option<ImageStyle>,
}

impl<G, D> Default for ImageReplay<G, D> {
    fn default() -> Self {
        Self {
            tape: Replay::new(),
            image: None,
        }
    }
}

impl<G: Geometry + Clone, D> ImageReplay<G, D> {
    /// Record a point.
    ///
    /// Does nothing when no image is set.
    pub fn draw_point_geometry(&mut self, geometry: G, data: D) {
        self.draw_points(geometry, data);
    }

    /// Record every point of a multi-point with one image instruction.
    ///
    /// Does nothing when no image is set.
    pub fn draw_multi_point_geometry(&mut self, geometry: G, data: D) {
        self.draw_points(geometry, data);
    }

    fn draw_points(&mut self, geometry: G, data: D) {
        let Some(style) = self.image else {
            return;
        };
        self.tape.extend_extent(&geometry.extent());
        let begin = self.tape.begin_geometry(geometry.clone());
        let flat = geometry.flat_coordinates();
        let end = self
            .tape
            .append_flat_coordinates(flat, 0, flat.len(), geometry.stride(), false);
        self.tape.push(Instruction::DrawImage {
            end,
            anchor: style.anchor,
            size: style.size,
            image: style.image,
            snap_to_pixel: style.snap_to_pixel,
        });
        self.tape.end_geometry(begin, geometry, data);
    }
}

impl<G, D> ImageReplay<G, D> {
    /// An empty replay with no image set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image drawn for subsequent points.
    pub fn set_image_style(&mut self, style: ImageStyle) {
        self.image = Some(style);
    }

    /// The image currently set, if any.
    pub fn image_style(&self) -> Option<&ImageStyle> {
        self.image.as_ref()
    }

    /// Seal the replay, dropping the current image.
    pub fn finish(&mut self) {
        self.image = None;
    }

    /// The recorded tape.
    pub fn tape(&self) -> &Replay<G, D> {
        &self.tape
    }

    /// The recorded tape, for replaying.
    pub fn tape_mut(&mut self) -> &mut Replay<G, D> {
        &mut self.tape
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The instruction set of a replay tape.

use kurbo::{Point, Size};
use peniko::Color;

use crate::{ImageId, StrokeState};

/// How a tape is being replayed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReplayMode {
    /// Paint everything in as few passes as possible.
    Batch,
    /// Isolate each geometry and report it when it is done, for hit testing.
    PerGeometry,
}

bitflags::bitflags! {
    /// Replay modes in which a path instruction takes effect.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ReplayModes: u8 {
        /// Executed when replaying per geometry.
        const PER_GEOMETRY = 0b0000_0001;
        /// Executed when replaying in batch.
        const BATCH        = 0b0000_0010;
    }
}

impl ReplayModes {
    /// Returns `true` if an instruction carrying these flags runs in `mode`.
    #[inline]
    pub fn runs_in(self, mode: ReplayMode) -> bool {
        match mode {
            ReplayMode::Batch => self.contains(Self::BATCH),
            ReplayMode::PerGeometry => self.contains(Self::PER_GEOMETRY),
        }
    }
}

/// One recorded drawing operation.
///
/// Coordinate operands are exclusive end offsets into the tape's shared
/// coordinate buffer; each instruction consumes coordinates from wherever the
/// previous one stopped.
#[derive(Clone, Debug)]
pub enum Instruction<G, D> {
    /// Start of one geometry's sub-tape.
    ///
    /// The two end offsets are written when the matching
    /// [`Instruction::EndGeometry`] is appended; until then they are zero.
    BeginGeometry {
        /// Geometry handle passed to the replay filter.
        geometry: G,
        /// Coordinate-buffer offset just past this geometry's coordinates.
        coordinates_end: usize,
        /// Instruction index just past this geometry's `EndGeometry`.
        instructions_end: usize,
    },
    /// Begin a new path in the given modes.
    BeginPath(ReplayModes),
    /// Close the current subpath.
    ClosePath,
    /// Draw an image at every point up to `end`.
    DrawImage {
        /// Coordinate-buffer end offset of the points.
        end: usize,
        /// Anchor offset subtracted from each point.
        anchor: Point,
        /// Drawn size.
        size: Size,
        /// Image resource.
        image: ImageId,
        /// Round positions to whole device pixels.
        snap_to_pixel: bool,
    },
    /// End of one geometry's sub-tape.
    EndGeometry {
        /// Geometry handle reported to the per-geometry callback.
        geometry: G,
        /// Opaque payload reported to the per-geometry callback.
        data: D,
    },
    /// Fill the current path.
    Fill,
    /// Move to the next point, then line to every point up to `end`.
    MoveToLineTo {
        /// Coordinate-buffer end offset of the polyline.
        end: usize,
    },
    /// Set the fill color.
    SetFillStyle(Color),
    /// Set the stroke attributes, including the dash pattern.
    SetStrokeStyle(StrokeState),
    /// Stroke the current path in the given modes.
    Stroke(ReplayModes),
}

/// Payload-free tag of an [`Instruction`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// [`Instruction::BeginGeometry`].
    BeginGeometry,
    /// [`Instruction::BeginPath`].
    BeginPath(ReplayModes),
    /// [`Instruction::ClosePath`].
    ClosePath,
    /// [`Instruction::DrawImage`].
    DrawImage,
    /// [`Instruction::EndGeometry`].
    EndGeometry,
    /// [`Instruction::Fill`].
    Fill,
    /// [`Instruction::MoveToLineTo`].
    MoveToLineTo,
    /// [`Instruction::SetFillStyle`].
    SetFillStyle,
    /// [`Instruction::SetStrokeStyle`].
    SetStrokeStyle,
    /// [`Instruction::Stroke`].
    Stroke(ReplayModes),
}

impl<G, D> Instruction<G, D> {
    /// The tag of this instruction, keeping the mode flags of path
    /// instructions.
    pub fn kind(&self) -> InstructionKind {
        match self {
            Self::BeginGeometry { .. } => InstructionKind::BeginGeometry,
            Self::BeginPath(modes) => InstructionKind::BeginPath(*modes),
            Self::ClosePath => InstructionKind::ClosePath,
            Self::DrawImage { .. } => InstructionKind::DrawImage,
            Self::EndGeometry { .. } => InstructionKind::EndGeometry,
            Self::Fill => InstructionKind::Fill,
            Self::MoveToLineTo { .. } => InstructionKind::MoveToLineTo,
            Self::SetFillStyle(_) => InstructionKind::SetFillStyle,
            Self::SetStrokeStyle(_) => InstructionKind::SetStrokeStyle,
            Self::Stroke(modes) => InstructionKind::Stroke(*modes),
        }
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Replay: record vector geometries once, replay them many times.
//!
//! This crate turns styled points, line strings, and polygons into compact
//! instruction tapes that can be replayed against any immediate-mode 2D
//! drawing surface under an arbitrary view transform. The same tapes serve
//! two purposes:
//!
//! - **Painting**: a batch replay draws everything recorded, sharing paths
//!   between consecutive geometries with identical style.
//! - **Hit detection**: a per-geometry replay draws one geometry at a time
//!   into a single-pixel surface and reports every geometry whose ink covers
//!   the probed coordinate.
//!
//! # Core concepts
//!
//! - **Tapes**: a [`Replay`] holds an [`Instruction`] list and a shared
//!   buffer of world coordinates. Replaying maps the coordinates through the
//!   view transform once and reuses the result while the transform stays the
//!   same.
//! - **Primitive replays**: [`ImageReplay`], [`LineStringReplay`], and
//!   [`PolygonReplay`] record one primitive each, deduplicating style
//!   changes. [`TypedReplay`] dispatches over the three.
//! - **Groups**: a [`ReplayGroup`] buckets primitive replays by z-index and
//!   [`ReplayType`], culls them against the requested extent, and drives hit
//!   detection through its [`HitDetectionContext`].
//! - **Contexts**: [`DrawingContext`] is the drawing surface the interpreter
//!   talks to. Rasterizers and recording contexts live in sibling crates.
//!
//! Geometries enter through the [`Geometry`] trait; [`FlatGeometry`] is a
//! small owned implementation. Unset style attributes resolve through one
//! [`RenderDefaults`] record handed to the group at construction.
//!
//! # Example
//!
//! ```
//! use kurbo::{Affine, Point};
//! use peniko::Color;
//! use understory_replay::{
//!     DrawingContext, Extent, FlatGeometry, Geometry, HitDetectionContext, ReplayGroup,
//!     ReplayType, StrokeState, StrokeStyle,
//! };
//!
//! // A context that draws nothing; real code uses a rasterizer.
//! #[derive(Debug, Default)]
//! struct Null;
//! impl DrawingContext for Null {
//!     fn begin_path(&mut self) {}
//!     fn close_path(&mut self) {}
//!     fn move_to(&mut self, _: f64, _: f64) {}
//!     fn line_to(&mut self, _: f64, _: f64) {}
//!     fn fill(&mut self) {}
//!     fn stroke(&mut self) {}
//!     fn draw_image(&mut self, _: understory_replay::ImageId, _: kurbo::Rect) {}
//!     fn set_fill_style(&mut self, _: Color) {}
//!     fn set_stroke_style(&mut self, _: &StrokeState) {}
//! }
//! impl HitDetectionContext for Null {
//!     fn probe_alpha(&mut self) -> u8 { 0 }
//!     fn clear_probe(&mut self) {}
//! }
//!
//! let mut group = ReplayGroup::new(Null);
//! let road = FlatGeometry::line_string(&[(0.0, 0.0), (100.0, 0.0)]);
//! let replay = group.get_replay(None, ReplayType::for_geometry_kind(road.kind()));
//! replay.set_fill_stroke_style(None, Some(&StrokeStyle::new(Color::BLACK, 2.0)));
//! replay.draw_geometry(road, "road");
//! group.finish();
//!
//! let mut screen = Null;
//! group.replay(&mut screen, &Extent::EVERYTHING, Affine::scale(0.5), |_| true);
//!
//! let mut hits = 0;
//! group.for_each_geometry_at_coordinate(
//!     &Extent::EVERYTHING,
//!     1.0,
//!     Point::new(50.0, 0.0),
//!     |_| true,
//!     |_, _| hits += 1,
//! );
//! assert_eq!(hits, 0);
//! ```

#![no_std]

extern crate alloc;

mod context;
mod extent;
mod flat;
mod geom;
mod group;
mod image;
mod instruction;
mod line_string;
mod polygon;
mod replay;
mod style;
mod typed;

#[cfg(test)]
mod test_util;

pub use context::{DrawingContext, HitDetectionContext};
pub use extent::Extent;
pub use flat::{transform_flat_coordinates, transform_flat_coordinates_into};
pub use geom::{FlatGeometry, Geometry, GeometryKind};
pub use group::{ReplayGroup, hit_detection_transform};
pub use image::ImageReplay;
pub use instruction::{Instruction, InstructionKind, ReplayMode, ReplayModes};
pub use line_string::LineStringReplay;
pub use polygon::PolygonReplay;
pub use replay::Replay;
pub use style::{
    FillStyle, ImageId, ImageStyle, LineDash, RenderDefaults, StrokeState, StrokeStyle,
};
pub use typed::{ReplayType, TypedReplay};

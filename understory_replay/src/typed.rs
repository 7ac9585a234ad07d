// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed dispatch over the primitive-specific replays.

use kurbo::Affine;

use crate::{
    DrawingContext, Extent, FillStyle, Geometry, GeometryKind, ImageReplay, ImageStyle,
    LineStringReplay, PolygonReplay, RenderDefaults, Replay, StrokeStyle,
};

/// The primitive a replay records.
///
/// Within one z-index, replays are painted in declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReplayType {
    /// Filled and stroked polygons.
    Polygon,
    /// Stroked line strings.
    LineString,
    /// Point symbols.
    Image,
}

impl ReplayType {
    /// All replay types in paint order.
    pub const ALL: [Self; 3] = [Self::Polygon, Self::LineString, Self::Image];

    /// The replay type that records geometries of `kind`.
    pub fn for_geometry_kind(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Point | GeometryKind::MultiPoint => Self::Image,
            GeometryKind::LineString | GeometryKind::MultiLineString => Self::LineString,
            GeometryKind::Polygon | GeometryKind::MultiPolygon => Self::Polygon,
        }
    }
}

/// One of the primitive-specific replays.
///
/// Draw calls for a primitive the variant does not record panic; use
/// [`ReplayType::for_geometry_kind`] to pick the right replay.
#[derive(Clone, Debug)]
pub enum TypedReplay<G, D> {
    /// Point symbols.
    Image(ImageReplay<G, D>),
    /// Stroked line strings.
    LineString(LineStringReplay<G, D>),
    /// Filled and stroked polygons.
    Polygon(PolygonReplay<G, D>),
}

impl<G, D> TypedReplay<G, D> {
    /// A new, empty replay of the given type.
    pub fn new(replay_type: ReplayType, defaults: &RenderDefaults) -> Self {
        match replay_type {
            ReplayType::Image => Self::Image(ImageReplay::new()),
            ReplayType::LineString => Self::LineString(LineStringReplay::new(defaults.clone())),
            ReplayType::Polygon => Self::Polygon(PolygonReplay::new(defaults.clone())),
        }
    }

    /// The type of this replay.
    pub fn replay_type(&self) -> ReplayType {
        match self {
            Self::Image(_) => ReplayType::Image,
            Self::LineString(_) => ReplayType::LineString,
            Self::Polygon(_) => ReplayType::Polygon,
        }
    }

    /// The recorded tape.
    pub fn tape(&self) -> &Replay<G, D> {
        match self {
            Self::Image(r) => r.tape(),
            Self::LineString(r) => r.tape(),
            Self::Polygon(r) => r.tape(),
        }
    }

    /// The recorded tape, mutably.
    pub fn tape_mut(&mut self) -> &mut Replay<G, D> {
        match self {
            Self::Image(r) => r.tape_mut(),
            Self::LineString(r) => r.tape_mut(),
            Self::Polygon(r) => r.tape_mut(),
        }
    }

    /// Bounding extent of everything recorded.
    pub fn extent(&self) -> Extent {
        self.tape().extent()
    }

    /// Set the fill and stroke used by subsequent line or polygon draws.
    ///
    /// Line-string replays only use the stroke.
    ///
    /// # Panics
    ///
    /// Panics on an image replay, or if the replay has been finished.
    pub fn set_fill_stroke_style(
        &mut self,
        fill: Option<&FillStyle>,
        stroke: Option<&StrokeStyle>,
    ) {
        match self {
            Self::LineString(r) => r.set_stroke_style(stroke),
            Self::Polygon(r) => r.set_fill_stroke_style(fill, stroke),
            Self::Image(_) => panic!("image replays take an image style, not fill and stroke"),
        }
    }

    /// Set the image used by subsequent point draws.
    ///
    /// # Panics
    ///
    /// Panics unless this is an image replay.
    pub fn set_image_style(&mut self, style: ImageStyle) {
        match self {
            Self::Image(r) => r.set_image_style(style),
            other => panic!("{:?} replays do not draw images", other.replay_type()),
        }
    }

    /// Seal the replay; see the `finish` method of each variant.
    pub fn finish(&mut self) {
        match self {
            Self::Image(r) => r.finish(),
            Self::LineString(r) => r.finish(),
            Self::Polygon(r) => r.finish(),
        }
    }

    /// Replay the tape in batch mode.
    pub fn replay<C, F>(&mut self, context: &mut C, transform: Affine, filter: F)
    where
        C: DrawingContext + ?Sized,
        F: FnMut(&G) -> bool,
    {
        self.tape_mut().replay(context, transform, filter);
    }

    /// Replay the tape one geometry at a time.
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
        self.tape_mut()
            .replay_per_geometry(context, transform, filter, callback);
    }

    fn cannot_draw(&self, kind: GeometryKind) -> ! {
        panic!("{:?} replays cannot draw {kind:?} geometries", self.replay_type())
    }
}

impl<G: Geometry + Clone, D> TypedReplay<G, D> {
    /// Record `geometry` with the draw call matching its kind.
    ///
    /// # Panics
    ///
    /// Panics if this replay does not record that kind.
    pub fn draw_geometry(&mut self, geometry: G, data: D) {
        match geometry.kind() {
            GeometryKind::Point => self.draw_point_geometry(geometry, data),
            GeometryKind::MultiPoint => self.draw_multi_point_geometry(geometry, data),
            GeometryKind::LineString => self.draw_line_string_geometry(geometry, data),
            GeometryKind::MultiLineString => self.draw_multi_line_string_geometry(geometry, data),
            GeometryKind::Polygon => self.draw_polygon_geometry(geometry, data),
            GeometryKind::MultiPolygon => self.draw_multi_polygon_geometry(geometry, data),
        }
    }

    /// Record a point.
    pub fn draw_point_geometry(&mut self, geometry: G, data: D) {
        match self {
            Self::Image(r) => r.draw_point_geometry(geometry, data),
            _ => self.cannot_draw(GeometryKind::Point),
        }
    }

    /// Record a multi-point.
    pub fn draw_multi_point_geometry(&mut self, geometry: G, data: D) {
        match self {
            Self::Image(r) => r.draw_multi_point_geometry(geometry, data),
            _ => self.cannot_draw(GeometryKind::MultiPoint),
        }
    }

    /// Record a line string.
    pub fn draw_line_string_geometry(&mut self, geometry: G, data: D) {
        match self {
            Self::LineString(r) => r.draw_line_string_geometry(geometry, data),
            _ => self.cannot_draw(GeometryKind::LineString),
        }
    }

    /// Record a multi-line string.
    pub fn draw_multi_line_string_geometry(&mut self, geometry: G, data: D) {
        match self {
            Self::LineString(r) => r.draw_multi_line_string_geometry(geometry, data),
            _ => self.cannot_draw(GeometryKind::MultiLineString),
        }
    }

    /// Record a polygon.
    pub fn draw_polygon_geometry(&mut self, geometry: G, data: D) {
        match self {
            Self::Polygon(r) => r.draw_polygon_geometry(geometry, data),
            _ => self.cannot_draw(GeometryKind::Polygon),
        }
    }

    /// Record a multi-polygon.
    pub fn draw_multi_polygon_geometry(&mut self, geometry: G, data: D) {
        match self {
            Self::Polygon(r) => r.draw_multi_polygon_geometry(geometry, data),
            _ => self.cannot_draw(GeometryKind::MultiPolygon),
        }
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding extents in world coordinates.

use kurbo::{Point, Rect};

/// An axis-aligned bounding box in world coordinates.
///
/// Unlike [`Rect`], an extent has a distinguished empty value
/// ([`Extent::EMPTY`]) whose minimum is `+∞` and maximum is `-∞`. Extending
/// the empty extent by anything yields that thing, and the empty extent never
/// intersects anything, which is what a tape that has recorded nothing needs
/// for culling.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extent {
    /// Minimum X coordinate.
    pub min_x: f64,
    /// Minimum Y coordinate.
    pub min_y: f64,
    /// Maximum X coordinate.
    pub max_x: f64,
    /// Maximum Y coordinate.
    pub max_y: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Extent {
    /// The empty extent.
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// An extent covering the whole plane.
    pub const EVERYTHING: Self = Self {
        min_x: f64::NEG_INFINITY,
        min_y: f64::NEG_INFINITY,
        max_x: f64::INFINITY,
        max_y: f64::INFINITY,
    };

    /// Create an extent from min/max corners.
    #[inline]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding extent of a packed coordinate buffer with the given stride.
    pub fn from_flat_coordinates(flat_coordinates: &[f64], stride: usize) -> Self {
        let mut extent = Self::EMPTY;
        extent.extend_flat_coordinates(flat_coordinates, stride);
        extent
    }

    /// Returns `true` if no point has been added to this extent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Grow this extent to include `point`.
    #[inline]
    pub fn extend_point(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    /// Grow this extent to include every vertex of a packed coordinate buffer.
    pub fn extend_flat_coordinates(&mut self, flat_coordinates: &[f64], stride: usize) {
        assert!(stride >= 2, "stride must cover at least x and y");
        for vertex in flat_coordinates.chunks_exact(stride) {
            self.extend_point(Point::new(vertex[0], vertex[1]));
        }
    }

    /// Grow this extent to include `other`.
    #[inline]
    pub fn extend(&mut self, other: &Self) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// The smallest extent containing both `self` and `other`.
    #[must_use]
    #[inline]
    pub fn union(mut self, other: &Self) -> Self {
        self.extend(other);
        self
    }

    /// Returns `true` if the two extents overlap or touch.
    ///
    /// Empty extents never intersect anything.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Returns `true` if `point` lies inside or on the boundary of this extent.
    #[inline]
    pub fn contains_point(&self, point: Point) -> bool {
        self.min_x <= point.x
            && point.x <= self.max_x
            && self.min_y <= point.y
            && point.y <= self.max_y
    }

    /// Convert to kurbo's rectangle type.
    ///
    /// Returns `None` for the empty extent, which has no rectangle equivalent.
    #[inline]
    pub fn to_kurbo(self) -> Option<Rect> {
        (!self.is_empty()).then(|| Rect::new(self.min_x, self.min_y, self.max_x, self.max_y))
    }
}

impl From<Rect> for Extent {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.x1, rect.y1)
    }
}

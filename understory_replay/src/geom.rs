// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry data sources consumed by the replays.
//!
//! Replays never look inside geometries beyond the accessors of [`Geometry`]:
//! a packed coordinate buffer, its stride, the part boundaries, and an extent.
//! Applications with their own geometry model implement the trait directly;
//! [`FlatGeometry`] is a small owned implementation for everything else.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::Extent;

/// The kind of a geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// A single point.
    Point,
    /// A collection of points.
    MultiPoint,
    /// A connected polyline.
    LineString,
    /// A collection of polylines.
    MultiLineString,
    /// A polygon made of one exterior ring and any number of holes.
    Polygon,
    /// A collection of polygons.
    MultiPolygon,
}

/// Read-only access to packed geometry coordinates.
///
/// Coordinates are stored as `stride` components per vertex (x and y first,
/// followed by any extra per-vertex attributes). Part boundaries are
/// exclusive end offsets into [`Geometry::flat_coordinates`]:
///
/// - [`Geometry::ends`]: one end per part of a multi-line string, or per
///   ring of a polygon.
/// - [`Geometry::endss`]: one list of ring ends per polygon of a
///   multi-polygon.
pub trait Geometry {
    /// The kind of this geometry.
    fn kind(&self) -> GeometryKind;

    /// Packed coordinates.
    fn flat_coordinates(&self) -> &[f64];

    /// Number of components per vertex.
    fn stride(&self) -> usize;

    /// Part end offsets (multi-line strings and polygons).
    fn ends(&self) -> &[usize] {
        &[]
    }

    /// Ring end offsets per polygon (multi-polygons).
    fn endss(&self) -> &[Vec<usize>] {
        &[]
    }

    /// Bounding extent of the geometry.
    fn extent(&self) -> Extent {
        Extent::from_flat_coordinates(self.flat_coordinates(), self.stride())
    }
}

macro_rules! forward_geometry {
    ($($ptr:ty),*) => {
        $(
            impl<T: Geometry + ?Sized> Geometry for $ptr {
                #[inline]
                fn kind(&self) -> GeometryKind {
                    (**self).kind()
                }

                #[inline]
                fn flat_coordinates(&self) -> &[f64] {
                    (**self).flat_coordinates()
                }

                #[inline]
                fn stride(&self) -> usize {
                    (**self).stride()
                }

                #[inline]
                fn ends(&self) -> &[usize] {
                    (**self).ends()
                }

                #[inline]
                fn endss(&self) -> &[Vec<usize>] {
                    (**self).endss()
                }

                #[inline]
                fn extent(&self) -> Extent {
                    (**self).extent()
                }
            }
        )*
    };
}

forward_geometry!(&T, Box<T>, Rc<T>, Arc<T>);

/// An owned geometry with packed 2D coordinates.
///
/// The extent is computed once at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatGeometry {
    kind: GeometryKind,
    flat_coordinates: Vec<f64>,
    stride: usize,
    ends: Vec<usize>,
    endss: Vec<Vec<usize>>,
    extent: Extent,
}

impl FlatGeometry {
    /// Build a geometry from raw packed parts.
    ///
    /// # Panics
    ///
    /// Panics if `stride < 2`, if the coordinate count is not a multiple of
    /// `stride`, or if any end offset exceeds the buffer.
    pub fn from_flat_parts(
        kind: GeometryKind,
        flat_coordinates: Vec<f64>,
        stride: usize,
        ends: Vec<usize>,
        endss: Vec<Vec<usize>>,
    ) -> Self {
        assert!(stride >= 2, "stride must cover at least x and y");
        assert!(
            flat_coordinates.len() % stride == 0,
            "coordinate count must be a multiple of the stride"
        );
        let len = flat_coordinates.len();
        assert!(
            ends.iter().chain(endss.iter().flatten()).all(|&end| end <= len),
            "part ends must lie within the coordinate buffer"
        );
        let extent = Extent::from_flat_coordinates(&flat_coordinates, stride);
        Self {
            kind,
            flat_coordinates,
            stride,
            ends,
            endss,
            extent,
        }
    }

    /// A single point.
    pub fn point(x: f64, y: f64) -> Self {
        Self::from_flat_parts(
            GeometryKind::Point,
            Vec::from([x, y]),
            2,
            Vec::new(),
            Vec::new(),
        )
    }

    /// A set of points.
    pub fn multi_point(points: &[(f64, f64)]) -> Self {
        Self::from_flat_parts(
            GeometryKind::MultiPoint,
            flatten(points),
            2,
            Vec::new(),
            Vec::new(),
        )
    }

    /// A polyline through `points`.
    pub fn line_string(points: &[(f64, f64)]) -> Self {
        Self::from_flat_parts(
            GeometryKind::LineString,
            flatten(points),
            2,
            Vec::new(),
            Vec::new(),
        )
    }

    /// A set of polylines.
    pub fn multi_line_string(lines: &[&[(f64, f64)]]) -> Self {
        let mut flat = Vec::new();
        let ends = append_parts(&mut flat, lines);
        Self::from_flat_parts(GeometryKind::MultiLineString, flat, 2, ends, Vec::new())
    }

    /// A polygon from its rings, exterior first.
    ///
    /// Rings are given open (without repeating the first vertex); the replays
    /// close them when recording.
    pub fn polygon(rings: &[&[(f64, f64)]]) -> Self {
        let mut flat = Vec::new();
        let ends = append_parts(&mut flat, rings);
        Self::from_flat_parts(GeometryKind::Polygon, flat, 2, ends, Vec::new())
    }

    /// A set of polygons, each given as its rings.
    pub fn multi_polygon(polygons: &[&[&[(f64, f64)]]]) -> Self {
        let mut flat = Vec::new();
        let endss = polygons
            .iter()
            .map(|rings| append_parts(&mut flat, rings))
            .collect();
        Self::from_flat_parts(GeometryKind::MultiPolygon, flat, 2, Vec::new(), endss)
    }
}

fn flatten(points: &[(f64, f64)]) -> Vec<f64> {
    points.iter().flat_map(|&(x, y)| [x, y]).collect()
}

fn append_parts(flat: &mut Vec<f64>, parts: &[&[(f64, f64)]]) -> Vec<usize> {
    parts
        .iter()
        .map(|part| {
            flat.extend(part.iter().flat_map(|&(x, y)| [x, y]));
            flat.len()
        })
        .collect()
}

impl Geometry for FlatGeometry {
    fn kind(&self) -> GeometryKind {
        self.kind
    }

    fn flat_coordinates(&self) -> &[f64] {
        &self.flat_coordinates
    }

    fn stride(&self) -> usize {
        self.stride
    }

    fn ends(&self) -> &[usize] {
        &self.ends
    }

    fn endss(&self) -> &[Vec<usize>] {
        &self.endss
    }

    fn extent(&self) -> Extent {
        self.extent
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transforms over packed ("flat") coordinate buffers.

use alloc::vec::Vec;

use kurbo::Affine;

/// Transform a packed coordinate buffer into device space.
///
/// `flat_coordinates` holds vertices of `stride` components each; only the
/// first two components (x, y) of every vertex are read. The result is written
/// into `dest` as interleaved `(x', y')` pairs in input order, and `dest` is
/// truncated to exactly that length, so a buffer reused across calls never
/// keeps stale trailing values.
///
/// Only the 2D part of `transform` is used.
pub fn transform_flat_coordinates_into(
    flat_coordinates: &[f64],
    stride: usize,
    transform: Affine,
    dest: &mut Vec<f64>,
) {
    assert!(stride >= 2, "stride must cover at least x and y");
    let [a, b, c, d, e, f] = transform.as_coeffs();
    let vertices = flat_coordinates.len() / stride;
    dest.clear();
    dest.reserve(vertices * 2);
    for vertex in flat_coordinates.chunks_exact(stride) {
        let (x, y) = (vertex[0], vertex[1]);
        dest.push(a * x + c * y + e);
        dest.push(b * x + d * y + f);
    }
}

/// Transform a packed coordinate buffer into a freshly allocated buffer.
///
/// See [`transform_flat_coordinates_into`].
pub fn transform_flat_coordinates(
    flat_coordinates: &[f64],
    stride: usize,
    transform: Affine,
) -> Vec<f64> {
    let mut dest = Vec::new();
    transform_flat_coordinates_into(flat_coordinates, stride, transform, &mut dest);
    dest
}

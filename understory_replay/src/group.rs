// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replays bucketed by z-index and primitive type.

use alloc::collections::BTreeMap;

use kurbo::{Affine, Point};

use crate::{
    DrawingContext, Extent, HitDetectionContext, RenderDefaults, ReplayType, TypedReplay,
};

/// Transform that maps the world `coordinate` onto the center of a 1×1
/// device surface, at `resolution` world units per pixel and with the y axis
/// pointing down.
pub fn hit_detection_transform(coordinate: Point, resolution: f64) -> Affine {
    Affine::translate((0.5, 0.5))
        * Affine::scale_non_uniform(1.0 / resolution, -1.0 / resolution)
        * Affine::translate((-coordinate.x, -coordinate.y))
}

/// All replays of one render pass, keyed by z-index and then by
/// [`ReplayType`].
///
/// Painting walks z-indices from low to high; hit detection walks them from
/// high to low so the topmost ink is reported first. Every tape whose extent
/// misses the requested extent is skipped.
///
/// The group owns the single-pixel surface `H` used for hit detection.
#[derive(Debug)]
pub struct ReplayGroup<G, D, H> {
    defaults: RenderDefaults,
    replays_by_z_index: BTreeMap<i32, BTreeMap<ReplayType, TypedReplay<G, D>>>,
    hit_detection_context: H,
}

impl<G, D, H> ReplayGroup<G, D, H> {
    /// An empty group with the default render style.
    pub fn new(hit_detection_context: H) -> Self {
        Self::with_defaults(hit_detection_context, RenderDefaults::default())
    }

    /// An empty group whose replays resolve unset style attributes from
    /// `defaults`.
    pub fn with_defaults(hit_detection_context: H, defaults: RenderDefaults) -> Self {
        Self {
            defaults,
            replays_by_z_index: BTreeMap::new(),
            hit_detection_context,
        }
    }

    /// The defaults handed to every new replay.
    pub fn defaults(&self) -> &RenderDefaults {
        &self.defaults
    }

    /// The hit-detection surface.
    pub fn hit_detection_context(&self) -> &H {
        &self.hit_detection_context
    }

    /// Mutable access to the hit-detection surface, for registering
    /// resources it resolves while probing.
    pub fn hit_detection_context_mut(&mut self) -> &mut H {
        &mut self.hit_detection_context
    }

    /// The replay for `replay_type` at `z_index` (0 when `None`), created on
    /// first use.
    pub fn get_replay(
        &mut self,
        z_index: Option<i32>,
        replay_type: ReplayType,
    ) -> &mut TypedReplay<G, D> {
        let defaults = &self.defaults;
        self.replays_by_z_index
            .entry(z_index.unwrap_or(0))
            .or_default()
            .entry(replay_type)
            .or_insert_with(|| TypedReplay::new(replay_type, defaults))
    }

    /// The replay for `replay_type` at `z_index`, if one has been created.
    pub fn find_replay(&self, z_index: i32, replay_type: ReplayType) -> Option<&TypedReplay<G, D>> {
        self.replays_by_z_index.get(&z_index)?.get(&replay_type)
    }

    /// The z-indices that hold replays, in ascending order.
    pub fn z_indices(&self) -> impl Iterator<Item = i32> + '_ {
        self.replays_by_z_index.keys().copied()
    }

    /// Returns `true` if no replay has been created.
    pub fn is_empty(&self) -> bool {
        self.replays_by_z_index.is_empty()
    }

    /// Seal every replay.
    ///
    /// # Panics
    ///
    /// Panics if the group has already been finished and holds line-string
    /// or polygon replays.
    pub fn finish(&mut self) {
        let mut count = 0_usize;
        for replay in self.replays_by_z_index.values_mut().flat_map(BTreeMap::values_mut) {
            replay.finish();
            count += 1;
        }
        log::debug!("finished {count} replays");
    }

    /// Paint every replay intersecting `extent`, lowest z-index first.
    pub fn replay<C, F>(
        &mut self,
        context: &mut C,
        extent: &Extent,
        transform: Affine,
        mut filter: F,
    ) where
        C: DrawingContext + ?Sized,
        F: FnMut(&G) -> bool,
    {
        for (z_index, replays) in &mut self.replays_by_z_index {
            for (replay_type, replay) in replays {
                if !extent.intersects(&replay.extent()) {
                    log::trace!("culled {replay_type:?} replay at z-index {z_index}");
                    continue;
                }
                replay.replay(context, transform, &mut filter);
            }
        }
    }

    /// Paint every replay intersecting `extent` one geometry at a time,
    /// lowest z-index first, calling `callback` after each geometry.
    pub fn replay_per_geometry<C, F, K>(
        &mut self,
        context: &mut C,
        extent: &Extent,
        transform: Affine,
        mut filter: F,
        mut callback: K,
    ) where
        C: DrawingContext + ?Sized,
        F: FnMut(&G) -> bool,
        K: FnMut(&mut C, &G, &D),
    {
        for (z_index, replays) in &mut self.replays_by_z_index {
            for (replay_type, replay) in replays {
                if !extent.intersects(&replay.extent()) {
                    log::trace!("culled {replay_type:?} replay at z-index {z_index}");
                    continue;
                }
                replay.replay_per_geometry(context, transform, &mut filter, &mut callback);
            }
        }
    }
}

impl<G, D, H: HitDetectionContext> ReplayGroup<G, D, H> {
    /// Call `callback` for every geometry accepted by `filter` whose ink
    /// covers the world `coordinate` at `resolution`.
    ///
    /// Replays are visited topmost first: z-indices from high to low, and
    /// within one z-index the replay types in reverse paint order. Inside a
    /// single replay, geometries are tested in the order they were drawn.
    pub fn for_each_geometry_at_coordinate<F, K>(
        &mut self,
        extent: &Extent,
        resolution: f64,
        coordinate: Point,
        mut filter: F,
        mut callback: K,
    ) where
        F: FnMut(&G) -> bool,
        K: FnMut(&G, &D),
    {
        let transform = hit_detection_transform(coordinate, resolution);
        let context = &mut self.hit_detection_context;
        context.clear_probe();
        let mut hits = 0_usize;
        for (z_index, replays) in self.replays_by_z_index.iter_mut().rev() {
            for (replay_type, replay) in replays.iter_mut().rev() {
                if !extent.intersects(&replay.extent()) {
                    log::trace!("culled {replay_type:?} replay at z-index {z_index}");
                    continue;
                }
                replay.replay_per_geometry(
                    context,
                    transform,
                    &mut filter,
                    |probe: &mut H, geometry: &G, data: &D| {
                        if probe.probe_alpha() > 0 {
                            callback(geometry, data);
                            probe.clear_probe();
                            hits += 1;
                        }
                    },
                );
            }
        }
        log::debug!(
            "{hits} geometries at ({}, {}) at resolution {resolution}",
            coordinate.x,
            coordinate.y
        );
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing surfaces that recorded tapes are replayed against.

use kurbo::Rect;
use peniko::Color;

use crate::{ImageId, StrokeState};

/// A 2D drawing context with an implicit current path.
///
/// This is the minimal immediate-mode surface the tape interpreter needs:
/// path construction, fill and stroke of the current path, image blits, and
/// fill/stroke style state. All coordinates are in device pixels; the
/// interpreter applies the view transform itself before calling in.
///
/// Implementations decide what "drawing" means: a rasterizer produces
/// pixels, a reference context records calls for inspection.
pub trait DrawingContext {
    /// Discard the current path and start a new one.
    fn begin_path(&mut self);

    /// Close the current subpath.
    fn close_path(&mut self);

    /// Start a new subpath at the given point.
    fn move_to(&mut self, x: f64, y: f64);

    /// Add a line from the current point to the given point.
    fn line_to(&mut self, x: f64, y: f64);

    /// Fill the current path with the current fill color.
    fn fill(&mut self);

    /// Stroke the current path with the current stroke state.
    fn stroke(&mut self);

    /// Draw an image resource scaled into `dst`.
    fn draw_image(&mut self, image: ImageId, dst: Rect);

    /// Set the color used by [`DrawingContext::fill`].
    fn set_fill_style(&mut self, color: Color);

    /// Set the color, width, caps, join, and miter limit used by
    /// [`DrawingContext::stroke`].
    ///
    /// The dash pattern of `style` is applied separately through
    /// [`DrawingContext::set_line_dash`].
    fn set_stroke_style(&mut self, style: &StrokeState);

    /// Set the dash pattern used by [`DrawingContext::stroke`].
    ///
    /// Contexts without dash support keep the default, which ignores the
    /// pattern.
    fn set_line_dash(&mut self, _pattern: &[f64]) {}
}

/// A single-pixel offscreen surface used for hit detection.
///
/// Geometries are replayed into it under a transform that maps the probed
/// world coordinate onto the center of its only pixel; after each geometry
/// the pixel is read back to decide whether that geometry covers the
/// coordinate.
pub trait HitDetectionContext: DrawingContext {
    /// Alpha of the probe pixel, including everything drawn since the last
    /// [`HitDetectionContext::clear_probe`].
    fn probe_alpha(&mut self) -> u8;

    /// Reset the probe pixel to fully transparent.
    fn clear_probe(&mut self);
}

impl<C: DrawingContext + ?Sized> DrawingContext for &mut C {
    #[inline]
    fn begin_path(&mut self) {
        (**self).begin_path();
    }

    #[inline]
    fn close_path(&mut self) {
        (**self).close_path();
    }

    #[inline]
    fn move_to(&mut self, x: f64, y: f64) {
        (**self).move_to(x, y);
    }

    #[inline]
    fn line_to(&mut self, x: f64, y: f64) {
        (**self).line_to(x, y);
    }

    #[inline]
    fn fill(&mut self) {
        (**self).fill();
    }

    #[inline]
    fn stroke(&mut self) {
        (**self).stroke();
    }

    #[inline]
    fn draw_image(&mut self, image: ImageId, dst: Rect) {
        (**self).draw_image(image, dst);
    }

    #[inline]
    fn set_fill_style(&mut self, color: Color) {
        (**self).set_fill_style(color);
    }

    #[inline]
    fn set_stroke_style(&mut self, style: &StrokeState) {
        (**self).set_stroke_style(style);
    }

    #[inline]
    fn set_line_dash(&mut self, pattern: &[f64]) {
        (**self).set_line_dash(pattern);
    }
}

impl<C: HitDetectionContext + ?Sized> HitDetectionContext for &mut C {
    #[inline]
    fn probe_alpha(&mut self) -> u8 {
        (**self).probe_alpha()
    }

    #[inline]
    fn clear_probe(&mut self) {
        (**self).clear_probe();
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_replay_vello_cpu --heading-base-level=0

//! Vello CPU–backed drawing context for Understory replays.
//!
//! This crate implements [`DrawingContext`] and [`HitDetectionContext`] on
//! top of the sparse-strips [`vello_cpu::RenderContext`], so recorded tapes
//! can be rasterized to pixels and hit-tested against real coverage
//! (anti-aliasing, caps, joins, and dashes included).
//!
//! A [`VelloCpuContext::hit_detection_for`] context is a single-pixel surface
//! suitable as the probe of a [`ReplayGroup`](understory_replay::ReplayGroup).
//! It shares its image registry with the screen context it was created from,
//! so the same [`ImageId`]s resolve on both.

#![deny(unsafe_code)]
#![no_std]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use kurbo::{Cap, Join};
use peniko::{Color, ImageData, ImageSampler};
use understory_replay::{DrawingContext, HitDetectionContext, ImageId, StrokeState};
use vello_cpu::kurbo::{
    Affine as CpuAffine, BezPath, Cap as CpuCap, Join as CpuJoin, Rect as CpuRect, Stroke,
};
use vello_cpu::{Image as CpuImage, ImageSource, Pixmap, RenderContext};

/// Registered image resource.
#[derive(Clone)]
struct ImageEntry {
    source: ImageSource,
    width: u32,
    height: u32,
}

/// Drawing context that rasterizes replays with `vello_cpu`.
///
/// Fill and stroke colors are tracked here and applied as the render
/// context's paint right before each draw, since `vello_cpu` keeps a single
/// paint for both.
pub struct VelloCpuContext {
    ctx: RenderContext,
    width: u16,
    height: u16,
    path: BezPath,
    fill: Color,
    stroke_color: Color,
    stroke: Stroke,
    images: Rc<RefCell<Vec<Option<ImageEntry>>>>,
    sampler: ImageSampler,
}

impl fmt::Debug for VelloCpuContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuContext")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("images", &self.images.borrow().len())
            .finish_non_exhaustive()
    }
}

impl VelloCpuContext {
    /// Create a context rendering into a `width` × `height` surface.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            ctx: RenderContext::new(width, height),
            width,
            height,
            path: BezPath::new(),
            fill: Color::BLACK,
            stroke_color: Color::BLACK,
            stroke: Stroke::new(1.0),
            images: Rc::default(),
            sampler: ImageSampler::default(),
        }
    }

    /// Create a single-pixel context with its own, empty image registry.
    pub fn hit_detection() -> Self {
        Self::new(1, 1)
    }

    /// Create the single-pixel hit-detection context for `screen`.
    ///
    /// Both contexts share one image registry: images registered on either,
    /// before or after this call, are drawn by both. The image sampler is
    /// copied.
    pub fn hit_detection_for(screen: &Self) -> Self {
        Self {
            images: Rc::clone(&screen.images),
            sampler: screen.sampler,
            ..Self::new(1, 1)
        }
    }

    /// Width of the surface in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height of the surface in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The underlying render context.
    pub fn render_context(&self) -> &RenderContext {
        &self.ctx
    }

    /// Set the sampler used for subsequent image draws.
    pub fn set_image_sampler(&mut self, sampler: ImageSampler) {
        self.sampler = sampler;
    }

    /// Register an image and return the id replays should reference.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` images are registered.
    pub fn register_image(&mut self, image: &ImageData) -> ImageId {
        let mut images = self.images.borrow_mut();
        let id =
            u32::try_from(images.len()).expect("VelloCpuContext: too many images for u32 ImageId");
        images.push(Some(ImageEntry {
            source: ImageSource::from_peniko_image_data(image),
            width: image.width,
            height: image.height,
        }));
        ImageId(id)
    }

    /// Forget a registered image. Later draws of `id` are skipped by every
    /// context sharing the registry.
    pub fn unregister_image(&mut self, id: ImageId) {
        if let Some(slot) = self.images.borrow_mut().get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    /// Rasterize everything drawn so far into `pixmap`.
    ///
    /// The pixmap must have the same size as the context.
    pub fn render_to_pixmap(&mut self, pixmap: &mut Pixmap) {
        self.ctx.flush();
        self.ctx.render_to_pixmap(pixmap);
    }

    /// Rasterize everything drawn so far into a new pixmap.
    pub fn render(&mut self) -> Pixmap {
        let mut pixmap = Pixmap::new(self.width, self.height);
        self.render_to_pixmap(&mut pixmap);
        pixmap
    }

    /// Discard everything drawn so far. Styles and images are kept.
    pub fn clear(&mut self) {
        self.ctx.reset();
        self.path = BezPath::new();
    }

    fn stroke_from_state(style: &StrokeState) -> Stroke {
        let cap = match style.cap {
            Cap::Butt => CpuCap::Butt,
            Cap::Round => CpuCap::Round,
            Cap::Square => CpuCap::Square,
        };
        let mut stroke = Stroke::new(style.width);
        stroke.join = match style.join {
            Join::Bevel => CpuJoin::Bevel,
            Join::Miter => CpuJoin::Miter,
            Join::Round => CpuJoin::Round,
        };
        stroke.miter_limit = style.miter_limit;
        stroke.start_cap = cap;
        stroke.end_cap = cap;
        stroke
    }
}

impl DrawingContext for VelloCpuContext {
    fn begin_path(&mut self) {
        self.path = BezPath::new();
    }

    fn close_path(&mut self) {
        self.path.close_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.line_to((x, y));
    }

    fn fill(&mut self) {
        self.ctx.set_paint(self.fill);
        self.ctx.fill_path(&self.path);
    }

    fn stroke(&mut self) {
        self.ctx.set_paint(self.stroke_color);
        self.ctx.set_stroke(self.stroke.clone());
        self.ctx.stroke_path(&self.path);
    }

    fn draw_image(&mut self, image: ImageId, dst: kurbo::Rect) {
        let Some(Some(entry)) = self.images.borrow().get(image.0 as usize).cloned() else {
            log::warn!("draw_image: unknown image {image:?}");
            return;
        };
        if entry.width == 0 || entry.height == 0 || dst.width() == 0.0 || dst.height() == 0.0 {
            return;
        }
        let paint = CpuImage {
            image: entry.source,
            sampler: self.sampler,
        };
        let (width, height) = (f64::from(entry.width), f64::from(entry.height));
        let local = CpuAffine::translate((dst.x0, dst.y0))
            * CpuAffine::scale_non_uniform(dst.width() / width, dst.height() / height);

        let saved_transform = *self.ctx.transform();
        self.ctx.set_paint(paint);
        self.ctx.set_transform(saved_transform * local);
        self.ctx.fill_rect(&CpuRect::new(0.0, 0.0, width, height));
        self.ctx.set_transform(saved_transform);
    }

    fn set_fill_style(&mut self, color: Color) {
        self.fill = color;
    }

    fn set_stroke_style(&mut self, style: &StrokeState) {
        let dashes = core::mem::take(&mut self.stroke.dash_pattern);
        self.stroke_color = style.color;
        self.stroke = Self::stroke_from_state(style);
        self.stroke.dash_pattern = dashes;
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.stroke.dash_pattern = pattern.iter().copied().collect();
        self.stroke.dash_offset = 0.0;
    }
}

impl HitDetectionContext for VelloCpuContext {
    fn probe_alpha(&mut self) -> u8 {
        let pixels = self.render().take_unpremultiplied();
        pixels.first().map_or(0, |pixel| pixel.a)
    }

    fn clear_probe(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use peniko::color::palette::css::{BLUE, RED};
    use peniko::{Blob, ImageAlphaType, ImageFormat, ImageQuality};
    use understory_replay::LineDash;

    fn stroke_state(width: f64) -> StrokeState {
        StrokeState {
            color: RED,
            width,
            cap: Cap::Butt,
            join: Join::Miter,
            miter_limit: 10.0,
            line_dash: LineDash::new(),
        }
    }

    fn solid_image(width: u32, height: u32) -> ImageData {
        let pixels = vec![0xff_u8; (width * height * 4) as usize];
        ImageData {
            data: Blob::from(pixels),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            width,
            height,
        }
    }

    fn square(ctx: &mut VelloCpuContext, x0: f64, y0: f64, x1: f64, y1: f64) {
        ctx.begin_path();
        ctx.move_to(x0, y0);
        ctx.line_to(x1, y0);
        ctx.line_to(x1, y1);
        ctx.line_to(x0, y1);
        ctx.close_path();
    }

    #[test]
    fn fill_covers_the_probe() {
        let mut ctx = VelloCpuContext::hit_detection();
        assert_eq!(ctx.probe_alpha(), 0);
        square(&mut ctx, -2.0, -2.0, 3.0, 3.0);
        ctx.fill();
        assert_eq!(ctx.probe_alpha(), u8::MAX);
    }

    #[test]
    fn clear_probe_discards_coverage() {
        let mut ctx = VelloCpuContext::hit_detection();
        square(&mut ctx, -2.0, -2.0, 3.0, 3.0);
        ctx.fill();
        ctx.clear_probe();
        assert_eq!(ctx.probe_alpha(), 0);
    }

    #[test]
    fn stroke_coverage_follows_width() {
        let mut ctx = VelloCpuContext::hit_detection();
        ctx.set_stroke_style(&stroke_state(1.0));
        ctx.begin_path();
        ctx.move_to(-5.0, 4.5);
        ctx.line_to(5.0, 4.5);
        ctx.stroke();
        assert_eq!(ctx.probe_alpha(), 0);

        ctx.set_stroke_style(&stroke_state(12.0));
        ctx.stroke();
        assert!(ctx.probe_alpha() > 0, "wide stroke reaches the probe");
    }

    #[test]
    fn dash_gaps_leave_the_probe_uncovered() {
        let mut ctx = VelloCpuContext::hit_detection();
        ctx.set_stroke_style(&stroke_state(4.0));
        ctx.set_line_dash(&[2.0, 20.0]);
        ctx.begin_path();
        ctx.move_to(-10.0, 0.5);
        ctx.line_to(10.0, 0.5);
        ctx.stroke();
        assert_eq!(ctx.probe_alpha(), 0);

        ctx.set_line_dash(&[]);
        ctx.stroke();
        assert_eq!(ctx.probe_alpha(), u8::MAX);
    }

    #[test]
    fn images_are_scaled_into_their_destination() {
        let mut ctx = VelloCpuContext::new(8, 8);
        ctx.set_image_sampler(ImageSampler {
            quality: ImageQuality::Low,
            ..ImageSampler::default()
        });
        let id = ctx.register_image(&solid_image(2, 2));
        ctx.draw_image(id, kurbo::Rect::new(4.0, 4.0, 8.0, 8.0));
        let pixels = ctx.render().take_unpremultiplied();
        let row = |y: usize| pixels[y * 8..(y + 1) * 8].iter().map(|p| p.a).collect::<Vec<_>>();
        assert_eq!(row(2), [0; 8]);
        for alpha in &row(5)[..4] {
            assert_eq!(*alpha, 0, "left of the destination stays clear");
        }
        for alpha in &row(5)[4..] {
            assert!(*alpha > 250, "destination is covered, got {alpha}");
        }
    }

    #[test]
    fn hit_detection_for_shares_the_image_registry() {
        let mut screen = VelloCpuContext::new(16, 16);
        let early = screen.register_image(&solid_image(1, 1));
        let mut probe = VelloCpuContext::hit_detection_for(&screen);
        let late = screen.register_image(&solid_image(1, 1));

        for id in [early, late] {
            probe.draw_image(id, kurbo::Rect::new(-1.0, -1.0, 2.0, 2.0));
            assert!(probe.probe_alpha() > 0, "{id:?} resolves on the hit surface");
            probe.clear_probe();
        }

        probe.unregister_image(early);
        screen.draw_image(early, kurbo::Rect::new(0.0, 0.0, 16.0, 16.0));
        assert_eq!(screen.render().take_unpremultiplied()[0].a, 0);
    }

    #[test]
    fn unregistered_images_are_skipped() {
        let mut ctx = VelloCpuContext::hit_detection();
        let id = ctx.register_image(&solid_image(1, 1));
        ctx.unregister_image(id);
        ctx.draw_image(id, kurbo::Rect::new(0.0, 0.0, 1.0, 1.0));
        ctx.draw_image(ImageId(9), kurbo::Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(ctx.probe_alpha(), 0);
    }

    #[test]
    fn fill_and_stroke_use_their_own_colors() {
        let mut ctx = VelloCpuContext::new(4, 1);
        ctx.set_fill_style(BLUE);
        ctx.set_stroke_style(&stroke_state(1.0));
        square(&mut ctx, 0.0, 0.0, 2.0, 1.0);
        ctx.fill();
        ctx.begin_path();
        ctx.move_to(3.5, 0.0);
        ctx.line_to(3.5, 1.0);
        ctx.stroke();

        let pixels = ctx.render().take_unpremultiplied();
        assert_eq!((pixels[0].r, pixels[0].b), (0, u8::MAX));
        assert_eq!(pixels[1].a, u8::MAX);
        assert_eq!(pixels[2].a, 0);
        assert!(pixels[3].r > 0, "stroke is painted red");
        assert_eq!(pixels[3].b, 0);
    }
}

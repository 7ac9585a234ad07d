// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style descriptors read by the replays, and the resolved style state that
//! ends up in the instruction tape.

use kurbo::{Cap, Join, Point, Size, Stroke};
use peniko::Color;
use smallvec::SmallVec;

/// Dash pattern storage; short patterns stay inline.
pub type LineDash = SmallVec<[f64; 4]>;

/// Identifier for an image resource.
///
/// This is a small, opaque handle that is stable for the lifetime of the
/// resource. Drawing contexts resolve it to pixel data when a recorded
/// image instruction is replayed.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Fill style descriptor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillStyle {
    /// Fill color; [`RenderDefaults::fill_color`] when unset.
    pub color: Option<Color>,
}

impl FillStyle {
    /// A fill with the given color.
    #[inline]
    pub const fn new(color: Color) -> Self {
        Self { color: Some(color) }
    }
}

/// Stroke style descriptor.
///
/// Every unset attribute falls back to the matching [`RenderDefaults`] field
/// when the style is handed to a replay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Option<Color>,
    /// Line width in device pixels.
    pub width: Option<f64>,
    /// Line cap.
    pub cap: Option<Cap>,
    /// Line join.
    pub join: Option<Join>,
    /// Miter limit.
    pub miter_limit: Option<f64>,
    /// Dash pattern in device pixels.
    pub line_dash: Option<LineDash>,
}

impl StrokeStyle {
    /// A stroke with the given color and width.
    #[inline]
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color: Some(color),
            width: Some(width),
            ..Self::default()
        }
    }

    /// Builder method for setting the line cap.
    #[must_use]
    pub fn with_cap(mut self, cap: Cap) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Builder method for setting the line join.
    #[must_use]
    pub fn with_join(mut self, join: Join) -> Self {
        self.join = Some(join);
        self
    }

    /// Builder method for setting the miter limit.
    #[must_use]
    pub fn with_miter_limit(mut self, miter_limit: f64) -> Self {
        self.miter_limit = Some(miter_limit);
        self
    }

    /// Builder method for setting the dash pattern.
    #[must_use]
    pub fn with_line_dash(mut self, pattern: impl IntoIterator<Item = f64>) -> Self {
        self.line_dash = Some(pattern.into_iter().collect());
        self
    }
}

/// Image (point symbol) style descriptor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImageStyle {
    /// Offset from the top-left corner of the image to the point it marks,
    /// in device pixels.
    pub anchor: Point,
    /// Size at which the image is drawn, in device pixels.
    pub size: Size,
    /// Image resource.
    pub image: ImageId,
    /// Round the drawn position to whole device pixels.
    pub snap_to_pixel: bool,
}

/// Default style attributes used wherever a style leaves a field unset.
///
/// A single record is handed to every replay at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderDefaults {
    /// Default fill color.
    pub fill_color: Color,
    /// Default stroke color.
    pub stroke_color: Color,
    /// Default line cap.
    pub line_cap: Cap,
    /// Default line join.
    pub line_join: Join,
    /// Default line width.
    pub line_width: f64,
    /// Default miter limit.
    pub miter_limit: f64,
    /// Default dash pattern (solid when empty).
    pub line_dash: LineDash,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_cap: Cap::Round,
            line_join: Join::Round,
            line_width: 1.0,
            miter_limit: 10.0,
            line_dash: LineDash::new(),
        }
    }
}

impl RenderDefaults {
    /// Resolve a fill descriptor to the color that gets recorded.
    pub fn resolve_fill(&self, fill: &FillStyle) -> Color {
        fill.color.unwrap_or(self.fill_color)
    }

    /// Resolve a stroke descriptor to the state that gets recorded.
    pub fn resolve_stroke(&self, stroke: &StrokeStyle) -> StrokeState {
        StrokeState {
            color: stroke.color.unwrap_or(self.stroke_color),
            width: stroke.width.unwrap_or(self.line_width),
            cap: stroke.cap.unwrap_or(self.line_cap),
            join: stroke.join.unwrap_or(self.line_join),
            miter_limit: stroke.miter_limit.unwrap_or(self.miter_limit),
            line_dash: stroke
                .line_dash
                .clone()
                .unwrap_or_else(|| self.line_dash.clone()),
        }
    }
}

/// Fully resolved stroke attributes, as carried by a stroke-style
/// instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeState {
    /// Stroke color.
    pub color: Color,
    /// Line width.
    pub width: f64,
    /// Line cap (applied to both ends).
    pub cap: Cap,
    /// Line join.
    pub join: Join,
    /// Miter limit.
    pub miter_limit: f64,
    /// Dash pattern; empty for solid lines.
    pub line_dash: LineDash,
}

impl StrokeState {
    /// Convert to a [`kurbo::Stroke`] (without color).
    pub fn to_kurbo(&self) -> Stroke {
        Stroke::new(self.width)
            .with_caps(self.cap)
            .with_join(self.join)
            .with_miter_limit(self.miter_limit)
            .with_dashes(0.0, self.line_dash.iter().copied())
    }
}

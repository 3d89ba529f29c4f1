use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{ArenaError, ArenaResult};
use crate::geom::path::PathVector;

/// Paint channels at or below this opacity count as invisible.
pub(crate) const VISIBLE_OPACITY: f32 = 1e-3;

/// Rule deciding which winding numbers are inside a filled path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    /// Inside when the winding number is non-zero.
    #[default]
    NonZero,
    /// Inside when the winding number is odd.
    EvenOdd,
}

impl FillRule {
    /// Whether a point with this winding number is covered.
    pub fn covers(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding & 1 != 0,
        }
    }
}

/// Shape drawn at open stroke ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    /// Flat end exactly at the end point.
    #[default]
    Butt,
    /// Half-disc end.
    Round,
    /// Flat end extended by half the width.
    Square,
}

/// Shape drawn where two stroked segments meet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
}

/// Coarse paint classification used by the scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintKind {
    /// Nothing is painted.
    None,
    /// Single color.
    Solid,
    /// Repeated tile rendered off-screen.
    Pattern,
    /// Linear or radial gradient.
    Gradient,
}

/// Coordinate system of gradient geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientUnits {
    /// `0..1` spans the item's paint box.
    #[default]
    ObjectBoundingBox,
    /// Coordinates are in the item's user space.
    UserSpaceOnUse,
}

/// A gradient color stop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, `0..=1`.
    pub offset: f32,
    /// Stop color.
    pub color: Rgba8,
}

/// Fill or stroke paint descriptor.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paint {
    /// Paint nothing.
    #[default]
    None,
    /// Single color.
    Solid {
        /// Color.
        color: Rgba8,
    },
    /// Linear gradient between two points.
    LinearGradient {
        /// Start point (offset 0).
        start: Point,
        /// End point (offset 1).
        end: Point,
        /// Color stops.
        stops: Vec<GradientStop>,
        /// Coordinate system of `start` and `end`.
        #[serde(default)]
        units: GradientUnits,
    },
    /// Radial gradient.
    RadialGradient {
        /// Circle center.
        center: Point,
        /// Circle radius.
        radius: f64,
        /// Color stops.
        stops: Vec<GradientStop>,
        /// Coordinate system of `center` and `radius`.
        #[serde(default)]
        units: GradientUnits,
    },
    /// `content` filled with `color` inside the user-space `tile`, repeated.
    Pattern {
        /// Repeating cell in user space.
        tile: Rect,
        /// Tile content in user space.
        content: PathVector,
        /// Fill color of the content.
        color: Rgba8,
    },
}

impl Paint {
    /// Solid color paint.
    pub fn solid(color: Rgba8) -> Self {
        Paint::Solid { color }
    }

    /// Kind of `id`.
    pub fn kind(&self) -> PaintKind {
        match self {
            Paint::None => PaintKind::None,
            Paint::Solid { .. } => PaintKind::Solid,
            Paint::LinearGradient { .. } | Paint::RadialGradient { .. } => PaintKind::Gradient,
            Paint::Pattern { .. } => PaintKind::Pattern,
        }
    }

    /// Whether this paints nothing.
    pub fn is_none(&self) -> bool {
        matches!(self, Paint::None)
    }
}

/// Immutable style snapshot shared by a shape (or by every glyph of a glyphs group).
///
/// Defaults follow SVG: black nonzero fill, no stroke, width 1, miter joins with limit 4.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    /// Fill paint.
    pub fill: Paint,
    /// Fill opacity, `0..=1`.
    pub fill_opacity: f32,
    /// Fill rule.
    pub fill_rule: FillRule,
    /// Stroke paint.
    pub stroke: Paint,
    /// Stroke opacity, `0..=1`.
    pub stroke_opacity: f32,
    /// Stroke width in user units.
    pub stroke_width: f64,
    /// Cap style.
    pub line_cap: LineCap,
    /// Join style.
    pub line_join: LineJoin,
    /// Miter limit (ratio to the stroke width).
    pub miter_limit: f64,
    /// Dash lengths in user units; empty for a solid stroke.
    pub dash_array: Vec<f64>,
    /// Dash phase in user units.
    pub dash_offset: f64,
    /// Whole-object opacity. Zero makes the object unpickable outside outline mode.
    pub opacity: f32,
    /// Rule used when this object contributes to a clip path.
    pub clip_rule: FillRule,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Paint::solid(Rgba8::BLACK),
            fill_opacity: 1.0,
            fill_rule: FillRule::NonZero,
            stroke: Paint::None,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 4.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
            opacity: 1.0,
            clip_rule: FillRule::NonZero,
        }
    }
}

impl Style {
    /// Parse and validate a JSON style document. Missing fields take their defaults.
    pub fn from_json(s: &str) -> ArenaResult<Self> {
        let style: Style = serde_json::from_str(s).map_err(|e| ArenaError::serde(e.to_string()))?;
        style.validate()?;
        Ok(style)
    }

    /// Reject negative or non-finite widths, limits, dashes and opacities.
    pub fn validate(&self) -> ArenaResult<()> {
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(ArenaError::validation("stroke_width must be finite and >= 0"));
        }
        if !self.miter_limit.is_finite() || self.miter_limit < 1.0 {
            return Err(ArenaError::validation("miter_limit must be finite and >= 1"));
        }
        if self.dash_array.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(ArenaError::validation(
                "dash_array entries must be finite and >= 0",
            ));
        }
        for (name, v) in [
            ("fill_opacity", self.fill_opacity),
            ("stroke_opacity", self.stroke_opacity),
            ("opacity", self.opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ArenaError::validation(format!("{name} must be in 0..=1")));
            }
        }
        Ok(())
    }

    /// Whether the fill paints anything.
    pub fn fill_visible(&self) -> bool {
        !self.fill.is_none() && self.fill_opacity > VISIBLE_OPACITY
    }

    /// Stroke paint is set and not fully transparent. Width is not considered.
    pub fn stroke_visible(&self) -> bool {
        !self.stroke.is_none() && self.stroke_opacity > VISIBLE_OPACITY
    }

    /// Builder: replace the fill paint.
    pub fn with_fill(mut self, fill: Paint) -> Self {
        self.fill = fill;
        self
    }

    /// Builder: replace the stroke paint and width.
    pub fn with_stroke(mut self, stroke: Paint, width: f64) -> Self {
        self.stroke = stroke;
        self.stroke_width = width;
        self
    }

    /// Set the fill rule.
    pub fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    /// Set the join and its miter limit.
    pub fn with_line_join(mut self, join: LineJoin, miter_limit: f64) -> Self {
        self.line_join = join;
        self.miter_limit = miter_limit;
        self
    }

    /// Set the line cap.
    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    /// Set the dash pattern and phase.
    pub fn with_dashes(mut self, dash_array: Vec<f64>, dash_offset: f64) -> Self {
        self.dash_array = dash_array;
        self.dash_offset = dash_offset;
        self
    }

    /// Set whole-object opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set fill opacity.
    pub fn with_fill_opacity(mut self, opacity: f32) -> Self {
        self.fill_opacity = opacity;
        self
    }

    /// Set stroke opacity.
    pub fn with_stroke_opacity(mut self, opacity: f32) -> Self {
        self.stroke_opacity = opacity;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/style.rs"]
mod tests;

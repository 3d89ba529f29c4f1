use kurbo::{PathEl, Shape as _};
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::foundation::error::{ArenaError, ArenaResult};
use crate::geom::feed::{BoundsSink, feed_pathvector};

/// One drawing command of a [`Subpath`], in the subpath's local coordinates.
///
/// Every segment starts at the end point of the previous one (or the subpath start).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Segment {
    /// Straight line.
    Line {
        /// End point.
        to: Point,
    },
    /// Horizontal line to `x`, keeping the current `y`.
    HLine {
        /// Target x coordinate.
        x: f64,
    },
    /// Vertical line to `y`, keeping the current `x`.
    VLine {
        /// Target y coordinate.
        y: f64,
    },
    /// Quadratic Bézier.
    Quad {
        /// Control point.
        ctrl: Point,
        /// End point.
        to: Point,
    },
    /// Cubic Bézier.
    Cubic {
        /// First control point.
        c1: Point,
        /// Second control point.
        c2: Point,
        /// End point.
        to: Point,
    },
    /// SVG-style elliptical arc.
    Arc {
        /// Ellipse radii.
        radii: Vec2,
        /// Ellipse rotation in radians.
        x_rotation: f64,
        /// Pick the larger of the two candidate arcs.
        large_arc: bool,
        /// Sweep in the positive-angle direction.
        sweep: bool,
        /// End point.
        to: Point,
    },
}

impl Segment {
    /// End point of the segment when started at `from`.
    pub fn end_point(&self, from: Point) -> Point {
        match *self {
            Segment::Line { to }
            | Segment::Quad { to, .. }
            | Segment::Cubic { to, .. }
            | Segment::Arc { to, .. } => to,
            Segment::HLine { x } => Point::new(x, from.y),
            Segment::VLine { y } => Point::new(from.x, y),
        }
    }
}

/// A connected run of segments, optionally closed back to its start.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Subpath {
    /// First point.
    pub start: Point,
    /// Segments in drawing order.
    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Whether the subpath returns to `start`.
    #[serde(default)]
    pub closed: bool,
}

impl Subpath {
    /// Open subpath starting at `start`.
    pub fn new(start: impl Into<Point>) -> Self {
        Self {
            start: start.into(),
            segments: Vec::new(),
            closed: false,
        }
    }

    /// Straight segment to `to`.
    pub fn line_to(mut self, to: impl Into<Point>) -> Self {
        self.segments.push(Segment::Line { to: to.into() });
        self
    }

    /// Horizontal segment to `x`.
    pub fn hline_to(mut self, x: f64) -> Self {
        self.segments.push(Segment::HLine { x });
        self
    }

    /// Vertical segment to `y`.
    pub fn vline_to(mut self, y: f64) -> Self {
        self.segments.push(Segment::VLine { y });
        self
    }

    /// Quadratic Bézier segment.
    pub fn quad_to(mut self, ctrl: impl Into<Point>, to: impl Into<Point>) -> Self {
        self.segments.push(Segment::Quad {
            ctrl: ctrl.into(),
            to: to.into(),
        });
        self
    }

    /// Cubic Bézier segment.
    pub fn curve_to(
        mut self,
        c1: impl Into<Point>,
        c2: impl Into<Point>,
        to: impl Into<Point>,
    ) -> Self {
        self.segments.push(Segment::Cubic {
            c1: c1.into(),
            c2: c2.into(),
            to: to.into(),
        });
        self
    }

    /// Elliptical arc in SVG endpoint parameterization.
    pub fn arc_to(
        mut self,
        radii: Vec2,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: impl Into<Point>,
    ) -> Self {
        self.segments.push(Segment::Arc {
            radii,
            x_rotation,
            large_arc,
            sweep,
            to: to.into(),
        });
        self
    }

    /// Mark the subpath closed.
    pub fn close(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Current point after the last segment (before any closing line).
    pub fn end_point(&self) -> Point {
        self.segments
            .iter()
            .fold(self.start, |cur, seg| seg.end_point(cur))
    }
}

/// An ordered list of subpaths: the geometry of one shape or glyph.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathVector {
    subpaths: Vec<Subpath>,
}

impl PathVector {
    /// Path without subpaths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path made of `subpaths`.
    pub fn from_subpaths(subpaths: Vec<Subpath>) -> Self {
        Self { subpaths }
    }

    /// Closed axis-aligned rectangle, drawn clockwise in a y-down space.
    pub fn rect(r: Rect) -> Self {
        Self::from_subpaths(vec![
            Subpath::new((r.x0, r.y0))
                .line_to((r.x1, r.y0))
                .line_to((r.x1, r.y1))
                .line_to((r.x0, r.y1))
                .close(),
        ])
    }

    /// Convert a kurbo path. `ClosePath` marks the running subpath closed.
    pub fn from_bezpath(path: &BezPath) -> Self {
        let mut out: Vec<Subpath> = Vec::new();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => out.push(Subpath::new(p)),
                PathEl::LineTo(p) => current(&mut out, p).segments.push(Segment::Line { to: p }),
                PathEl::QuadTo(c, p) => current(&mut out, c)
                    .segments
                    .push(Segment::Quad { ctrl: c, to: p }),
                PathEl::CurveTo(c1, c2, p) => {
                    current(&mut out, c1)
                        .segments
                        .push(Segment::Cubic { c1, c2, to: p })
                }
                PathEl::ClosePath => {
                    if let Some(last) = out.last_mut() {
                        last.closed = true;
                    }
                }
            }
        }
        Self::from_subpaths(out)
    }

    /// Parse SVG path data (`d` attribute syntax).
    pub fn from_svg(data: &str) -> ArenaResult<Self> {
        let path = BezPath::from_svg(data)
            .map_err(|e| ArenaError::validation(format!("invalid path data: {e}")))?;
        Ok(Self::from_bezpath(&path))
    }

    /// Parse the serde JSON form (an array of subpaths).
    pub fn from_json(s: &str) -> ArenaResult<Self> {
        serde_json::from_str(s).map_err(|e| ArenaError::serde(e.to_string()))
    }

    /// Append a subpath.
    pub fn push(&mut self, subpath: Subpath) {
        self.subpaths.push(subpath);
    }

    /// Builder form of [`PathVector::push`].
    pub fn with(mut self, subpath: Subpath) -> Self {
        self.subpaths.push(subpath);
        self
    }

    /// Subpaths in drawing order.
    pub fn subpaths(&self) -> &[Subpath] {
        &self.subpaths
    }

    /// True when there is nothing to draw: no subpath has a segment.
    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|s| s.segments.is_empty())
    }

    /// Flatten into a kurbo path under `transform`, arcs converted to cubics.
    pub fn to_bezpath(&self, transform: Affine) -> BezPath {
        let mut out = BezPath::new();
        feed_pathvector(&mut out, self, transform, None, false, 0.0);
        out
    }

    /// Exact bounds of the transformed geometry (curve extrema included).
    pub fn bounds_exact(&self, transform: Affine) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_bezpath(transform).bounding_box())
    }

    /// Bounds of the transformed control points: cheap and never smaller than the exact bounds.
    pub fn bounds_fast(&self, transform: Affine) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let mut sink = BoundsSink::default();
        feed_pathvector(&mut sink, self, transform, None, false, 0.0);
        sink.bounds()
    }
}

fn current(out: &mut Vec<Subpath>, fallback: Point) -> &mut Subpath {
    if out.is_empty() {
        out.push(Subpath::new(fallback));
    }
    let last = out.len() - 1;
    &mut out[last]
}

#[cfg(test)]
#[path = "../../tests/unit/geom/path.rs"]
mod tests;

//! Geometry feeding: walks a [`PathVector`] and emits transformed move/line/cubic commands into
//! a [`PathSink`].
//!
//! Quadratics are degree-raised, arcs are converted to cubics, and closed subpaths end with an
//! explicit line back to their start (never a sink-native "close"), because the two differ in
//! how caps and joins are drawn at the seam.
//!
//! With `optimize_stroke`, segments whose transformed control box misses the area of interest
//! (grown by the stroke width) are replaced by a plain cursor move. Only use this for strokes:
//! fills need the full contour.

use kurbo::{PathEl, SvgArc};

use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::foundation::math::{points_bounds, quad_to_cubic, rects_touch};
use crate::geom::path::{PathVector, Segment, Subpath};

/// Arcs are approximated by cubics within this distance (in local units).
pub(crate) const ARC_TOLERANCE: f64 = 0.1;

/// Receiver of path-building commands, in device coordinates.
pub trait PathSink {
    /// Start a new subpath at `p`.
    fn move_to(&mut self, p: Point);
    /// Straight line from the current point.
    fn line_to(&mut self, p: Point);
    /// Cubic Bézier from the current point.
    fn curve_to(&mut self, c1: Point, c2: Point, p: Point);
}

impl PathSink for BezPath {
    fn move_to(&mut self, p: Point) {
        BezPath::move_to(self, p);
    }

    fn line_to(&mut self, p: Point) {
        BezPath::line_to(self, p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        BezPath::curve_to(self, c1, c2, p);
    }
}

/// Feed every non-empty subpath of `path`.
pub fn feed_pathvector<S: PathSink + ?Sized>(
    sink: &mut S,
    path: &PathVector,
    transform: Affine,
    area: Option<Rect>,
    optimize_stroke: bool,
    stroke_width: f64,
) {
    for subpath in path.subpaths() {
        if subpath.segments.is_empty() {
            continue;
        }
        feed_path(sink, subpath, transform, area, optimize_stroke, stroke_width);
    }
}

/// Feed one subpath, transformed, optionally culling stroke segments outside `area`.
pub fn feed_path<S: PathSink + ?Sized>(
    sink: &mut S,
    subpath: &Subpath,
    transform: Affine,
    area: Option<Rect>,
    optimize_stroke: bool,
    stroke_width: f64,
) {
    let mut f = Feeder::new(sink, transform, stroke_view(area, optimize_stroke, stroke_width));
    f.move_to(subpath.start);
    for seg in &subpath.segments {
        f.segment(seg);
    }
    if subpath.closed && f.cur != subpath.start {
        f.line(subpath.start);
    }
}

/// Re-emit an already transformed device path (as cached by shapes) with the same culling rules.
pub fn replay<S: PathSink + ?Sized>(
    sink: &mut S,
    path: &BezPath,
    area: Option<Rect>,
    optimize_stroke: bool,
    stroke_width: f64,
) {
    let mut f = Feeder::new(
        sink,
        Affine::IDENTITY,
        stroke_view(area, optimize_stroke, stroke_width),
    );
    let mut start = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                start = p;
                f.move_to(p);
            }
            PathEl::LineTo(p) => f.line(p),
            PathEl::QuadTo(c, p) => {
                let (c1, c2) = quad_to_cubic(f.cur, c, p);
                f.cubic(c1, c2, p);
            }
            PathEl::CurveTo(c1, c2, p) => f.cubic(c1, c2, p),
            PathEl::ClosePath => {
                if f.cur != start {
                    f.line(start);
                }
            }
        }
    }
}

fn stroke_view(area: Option<Rect>, optimize_stroke: bool, stroke_width: f64) -> Option<Rect> {
    if !optimize_stroke {
        return None;
    }
    let w = stroke_width.abs();
    area.map(|a| a.inflate(w, w))
}

struct Feeder<'a, S: PathSink + ?Sized> {
    sink: &'a mut S,
    transform: Affine,
    view: Option<Rect>,
    // current point, local and device
    cur: Point,
    dev: Point,
}

impl<'a, S: PathSink + ?Sized> Feeder<'a, S> {
    fn new(sink: &'a mut S, transform: Affine, view: Option<Rect>) -> Self {
        Self {
            sink,
            transform,
            view,
            cur: Point::ZERO,
            dev: Point::ZERO,
        }
    }

    fn move_to(&mut self, p: Point) {
        let d = self.transform * p;
        self.sink.move_to(d);
        self.cur = p;
        self.dev = d;
    }

    fn segment(&mut self, seg: &Segment) {
        match *seg {
            Segment::Line { to } => self.line(to),
            Segment::HLine { x } => self.line(Point::new(x, self.cur.y)),
            Segment::VLine { y } => self.line(Point::new(self.cur.x, y)),
            Segment::Quad { ctrl, to } => {
                let (c1, c2) = quad_to_cubic(self.cur, ctrl, to);
                self.cubic(c1, c2, to);
            }
            Segment::Cubic { c1, c2, to } => self.cubic(c1, c2, to),
            Segment::Arc {
                radii,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => self.arc(radii, x_rotation, large_arc, sweep, to),
        }
    }

    fn line(&mut self, to: Point) {
        let d = self.transform * to;
        if self.culled(&[self.dev, d]) {
            self.sink.move_to(d);
        } else {
            self.sink.line_to(d);
        }
        self.cur = to;
        self.dev = d;
    }

    fn cubic(&mut self, c1: Point, c2: Point, to: Point) {
        let d1 = self.transform * c1;
        let d2 = self.transform * c2;
        let d3 = self.transform * to;
        if self.culled(&[self.dev, d1, d2, d3]) {
            self.sink.move_to(d3);
        } else {
            self.sink.curve_to(d1, d2, d3);
        }
        self.cur = to;
        self.dev = d3;
    }

    fn arc(&mut self, radii: Vec2, x_rotation: f64, large_arc: bool, sweep: bool, to: Point) {
        let svg = SvgArc {
            from: self.cur,
            to,
            radii,
            x_rotation,
            large_arc,
            sweep,
        };
        match kurbo::Arc::from_svg_arc(&svg) {
            Some(arc) => {
                for el in arc.append_iter(ARC_TOLERANCE) {
                    if let PathEl::CurveTo(c1, c2, p) = el {
                        self.cubic(c1, c2, p);
                    }
                }
                self.cur = to;
            }
            // zero radii: straight line; identical end points: nothing to draw
            None if to != self.cur => self.line(to),
            None => {}
        }
    }

    fn culled(&self, pts: &[Point]) -> bool {
        match (self.view, points_bounds(pts)) {
            (Some(view), Some(bounds)) => !rects_touch(bounds, view),
            _ => false,
        }
    }
}

/// Accumulates the bounds of every point it receives (control points included).
#[derive(Debug, Default)]
pub(crate) struct BoundsSink {
    bounds: Option<Rect>,
}

impl BoundsSink {
    pub(crate) fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn add(&mut self, p: Point) {
        self.bounds = Some(match self.bounds {
            Some(r) => r.union_pt(p),
            None => Rect::from_points(p, p),
        });
    }
}

impl PathSink for BoundsSink {
    fn move_to(&mut self, p: Point) {
        self.add(p);
    }

    fn line_to(&mut self, p: Point) {
        self.add(p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.add(c1);
        self.add(c2);
        self.add(p);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geom/feed.rs"]
mod tests;

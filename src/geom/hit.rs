use kurbo::{ParamCurveExtrema, ParamCurveNearest as _, Shape as _};

use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::math::rects_touch;
use crate::geom::feed::feed_path;
use crate::geom::path::PathVector;

/// Accuracy passed to kurbo's nearest-point solver, in device pixels.
const NEAREST_ACCURACY: f64 = 1e-6;

/// Winding number and edge distance of a device-space point against a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointHit {
    /// Winding number with every subpath implicitly closed (fill semantics).
    pub winding: i32,
    /// Distance to the nearest point of the outline, `f64::INFINITY` when not measured or
    /// when every segment was culled.
    pub distance: f64,
}

/// Measure `point` against `path` drawn under `transform`.
///
/// When `viewbox` is given, outline segments whose bounds miss it are skipped for the
/// distance measurement; the winding number always considers the whole path.
pub fn point_hit(
    path: &PathVector,
    transform: Affine,
    point: Point,
    measure_distance: bool,
    viewbox: Option<Rect>,
) -> PointHit {
    let winding = fill_outline(path, transform).winding(point);
    let distance = if measure_distance {
        nearest_distance(&path.to_bezpath(transform), point, viewbox)
    } else {
        f64::INFINITY
    };
    PointHit { winding, distance }
}

/// Device outline with open subpaths closed back to their start, as a fill sees it.
pub(crate) fn fill_outline(path: &PathVector, transform: Affine) -> BezPath {
    let mut out = BezPath::new();
    for subpath in path.subpaths() {
        if subpath.segments.is_empty() {
            continue;
        }
        feed_path(&mut out, subpath, transform, None, false, 0.0);
        if !subpath.closed {
            out.line_to(transform * subpath.start);
        }
    }
    out
}

pub(crate) fn nearest_distance(outline: &BezPath, point: Point, viewbox: Option<Rect>) -> f64 {
    let mut best = f64::INFINITY;
    for seg in outline.segments() {
        if let Some(view) = viewbox
            && !rects_touch(ParamCurveExtrema::bounding_box(&seg), view)
        {
            continue;
        }
        best = best.min(seg.nearest(point, NEAREST_ACCURACY).distance_sq);
    }
    best.sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/geom/hit.rs"]
mod tests;

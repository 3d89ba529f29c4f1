use kurbo::{Affine, Point, Rect};

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Uniform scale factor of an affine map: `sqrt(|det|)`.
pub(crate) fn expansion(a: Affine) -> f64 {
    a.determinant().abs().sqrt()
}

/// Closed-interval overlap, so zero-area rectangles (axis-aligned segments) still count.
pub(crate) fn rects_touch(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

pub(crate) fn points_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    let mut r = Rect::from_points(*first, *first);
    for p in rest {
        r = r.union_pt(*p);
    }
    Some(r)
}

/// Degree-raise a quadratic to the cubic with the same trace.
pub(crate) fn quad_to_cubic(p0: Point, p1: Point, p2: Point) -> (Point, Point) {
    let b1 = p0 + (p1 - p0) * (2.0 / 3.0);
    let b2 = b1 + (p2 - p0) * (1.0 / 3.0);
    (b1, b2)
}

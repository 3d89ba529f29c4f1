use super::*;

#[test]
fn outward_rounding_floors_min_and_ceils_max() {
    let r = IntRect::from_rect_outward(Rect::new(0.2, -1.5, 9.1, 10.0));
    assert_eq!(r, IntRect::new(0, -2, 10, 10));
    assert_eq!(r.width(), 10);
    assert_eq!(r.height(), 12);
}

#[test]
fn outward_rounding_rejects_non_finite() {
    assert_eq!(
        IntRect::from_rect_outward(Rect::new(0.0, 0.0, f64::NAN, 1.0)),
        IntRect::EMPTY
    );
    assert_eq!(
        IntRect::from_rect_outward(Rect::new(0.0, 0.0, f64::INFINITY, 1.0)),
        IntRect::EMPTY
    );
}

#[test]
fn empty_is_union_identity_and_never_intersects() {
    let r = IntRect::new(1, 2, 3, 4);
    assert!(IntRect::EMPTY.is_empty());
    assert_eq!(IntRect::EMPTY.union(&r), r);
    assert_eq!(r.union(&IntRect::EMPTY), r);
    assert!(!IntRect::EMPTY.intersects(&r));
    assert_eq!(IntRect::EMPTY.width(), 0);
}

#[test]
fn intersect_is_half_open() {
    let a = IntRect::new(0, 0, 10, 10);
    let touching = IntRect::new(10, 0, 20, 10);
    let overlapping = IntRect::new(9, 9, 20, 20);
    assert!(!a.intersects(&touching));
    assert_eq!(a.intersect(&overlapping), IntRect::new(9, 9, 10, 10));
}

#[test]
fn expand_grows_and_shrinks() {
    let r = IntRect::new(0, 0, 4, 4);
    assert_eq!(r.expand(1), IntRect::new(-1, -1, 5, 5));
    assert_eq!(r.expand(-2), IntRect::EMPTY);
    assert_eq!(IntRect::EMPTY.expand(3), IntRect::EMPTY);
}

#[test]
fn contains_point_excludes_far_edges() {
    let r = IntRect::new(0, 0, 10, 10);
    assert!(r.contains_point(Point::new(0.0, 0.0)));
    assert!(r.contains_point(Point::new(9.99, 5.0)));
    assert!(!r.contains_point(Point::new(10.0, 5.0)));
}

#[test]
fn rgba_from_u32_and_premultiply() {
    let c = Rgba8::from_u32(0xff80_0080);
    assert_eq!(c, Rgba8::new(255, 128, 0, 128));
    assert_eq!(c.premultiplied(), [128, 64, 0, 128]);
    assert_eq!(Rgba8::BLACK.with_opacity(0.5).a, 128);
    assert!(Rgba8::BLACK.with_opacity(0.0).is_transparent());
}

#[test]
fn touches_counts_shared_edges() {
    let a = IntRect::new(0, 0, 10, 10);
    let b = IntRect::new(10, 0, 20, 10);
    assert!(!a.intersects(&b));
    assert!(a.touches(&b));
    assert!(!a.touches(&IntRect::new(11, 0, 20, 10)));
    assert!(!a.touches(&IntRect::EMPTY));
}

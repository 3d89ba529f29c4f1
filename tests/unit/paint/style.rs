use super::*;

#[test]
fn defaults_follow_svg() {
    let s = Style::default();
    assert_eq!(s.fill.kind(), PaintKind::Solid);
    assert_eq!(s.stroke.kind(), PaintKind::None);
    assert!(s.fill_visible());
    assert!(!s.stroke_visible());
    assert_eq!(s.line_join, LineJoin::Miter);
    assert_eq!(s.miter_limit, 4.0);
    s.validate().unwrap();
}

#[test]
fn fill_rules_cover_windings() {
    assert!(FillRule::NonZero.covers(1));
    assert!(FillRule::NonZero.covers(-2));
    assert!(!FillRule::NonZero.covers(0));
    assert!(FillRule::EvenOdd.covers(-1));
    assert!(!FillRule::EvenOdd.covers(2));
}

#[test]
fn json_style_parses_with_defaults() {
    let style = Style::from_json(
        r#"{
            "fill": {"type": "none"},
            "stroke": {"type": "solid", "color": {"r": 255, "g": 0, "b": 0, "a": 255}},
            "stroke_width": 3.0,
            "line_join": "bevel"
        }"#,
    )
    .unwrap();
    assert!(!style.fill_visible());
    assert!(style.stroke_visible());
    assert_eq!(style.stroke_width, 3.0);
    assert_eq!(style.line_join, LineJoin::Bevel);
    assert_eq!(style.miter_limit, 4.0);
}

#[test]
fn gradient_and_pattern_kinds() {
    let style = Style::from_json(
        r#"{
            "fill": {"type": "linear_gradient",
                     "start": {"x": 0.0, "y": 0.0}, "end": {"x": 1.0, "y": 0.0},
                     "stops": [{"offset": 0.0, "color": {"r": 0, "g": 0, "b": 0, "a": 255}}]},
            "stroke": {"type": "pattern",
                       "tile": {"x0": 0.0, "y0": 0.0, "x1": 4.0, "y1": 4.0},
                       "content": [],
                       "color": {"r": 0, "g": 0, "b": 255, "a": 255}}
        }"#,
    )
    .unwrap();
    assert_eq!(style.fill.kind(), PaintKind::Gradient);
    assert_eq!(style.stroke.kind(), PaintKind::Pattern);
    let Paint::LinearGradient { units, .. } = &style.fill else {
        panic!("expected linear gradient");
    };
    assert_eq!(*units, GradientUnits::ObjectBoundingBox);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(Style::from_json(r#"{"stroke_width": -1.0}"#).is_err());
    assert!(Style::from_json(r#"{"miter_limit": 0.5}"#).is_err());
    assert!(Style::from_json(r#"{"opacity": 2.0}"#).is_err());
    assert!(Style::from_json(r#"{"dash_array": [1.0, -2.0]}"#).is_err());
    let unknown = Style::from_json(r#"{"colour": "red"}"#).unwrap_err();
    assert!(unknown.to_string().contains("serialization error"));
}

#[test]
fn transparent_channels_are_invisible() {
    let s = Style::default()
        .with_stroke(Paint::solid(Rgba8::BLACK), 2.0)
        .with_fill_opacity(0.0)
        .with_stroke_opacity(0.0005);
    assert!(!s.fill_visible());
    assert!(!s.stroke_visible());
}

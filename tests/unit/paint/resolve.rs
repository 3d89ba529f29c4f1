use super::*;
use crate::foundation::core::{Point, Vec2};
use crate::geom::path::Subpath;
use crate::render::recording::{DrawCommand, RecordingContext};

fn stops() -> Vec<GradientStop> {
    vec![
        GradientStop {
            offset: 0.0,
            color: Rgba8::new(255, 0, 0, 255),
        },
        GradientStop {
            offset: 1.0,
            color: Rgba8::new(0, 0, 255, 255),
        },
    ]
}

#[test]
fn solid_fill_applies_opacity() {
    let style = Arc::new(Style::default().with_fill_opacity(0.5));
    let mut paint = StylePaint::new(style, Affine::IDENTITY);
    let mut ctx = RecordingContext::new();
    assert!(paint.prepare_fill(&mut ctx, DEFAULT_PAINT_BOX));
    assert!(!paint.prepare_stroke(&mut ctx, DEFAULT_PAINT_BOX));
    paint.apply_fill(&mut ctx);
    paint.apply_stroke(&mut ctx);
    assert_eq!(
        ctx.commands(),
        &[DrawCommand::SetSource(PaintSource::Solid(Rgba8::new(
            0, 0, 0, 128
        )))]
    );
}

#[test]
fn bounding_box_gradient_maps_through_paint_box_and_ctm() {
    let style = Arc::new(Style::default().with_fill(Paint::LinearGradient {
        start: Point::new(0.0, 0.0),
        end: Point::new(1.0, 0.0),
        stops: stops(),
        units: GradientUnits::ObjectBoundingBox,
    }));
    let ctm = Affine::translate((5.0, 0.0));
    let mut paint = StylePaint::new(style, ctm);
    let mut ctx = RecordingContext::new();
    let pbox = Rect::new(10.0, 20.0, 30.0, 60.0);
    assert!(paint.prepare_fill(&mut ctx, pbox));
    paint.apply_fill(&mut ctx);
    let [DrawCommand::SetSource(PaintSource::Linear { transform, .. })] = ctx.commands() else {
        panic!("unexpected commands {:?}", ctx.commands());
    };
    assert_eq!(*transform * Point::new(1.0, 1.0), Point::new(35.0, 60.0));
}

#[test]
fn user_space_radial_ignores_paint_box() {
    let paint = Paint::RadialGradient {
        center: Point::new(4.0, 4.0),
        radius: 2.0,
        stops: stops(),
        units: GradientUnits::UserSpaceOnUse,
    };
    let mut ctx = RecordingContext::new();
    let src = resolve_paint(
        &paint,
        1.0,
        Rect::new(0.0, 0.0, 100.0, 100.0),
        Affine::IDENTITY,
        &mut ctx,
    )
    .unwrap();
    let PaintSource::Radial { transform, .. } = src else {
        panic!("expected radial");
    };
    assert_eq!(transform, Affine::IDENTITY);
}

#[test]
fn gradients_without_stops_paint_nothing() {
    let paint = Paint::LinearGradient {
        start: Point::ZERO,
        end: Point::new(1.0, 0.0),
        stops: Vec::new(),
        units: GradientUnits::default(),
    };
    let mut ctx = RecordingContext::new();
    assert!(resolve_paint(&paint, 1.0, DEFAULT_PAINT_BOX, Affine::IDENTITY, &mut ctx).is_none());
}

#[test]
fn pattern_rasterizes_tile_through_live_context() {
    let paint = Paint::Pattern {
        tile: Rect::new(0.0, 0.0, 4.0, 4.0),
        content: PathVector::rect(Rect::new(0.0, 0.0, 2.0, 2.0)),
        color: Rgba8::BLACK,
    };
    let mut ctx = RecordingContext::new();
    let src = resolve_paint(&paint, 1.0, DEFAULT_PAINT_BOX, Affine::scale(2.0), &mut ctx).unwrap();
    let PaintSource::Image { tile, transform } = src else {
        panic!("expected image paint");
    };
    assert_eq!((tile.width, tile.height), (8, 8));
    assert_eq!(transform * Point::new(8.0, 8.0), Point::new(8.0, 8.0));
    let [DrawCommand::RasterizeTile { drawn, .. }] = ctx.commands() else {
        panic!("expected one tile");
    };
    assert!(drawn.contains(&DrawCommand::Fill));
    assert!(drawn.contains(&DrawCommand::LineTo(Point::new(4.0, 4.0))));
}

#[test]
fn failed_tile_allocation_means_no_paint() {
    let style = Arc::new(
        Style::default().with_stroke(
            Paint::Pattern {
                tile: Rect::new(0.0, 0.0, 4.0, 4.0),
                content: PathVector::from_subpaths(vec![
                    Subpath::new((0.0, 0.0)).arc_to(Vec2::new(2.0, 2.0), 0.0, false, true, (4.0, 0.0)),
                ]),
                color: Rgba8::BLACK,
            },
            1.0,
        ),
    );
    let mut paint = StylePaint::new(style, Affine::IDENTITY);
    let mut ctx = RecordingContext::new().with_failing_tiles(true);
    assert!(paint.prepare_fill(&mut ctx, DEFAULT_PAINT_BOX));
    assert!(!paint.prepare_stroke(&mut ctx, DEFAULT_PAINT_BOX));
}

#[test]
fn empty_paint_boxes_fall_back_to_default() {
    assert_eq!(effective_paint_box(None), DEFAULT_PAINT_BOX);
    assert_eq!(
        effective_paint_box(Some(Rect::new(5.0, 5.0, 5.0, 9.0))),
        DEFAULT_PAINT_BOX
    );
    let r = Rect::new(1.0, 2.0, 3.0, 4.0);
    assert_eq!(effective_paint_box(Some(r)), r);
}

use super::*;
use crate::foundation::core::Rgba8;

#[test]
fn records_calls_in_order() {
    let mut ctx = RecordingContext::new();
    ctx.new_path();
    ctx.move_to(Point::new(0.0, 0.0));
    ctx.line_to(Point::new(1.0, 0.0));
    ctx.set_source(&PaintSource::Solid(Rgba8::BLACK));
    ctx.fill();
    assert_eq!(
        ctx.commands(),
        &[
            DrawCommand::NewPath,
            DrawCommand::MoveTo(Point::new(0.0, 0.0)),
            DrawCommand::LineTo(Point::new(1.0, 0.0)),
            DrawCommand::SetSource(PaintSource::Solid(Rgba8::BLACK)),
            DrawCommand::Fill,
        ]
    );
    assert_eq!(ctx.paint_ops(), 1);
    assert_eq!(ctx.take_commands().len(), 5);
    assert!(ctx.commands().is_empty());
}

#[test]
fn failing_layers_push_nothing() {
    let mut ctx = RecordingContext::new().with_failing_layers(true);
    assert!(!ctx.push_opacity_layer(0.5));
    assert!(!ctx.push_clip());
    assert!(ctx.commands().is_empty());
}

#[test]
fn tiles_capture_nested_drawing() {
    let mut ctx = RecordingContext::new();
    let tile = ctx
        .rasterize_tile(2, 3, &mut |inner: &mut dyn DrawContext| inner.fill())
        .unwrap();
    assert_eq!(tile.data.len(), 2 * 3 * 4);
    assert_eq!(
        ctx.commands(),
        &[DrawCommand::RasterizeTile {
            width: 2,
            height: 3,
            drawn: vec![DrawCommand::Fill],
        }]
    );

    let mut failing = RecordingContext::new().with_failing_tiles(true);
    assert!(
        failing
            .rasterize_tile(2, 2, &mut |inner: &mut dyn DrawContext| inner.fill())
            .is_none()
    );
}

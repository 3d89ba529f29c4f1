use super::*;
use crate::foundation::core::Rect;
use crate::geom::path::PathVector;
use crate::paint::style::{Paint, Style};

fn scene(arena: &mut Arena, r: Rect, style: Style) -> ItemId {
    let s = arena.create_shape();
    arena
        .set_path(s, Some(Arc::new(PathVector::rect(r))))
        .unwrap();
    arena.set_style(s, Some(Arc::new(style))).unwrap();
    s
}

#[test]
fn black_square_fills_its_pixels() {
    let mut arena = Arena::new();
    let s = scene(&mut arena, Rect::new(0.0, 0.0, 10.0, 10.0), Style::default());
    let mut renderer = CpuRenderer::default();
    let (frame, state) = renderer
        .render(&mut arena, s, IntRect::new(0, 0, 20, 20), RenderFlags::empty())
        .unwrap();
    assert_eq!(state, ItemState::ALL);
    assert_eq!((frame.width, frame.height), (20, 20));
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(5, 5), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(15, 15), Some([0, 0, 0, 0]));
}

#[test]
fn area_origin_shifts_the_frame() {
    let mut arena = Arena::new();
    let s = scene(
        &mut arena,
        Rect::new(100.0, 100.0, 110.0, 110.0),
        Style::default().with_fill(Paint::solid(Rgba8::new(255, 0, 0, 255))),
    );
    let mut renderer = CpuRenderer::default();
    let (frame, _) = renderer
        .render(
            &mut arena,
            s,
            IntRect::new(95, 95, 115, 115),
            RenderFlags::empty(),
        )
        .unwrap();
    assert_eq!(frame.pixel(10, 10), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(2, 2), Some([0, 0, 0, 0]));
}

#[test]
fn clear_color_shows_behind_the_scene() {
    let mut arena = Arena::new();
    let s = scene(&mut arena, Rect::new(0.0, 0.0, 10.0, 10.0), Style::default());
    let mut renderer =
        CpuRenderer::new(CpuRendererOpts::default().with_clear_rgba(Some([255, 255, 255, 255])));
    let (frame, _) = renderer
        .render(&mut arena, s, IntRect::new(0, 0, 20, 20), RenderFlags::empty())
        .unwrap();
    assert_eq!(frame.pixel(15, 15), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(5, 5), Some([0, 0, 0, 255]));
}

#[test]
fn item_opacity_composites_through_a_layer() {
    let mut arena = Arena::new();
    let s = scene(&mut arena, Rect::new(0.0, 0.0, 10.0, 10.0), Style::default());
    arena.set_opacity(s, 0.5).unwrap();
    let mut renderer = CpuRenderer::default();
    let (frame, _) = renderer
        .render(&mut arena, s, IntRect::new(0, 0, 10, 10), RenderFlags::empty())
        .unwrap();
    let [_, _, _, a] = frame.pixel(5, 5).unwrap();
    assert!((126..=129).contains(&a), "alpha {a}");
}

#[test]
fn context_is_reused_between_frames() {
    let mut arena = Arena::new();
    let s = scene(&mut arena, Rect::new(0.0, 0.0, 10.0, 10.0), Style::default());
    let mut renderer = CpuRenderer::default();
    let area = IntRect::new(0, 0, 20, 20);
    let (first, _) = renderer
        .render(&mut arena, s, area, RenderFlags::empty())
        .unwrap();
    arena
        .set_transform(s, Some(Affine::translate((10.0, 10.0))))
        .unwrap();
    let (second, _) = renderer
        .render(&mut arena, s, area, RenderFlags::empty())
        .unwrap();
    assert_eq!(first.pixel(5, 5), Some([0, 0, 0, 255]));
    assert_eq!(second.pixel(5, 5), Some([0, 0, 0, 0]));
    assert_eq!(second.pixel(15, 15), Some([0, 0, 0, 255]));
}

#[test]
fn bad_areas_and_ids_are_rejected() {
    let mut arena = Arena::new();
    let s = scene(&mut arena, Rect::new(0.0, 0.0, 10.0, 10.0), Style::default());
    let mut renderer = CpuRenderer::default();
    assert!(matches!(
        renderer.render(&mut arena, s, IntRect::EMPTY, RenderFlags::empty()),
        Err(ArenaError::Render(_))
    ));
    assert!(matches!(
        renderer.render(
            &mut arena,
            s,
            IntRect::new(0, 0, 70_000, 10),
            RenderFlags::empty()
        ),
        Err(ArenaError::Render(_))
    ));
    arena.release(s).unwrap();
    assert!(matches!(
        renderer.render(&mut arena, s, IntRect::new(0, 0, 10, 10), RenderFlags::empty()),
        Err(ArenaError::UnknownItem(_))
    ));
}

#[test]
fn tiles_rasterize_nested_drawing() {
    let mut ctx = vello_cpu::RenderContext::new(4, 4);
    let mut dc = CpuDrawContext::new(&mut ctx, Vec2::ZERO);
    let tile = dc
        .rasterize_tile(4, 4, &mut |inner: &mut dyn DrawContext| {
            inner.new_path();
            inner.move_to(Point::new(0.0, 0.0));
            inner.line_to(Point::new(4.0, 0.0));
            inner.line_to(Point::new(4.0, 2.0));
            inner.line_to(Point::new(0.0, 2.0));
            inner.set_source(&PaintSource::Solid(Rgba8::new(0, 0, 255, 255)));
            inner.fill();
        })
        .unwrap();
    assert_eq!((tile.width, tile.height), (4, 4));
    assert_eq!(&tile.data[0..4], &[0, 0, 255, 255]);
    let bottom = ((3 * 4) + 1) * 4;
    assert_eq!(&tile.data[bottom..bottom + 4], &[0, 0, 0, 0]);
    assert!(dc.rasterize_tile(0, 4, &mut |_| {}).is_none());
}

use super::*;
use crate::display::state::RenderFlags;
use crate::foundation::core::{Affine, Rect, Rgba8};
use crate::paint::style::{LineJoin, Paint};
use crate::render::recording::{DrawCommand, RecordingContext};

fn font() -> Arc<dyn GlyphOutlines> {
    Arc::new(
        OutlineFont::new()
            .with_glyph(1, PathVector::rect(Rect::new(0.0, 0.0, 8.0, 10.0)))
            .with_glyph(2, PathVector::rect(Rect::new(0.0, 0.0, 4.0, 10.0))),
    )
}

/// A glyphs group showing glyph 1 at x = 0 and glyph 2 at x = 20.
fn word(arena: &mut Arena, style: Style) -> (ItemId, ItemId, ItemId) {
    let group = arena.create_glyphs_group();
    arena.set_style(group, Some(Arc::new(style))).unwrap();
    let f = font();
    let a = arena.create_glyph();
    arena
        .set_glyph(a, Some(Arc::clone(&f)), 1, Affine::IDENTITY)
        .unwrap();
    let b = arena.create_glyph();
    arena
        .set_glyph(b, Some(f), 2, Affine::translate((20.0, 0.0)))
        .unwrap();
    arena.append_child(group, a).unwrap();
    arena.append_child(group, b).unwrap();
    (group, a, b)
}

fn update_all(arena: &mut Arena, id: ItemId) -> ItemState {
    arena.update(
        id,
        None,
        &GraphicsContext::identity(),
        ItemState::ALL,
        ItemState::NONE,
    )
}

#[test]
fn outline_font_lookup() {
    let f = OutlineFont::new().with_glyph(3, PathVector::rect(Rect::new(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(f.len(), 1);
    assert!(!f.is_empty());
    assert!(f.path_vector(3).is_some());
    assert!(f.path_vector(4).is_none());
}

#[test]
fn group_bbox_covers_every_glyph() {
    let mut arena = Arena::new();
    let (group, a, b) = word(&mut arena, Style::default());
    assert_eq!(update_all(&mut arena, group), ItemState::ALL);
    assert_eq!(arena.bbox(a), Some(IntRect::new(0, 0, 8, 10)));
    assert_eq!(arena.bbox(b), Some(IntRect::new(20, 0, 24, 10)));
    assert_eq!(arena.bbox(group), Some(IntRect::new(0, 0, 24, 10)));
}

#[test]
fn group_stroke_pads_glyph_boxes() {
    let mut arena = Arena::new();
    let style = Style::default()
        .with_stroke(Paint::solid(Rgba8::BLACK), 2.0)
        .with_line_join(LineJoin::Round, 4.0);
    let (group, a, _) = word(&mut arena, style);
    update_all(&mut arena, group);
    assert_eq!(arena.bbox(a), Some(IntRect::new(-1, -1, 9, 11)));

    // restyling the group reaches every glyph
    arena
        .set_style(group, Some(Arc::new(Style::default())))
        .unwrap();
    assert_eq!(arena.state(a), Some(ItemState::ALL));
    update_all(&mut arena, group);
    assert_eq!(arena.bbox(a), Some(IntRect::new(0, 0, 8, 10)));
}

#[test]
fn unknown_glyphs_are_empty() {
    let mut arena = Arena::new();
    let group = arena.create_glyphs_group();
    let g = arena.create_glyph();
    arena.set_glyph(g, Some(font()), 99, Affine::IDENTITY).unwrap();
    arena.append_child(group, g).unwrap();
    assert_eq!(update_all(&mut arena, group), ItemState::ALL);
    assert_eq!(arena.bbox(g), Some(IntRect::EMPTY));
}

#[test]
fn glyphs_draw_with_one_fill_and_one_stroke() {
    let mut arena = Arena::new();
    let style = Style::default().with_stroke(Paint::solid(Rgba8::new(255, 0, 0, 255)), 1.0);
    let (group, _, _) = word(&mut arena, style);
    update_all(&mut arena, group);

    let mut ctx = RecordingContext::new();
    let state = arena.render(&mut ctx, group, IntRect::new(-10, -10, 40, 20), RenderFlags::empty());
    assert_eq!(state, ItemState::ALL);
    assert_eq!(ctx.count(&DrawCommand::Fill), 1);
    assert_eq!(ctx.count(&DrawCommand::Stroke), 1);
    // both glyph outlines are in the filled path
    let fill_at = ctx
        .commands()
        .iter()
        .position(|c| *c == DrawCommand::Fill)
        .unwrap();
    let moves = ctx.commands()[..fill_at]
        .iter()
        .filter(|c| matches!(c, DrawCommand::MoveTo(_)))
        .count();
    assert_eq!(moves, 2);
}

#[test]
fn hidden_glyphs_are_left_out() {
    let mut arena = Arena::new();
    let (group, _, b) = word(&mut arena, Style::default());
    arena.set_visible(b, false).unwrap();
    update_all(&mut arena, group);
    assert_eq!(arena.bbox(group), Some(IntRect::new(0, 0, 8, 10)));

    let mut ctx = RecordingContext::new();
    arena.render(&mut ctx, group, IntRect::new(0, 0, 40, 20), RenderFlags::empty());
    assert_eq!(
        ctx.commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::MoveTo(_)))
            .count(),
        1
    );
}

#[test]
fn glyphs_groups_pick_as_a_whole() {
    let mut arena = Arena::new();
    let (group, _, b) = word(&mut arena, Style::default());
    update_all(&mut arena, group);
    assert_eq!(arena.pick(group, Point::new(22.0, 5.0), 0.0, false), Some(group));
    assert_eq!(arena.pick(group, Point::new(14.0, 5.0), 0.0, false), None);
    assert_eq!(arena.pick(b, Point::new(22.0, 5.0), 0.0, false), Some(b));
}

#[test]
fn unstyled_or_fontless_glyphs_are_not_picked() {
    let mut arena = Arena::new();
    let (group, a, b) = word(&mut arena, Style::default());
    arena.set_style(group, None).unwrap();
    update_all(&mut arena, group);
    assert_eq!(arena.pick(group, Point::new(2.0, 5.0), 0.0, false), None);
    assert_eq!(arena.pick(a, Point::new(2.0, 5.0), 0.0, false), None);

    arena
        .set_style(group, Some(Arc::new(Style::default())))
        .unwrap();
    update_all(&mut arena, group);
    assert_eq!(arena.pick(a, Point::new(2.0, 5.0), 0.0, false), Some(a));

    arena.set_glyph(b, None, 2, Affine::translate((20.0, 0.0))).unwrap();
    update_all(&mut arena, group);
    assert_eq!(arena.pick(group, Point::new(22.0, 5.0), 0.0, false), None);
}

#[test]
fn glyphs_clip_with_their_union() {
    let mut arena = Arena::new();
    let (group, a, _) = word(&mut arena, Style::default());
    update_all(&mut arena, group);

    let mut ctx = RecordingContext::new();
    arena.clip(&mut ctx, group, IntRect::new(0, 0, 40, 20));
    assert_eq!(ctx.count(&DrawCommand::ClipFill), 1);

    let mut ctx = RecordingContext::new();
    arena.clip(&mut ctx, a, IntRect::new(0, 0, 40, 20));
    assert_eq!(ctx.count(&DrawCommand::ClipFill), 1);
    assert_eq!(ctx.count(&DrawCommand::SetFillRule(FillRule::NonZero)), 1);
}

#[test]
fn outline_mode_strokes_the_union() {
    let mut arena = Arena::new();
    let (group, _, _) = word(&mut arena, Style::default());
    arena.set_render_mode(RenderMode::Outline);
    update_all(&mut arena, group);

    let mut ctx = RecordingContext::new();
    arena.render(&mut ctx, group, IntRect::new(-10, -10, 40, 20), RenderFlags::empty());
    assert_eq!(ctx.count(&DrawCommand::Stroke), 1);
    assert_eq!(ctx.count(&DrawCommand::Fill), 0);
    assert!(
        ctx.commands()
            .contains(&DrawCommand::SetSource(PaintSource::Solid(Rgba8::BLACK)))
    );
}

use std::sync::Arc;

use vector_arena::{
    Affine, Arena, CpuRenderer, GraphicsContext, IntRect, ItemState, PathVector, Point,
    RenderFlags, Style,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut arena = Arena::new();
    let root = arena.create_group();
    arena.set_root(Some(root))?;
    arena.set_group_transparent(root, true)?;

    let style = Arc::new(Style::from_json(
        r#"{
            "fill": { "type": "solid", "color": { "r": 30, "g": 120, "b": 200, "a": 255 } },
            "stroke": { "type": "solid", "color": { "r": 0, "g": 0, "b": 0, "a": 255 } },
            "stroke_width": 2.0,
            "line_join": "round"
        }"#,
    )?);
    let wave = Arc::new(PathVector::from_svg(
        "M 10 50 C 30 10 50 10 70 50 S 110 90 130 50 L 130 90 L 10 90 Z",
    )?);
    for i in 0..3 {
        let s = arena.create_shape();
        arena.set_path(s, Some(Arc::clone(&wave)))?;
        arena.set_style(s, Some(Arc::clone(&style)))?;
        arena.set_transform(s, Some(Affine::translate((0.0, f64::from(i) * 20.0))))?;
        arena.append_child(root, s)?;
        arena.release(s)?;
    }

    let area = IntRect::new(0, 0, 140, 150);
    let state = arena.update(
        root,
        Some(area),
        &GraphicsContext::identity(),
        ItemState::ALL,
        ItemState::NONE,
    );
    println!("update: {state:?}, bbox {:?}", arena.bbox(root));

    let mut renderer = CpuRenderer::default();
    let (frame, state) = renderer.render(&mut arena, root, area, RenderFlags::empty())?;
    let covered = frame.data.chunks_exact(4).filter(|px| px[3] > 0).count();
    println!(
        "render: {state:?}, {}x{} frame, {covered} covered pixels",
        frame.width, frame.height
    );

    for p in [Point::new(70.0, 80.0), Point::new(135.0, 5.0)] {
        println!("pick {p:?} -> {:?}", arena.pick(root, p, 1.0, false));
    }
    println!("{:?}", arena.stats());

    Ok(())
}

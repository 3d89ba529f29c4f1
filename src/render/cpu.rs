//! `vello_cpu` rasterizer behind the [`DrawContext`] seam.
//!
//! Paths arrive in device coordinates; a [`CpuDrawContext`] shifts them by the origin of the
//! rendered area so the pixmap covers exactly that area.

use std::sync::Arc;

use crate::display::arena::Arena;
use crate::display::gc::GraphicsContext;
use crate::display::item::ItemId;
use crate::display::state::{ItemState, RenderFlags};
use crate::foundation::core::{Affine, IntRect, Point, Rgba8, Vec2};
use crate::foundation::error::{ArenaError, ArenaResult};
use crate::geom::feed::PathSink;
use crate::paint::style::{FillRule, GradientStop, LineCap, LineJoin};
use crate::render::backend::{DrawContext, FrameRGBA, PaintSource, StrokeStyle, TileImage};

/// Options for [`CpuRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuRendererOpts {
    pub(crate) clear_rgba: Option<[u8; 4]>,
}

impl CpuRendererOpts {
    /// Return options with a straight-alpha clear color painted under every frame.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }
}

/// Renders an arena subtree into premultiplied RGBA8 frames.
///
/// The `vello_cpu` context is kept between frames of the same size.
pub struct CpuRenderer {
    opts: CpuRendererOpts,
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("opts", &self.opts)
            .field("cached_ctx", &self.ctx.is_some())
            .finish()
    }
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new(CpuRendererOpts::default())
    }
}

impl CpuRenderer {
    /// Renderer without a cached context; the first frame allocates one.
    pub fn new(opts: CpuRendererOpts) -> Self {
        Self { opts, ctx: None }
    }

    /// Update `root` for `area` and draw it.
    ///
    /// The returned state is the render traversal's result; it contains `INVALID` when some
    /// item could not be drawn. The frame is produced either way.
    #[tracing::instrument(skip(self, arena))]
    pub fn render(
        &mut self,
        arena: &mut Arena,
        root: ItemId,
        area: IntRect,
        flags: RenderFlags,
    ) -> ArenaResult<(FrameRGBA, ItemState)> {
        if area.is_empty() {
            return Err(ArenaError::render("render area is empty"));
        }
        let width: u16 = area
            .width()
            .try_into()
            .map_err(|_| ArenaError::render("render width exceeds u16"))?;
        let height: u16 = area
            .height()
            .try_into()
            .map_err(|_| ArenaError::render("render height exceeds u16"))?;
        if !arena.contains(root) {
            return Err(ArenaError::UnknownItem(root));
        }

        let clear = self.opts.clear_rgba;
        self.with_ctx_mut(width, height, |_, ctx| {
            if let Some([r, g, b, a]) = clear {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(width),
                    f64::from(height),
                ));
            }

            arena.update(
                root,
                Some(area),
                &GraphicsContext::identity(),
                ItemState::ALL,
                ItemState::NONE,
            );
            let state = {
                let mut dc =
                    CpuDrawContext::new(ctx, Vec2::new(f64::from(area.x0), f64::from(area.y0)));
                arena.render(&mut dc, root, area, flags)
            };
            if state.contains(ItemState::INVALID) {
                tracing::warn!(?root, ?state, "render traversal reported invalid items");
            }

            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            let frame = FrameRGBA {
                width: u32::from(width),
                height: u32::from(height),
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            };
            Ok((frame, state))
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> ArenaResult<R>,
    ) -> ArenaResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

/// [`DrawContext`] drawing into a `vello_cpu` render context.
pub struct CpuDrawContext<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    origin: Vec2,
    path: vello_cpu::kurbo::BezPath,
    fill_rule: FillRule,
    clip: vello_cpu::kurbo::BezPath,
    clip_rule: FillRule,
}

impl<'a> CpuDrawContext<'a> {
    /// Wrap `ctx`, whose pixel `(0, 0)` shows device point `origin`.
    pub fn new(ctx: &'a mut vello_cpu::RenderContext, origin: Vec2) -> Self {
        ctx.set_transform(affine_to_cpu(Affine::translate(-origin)));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_fill_rule(fill_to_cpu(FillRule::NonZero));
        Self {
            ctx,
            origin,
            path: vello_cpu::kurbo::BezPath::new(),
            fill_rule: FillRule::NonZero,
            clip: vello_cpu::kurbo::BezPath::new(),
            clip_rule: FillRule::NonZero,
        }
    }
}

impl PathSink for CpuDrawContext<'_> {
    fn move_to(&mut self, p: Point) {
        self.path.move_to(point_to_cpu(p));
    }

    fn line_to(&mut self, p: Point) {
        self.path.line_to(point_to_cpu(p));
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.path
            .curve_to(point_to_cpu(c1), point_to_cpu(c2), point_to_cpu(p));
    }
}

impl DrawContext for CpuDrawContext<'_> {
    fn new_path(&mut self) {
        self.path.truncate(0);
    }

    // vello_cpu flattens at its own fixed tolerance.
    fn set_tolerance(&mut self, _tolerance: f64) {}

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.ctx.set_stroke(stroke_to_cpu(style));
    }

    fn set_source(&mut self, source: &PaintSource) {
        match source {
            PaintSource::Solid(c) => {
                self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                self.ctx.set_paint(color_to_cpu(*c));
            }
            PaintSource::Linear {
                start,
                end,
                stops,
                transform,
            } => {
                let gradient =
                    vello_cpu::peniko::Gradient::new_linear(point_to_cpu(*start), point_to_cpu(*end))
                        .with_stops(stops_to_cpu(stops).as_slice());
                self.ctx.set_paint_transform(affine_to_cpu(*transform));
                self.ctx.set_paint(gradient);
            }
            PaintSource::Radial {
                center,
                radius,
                stops,
                transform,
            } => {
                let gradient =
                    vello_cpu::peniko::Gradient::new_radial(point_to_cpu(*center), *radius as f32)
                        .with_stops(stops_to_cpu(stops).as_slice());
                self.ctx.set_paint_transform(affine_to_cpu(*transform));
                self.ctx.set_paint(gradient);
            }
            PaintSource::Image { tile, transform } => match tile_to_image(tile) {
                Some(image) => {
                    self.ctx.set_paint_transform(affine_to_cpu(*transform));
                    self.ctx.set_paint(image);
                }
                None => {
                    tracing::warn!(
                        width = tile.width,
                        height = tile.height,
                        "pattern tile cannot be used as paint"
                    );
                    self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    self.ctx.set_paint(color_to_cpu(Rgba8::TRANSPARENT));
                }
            },
        }
    }

    fn fill(&mut self) {
        self.ctx.set_fill_rule(fill_to_cpu(self.fill_rule));
        self.ctx.fill_path(&self.path);
    }

    fn stroke(&mut self) {
        self.ctx.stroke_path(&self.path);
    }

    fn begin_clip(&mut self) {
        self.clip.truncate(0);
        self.clip_rule = FillRule::NonZero;
    }

    fn clip_fill(&mut self) {
        self.clip.extend(self.path.elements().iter().copied());
        self.clip_rule = self.fill_rule;
    }

    fn push_clip(&mut self) -> bool {
        self.ctx.set_fill_rule(fill_to_cpu(self.clip_rule));
        self.ctx.push_clip_layer(&self.clip);
        true
    }

    fn push_mask(&mut self, draw: &mut dyn FnMut(&mut dyn DrawContext) -> bool) -> bool {
        let (w, h) = (self.ctx.width(), self.ctx.height());
        let mut mask_ctx = vello_cpu::RenderContext::new(w, h);
        let drawn = {
            let mut nested = CpuDrawContext::new(&mut mask_ctx, self.origin);
            draw(&mut nested)
        };
        if !drawn {
            return false;
        }
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        mask_ctx.flush();
        mask_ctx.render_to_pixmap(&mut pixmap);
        self.ctx
            .push_mask_layer(vello_cpu::Mask::new_luminance(&pixmap));
        true
    }

    fn push_opacity_layer(&mut self, opacity: f32) -> bool {
        self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
        true
    }

    fn pop_layer(&mut self) {
        self.ctx.pop_layer();
    }

    fn rasterize_tile(
        &mut self,
        width: u32,
        height: u32,
        draw: &mut dyn FnMut(&mut dyn DrawContext),
    ) -> Option<TileImage> {
        let w: u16 = width.try_into().ok().filter(|w| *w > 0)?;
        let h: u16 = height.try_into().ok().filter(|h| *h > 0)?;
        let mut tile_ctx = vello_cpu::RenderContext::new(w, h);
        {
            let mut nested = CpuDrawContext::new(&mut tile_ctx, Vec2::ZERO);
            draw(&mut nested);
        }
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        tile_ctx.flush();
        tile_ctx.render_to_pixmap(&mut pixmap);
        Some(TileImage {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn fill_to_cpu(rule: FillRule) -> vello_cpu::peniko::Fill {
    match rule {
        FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
        FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
    }
}

fn stops_to_cpu(stops: &[GradientStop]) -> Vec<vello_cpu::peniko::ColorStop> {
    stops
        .iter()
        .map(|s| vello_cpu::peniko::ColorStop::from((s.offset, color_to_cpu(s.color))))
        .collect()
}

fn stroke_to_cpu(style: &StrokeStyle) -> vello_cpu::kurbo::Stroke {
    let cap = match style.cap {
        LineCap::Butt => vello_cpu::kurbo::Cap::Butt,
        LineCap::Round => vello_cpu::kurbo::Cap::Round,
        LineCap::Square => vello_cpu::kurbo::Cap::Square,
    };
    let join = match style.join {
        LineJoin::Miter => vello_cpu::kurbo::Join::Miter,
        LineJoin::Round => vello_cpu::kurbo::Join::Round,
        LineJoin::Bevel => vello_cpu::kurbo::Join::Bevel,
    };
    let stroke = vello_cpu::kurbo::Stroke::new(style.width)
        .with_caps(cap)
        .with_join(join)
        .with_miter_limit(style.miter_limit);
    if style.dash_array.iter().any(|d| *d > 0.0) {
        stroke.with_dashes(style.dash_offset, style.dash_array.iter().copied())
    } else {
        stroke
    }
}

/// Repeating image paint over a premultiplied tile.
fn tile_to_image(tile: &Arc<TileImage>) -> Option<vello_cpu::Image> {
    let w: u16 = tile.width.try_into().ok()?;
    let h: u16 = tile.height.try_into().ok()?;
    if tile.data.len() != (tile.width as usize) * (tile.height as usize) * 4 {
        return None;
    }
    let pixels = tile
        .data
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Some(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler {
            x_extend: vello_cpu::peniko::Extend::Repeat,
            y_extend: vello_cpu::peniko::Extend::Repeat,
            ..vello_cpu::peniko::ImageSampler::default()
        },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

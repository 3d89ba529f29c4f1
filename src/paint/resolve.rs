use std::sync::Arc;

use crate::foundation::core::{Affine, Rect, Rgba8};
use crate::foundation::math::expansion;
use crate::geom::feed::feed_pathvector;
use crate::geom::path::PathVector;
use crate::paint::style::{FillRule, GradientStop, GradientUnits, Paint, Style};
use crate::render::backend::{DrawContext, PaintSource};

/// Largest off-screen pattern tile edge, in pixels.
const MAX_TILE_EDGE: f64 = 2048.0;

/// Paint box used when an item has none (or an empty one).
pub const DEFAULT_PAINT_BOX: Rect = Rect::new(0.0, 0.0, 256.0, 256.0);

/// Resolves fill and stroke paint against a live drawing context.
///
/// The four calls bracket every draw: `prepare_*` may allocate backend resources (gradients,
/// off-screen pattern tiles) and reports whether that channel has anything to paint; `apply_*`
/// installs the prepared paint as the context's current source.
pub trait PaintResolver {
    /// Prepare fill paint for `paint_box`. `false` means there is no fill to draw.
    fn prepare_fill(&mut self, ctx: &mut dyn DrawContext, paint_box: Rect) -> bool;
    /// Prepare stroke paint for `paint_box`. `false` means there is no stroke to draw.
    fn prepare_stroke(&mut self, ctx: &mut dyn DrawContext, paint_box: Rect) -> bool;
    /// Install the prepared fill paint.
    fn apply_fill(&mut self, ctx: &mut dyn DrawContext);
    /// Install the prepared stroke paint.
    fn apply_stroke(&mut self, ctx: &mut dyn DrawContext);
    /// Multiply `opacity` into the paint produced by the next `prepare_fill`/`prepare_stroke`
    /// pair. Returns `false` when the resolver cannot, in which case the caller composites
    /// through an opacity layer instead.
    fn fold_opacity(&mut self, _opacity: f32) -> bool {
        false
    }
}

/// Builds the resolver a shape or glyphs group uses for a style under a device transform.
pub type PaintFactory = Box<dyn Fn(&Arc<Style>, Affine) -> Box<dyn PaintResolver>>;

pub(crate) fn default_paint_factory() -> PaintFactory {
    Box::new(|style: &Arc<Style>, ctm: Affine| -> Box<dyn PaintResolver> {
        Box::new(StylePaint::new(Arc::clone(style), ctm))
    })
}

/// [`PaintResolver`] for [`Style`] snapshots.
#[derive(Debug)]
pub struct StylePaint {
    style: Arc<Style>,
    ctm: Affine,
    fill: Option<PaintSource>,
    stroke: Option<PaintSource>,
    folded: f32,
}

impl StylePaint {
    /// Resolver for `style` drawn under the user-to-device transform `ctm`.
    pub fn new(style: Arc<Style>, ctm: Affine) -> Self {
        Self {
            style,
            ctm,
            fill: None,
            stroke: None,
            folded: 1.0,
        }
    }
}

impl PaintResolver for StylePaint {
    fn prepare_fill(&mut self, ctx: &mut dyn DrawContext, paint_box: Rect) -> bool {
        self.fill = if self.style.fill_visible() {
            resolve_paint(
                &self.style.fill,
                self.style.fill_opacity * self.folded,
                paint_box,
                self.ctm,
                ctx,
            )
        } else {
            None
        };
        self.fill.is_some()
    }

    fn prepare_stroke(&mut self, ctx: &mut dyn DrawContext, paint_box: Rect) -> bool {
        self.stroke = if self.style.stroke_visible() {
            resolve_paint(
                &self.style.stroke,
                self.style.stroke_opacity * self.folded,
                paint_box,
                self.ctm,
                ctx,
            )
        } else {
            None
        };
        self.folded = 1.0;
        self.stroke.is_some()
    }

    fn apply_fill(&mut self, ctx: &mut dyn DrawContext) {
        if let Some(src) = &self.fill {
            ctx.set_source(src);
        }
    }

    fn apply_stroke(&mut self, ctx: &mut dyn DrawContext) {
        if let Some(src) = &self.stroke {
            ctx.set_source(src);
        }
    }

    fn fold_opacity(&mut self, opacity: f32) -> bool {
        self.folded = opacity.clamp(0.0, 1.0);
        true
    }
}

/// Paint box to use for paint resolution: `pbox` if it has area, the default box otherwise.
pub fn effective_paint_box(pbox: Option<Rect>) -> Rect {
    match pbox {
        Some(r) if r.width() > 0.0 && r.height() > 0.0 && r.is_finite() => r,
        _ => DEFAULT_PAINT_BOX,
    }
}

pub(crate) fn resolve_paint(
    paint: &Paint,
    opacity: f32,
    paint_box: Rect,
    ctm: Affine,
    ctx: &mut dyn DrawContext,
) -> Option<PaintSource> {
    match paint {
        Paint::None => None,
        Paint::Solid { color } => {
            let c = color.with_opacity(opacity);
            (!c.is_transparent()).then_some(PaintSource::Solid(c))
        }
        Paint::LinearGradient {
            start,
            end,
            stops,
            units,
        } => {
            if stops.is_empty() {
                return None;
            }
            Some(PaintSource::Linear {
                start: *start,
                end: *end,
                stops: faded(stops, opacity),
                transform: ctm * units_transform(*units, paint_box),
            })
        }
        Paint::RadialGradient {
            center,
            radius,
            stops,
            units,
        } => {
            if stops.is_empty() || *radius <= 0.0 {
                return None;
            }
            Some(PaintSource::Radial {
                center: *center,
                radius: *radius,
                stops: faded(stops, opacity),
                transform: ctm * units_transform(*units, paint_box),
            })
        }
        Paint::Pattern {
            tile,
            content,
            color,
        } => rasterize_pattern(*tile, content, color.with_opacity(opacity), ctm, ctx),
    }
}

fn faded(stops: &[GradientStop], opacity: f32) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|s| GradientStop {
            offset: s.offset.clamp(0.0, 1.0),
            color: s.color.with_opacity(opacity),
        })
        .collect()
}

fn units_transform(units: GradientUnits, pbox: Rect) -> Affine {
    match units {
        GradientUnits::ObjectBoundingBox => {
            Affine::new([pbox.width(), 0.0, 0.0, pbox.height(), pbox.x0, pbox.y0])
        }
        GradientUnits::UserSpaceOnUse => Affine::IDENTITY,
    }
}

fn rasterize_pattern(
    tile: Rect,
    content: &PathVector,
    color: Rgba8,
    ctm: Affine,
    ctx: &mut dyn DrawContext,
) -> Option<PaintSource> {
    let tile = tile.abs();
    if !(tile.width() > 0.0 && tile.height() > 0.0 && tile.is_finite()) || color.is_transparent()
    {
        return None;
    }
    let scale = expansion(ctm);
    let w = (tile.width() * scale).ceil().clamp(1.0, MAX_TILE_EDGE);
    let h = (tile.height() * scale).ceil().clamp(1.0, MAX_TILE_EDGE);
    let sx = w / tile.width();
    let sy = h / tile.height();
    let to_tile = Affine::scale_non_uniform(sx, sy) * Affine::translate(-tile.origin().to_vec2());

    let source = PaintSource::Solid(color);
    let image = ctx.rasterize_tile(w as u32, h as u32, &mut |tile_ctx: &mut dyn DrawContext| {
        tile_ctx.new_path();
        feed_pathvector(tile_ctx, content, to_tile, None, false, 0.0);
        tile_ctx.set_fill_rule(FillRule::NonZero);
        tile_ctx.set_source(&source);
        tile_ctx.fill();
    });
    let Some(image) = image else {
        tracing::warn!(w, h, "pattern tile allocation failed; painting nothing");
        return None;
    };
    Some(PaintSource::Image {
        tile: Arc::new(image),
        transform: ctm
            * Affine::translate(tile.origin().to_vec2())
            * Affine::scale_non_uniform(1.0 / sx, 1.0 / sy),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/paint/resolve.rs"]
mod tests;

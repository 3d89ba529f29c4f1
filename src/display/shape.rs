use kurbo::Shape as _;

use crate::display::arena::{Arena, ArenaEvent, RenderMode, slot_mut};
use crate::display::gc::GraphicsContext;
use crate::display::item::{ItemId, ItemKind, ShapeData};
use crate::display::state::{ItemState, RenderFlags};
use crate::display::traverse::{object_opacity, stroke_pad};
use crate::foundation::core::{Affine, IntRect, Point, Rect};
use crate::foundation::math::expansion;
use crate::geom::feed::{feed_pathvector, replay};
use crate::geom::hit::point_hit;
use crate::paint::resolve::effective_paint_box;
use crate::paint::style::{FillRule, VISIBLE_OPACITY};
use crate::render::backend::{DrawContext, PaintSource, StrokeStyle};

/// Emit the device outline of `shape` under `ctm`, reusing the cached device path when it was
/// built for the same transform.
fn feed_device(
    ctx: &mut dyn DrawContext,
    shape: &ShapeData,
    ctm: Affine,
    use_cache: bool,
    area: Option<Rect>,
    optimize_stroke: bool,
    stroke_width: f64,
) {
    match &shape.device_path {
        Some((t, device)) if use_cache && *t == ctm => {
            replay(ctx, device, area, optimize_stroke, stroke_width);
        }
        _ => {
            if let Some(path) = &shape.path {
                feed_pathvector(ctx, path, ctm, area, optimize_stroke, stroke_width);
            }
        }
    }
}

impl Arena {
    pub(crate) fn update_shape(
        &mut self,
        id: ItemId,
        area: Option<IntRect>,
        gc: &GraphicsContext,
        flags: ItemState,
        reset: ItemState,
    ) -> ItemState {
        let markers = self.markers(id).to_vec();
        let mut best = ItemState::ALL;
        for m in &markers {
            best &= self.invoke_update(*m, area, gc, flags, reset);
        }
        let marker_bbox = markers
            .iter()
            .filter_map(|m| self.bbox(*m))
            .fold(IntRect::EMPTY, |acc, b| acc.union(&b));

        let outline = self.mode == RenderMode::Outline;
        let Arena {
            slots,
            opts,
            paint_factory,
            ..
        } = self;
        let Some(item) = slot_mut(slots, id) else {
            return ItemState::INVALID;
        };
        let ItemKind::Shape(shape) = &mut item.kind else {
            return ItemState::INVALID;
        };

        let ctm = gc.transform;
        let scale = expansion(ctm);
        let pad = shape
            .style
            .as_deref()
            .map_or(0.0, |s| stroke_pad(s, scale, opts, outline));
        let approx = shape
            .path
            .as_deref()
            .and_then(|p| p.bounds_fast(ctm))
            .map_or(IntRect::EMPTY, |r| {
                IntRect::from_rect_outward(r.inflate(pad, pad))
            });
        shape.approx_bbox = approx;
        let offscreen = opts.delayed_shapes && area.is_some_and(|a| !a.touches(&approx));

        if !flags.contains(ItemState::RENDER_VALID) {
            let bbox = if offscreen {
                shape.delayed = true;
                approx
            } else {
                shape
                    .path
                    .as_deref()
                    .and_then(|p| p.bounds_exact(ctm))
                    .map_or(IntRect::EMPTY, |r| {
                        IntRect::from_rect_outward(r.inflate(pad, pad))
                    })
            };
            item.bbox = bbox.union(&marker_bbox);
            return ItemState::BBOX_VALID & best;
        }

        shape.device_path = None;
        shape.painter = None;
        shape.delayed = false;
        let drawable = match (&shape.path, &shape.style) {
            (Some(path), Some(style)) => {
                !path.is_empty() && (outline || !style.fill.is_none() || !style.stroke.is_none())
            }
            _ => false,
        };
        if !drawable {
            item.bbox = approx.union(&marker_bbox);
            return ItemState::ALL & best;
        }

        let bbox = if offscreen {
            tracing::debug!(?id, "shape outside update area; deferring device path");
            shape.delayed = true;
            approx
        } else {
            let device = shape
                .path
                .as_deref()
                .map(|p| p.to_bezpath(ctm))
                .unwrap_or_default();
            let exact = IntRect::from_rect_outward(device.bounding_box().inflate(pad, pad));
            shape.device_path = Some((ctm, device));
            exact
        };
        item.bbox = bbox;
        if bbox.is_empty() {
            item.bbox = marker_bbox;
            return ItemState::ALL & best;
        }
        if let Some(style) = &shape.style {
            shape.painter = Some(paint_factory(style, ctm));
        }
        item.bbox = bbox.union(&marker_bbox);
        let rect = item.bbox;
        self.emit(ArenaEvent::RequestRender { rect });
        ItemState::ALL & best
    }

    pub(crate) fn render_shape(
        &mut self,
        ctx: &mut dyn DrawContext,
        id: ItemId,
        area: IntRect,
        flags: RenderFlags,
    ) -> ItemState {
        let outline = self.mode == RenderMode::Outline;
        let outline_color = self.outline_color;
        let Arena {
            slots,
            opts,
            paint_factory,
            ..
        } = self;
        let Some(item) = slot_mut(slots, id) else {
            return ItemState::INVALID;
        };
        let (ctm, bbox) = (item.ctm, item.bbox);
        let ItemKind::Shape(shape) = &mut item.kind else {
            return ItemState::INVALID;
        };
        let markers = shape.markers.clone();

        let drawable = match (&shape.path, &shape.style) {
            (Some(path), Some(_)) => !path.is_empty(),
            _ => false,
        };
        let mut layers = 0;
        if drawable {
            if shape.delayed {
                if !area.intersects(&bbox) {
                    return ItemState::ALL;
                }
                shape.device_path = shape.path.as_deref().map(|p| (ctm, p.to_bezpath(ctm)));
                shape.delayed = false;
            }
            let use_cache = !flags.contains(RenderFlags::NO_CACHE);

            if outline {
                ctx.new_path();
                feed_device(ctx, shape, ctm, use_cache, None, false, 0.0);
                ctx.set_tolerance(opts.outline_tolerance);
                ctx.set_stroke_style(&StrokeStyle::hairline(opts.outline_line_width));
                ctx.set_source(&PaintSource::Solid(outline_color));
                ctx.stroke();
            } else if let Some(style) = shape.style.clone() {
                let pbox = effective_paint_box(shape.paint_box);
                let mut painter = shape
                    .painter
                    .take()
                    .unwrap_or_else(|| paint_factory(&style, ctm));
                // Overlapping fill and stroke, or markers, composite as one layer.
                let foldable =
                    markers.is_empty() && !(style.fill_visible() && style.stroke_visible());
                match object_opacity(ctx, painter.as_mut(), style.opacity, foldable) {
                    Some(n) => layers = n,
                    None => {
                        tracing::warn!(
                            ?id,
                            opacity = style.opacity,
                            "could not establish style opacity layer"
                        );
                        shape.painter = Some(painter);
                        return ItemState::INVALID;
                    }
                }
                let has_fill = painter.prepare_fill(ctx, pbox);
                let has_stroke = painter.prepare_stroke(ctx, pbox);

                if has_fill {
                    ctx.new_path();
                    feed_device(ctx, shape, ctm, use_cache, None, false, 0.0);
                    ctx.set_fill_rule(style.fill_rule);
                    painter.apply_fill(ctx);
                    ctx.fill();
                }
                if has_stroke {
                    let stroke = StrokeStyle::from_style(&style, expansion(ctm));
                    ctx.new_path();
                    feed_device(
                        ctx,
                        shape,
                        ctm,
                        use_cache,
                        Some(area.to_rect()),
                        true,
                        stroke.width,
                    );
                    ctx.set_tolerance(opts.stroke_tolerance);
                    ctx.set_stroke_style(&stroke);
                    painter.apply_stroke(ctx);
                    ctx.stroke();
                }
                shape.painter = Some(painter);
            }
        }

        let mut state = ItemState::ALL;
        for m in markers {
            let marker_state = self.invoke_render(ctx, m, area, flags);
            if marker_state.contains(ItemState::INVALID) {
                state = marker_state;
                break;
            }
        }
        for _ in 0..layers {
            ctx.pop_layer();
        }
        state
    }

    pub(crate) fn clip_shape(&mut self, ctx: &mut dyn DrawContext, id: ItemId) -> ItemState {
        let Some(item) = self.item(id) else {
            return ItemState::INVALID;
        };
        let ItemKind::Shape(shape) = &item.kind else {
            return ItemState::INVALID;
        };
        if shape.path.as_deref().is_none_or(|p| p.is_empty()) {
            return ItemState::ALL;
        }
        let rule = shape
            .style
            .as_deref()
            .map_or(FillRule::NonZero, |s| s.clip_rule);
        ctx.new_path();
        feed_device(ctx, shape, item.ctm, true, None, false, 0.0);
        ctx.set_fill_rule(rule);
        ctx.clip_fill();
        ItemState::ALL
    }

    /// Throttled exact pick. While the throttle counter runs, the previous result is returned.
    pub(crate) fn pick_shape(
        &mut self,
        id: ItemId,
        p: Point,
        delta: f64,
        sticky: bool,
    ) -> Option<ItemId> {
        if let Some(ItemKind::Shape(shape)) = self.item_mut(id).map(|n| &mut n.kind)
            && shape.repick_throttle > 0
        {
            shape.repick_throttle -= 1;
            let cached = shape.last_pick;
            self.stats.cached_picks += 1;
            return cached;
        }

        let start = self.clock.now_ms();
        let hit = self.pick_shape_exact(id, p, delta, sticky);
        let cost = self.clock.now_ms() - start;
        self.stats.exact_tests += 1;

        let slow = cost > self.opts.pick_slow_threshold_ms;
        let skip = (cost / self.opts.pick_skip_unit_ms).max(0.0) as u32;
        if slow {
            self.stats.throttle_engaged += 1;
            tracing::debug!(?id, cost_ms = cost, skip, "slow pick; throttling exact tests");
        }
        if let Some(ItemKind::Shape(shape)) = self.item_mut(id).map(|n| &mut n.kind) {
            if slow {
                shape.repick_throttle = skip;
            }
            shape.last_pick = hit;
        }
        hit
    }

    fn pick_shape_exact(&mut self, id: ItemId, p: Point, delta: f64, sticky: bool) -> Option<ItemId> {
        let outline = self.mode == RenderMode::Outline;
        let viewbox = self.canvas_viewbox();
        let item = self.item(id)?;
        let ItemKind::Shape(shape) = &item.kind else {
            return None;
        };
        let markers = shape.markers.clone();

        if let (Some(path), Some(style)) = (&shape.path, &shape.style)
            && (outline || style.opacity > VISIBLE_OPACITY)
        {
            let needfill = !outline && style.fill_visible();
            let width = if outline {
                self.opts.outline_line_width
            } else if style.stroke_visible() {
                self.opts
                    .min_stroke_width
                    .max(style.stroke_width * expansion(item.ctm))
                    * 0.5
            } else {
                0.0
            };
            let measure = needfill || width > 0.0;
            let viewbox = viewbox.map(|v| v.to_rect().inflate(width, width));
            let hit = point_hit(path, item.ctm, p, measure, viewbox);
            if needfill && style.fill_rule.covers(hit.winding) {
                return Some(id);
            }
            if measure && hit.distance - width < delta {
                return Some(id);
            }
        }

        markers
            .into_iter()
            .any(|m| self.invoke_pick(m, p, delta, sticky).is_some())
            .then_some(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/shape.rs"]
mod tests;

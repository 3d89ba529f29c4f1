//! The four traversals. Each public entry point runs a wrapper that handles the behavior
//! shared by every kind (state bookkeeping, area culling, layers, sensitivity) and then
//! dispatches on the item kind.

use crate::display::arena::{Arena, RenderMode};
use crate::display::gc::GraphicsContext;
use crate::display::item::{ItemId, ItemKindTag};
use crate::display::opts::ArenaOpts;
use crate::display::state::{ItemState, RenderFlags};
use crate::foundation::core::{IntRect, Point};
use crate::paint::resolve::PaintResolver;
use crate::paint::style::{LineJoin, Style};
use crate::render::backend::DrawContext;

/// Device padding of every bbox in outline mode.
const OUTLINE_BBOX_PAD: f64 = 0.25;
/// Device stroke widths at or below this are treated as no stroke for bbox purposes.
const HAIRLINE_EPSILON: f64 = 0.01;
/// Item opacities at or above this are drawn without an opacity layer.
pub(crate) const OPAQUE: f32 = 1.0 - 1e-3;

/// Device distance by which a stroke (or the outline) extends beyond the path.
pub(crate) fn stroke_pad(style: &Style, scale: f64, opts: &ArenaOpts, outline: bool) -> f64 {
    if outline {
        return OUTLINE_BBOX_PAD;
    }
    if style.stroke.is_none() {
        return 0.0;
    }
    let device = style.stroke_width * scale;
    if device.abs() <= HAIRLINE_EPSILON {
        return 0.0;
    }
    let width = device.abs().max(opts.min_stroke_width);
    match style.line_join {
        LineJoin::Miter => (width * 0.5).max(width * style.miter_limit * 0.5),
        _ => width * 0.5,
    }
}

/// Establish a style's whole-object `opacity` for one draw. It is folded into the paint when
/// `foldable` and the resolver supports it; otherwise an opacity layer is pushed. Returns the
/// number of layers pushed, `None` when the layer could not be established.
pub(crate) fn object_opacity(
    ctx: &mut dyn DrawContext,
    painter: &mut dyn PaintResolver,
    opacity: f32,
    foldable: bool,
) -> Option<usize> {
    if opacity >= OPAQUE || (foldable && painter.fold_opacity(opacity)) {
        return Some(0);
    }
    ctx.push_opacity_layer(opacity).then_some(1)
}

impl Arena {
    /// Bring the subtree under `item` to `flags`, forcing recomputation of the `reset` bits.
    ///
    /// `area` limits work to items whose bbox touches it; `None` means everywhere. Returns the
    /// bits valid for every visited item; `INVALID` if `item` is unknown or in error.
    #[tracing::instrument(skip(self, gc))]
    pub fn update(
        &mut self,
        item: ItemId,
        area: Option<IntRect>,
        gc: &GraphicsContext,
        flags: ItemState,
        reset: ItemState,
    ) -> ItemState {
        self.invoke_update(item, area, gc, flags, reset)
    }

    /// Draw the subtree under `item` clipped to the device rectangle `area`.
    ///
    /// Requires a prior update with at least `BBOX_VALID`. A result containing `INVALID` tells a
    /// tiled caller to abort the batch.
    #[tracing::instrument(skip(self, ctx))]
    pub fn render(
        &mut self,
        ctx: &mut dyn DrawContext,
        item: ItemId,
        area: IntRect,
        flags: RenderFlags,
    ) -> ItemState {
        self.invoke_render(ctx, item, area, flags)
    }

    /// Add the geometry of `item` to the clip region being collected on `ctx`.
    #[tracing::instrument(skip(self, ctx))]
    pub fn clip(&mut self, ctx: &mut dyn DrawContext, item: ItemId, area: IntRect) -> ItemState {
        self.invoke_clip(ctx, item, area)
    }

    /// Topmost item under the device point `point`, within distance `delta`.
    ///
    /// `sticky` picks ignore visibility and sensitivity.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn pick(&mut self, item: ItemId, point: Point, delta: f64, sticky: bool) -> Option<ItemId> {
        self.invoke_pick(item, point, delta, sticky)
    }

    pub(crate) fn invoke_update(
        &mut self,
        id: ItemId,
        area: Option<IntRect>,
        gc: &GraphicsContext,
        flags: ItemState,
        reset: ItemState,
    ) -> ItemState {
        if flags.contains(ItemState::INVALID) {
            return ItemState::INVALID;
        }
        let Some(item) = self.item_mut(id) else {
            return ItemState::INVALID;
        };
        if item.state.contains(ItemState::INVALID) {
            return item.state;
        }
        let mut reset = reset;
        if item.propagate {
            reset |= ItemState::ALL.difference(item.state);
            item.propagate = false;
        }
        item.state.remove(reset);
        if item.state.contains(flags) {
            return item.state;
        }
        if let Some(area) = area
            && item.state.contains(ItemState::BBOX_VALID)
            && !area.touches(&item.bbox)
        {
            return item.state;
        }

        let child_gc = gc.child(item.transform);
        item.ctm = child_gc.transform;
        let tag = item.tag();

        let state = match tag {
            ItemKindTag::Shape => self.update_shape(id, area, &child_gc, flags, reset),
            ItemKindTag::Group => self.update_children(id, area, &child_gc, flags, reset),
            ItemKindTag::GlyphsGroup => {
                self.update_glyphs_group(id, area, &child_gc, flags, reset)
            }
            ItemKindTag::Glyph => self.update_glyph(id, &child_gc),
        };

        let Some(item) = self.item_mut(id) else {
            return ItemState::INVALID;
        };
        item.state = state;
        if state.contains(ItemState::INVALID) {
            return state;
        }
        // Clip and mask items live in the item's coordinate space and bound its bbox.
        let bounds = [item.clip, item.mask];
        for bound in bounds.into_iter().flatten() {
            let bound_state = self.invoke_update(bound, area, &child_gc, flags, reset);
            let bound_bbox = self.bbox(bound).unwrap_or(IntRect::EMPTY);
            let Some(item) = self.item_mut(id) else {
                return ItemState::INVALID;
            };
            if bound_state.contains(ItemState::INVALID) {
                item.state |= ItemState::INVALID;
                return item.state;
            }
            item.bbox = item.bbox.intersect(&bound_bbox);
        }
        state
    }

    pub(crate) fn invoke_render(
        &mut self,
        ctx: &mut dyn DrawContext,
        id: ItemId,
        area: IntRect,
        flags: RenderFlags,
    ) -> ItemState {
        let Some(item) = self.item(id) else {
            return ItemState::INVALID;
        };
        if !item.state.contains(ItemState::BBOX_VALID) {
            return item.state;
        }
        if !item.visible {
            return item.state | ItemState::RENDER_VALID;
        }
        let carea = area.intersect(&item.bbox);
        if carea.is_empty() {
            return item.state | ItemState::RENDER_VALID;
        }
        let outline = self.mode == RenderMode::Outline;
        let (opacity, clip, mask, tag) = (item.opacity, item.clip, item.mask, item.tag());

        let mut layers = 0;
        if !outline && opacity < OPAQUE {
            if !ctx.push_opacity_layer(opacity) {
                tracing::warn!(?id, opacity, "could not establish opacity layer");
                return self.mark_invalid(id);
            }
            layers += 1;
        }
        if let Some(clip) = clip {
            ctx.begin_clip();
            let clip_state = self.invoke_clip(ctx, clip, carea);
            if clip_state.contains(ItemState::INVALID) || !ctx.push_clip() {
                tracing::warn!(?id, ?clip, "could not establish clip layer");
                for _ in 0..layers {
                    ctx.pop_layer();
                }
                return self.mark_invalid(id);
            }
            layers += 1;
        }
        if let Some(mask) = mask.filter(|_| !outline) {
            let mut mask_state = ItemState::NONE;
            let pushed = ctx.push_mask(&mut |mask_ctx: &mut dyn DrawContext| {
                mask_state = self.invoke_render(mask_ctx, mask, carea, flags);
                !mask_state.contains(ItemState::INVALID)
            });
            if !pushed {
                tracing::warn!(?id, ?mask, ?mask_state, "could not establish mask layer");
                for _ in 0..layers {
                    ctx.pop_layer();
                }
                return self.mark_invalid(id);
            }
            layers += 1;
        }

        let state = match tag {
            ItemKindTag::Shape => self.render_shape(ctx, id, carea, flags),
            ItemKindTag::Group => self.render_children(ctx, id, carea, flags),
            ItemKindTag::GlyphsGroup => self.render_glyphs_group(ctx, id, carea),
            ItemKindTag::Glyph => ItemState::ALL,
        };

        for _ in 0..layers {
            ctx.pop_layer();
        }
        if state.contains(ItemState::INVALID) {
            return self.mark_invalid(id);
        }
        self.state(id).unwrap_or(ItemState::INVALID) | ItemState::RENDER_VALID
    }

    pub(crate) fn invoke_clip(
        &mut self,
        ctx: &mut dyn DrawContext,
        id: ItemId,
        area: IntRect,
    ) -> ItemState {
        let Some(item) = self.item(id) else {
            return ItemState::INVALID;
        };
        if !(item.visible && area.intersects(&item.bbox)) {
            return item.state;
        }
        match item.tag() {
            ItemKindTag::Shape => self.clip_shape(ctx, id),
            ItemKindTag::Group => self.clip_children(ctx, id, area),
            ItemKindTag::GlyphsGroup => self.clip_glyphs_group(ctx, id),
            ItemKindTag::Glyph => self.clip_glyph(ctx, id),
        }
    }

    pub(crate) fn invoke_pick(
        &mut self,
        id: ItemId,
        p: Point,
        delta: f64,
        sticky: bool,
    ) -> Option<ItemId> {
        let item = self.item(id)?;
        if !item.state.contains(ItemState::BBOX_VALID) {
            return None;
        }
        if !sticky && !(item.visible && item.sensitive) {
            return None;
        }
        let b = item.bbox;
        let inside = p.x + delta >= f64::from(b.x0)
            && p.x - delta < f64::from(b.x1)
            && p.y + delta >= f64::from(b.y0)
            && p.y - delta < f64::from(b.y1);
        if !inside {
            return None;
        }
        match item.tag() {
            ItemKindTag::Shape => self.pick_shape(id, p, delta, sticky),
            ItemKindTag::Group => self.pick_group(id, p, delta, sticky),
            ItemKindTag::GlyphsGroup => self.pick_glyphs_group(id, p, delta, sticky),
            ItemKindTag::Glyph => self.pick_glyph(id),
        }
    }

    fn mark_invalid(&mut self, id: ItemId) -> ItemState {
        match self.item_mut(id) {
            Some(item) => {
                item.state |= ItemState::INVALID;
                item.state
            }
            None => ItemState::INVALID,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/traverse.rs"]
mod tests;

//! Glyph outlines and the glyphs-group item kinds.
//!
//! A glyphs group holds one style shared by all of its glyphs; it draws the union of their
//! outlines with a single fill and a single stroke.

use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::display::arena::{Arena, RenderMode, slot, slot_mut};
use crate::display::gc::GraphicsContext;
use crate::display::item::{ItemId, ItemKind};
use crate::display::state::ItemState;
use crate::display::traverse::{object_opacity, stroke_pad};
use crate::foundation::core::{BezPath, IntRect, Point};
use crate::foundation::math::expansion;
use crate::geom::feed::replay;
use crate::geom::path::PathVector;
use crate::paint::resolve::effective_paint_box;
use crate::paint::style::{FillRule, Style};
use crate::render::backend::{DrawContext, PaintSource, StrokeStyle};

/// Source of glyph outlines, as provided by a font layer.
pub trait GlyphOutlines {
    /// Outline of `glyph` in font units placed at the origin, `None` for an unknown glyph.
    fn path_vector(&self, glyph: u32) -> Option<Arc<PathVector>>;
}

/// [`GlyphOutlines`] backed by a map of preloaded outlines.
#[derive(Clone, Debug, Default)]
pub struct OutlineFont {
    glyphs: HashMap<u32, Arc<PathVector>>,
}

impl OutlineFont {
    /// Font without glyphs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outline of `glyph`, replacing any previous one.
    pub fn insert(&mut self, glyph: u32, outline: PathVector) {
        self.glyphs.insert(glyph, Arc::new(outline));
    }

    /// Builder form of [`OutlineFont::insert`].
    pub fn with_glyph(mut self, glyph: u32, outline: PathVector) -> Self {
        self.insert(glyph, outline);
        self
    }

    /// Number of glyphs with an outline.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether no glyph has an outline.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl GlyphOutlines for OutlineFont {
    fn path_vector(&self, glyph: u32) -> Option<Arc<PathVector>> {
        self.glyphs.get(&glyph).cloned()
    }
}

impl Arena {
    pub(crate) fn update_glyphs_group(
        &mut self,
        id: ItemId,
        area: Option<IntRect>,
        gc: &GraphicsContext,
        flags: ItemState,
        reset: ItemState,
    ) -> ItemState {
        if let Some(ItemKind::GlyphsGroup(group)) = self.item_mut(id).map(|n| &mut n.kind) {
            group.painter = None;
        }
        let best = self.update_children(id, area, gc, flags, reset);
        if flags.contains(ItemState::RENDER_VALID) {
            let Arena {
                slots,
                paint_factory,
                ..
            } = self;
            if let Some(ItemKind::GlyphsGroup(group)) = slot_mut(slots, id).map(|n| &mut n.kind)
                && let Some(style) = &group.style
            {
                group.painter = Some(paint_factory(style, gc.transform));
            }
        }
        best
    }

    /// Realize the device outline of a glyph. Stroke padding comes from the owning group's style.
    pub(crate) fn update_glyph(&mut self, id: ItemId, gc: &GraphicsContext) -> ItemState {
        let outline = self.mode == RenderMode::Outline;
        let ctm = gc.transform;
        let parent_style = self
            .parent(id)
            .and_then(|p| match self.item(p).map(|n| &n.kind) {
                Some(ItemKind::GlyphsGroup(group)) => group.style.clone(),
                _ => None,
            });
        let pad = stroke_pad(
            parent_style.as_deref().unwrap_or(&Style::default()),
            expansion(ctm),
            &self.opts,
            outline,
        );

        let Some(item) = self.item_mut(id) else {
            return ItemState::INVALID;
        };
        let ItemKind::Glyph(glyph) = &mut item.kind else {
            return ItemState::INVALID;
        };
        glyph.device_path = glyph.path.as_deref().map(|p| p.to_bezpath(ctm));
        item.bbox = match &glyph.device_path {
            Some(device) if !device.elements().is_empty() => {
                IntRect::from_rect_outward(device.bounding_box().inflate(pad, pad))
            }
            _ => IntRect::EMPTY,
        };
        ItemState::ALL
    }

    /// Device outlines of the visible glyphs of a group that overlap `area`.
    fn glyph_union(&self, id: ItemId, area: Option<IntRect>) -> BezPath {
        let mut union = BezPath::new();
        for child in self.children(id) {
            let Some(item) = slot(&self.slots, *child) else {
                continue;
            };
            if !item.visible || area.is_some_and(|a| !a.intersects(&item.bbox)) {
                continue;
            }
            if let ItemKind::Glyph(glyph) = &item.kind
                && let Some(device) = &glyph.device_path
            {
                union.extend(device.elements().iter().copied());
            }
        }
        union
    }

    pub(crate) fn render_glyphs_group(
        &mut self,
        ctx: &mut dyn DrawContext,
        id: ItemId,
        area: IntRect,
    ) -> ItemState {
        let union = self.glyph_union(id, Some(area));
        if union.elements().is_empty() {
            return ItemState::ALL;
        }
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
        let ctm = item.ctm;
        let ItemKind::GlyphsGroup(group) = &mut item.kind else {
            return ItemState::INVALID;
        };

        if outline {
            ctx.new_path();
            replay(ctx, &union, None, false, 0.0);
            ctx.set_tolerance(opts.outline_tolerance);
            ctx.set_stroke_style(&StrokeStyle::hairline(opts.outline_line_width));
            ctx.set_source(&PaintSource::Solid(outline_color));
            ctx.stroke();
            return ItemState::ALL;
        }

        let Some(style) = group.style.clone() else {
            return ItemState::ALL;
        };
        let pbox = effective_paint_box(group.paint_box);
        let mut painter = group
            .painter
            .take()
            .unwrap_or_else(|| paint_factory(&style, ctm));
        let foldable = !(style.fill_visible() && style.stroke_visible());
        let Some(layers) = object_opacity(ctx, painter.as_mut(), style.opacity, foldable) else {
            tracing::warn!(
                ?id,
                opacity = style.opacity,
                "could not establish style opacity layer"
            );
            group.painter = Some(painter);
            return ItemState::INVALID;
        };
        let has_fill = painter.prepare_fill(ctx, pbox);
        let has_stroke = painter.prepare_stroke(ctx, pbox);
        if has_fill {
            ctx.new_path();
            replay(ctx, &union, None, false, 0.0);
            ctx.set_fill_rule(style.fill_rule);
            painter.apply_fill(ctx);
            ctx.fill();
        }
        if has_stroke {
            let stroke = StrokeStyle::from_style(&style, expansion(ctm));
            ctx.new_path();
            replay(ctx, &union, Some(area.to_rect()), true, stroke.width);
            ctx.set_tolerance(opts.stroke_tolerance);
            ctx.set_stroke_style(&stroke);
            painter.apply_stroke(ctx);
            ctx.stroke();
        }
        for _ in 0..layers {
            ctx.pop_layer();
        }
        group.painter = Some(painter);
        ItemState::ALL
    }

    pub(crate) fn clip_glyphs_group(&mut self, ctx: &mut dyn DrawContext, id: ItemId) -> ItemState {
        let union = self.glyph_union(id, None);
        if !union.elements().is_empty() {
            ctx.new_path();
            replay(ctx, &union, None, false, 0.0);
            ctx.set_fill_rule(FillRule::NonZero);
            ctx.clip_fill();
        }
        ItemState::ALL
    }

    pub(crate) fn clip_glyph(&mut self, ctx: &mut dyn DrawContext, id: ItemId) -> ItemState {
        if let Some(ItemKind::Glyph(glyph)) = self.item(id).map(|n| &n.kind)
            && let Some(device) = &glyph.device_path
        {
            ctx.new_path();
            replay(ctx, device, None, false, 0.0);
            ctx.set_fill_rule(FillRule::NonZero);
            ctx.clip_fill();
        }
        ItemState::ALL
    }

    /// A glyph is hit anywhere in its box, once it has a font and its group has a style.
    pub(crate) fn pick_glyph(&self, id: ItemId) -> Option<ItemId> {
        let item = self.item(id)?;
        let ItemKind::Glyph(glyph) = &item.kind else {
            return None;
        };
        glyph.font.as_ref()?;
        match self.item(item.parent?).map(|n| &n.kind) {
            Some(ItemKind::GlyphsGroup(group)) if group.style.is_some() => Some(id),
            _ => None,
        }
    }

    /// A glyphs group is picked as a whole.
    pub(crate) fn pick_glyphs_group(
        &mut self,
        id: ItemId,
        p: Point,
        delta: f64,
        sticky: bool,
    ) -> Option<ItemId> {
        self.pick_topmost_child(id, p, delta, sticky).map(|_| id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/glyphs.rs"]
mod tests;

use crate::display::arena::Arena;
use crate::display::gc::GraphicsContext;
use crate::display::item::{ItemId, ItemKind};
use crate::display::state::{ItemState, RenderFlags};
use crate::foundation::core::{IntRect, Point};
use crate::render::backend::DrawContext;

impl Arena {
    /// Update every child, then take the union of the visible children's boxes.
    pub(crate) fn update_children(
        &mut self,
        id: ItemId,
        area: Option<IntRect>,
        gc: &GraphicsContext,
        flags: ItemState,
        reset: ItemState,
    ) -> ItemState {
        let children = self.children(id).to_vec();
        let mut best = ItemState::ALL;
        for child in &children {
            best &= self.invoke_update(*child, area, gc, flags, reset);
        }
        if best.contains(ItemState::BBOX_VALID) {
            let bbox = children
                .iter()
                .filter_map(|c| self.item(*c))
                .filter(|c| c.visible)
                .fold(IntRect::EMPTY, |acc, c| acc.union(&c.bbox));
            if let Some(item) = self.item_mut(id) {
                item.bbox = bbox;
            }
        }
        best
    }

    pub(crate) fn render_children(
        &mut self,
        ctx: &mut dyn DrawContext,
        id: ItemId,
        area: IntRect,
        flags: RenderFlags,
    ) -> ItemState {
        for child in self.children(id).to_vec() {
            let state = self.invoke_render(ctx, child, area, flags);
            if state.contains(ItemState::INVALID) {
                return state;
            }
        }
        ItemState::ALL
    }

    pub(crate) fn clip_children(
        &mut self,
        ctx: &mut dyn DrawContext,
        id: ItemId,
        area: IntRect,
    ) -> ItemState {
        for child in self.children(id).to_vec() {
            let state = self.invoke_clip(ctx, child, area);
            if state.contains(ItemState::INVALID) {
                return state;
            }
        }
        ItemState::ALL
    }

    /// Topmost hit child, searched front to back.
    pub(crate) fn pick_topmost_child(
        &mut self,
        id: ItemId,
        p: Point,
        delta: f64,
        sticky: bool,
    ) -> Option<ItemId> {
        let children = self.children(id).to_vec();
        children
            .into_iter()
            .rev()
            .find_map(|child| self.invoke_pick(child, p, delta, sticky))
    }

    /// The group itself when any child is hit, or the hit child for transparent groups.
    pub(crate) fn pick_group(
        &mut self,
        id: ItemId,
        p: Point,
        delta: f64,
        sticky: bool,
    ) -> Option<ItemId> {
        let hit = self.pick_topmost_child(id, p, delta, sticky)?;
        let transparent = matches!(
            self.item(id).map(|n| &n.kind),
            Some(ItemKind::Group(g)) if g.transparent
        );
        Some(if transparent { hit } else { id })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/group.rs"]
mod tests;

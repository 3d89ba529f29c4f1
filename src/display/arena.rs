use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::display::glyphs::GlyphOutlines;
use crate::display::item::{
    ChildList, GlyphData, GlyphsGroupData, GroupData, Item, ItemId, ItemKind, ItemKindTag,
    ShapeData,
};
use crate::display::opts::{ArenaOpts, PickClock, SystemClock};
use crate::display::state::ItemState;
use crate::foundation::core::{Affine, IntRect, Rect, Rgba8};
use crate::foundation::error::{ArenaError, ArenaResult};
use crate::geom::path::PathVector;
use crate::paint::resolve::{PaintFactory, default_paint_factory};
use crate::paint::style::Style;

/// Tolerance used to decide whether a new transform differs from the current one.
const TRANSFORM_EPSILON: f64 = 1e-9;

/// How items are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Full paint resolution.
    #[default]
    Normal,
    /// Every item stroked with a thin line in the arena's outline color.
    Outline,
}

/// The canvas hosting an arena, as seen by pick.
pub trait HostCanvas {
    /// Visible device-space rectangle, if known.
    fn viewbox(&self) -> Option<IntRect>;
}

/// Notification sent from the scene graph to its host.
///
/// Delivery is fire-and-forget: observers get no scheduling guarantees and the arena does not
/// wait for them to act.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaEvent {
    /// A root item lost cached state and needs a new update. `rect` is its last known bbox.
    RequestUpdate {
        /// The item without a parent whose subtree needs updating.
        item: ItemId,
        /// Last known device bbox of that item.
        rect: IntRect,
    },
    /// Pixels inside `rect` are stale.
    RequestRender {
        /// Device rectangle to repaint.
        rect: IntRect,
    },
}

/// Receiver of [`ArenaEvent`]s.
pub trait ArenaObserver {
    /// Handle one event. Called synchronously from inside the mutating arena call.
    fn notify(&mut self, event: &ArenaEvent);
}

impl<F> ArenaObserver for F
where
    F: FnMut(&ArenaEvent),
{
    fn notify(&mut self, event: &ArenaEvent) {
        self(event)
    }
}

/// Handle returned by [`Arena::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Counters kept by pick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PickStats {
    /// Exact hit tests run by shapes.
    pub exact_tests: u64,
    /// Picks answered from a shape's cached result while throttled.
    pub cached_picks: u64,
    /// Times a slow exact test engaged the throttle.
    pub throttle_engaged: u64,
}

/// Root rendering context and owner of every display item.
///
/// Items live in generational slots and are addressed by [`ItemId`]. An item stays alive while
/// it has a parent or at least one external hold; `create_*` returns an id carrying one hold.
pub struct Arena {
    pub(crate) slots: Vec<Option<Item>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: Option<ItemId>,
    pub(crate) mode: RenderMode,
    pub(crate) outline_color: Rgba8,
    pub(crate) canvas: Option<Arc<dyn HostCanvas>>,
    observers: Vec<(ObserverId, Box<dyn ArenaObserver>)>,
    next_observer: u64,
    pub(crate) opts: ArenaOpts,
    pub(crate) clock: Box<dyn PickClock>,
    pub(crate) paint_factory: PaintFactory,
    pub(crate) stats: PickStats,
}

impl core::fmt::Debug for Arena {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let live = self.slots.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Arena")
            .field("items_total", &self.slots.len())
            .field("items_alive", &live)
            .field("free_list", &self.free_list.len())
            .field("root", &self.root)
            .field("mode", &self.mode)
            .field("observers", &self.observers.len())
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn slot<'a>(slots: &'a [Option<Item>], id: ItemId) -> Option<&'a Item> {
    slots
        .get(id.idx())?
        .as_ref()
        .filter(|n| n.generation == id.1)
}

pub(crate) fn slot_mut<'a>(slots: &'a mut [Option<Item>], id: ItemId) -> Option<&'a mut Item> {
    slots
        .get_mut(id.idx())?
        .as_mut()
        .filter(|n| n.generation == id.1)
}

impl Arena {
    /// Empty arena with default options.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: None,
            mode: RenderMode::Normal,
            outline_color: Rgba8::BLACK,
            canvas: None,
            observers: Vec::new(),
            next_observer: 0,
            opts: ArenaOpts::default(),
            clock: Box::new(SystemClock::new()),
            paint_factory: default_paint_factory(),
            stats: PickStats::default(),
        }
    }

    /// Arena with validated tunables.
    pub fn with_opts(opts: ArenaOpts) -> ArenaResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            ..Self::new()
        })
    }

    /// Options this arena was built with.
    pub fn opts(&self) -> &ArenaOpts {
        &self.opts
    }

    /// Current rendering mode.
    pub fn render_mode(&self) -> RenderMode {
        self.mode
    }

    /// Switch between normal and outline drawing. Every cached state is dropped.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        let mut roots = Vec::new();
        for (idx, node) in self.slots.iter_mut().enumerate() {
            let Some(node) = node else { continue };
            node.state = ItemState::NONE;
            if node.parent.is_none() {
                roots.push((ItemId::new(idx as u32, node.generation), node.bbox));
            }
        }
        for (item, rect) in roots {
            self.emit(ArenaEvent::RequestUpdate { item, rect });
        }
    }

    /// Color used by outline-mode strokes.
    pub fn outline_color(&self) -> Rgba8 {
        self.outline_color
    }

    /// Set the outline color and repaint if outline mode is active.
    pub fn set_outline_color(&mut self, color: Rgba8) {
        if self.outline_color == color {
            return;
        }
        self.outline_color = color;
        if self.mode != RenderMode::Outline {
            return;
        }
        let rects: Vec<IntRect> = self
            .slots
            .iter()
            .flatten()
            .filter(|n| n.parent.is_none())
            .map(|n| n.bbox)
            .collect();
        for rect in rects {
            self.request_render_rect(rect);
        }
    }

    /// Attach the host canvas whose viewbox limits pick distance measurement.
    pub fn set_canvas(&mut self, canvas: Option<Arc<dyn HostCanvas>>) {
        self.canvas = canvas;
    }

    pub(crate) fn canvas_viewbox(&self) -> Option<IntRect> {
        self.canvas.as_ref().and_then(|c| c.viewbox())
    }

    /// Replace the clock used to time exact pick tests.
    pub fn set_clock(&mut self, clock: Box<dyn PickClock>) {
        self.clock = clock;
    }

    /// Replace how shapes and glyphs groups build their paint resolvers.
    pub fn set_paint_factory(&mut self, factory: PaintFactory) {
        self.paint_factory = factory;
    }

    /// Pick counters accumulated since creation or the last reset.
    pub fn stats(&self) -> PickStats {
        self.stats
    }

    /// Zero the pick counters.
    pub fn reset_stats(&mut self) {
        self.stats = PickStats::default();
    }

    // Observers

    /// Register an observer for [`ArenaEvent`]s.
    pub fn subscribe(&mut self, observer: impl ArenaObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Forward every event into `tx`. A disconnected receiver is ignored.
    pub fn subscribe_channel(&mut self, tx: Sender<ArenaEvent>) -> ObserverId {
        self.subscribe(move |event: &ArenaEvent| {
            let _ = tx.send(*event);
        })
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    pub(crate) fn emit(&mut self, event: ArenaEvent) {
        for (_, observer) in &mut self.observers {
            observer.notify(&event);
        }
    }

    // Slots

    pub(crate) fn item(&self, id: ItemId) -> Option<&Item> {
        slot(&self.slots, id)
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        slot_mut(&mut self.slots, id)
    }

    fn live(&self, id: ItemId) -> ArenaResult<&Item> {
        self.item(id).ok_or(ArenaError::UnknownItem(id))
    }

    fn live_mut(&mut self, id: ItemId) -> ArenaResult<&mut Item> {
        self.item_mut(id).ok_or(ArenaError::UnknownItem(id))
    }

    fn shape_mut(&mut self, id: ItemId) -> ArenaResult<&mut ShapeData> {
        match &mut self.live_mut(id)?.kind {
            ItemKind::Shape(shape) => Ok(shape),
            _ => Err(ArenaError::WrongKind {
                item: id,
                expected: ItemKindTag::Shape.name(),
            }),
        }
    }

    fn insert(&mut self, kind: ItemKind) -> ItemId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Item::new(generation, kind));
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Item::new(generation, kind)));
            self.generations.push(generation);
            ((self.slots.len() - 1) as u32, generation)
        };
        ItemId::new(idx, generation)
    }

    /// New shape without path or style. The returned id carries one hold.
    pub fn create_shape(&mut self) -> ItemId {
        self.insert(ItemKind::Shape(Box::default()))
    }

    /// New empty group.
    pub fn create_group(&mut self) -> ItemId {
        self.insert(ItemKind::Group(GroupData::default()))
    }

    /// New empty glyphs group.
    pub fn create_glyphs_group(&mut self) -> ItemId {
        self.insert(ItemKind::GlyphsGroup(GlyphsGroupData::default()))
    }

    /// New glyph; only valid as a child of a glyphs group.
    pub fn create_glyph(&mut self) -> ItemId {
        self.insert(ItemKind::Glyph(GlyphData::default()))
    }

    /// Whether `id` names a live item.
    pub fn contains(&self, id: ItemId) -> bool {
        self.item(id).is_some()
    }

    /// Kind of `id`.
    pub fn kind(&self, id: ItemId) -> ArenaResult<ItemKindTag> {
        Ok(self.live(id)?.tag())
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|n| n.is_some()).count()
    }

    /// Whether no items are alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // References

    /// Take an external reference on `id`.
    pub fn hold(&mut self, id: ItemId) -> ArenaResult<()> {
        let item = self.live_mut(id)?;
        item.holds = item.holds.saturating_add(1);
        Ok(())
    }

    /// Drop an external reference. The item is freed once it has neither holds nor a parent.
    pub fn release(&mut self, id: ItemId) -> ArenaResult<()> {
        let item = self.live_mut(id)?;
        if item.holds == 0 {
            return Err(ArenaError::structure(format!("{id:?} has no holds to release")));
        }
        item.holds -= 1;
        self.free_if_unowned(id);
        Ok(())
    }

    /// Item held as the document root, if any.
    pub fn root(&self) -> Option<ItemId> {
        self.root
    }

    /// Designate the tree root. The arena holds the root until it is replaced.
    pub fn set_root(&mut self, root: Option<ItemId>) -> ArenaResult<()> {
        if let Some(new) = root {
            if self.live(new)?.parent.is_some() {
                return Err(ArenaError::structure(format!("{new:?} already has a parent")));
            }
            self.hold(new)?;
        }
        if let Some(old) = std::mem::replace(&mut self.root, root) {
            self.release(old)?;
        }
        Ok(())
    }

    fn free_if_unowned(&mut self, id: ItemId) {
        let unowned = self
            .item(id)
            .is_some_and(|n| n.parent.is_none() && n.holds == 0);
        if !unowned {
            return;
        }
        let Some(item) = self.slots[id.idx()].take() else {
            return;
        };
        self.free_list.push(id.idx());
        tracing::debug!(?id, kind = item.tag().name(), "freeing display item");
        for owned in item.owned() {
            if let Some(child) = self.item_mut(owned) {
                child.parent = None;
                child.state = ItemState::NONE;
            }
            self.free_if_unowned(owned);
        }
    }

    /// Unlink `id` from its owner: schedule a repaint of its last bbox, clear its state and free
    /// it if nothing else holds it. The owner's lists must already be updated.
    fn detach(&mut self, id: ItemId) {
        self.request_render(id);
        if let Some(item) = self.item_mut(id) {
            item.parent = None;
            item.state = ItemState::NONE;
        }
        self.free_if_unowned(id);
    }

    /// `true` if `ancestor` is `id` or one of its owners.
    fn is_self_or_ancestor(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.item(c).and_then(|n| n.parent);
        }
        false
    }

    /// Checks shared by every operation that gives `child` an owner.
    fn check_adoptable(&self, owner: ItemId, child: ItemId) -> ArenaResult<()> {
        self.live(owner)?;
        let c = self.live(child)?;
        if c.parent.is_some() {
            return Err(ArenaError::structure(format!("{child:?} already has a parent")));
        }
        if self.root == Some(child) {
            return Err(ArenaError::structure(format!("{child:?} is the arena root")));
        }
        if self.is_self_or_ancestor(child, owner) {
            return Err(ArenaError::structure(format!(
                "attaching {child:?} under {owner:?} would create a cycle"
            )));
        }
        Ok(())
    }

    fn check_child_kind(&self, parent: ItemId, child: ItemId) -> ArenaResult<()> {
        match (self.live(parent)?.tag(), self.live(child)?.tag()) {
            (ItemKindTag::Group, _) => Ok(()),
            (ItemKindTag::GlyphsGroup, ItemKindTag::Glyph) => Ok(()),
            (ItemKindTag::GlyphsGroup, _) => Err(ArenaError::WrongKind {
                item: child,
                expected: ItemKindTag::Glyph.name(),
            }),
            (tag, _) => Err(ArenaError::structure(format!(
                "{} items cannot have children",
                tag.name()
            ))),
        }
    }

    // Tree structure

    /// Append `child` as the topmost child of `parent`.
    pub fn append_child(&mut self, parent: ItemId, child: ItemId) -> ArenaResult<()> {
        let after = self.live(parent)?.children.last().copied();
        self.insert_child_after(parent, child, after)
    }

    /// Insert `child` directly above `after`, or as the bottom-most child when `after` is `None`.
    pub fn insert_child_after(
        &mut self,
        parent: ItemId,
        child: ItemId,
        after: Option<ItemId>,
    ) -> ArenaResult<()> {
        self.check_child_kind(parent, child)?;
        self.check_adoptable(parent, child)?;
        let children = &self.live(parent)?.children;
        let at = match after {
            None => 0,
            Some(a) => {
                children.iter().position(|c| *c == a).ok_or_else(|| {
                    ArenaError::structure(format!("{a:?} is not a child of {parent:?}"))
                })? + 1
            }
        };
        self.live_mut(parent)?.children.insert(at, child);
        self.live_mut(child)?.parent = Some(parent);
        self.request_update(parent, ItemState::ALL, false);
        Ok(())
    }

    /// Detach `child` from `parent`. It is freed unless held elsewhere.
    pub fn remove_child(&mut self, parent: ItemId, child: ItemId) -> ArenaResult<()> {
        let p = self.live_mut(parent)?;
        let Some(pos) = p.children.iter().position(|c| *c == child) else {
            return Err(ArenaError::structure(format!(
                "{child:?} is not a child of {parent:?}"
            )));
        };
        p.children.remove(pos);
        self.detach(child);
        self.request_update(parent, ItemState::ALL, false);
        Ok(())
    }

    /// Move `id` to position `order` among its siblings (clamped to the last position).
    pub fn set_order(&mut self, id: ItemId, order: usize) -> ArenaResult<()> {
        let parent = self
            .live(id)?
            .parent
            .ok_or_else(|| ArenaError::structure(format!("{id:?} has no parent")))?;
        let siblings = &mut self.live_mut(parent)?.children;
        let Some(pos) = siblings.iter().position(|c| *c == id) else {
            return Err(ArenaError::structure(format!(
                "{id:?} is not ordered among the children of {parent:?}"
            )));
        };
        siblings.remove(pos);
        let at = order.min(siblings.len());
        siblings.insert(at, id);
        self.request_render(id);
        Ok(())
    }

    /// Parent of `id`, if attached.
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.item(id).and_then(|n| n.parent)
    }

    /// Children bottom to top. Empty for unknown ids.
    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.item(id).map_or(&[], |n| n.children.as_slice())
    }

    // Invalidation

    /// Clear `reset` bits on `id` and its ancestors, then notify observers from the root.
    ///
    /// With `propagate`, the next update of `id` forces recomputation of every bit it lacks.
    pub fn request_update(&mut self, id: ItemId, reset: ItemState, propagate: bool) {
        let Some(item) = self.item_mut(id) else {
            return;
        };
        if propagate {
            item.propagate = true;
        }
        // Mutation is also the way out of an error state.
        let reset = reset | ItemState::INVALID;
        if !item.state.intersects(reset) {
            return;
        }
        item.state.remove(reset);
        let (parent, rect) = (item.parent, item.bbox);
        match parent {
            Some(parent) => self.request_update(parent, reset, false),
            None => self.emit(ArenaEvent::RequestUpdate { item: id, rect }),
        }
    }

    /// Ask observers to repaint the last known bbox of `id`.
    pub fn request_render(&mut self, id: ItemId) {
        if let Some(rect) = self.item(id).map(|n| n.bbox) {
            self.request_render_rect(rect);
        }
    }

    pub(crate) fn request_render_rect(&mut self, rect: IntRect) {
        if !rect.is_empty() {
            self.emit(ArenaEvent::RequestRender { rect });
        }
    }

    // Common item properties

    /// Local transform relative to the parent. Identity is stored as no transform.
    pub fn set_transform(&mut self, id: ItemId, transform: Option<Affine>) -> ArenaResult<()> {
        let current = self.live(id)?.transform.unwrap_or(Affine::IDENTITY);
        let next = transform.unwrap_or(Affine::IDENTITY);
        if affine_close(current, next) {
            return Ok(());
        }
        self.request_render(id);
        self.live_mut(id)?.transform =
            (!affine_close(next, Affine::IDENTITY)).then_some(next);
        self.request_update(id, ItemState::ALL, true);
        Ok(())
    }

    /// Local transform of `id`; `None` for identity or unknown ids.
    pub fn transform(&self, id: ItemId) -> Option<Affine> {
        self.item(id).and_then(|n| n.transform)
    }

    /// Group opacity, clamped to `0..=1`.
    pub fn set_opacity(&mut self, id: ItemId, opacity: f32) -> ArenaResult<()> {
        self.live(id)?;
        self.request_render(id);
        self.live_mut(id)?.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        Ok(())
    }

    /// Hidden items are skipped by every traversal.
    pub fn set_visible(&mut self, id: ItemId, visible: bool) -> ArenaResult<()> {
        self.live_mut(id)?.visible = visible;
        self.request_render(id);
        Ok(())
    }

    /// Whether the item takes part in non-sticky picks.
    pub fn set_sensitive(&mut self, id: ItemId, sensitive: bool) -> ArenaResult<()> {
        self.live_mut(id)?.sensitive = sensitive;
        Ok(())
    }

    /// Use `clip` (an item with no other owner) as the clip path of `id`.
    pub fn set_clip(&mut self, id: ItemId, clip: Option<ItemId>) -> ArenaResult<()> {
        let current = self.live(id)?.clip;
        if current == clip {
            return Ok(());
        }
        if let Some(c) = clip {
            self.check_adoptable(id, c)?;
        }
        self.request_render(id);
        if let Some(old) = current {
            self.live_mut(id)?.clip = None;
            self.detach(old);
        }
        if let Some(c) = clip {
            self.live_mut(c)?.parent = Some(id);
            self.live_mut(id)?.clip = Some(c);
        }
        self.request_update(id, ItemState::ALL, true);
        Ok(())
    }

    /// Clip item attached to `id`.
    pub fn clip_item(&self, id: ItemId) -> Option<ItemId> {
        self.item(id).and_then(|n| n.clip)
    }

    /// Use `mask` (an item with no other owner) as the luminance mask of `id`.
    pub fn set_mask(&mut self, id: ItemId, mask: Option<ItemId>) -> ArenaResult<()> {
        let current = self.live(id)?.mask;
        if current == mask {
            return Ok(());
        }
        if let Some(m) = mask {
            self.check_adoptable(id, m)?;
        }
        self.request_render(id);
        if let Some(old) = current {
            self.live_mut(id)?.mask = None;
            self.detach(old);
        }
        if let Some(m) = mask {
            self.live_mut(m)?.parent = Some(id);
            self.live_mut(id)?.mask = Some(m);
        }
        self.request_update(id, ItemState::ALL, true);
        Ok(())
    }

    /// Mask item attached to `id`.
    pub fn mask_item(&self, id: ItemId) -> Option<ItemId> {
        self.item(id).and_then(|n| n.mask)
    }

    // Shapes

    /// Replace the path of a shape. The cached device path and pick result are dropped.
    pub fn set_path(&mut self, id: ItemId, path: Option<Arc<PathVector>>) -> ArenaResult<()> {
        self.shape_mut(id)?;
        self.request_render(id);
        let shape = self.shape_mut(id)?;
        shape.path = path;
        shape.device_path = None;
        shape.last_pick = None;
        shape.repick_throttle = 0;
        self.request_update(id, ItemState::ALL, false);
        Ok(())
    }

    /// Replace the style of a shape, or the shared style of a glyphs group.
    pub fn set_style(&mut self, id: ItemId, style: Option<Arc<Style>>) -> ArenaResult<()> {
        // A glyphs group style reaches every glyph, so the whole subtree recomputes.
        let propagate = match &mut self.live_mut(id)?.kind {
            ItemKind::Shape(shape) => {
                shape.style = style;
                shape.painter = None;
                shape.last_pick = None;
                shape.repick_throttle = 0;
                false
            }
            ItemKind::GlyphsGroup(group) => {
                group.style = style;
                group.painter = None;
                true
            }
            _ => {
                return Err(ArenaError::WrongKind {
                    item: id,
                    expected: "shape or glyphs group",
                });
            }
        };
        self.request_update(id, ItemState::ALL, propagate);
        Ok(())
    }

    /// Object bounding box used to map paint coordinates, for shapes and glyphs groups.
    pub fn set_paint_box(&mut self, id: ItemId, paint_box: Option<Rect>) -> ArenaResult<()> {
        match &mut self.live_mut(id)?.kind {
            ItemKind::Shape(shape) => shape.paint_box = paint_box,
            ItemKind::GlyphsGroup(group) => group.paint_box = paint_box,
            _ => {
                return Err(ArenaError::WrongKind {
                    item: id,
                    expected: "shape or glyphs group",
                });
            }
        }
        self.request_update(id, ItemState::ALL, false);
        Ok(())
    }

    /// Replace every marker of a shape at once. Markers missing from the new list are detached
    /// (and freed unless held); markers kept in it stay attached.
    pub fn set_markers(&mut self, id: ItemId, markers: Vec<ItemId>) -> ArenaResult<()> {
        let current = self.shape_mut(id)?.markers.clone();
        for (i, m) in markers.iter().enumerate() {
            if markers[..i].contains(m) {
                return Err(ArenaError::structure(format!("{m:?} listed twice as a marker")));
            }
            if current.contains(m) {
                self.live(*m)?;
            } else {
                self.check_adoptable(id, *m)?;
            }
        }
        let old = std::mem::take(&mut self.shape_mut(id)?.markers);
        for m in old {
            if !markers.contains(&m) {
                self.detach(m);
            }
        }
        for m in &markers {
            self.live_mut(*m)?.parent = Some(id);
        }
        self.shape_mut(id)?.markers = markers.into_iter().collect::<ChildList>();
        self.request_update(id, ItemState::ALL, false);
        Ok(())
    }

    /// Marker items of a shape; empty for other kinds.
    pub fn markers(&self, id: ItemId) -> &[ItemId] {
        match self.item(id).map(|n| &n.kind) {
            Some(ItemKind::Shape(shape)) => shape.markers.as_slice(),
            _ => &[],
        }
    }

    // Groups

    /// A transparent group reports the hit child from pick instead of itself.
    pub fn set_group_transparent(&mut self, id: ItemId, transparent: bool) -> ArenaResult<()> {
        match &mut self.live_mut(id)?.kind {
            ItemKind::Group(group) => {
                group.transparent = transparent;
                Ok(())
            }
            _ => Err(ArenaError::WrongKind {
                item: id,
                expected: ItemKindTag::Group.name(),
            }),
        }
    }

    // Glyphs

    /// Point a glyph at outline `glyph` of `font`, placed by `transform`.
    pub fn set_glyph(
        &mut self,
        id: ItemId,
        font: Option<Arc<dyn GlyphOutlines>>,
        glyph: u32,
        transform: Affine,
    ) -> ArenaResult<()> {
        if !matches!(self.live(id)?.kind, ItemKind::Glyph(_)) {
            return Err(ArenaError::WrongKind {
                item: id,
                expected: ItemKindTag::Glyph.name(),
            });
        }
        self.request_render(id);
        let item = self.live_mut(id)?;
        item.transform = (!affine_close(transform, Affine::IDENTITY)).then_some(transform);
        if let ItemKind::Glyph(data) = &mut item.kind {
            data.path = font.as_ref().and_then(|f| f.path_vector(glyph));
            data.font = font;
            data.glyph = glyph;
            data.device_path = None;
        }
        self.request_update(id, ItemState::ALL, false);
        Ok(())
    }

    // Queries

    /// Device bbox computed by the last update.
    pub fn bbox(&self, id: ItemId) -> Option<IntRect> {
        self.item(id).map(|n| n.bbox)
    }

    /// Cached state bits of `id`.
    pub fn state(&self, id: ItemId) -> Option<ItemState> {
        self.item(id).map(|n| n.state)
    }

    /// Device transform recorded by the last update of `id`.
    pub fn ctm(&self, id: ItemId) -> Option<Affine> {
        self.item(id).map(|n| n.ctm)
    }
}

fn affine_close(a: Affine, b: Affine) -> bool {
    a.as_coeffs()
        .iter()
        .zip(b.as_coeffs().iter())
        .all(|(x, y)| (x - y).abs() <= TRANSFORM_EPSILON)
}

#[cfg(test)]
#[path = "../../tests/unit/display/arena.rs"]
mod tests;

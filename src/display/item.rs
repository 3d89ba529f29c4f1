use std::sync::Arc;

use smallvec::SmallVec;

use crate::display::glyphs::GlyphOutlines;
use crate::display::state::ItemState;
use crate::foundation::core::{Affine, BezPath, IntRect, Rect};
use crate::geom::path::PathVector;
use crate::paint::resolve::PaintResolver;
use crate::paint::style::Style;

/// Identifier for an item in an [`crate::Arena`] (generational).
///
/// Ids of freed items never alias a later item in the same slot: every lookup checks the
/// generation as well as the index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u32, pub(crate) u32);

impl ItemId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// The fixed set of display item kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKindTag {
    /// Single filled and stroked path with marker sub-items.
    Shape,
    /// Ordered children, no geometry of its own.
    Group,
    /// Positioned glyph outlines sharing one style.
    GlyphsGroup,
    /// One glyph of a glyphs group.
    Glyph,
}

impl ItemKindTag {
    pub(crate) fn name(self) -> &'static str {
        match self {
            ItemKindTag::Shape => "shape",
            ItemKindTag::Group => "group",
            ItemKindTag::GlyphsGroup => "glyphs group",
            ItemKindTag::Glyph => "glyph",
        }
    }
}

pub(crate) type ChildList = SmallVec<[ItemId; 4]>;

pub(crate) struct Item {
    pub(crate) generation: u32,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: ChildList,
    /// External references taken through `create_*` and `hold`.
    pub(crate) holds: u32,
    pub(crate) state: ItemState,
    pub(crate) propagate: bool,
    pub(crate) bbox: IntRect,
    /// Device transform of the last update.
    pub(crate) ctm: Affine,
    pub(crate) transform: Option<Affine>,
    pub(crate) opacity: f32,
    pub(crate) visible: bool,
    pub(crate) sensitive: bool,
    pub(crate) clip: Option<ItemId>,
    pub(crate) mask: Option<ItemId>,
    pub(crate) kind: ItemKind,
}

impl Item {
    pub(crate) fn new(generation: u32, kind: ItemKind) -> Self {
        Self {
            generation,
            parent: None,
            children: ChildList::new(),
            holds: 1,
            state: ItemState::NONE,
            propagate: false,
            bbox: IntRect::EMPTY,
            ctm: Affine::IDENTITY,
            transform: None,
            opacity: 1.0,
            visible: true,
            sensitive: true,
            clip: None,
            mask: None,
            kind,
        }
    }

    pub(crate) fn tag(&self) -> ItemKindTag {
        match self.kind {
            ItemKind::Shape(_) => ItemKindTag::Shape,
            ItemKind::Group(_) => ItemKindTag::Group,
            ItemKind::GlyphsGroup(_) => ItemKindTag::GlyphsGroup,
            ItemKind::Glyph(_) => ItemKindTag::Glyph,
        }
    }

    /// Items owned by this one: children, markers, the clip item and the mask item.
    pub(crate) fn owned(&self) -> ChildList {
        let mut out = self.children.clone();
        if let ItemKind::Shape(shape) = &self.kind {
            out.extend(shape.markers.iter().copied());
        }
        out.extend(self.clip);
        out.extend(self.mask);
        out
    }
}

pub(crate) enum ItemKind {
    Shape(Box<ShapeData>),
    Group(GroupData),
    GlyphsGroup(GlyphsGroupData),
    Glyph(GlyphData),
}

#[derive(Default)]
pub(crate) struct ShapeData {
    pub(crate) path: Option<Arc<PathVector>>,
    pub(crate) style: Option<Arc<Style>>,
    pub(crate) paint_box: Option<Rect>,
    pub(crate) markers: ChildList,
    /// Cheap box from control points, used to decide on delayed realization.
    pub(crate) approx_bbox: IntRect,
    /// Device path has not been built yet because the shape was off-screen at update.
    pub(crate) delayed: bool,
    /// Device path together with the transform it was built for.
    pub(crate) device_path: Option<(Affine, BezPath)>,
    pub(crate) painter: Option<Box<dyn PaintResolver>>,
    pub(crate) last_pick: Option<ItemId>,
    pub(crate) repick_throttle: u32,
}

#[derive(Default)]
pub(crate) struct GroupData {
    pub(crate) transparent: bool,
}

#[derive(Default)]
pub(crate) struct GlyphsGroupData {
    pub(crate) style: Option<Arc<Style>>,
    pub(crate) paint_box: Option<Rect>,
    pub(crate) painter: Option<Box<dyn PaintResolver>>,
}

#[derive(Default)]
pub(crate) struct GlyphData {
    pub(crate) font: Option<Arc<dyn GlyphOutlines>>,
    pub(crate) glyph: u32,
    pub(crate) path: Option<Arc<PathVector>>,
    pub(crate) device_path: Option<BezPath>,
}

//! Vector Arena is a retained-mode 2D scene graph for vector drawings.
//!
//! Items live in an [`Arena`] and are addressed by generational [`ItemId`]s. Four traversals
//! walk the tree:
//!
//! - `update` recomputes device transforms, bounding boxes and cached device paths
//! - `render` draws through a [`DrawContext`] backend
//! - `clip` contributes item geometry to a clip region
//! - `pick` finds the topmost item under a device point
//!
//! Mutations mark items stale with [`ItemState`] bits and notify subscribed observers so a host
//! can schedule the next update and repaint.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Item storage and the update/render/clip/pick traversals.
pub mod display;
/// Path model, device-space feeding and point hit tests.
pub mod geom;
/// Styles and paint resolution.
pub mod paint;
/// Drawing backends.
pub mod render;

pub use crate::foundation::core::{Affine, BezPath, IntRect, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{ArenaError, ArenaResult};

pub use crate::display::arena::{
    Arena, ArenaEvent, ArenaObserver, HostCanvas, ObserverId, PickStats, RenderMode,
};
pub use crate::display::gc::GraphicsContext;
pub use crate::display::glyphs::{GlyphOutlines, OutlineFont};
pub use crate::display::item::{ItemId, ItemKindTag};
pub use crate::display::opts::{ArenaOpts, PickClock, SystemClock};
pub use crate::display::state::{ItemState, RenderFlags};
pub use crate::geom::feed::PathSink;
pub use crate::geom::path::{PathVector, Segment, Subpath};
pub use crate::paint::resolve::{PaintFactory, PaintResolver, StylePaint};
pub use crate::paint::style::{
    FillRule, GradientStop, GradientUnits, LineCap, LineJoin, Paint, PaintKind, Style,
};
pub use crate::render::backend::{DrawContext, FrameRGBA, PaintSource, StrokeStyle, TileImage};
pub use crate::render::cpu::{CpuDrawContext, CpuRenderer, CpuRendererOpts};
pub use crate::render::recording::{DrawCommand, RecordingContext};

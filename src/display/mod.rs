//! The display tree: items, the arena that owns them and the update/render/clip/pick
//! traversals.

/// Arena: item storage, tree structure, properties and the observer channel.
pub mod arena;
/// Graphics context passed down traversals.
pub mod gc;
/// Glyph outline sources and the glyphs-group kinds.
pub mod glyphs;
mod group;
/// Item ids and per-kind payloads.
pub mod item;
/// Arena tunables and the pick clock.
pub mod opts;
mod shape;
/// Item state and render flag bitmasks.
pub mod state;
mod traverse;

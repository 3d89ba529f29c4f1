//! Path geometry: the path model, the device-space feeder and point hit tests.

/// Feeding paths into path sinks, with optional stroke culling.
pub mod feed;
/// Winding and distance measurements used by picking.
pub mod hit;
/// Path model: subpaths of line, curve and arc segments.
pub mod path;

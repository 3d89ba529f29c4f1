//! Style snapshots and paint resolution.

/// Resolving fill and stroke paint against a drawing context.
pub mod resolve;
/// Style snapshot model.
pub mod style;

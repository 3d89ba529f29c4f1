//! Drawing backends behind the [`backend::DrawContext`] seam.

/// The drawing context trait and backend-neutral paint and stroke types.
pub mod backend;
/// vello_cpu rasterizer backend.
pub mod cpu;
/// Call-recording backend for tests and diagnostics.
pub mod recording;

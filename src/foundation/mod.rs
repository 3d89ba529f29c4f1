//! Shared primitives: device rectangles, colors, errors and small numeric helpers.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;

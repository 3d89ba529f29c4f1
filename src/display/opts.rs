use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{ArenaError, ArenaResult};

/// Tunables of an [`crate::Arena`].
///
/// The pick-throttle thresholds are wall-clock heuristics; treat them as knobs, not as
/// behavior to reproduce exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaOpts {
    /// Exact pick tests slower than this (milliseconds) engage the throttle.
    pub pick_slow_threshold_ms: f64,
    /// The throttle skips `cost / pick_skip_unit_ms` subsequent exact tests.
    pub pick_skip_unit_ms: f64,
    /// Flattening tolerance for outline-mode strokes, in device pixels.
    pub outline_tolerance: f64,
    /// Flattening tolerance for regular strokes, in device pixels.
    pub stroke_tolerance: f64,
    /// Device width of outline-mode strokes.
    pub outline_line_width: f64,
    /// Minimum device stroke width considered by bbox expansion and pick.
    pub min_stroke_width: f64,
    /// Defer device path realization for shapes outside the update area.
    pub delayed_shapes: bool,
}

impl Default for ArenaOpts {
    fn default() -> Self {
        Self {
            pick_slow_threshold_ms: 10.0,
            pick_skip_unit_ms: 5.0,
            outline_tolerance: 1.25,
            stroke_tolerance: 0.1,
            outline_line_width: 0.5,
            min_stroke_width: 0.125,
            delayed_shapes: true,
        }
    }
}

impl ArenaOpts {
    /// Defaults overlaid with `VECTOR_ARENA_PICK_SLOW_MS`, `VECTOR_ARENA_PICK_SKIP_MS` and
    /// `VECTOR_ARENA_DELAYED_SHAPES`. Unparseable or out-of-range values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let pick_slow_threshold_ms = lookup("VECTOR_ARENA_PICK_SLOW_MS")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|&ms| ms.is_finite() && ms >= 0.0)
            .unwrap_or(defaults.pick_slow_threshold_ms);
        let pick_skip_unit_ms = lookup("VECTOR_ARENA_PICK_SKIP_MS")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|&ms| ms.is_finite() && ms > 0.0)
            .unwrap_or(defaults.pick_skip_unit_ms);
        let delayed_shapes = lookup("VECTOR_ARENA_DELAYED_SHAPES")
            .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" => Some(false),
                _ => None,
            })
            .unwrap_or(defaults.delayed_shapes);
        Self {
            pick_slow_threshold_ms,
            pick_skip_unit_ms,
            delayed_shapes,
            ..defaults
        }
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(s: &str) -> ArenaResult<Self> {
        let opts: ArenaOpts =
            serde_json::from_str(s).map_err(|e| ArenaError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// [`ArenaOpts::from_json`] over the contents of the file at `path`.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> ArenaResult<Self> {
        use anyhow::Context as _;
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read arena options '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Reject non-finite or out-of-range knobs.
    pub fn validate(&self) -> ArenaResult<()> {
        if !(self.pick_slow_threshold_ms.is_finite() && self.pick_slow_threshold_ms >= 0.0) {
            return Err(ArenaError::validation(
                "pick_slow_threshold_ms must be finite and >= 0",
            ));
        }
        if !(self.pick_skip_unit_ms.is_finite() && self.pick_skip_unit_ms > 0.0) {
            return Err(ArenaError::validation(
                "pick_skip_unit_ms must be finite and > 0",
            ));
        }
        for (name, v) in [
            ("outline_tolerance", self.outline_tolerance),
            ("stroke_tolerance", self.stroke_tolerance),
            ("outline_line_width", self.outline_line_width),
            ("min_stroke_width", self.min_stroke_width),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ArenaError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }

    /// Set `pick_slow_threshold_ms`.
    pub fn with_pick_slow_threshold_ms(mut self, ms: f64) -> Self {
        self.pick_slow_threshold_ms = ms;
        self
    }

    /// Set `pick_skip_unit_ms`.
    pub fn with_pick_skip_unit_ms(mut self, ms: f64) -> Self {
        self.pick_skip_unit_ms = ms;
        self
    }

    /// Set `outline_tolerance`.
    pub fn with_outline_tolerance(mut self, tolerance: f64) -> Self {
        self.outline_tolerance = tolerance;
        self
    }

    /// Set `stroke_tolerance`.
    pub fn with_stroke_tolerance(mut self, tolerance: f64) -> Self {
        self.stroke_tolerance = tolerance;
        self
    }

    /// Set `outline_line_width`.
    pub fn with_outline_line_width(mut self, width: f64) -> Self {
        self.outline_line_width = width;
        self
    }

    /// Set `min_stroke_width`.
    pub fn with_min_stroke_width(mut self, width: f64) -> Self {
        self.min_stroke_width = width;
        self
    }

    /// Enable or disable delayed shape realization.
    pub fn with_delayed_shapes(mut self, enabled: bool) -> Self {
        self.delayed_shapes = enabled;
        self
    }
}

/// Millisecond clock used to time exact pick tests.
pub trait PickClock {
    /// Monotonic time in milliseconds from an arbitrary origin.
    fn now_ms(&self) -> f64;
}

/// [`PickClock`] backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose zero is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PickClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/opts.rs"]
mod tests;

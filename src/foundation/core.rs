use crate::foundation::math::mul_div255_u8;

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Integer device-space rectangle, half-open on the right and bottom edges.
///
/// Bounding boxes are stored in this form after outward rounding (floor of the minimum, ceil of
/// the maximum). [`IntRect::EMPTY`] is the distinguished "nothing here" value: it is the
/// identity for [`IntRect::union`] and never intersects anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IntRect {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl IntRect {
    /// The canonical empty rectangle.
    pub const EMPTY: Self = Self {
        x0: i32::MAX,
        y0: i32::MAX,
        x1: i32::MIN,
        y1: i32::MIN,
    };

    /// Build a rectangle from its edges. No normalization is applied.
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Round a floating-point rectangle outward to whole pixels.
    ///
    /// Non-finite or inverted input yields [`IntRect::EMPTY`].
    pub fn from_rect_outward(r: Rect) -> Self {
        let finite = r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite();
        if !finite || r.x1 < r.x0 || r.y1 < r.y0 {
            return Self::EMPTY;
        }
        let clamp = |v: f64| v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
        Self {
            x0: clamp(r.x0.floor()),
            y0: clamp(r.y0.floor()),
            x1: clamp(r.x1.ceil()),
            y1: clamp(r.y1.ceil()),
        }
    }

    /// Whether the rectangle covers no pixel. [`IntRect::EMPTY`] is empty.
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Width in pixels; zero when empty.
    pub fn width(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }
        (i64::from(self.x1) - i64::from(self.x0)).min(i64::from(u32::MAX)) as u32
    }

    /// Height in pixels; zero when empty.
    pub fn height(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }
        (i64::from(self.y1) - i64::from(self.y0)).min(i64::from(u32::MAX)) as u32
    }

    /// Overlap of two rectangles, [`IntRect::EMPTY`] when they do not overlap.
    pub fn intersect(&self, other: &IntRect) -> IntRect {
        let r = IntRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if r.is_empty() { Self::EMPTY } else { r }
    }

    /// Whether the open interiors overlap.
    pub fn intersects(&self, other: &IntRect) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Inclusive overlap test: rectangles sharing only an edge touch.
    pub fn touches(&self, other: &IntRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x0 <= other.x1
            && other.x0 <= self.x1
            && self.y0 <= other.y1
            && other.y0 <= self.y1
    }

    /// Smallest rectangle containing both. Empty operands are ignored.
    pub fn union(&self, other: &IntRect) -> IntRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        IntRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow by `d` pixels on every side (shrink for negative `d`).
    pub fn expand(&self, d: i32) -> IntRect {
        if self.is_empty() {
            return *self;
        }
        let r = IntRect {
            x0: self.x0.saturating_sub(d),
            y0: self.y0.saturating_sub(d),
            x1: self.x1.saturating_add(d),
            y1: self.y1.saturating_add(d),
        };
        if r.is_empty() { Self::EMPTY } else { r }
    }

    /// Whether `p` lies inside, edges included on the low side.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= f64::from(self.x0)
            && p.x < f64::from(self.x1)
            && p.y >= f64::from(self.y0)
            && p.y < f64::from(self.y1)
    }

    /// Same rectangle in floating point. Empty rectangles map to [`Rect::ZERO`].
    pub fn to_rect(&self) -> Rect {
        if self.is_empty() {
            return Rect::ZERO;
        }
        Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }
}

impl Default for IntRect {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Straight (non-premultiplied) color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Decode a packed `0xRRGGBBAA` value.
    pub const fn from_u32(rgba: u32) -> Self {
        Self {
            r: (rgba >> 24) as u8,
            g: (rgba >> 16) as u8,
            b: (rgba >> 8) as u8,
            a: rgba as u8,
        }
    }

    /// Scale alpha by `opacity` (clamped to `0..=1`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: (f32::from(self.a) * o).round() as u8,
            ..self
        }
    }

    /// Whether alpha is zero.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Premultiplied `[r, g, b, a]` bytes.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        [
            mul_div255_u8(u16::from(self.r), a),
            mul_div255_u8(u16::from(self.g), a),
            mul_div255_u8(u16::from(self.b), a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

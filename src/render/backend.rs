use std::sync::Arc;

use crate::foundation::core::{Affine, Point, Rgba8};
use crate::geom::feed::PathSink;
use crate::paint::style::{FillRule, GradientStop, LineCap, LineJoin, Style};

/// A rendered area as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag is included to make this explicit
/// at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` relative to the frame origin, `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Premultiplied RGBA8 image produced by [`DrawContext::rasterize_tile`].
#[derive(Clone, Debug, PartialEq)]
pub struct TileImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, row-major.
    pub data: Vec<u8>,
}

/// Device-space stroke parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Line width in device pixels.
    pub width: f64,
    /// Cap style.
    pub cap: LineCap,
    /// Join style.
    pub join: LineJoin,
    /// Miter limit ratio.
    pub miter_limit: f64,
    /// Dash lengths in device pixels.
    pub dash_array: Vec<f64>,
    /// Dash phase in device pixels.
    pub dash_offset: f64,
}

impl StrokeStyle {
    /// Plain solid line of `width` device pixels, as used for outline rendering.
    pub fn hairline(width: f64) -> Self {
        Self {
            width,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
        }
    }

    /// The style's stroke, with lengths scaled from user units by `scale`.
    pub fn from_style(style: &Style, scale: f64) -> Self {
        Self {
            width: style.stroke_width * scale,
            cap: style.line_cap,
            join: style.line_join,
            miter_limit: style.miter_limit,
            dash_array: style.dash_array.iter().map(|d| d * scale).collect(),
            dash_offset: style.dash_offset * scale,
        }
    }
}

/// Resolved paint, ready for a drawing backend.
///
/// Gradient and image geometry is expressed in paint space; `transform` maps it to device space.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintSource {
    /// Straight-alpha color.
    Solid(Rgba8),
    /// Linear gradient.
    Linear {
        /// Start point in paint space.
        start: Point,
        /// End point in paint space.
        end: Point,
        /// Stops with opacity already applied.
        stops: Vec<GradientStop>,
        /// Paint space to device space.
        transform: Affine,
    },
    /// Radial gradient.
    Radial {
        /// Center in paint space.
        center: Point,
        /// Radius in paint space.
        radius: f64,
        /// Stops with opacity already applied.
        stops: Vec<GradientStop>,
        /// Paint space to device space.
        transform: Affine,
    },
    /// Repeating raster tile.
    Image {
        /// Tile pixels.
        tile: Arc<TileImage>,
        /// Tile pixel space to device space.
        transform: Affine,
    },
}

/// The drawing backend seam used by render and clip traversals.
///
/// Path building goes through the [`PathSink`] supertrait in device coordinates; `new_path`
/// discards the current path. Layers pushed with [`DrawContext::push_clip`],
/// [`DrawContext::push_mask`] and [`DrawContext::push_opacity_layer`] are closed by
/// [`DrawContext::pop_layer`] in LIFO order.
pub trait DrawContext: PathSink {
    /// Discard the current path.
    fn new_path(&mut self);
    /// Flattening tolerance hint in device pixels.
    fn set_tolerance(&mut self, tolerance: f64);
    /// Fill rule for the next `fill` or `clip_fill`.
    fn set_fill_rule(&mut self, rule: FillRule);
    /// Stroke parameters for the next `stroke`.
    fn set_stroke_style(&mut self, style: &StrokeStyle);
    /// Paint for the next `fill` or `stroke`.
    fn set_source(&mut self, source: &PaintSource);
    /// Fill the current path.
    fn fill(&mut self);
    /// Stroke the current path.
    fn stroke(&mut self);
    /// Start collecting a new clip region.
    fn begin_clip(&mut self);
    /// Add the current path (with the current fill rule) to the clip region being collected.
    fn clip_fill(&mut self);
    /// Restrict drawing to the collected clip region. Returns `false` when the layer could not
    /// be established, in which case nothing was pushed.
    fn push_clip(&mut self) -> bool;
    /// Composite subsequent drawing through the luminance of what `draw` paints, rendered
    /// off-screen over the same device area. `draw` returns `false` on failure. Returns `false`
    /// when `draw` failed or the layer could not be established, in which case nothing was
    /// pushed.
    fn push_mask(&mut self, draw: &mut dyn FnMut(&mut dyn DrawContext) -> bool) -> bool;
    /// Composite subsequent drawing at `opacity`. Returns `false` when the layer could not be
    /// established, in which case nothing was pushed.
    fn push_opacity_layer(&mut self, opacity: f32) -> bool;
    /// Close the most recently pushed layer.
    fn pop_layer(&mut self);
    /// Render `draw` into an off-screen `width`×`height` tile. `None` when the buffer cannot be
    /// allocated.
    fn rasterize_tile(
        &mut self,
        width: u32,
        height: u32,
        draw: &mut dyn FnMut(&mut dyn DrawContext),
    ) -> Option<TileImage>;
}

use crate::foundation::core::Point;
use crate::geom::feed::PathSink;
use crate::paint::style::FillRule;
use crate::render::backend::{DrawContext, PaintSource, StrokeStyle, TileImage};

/// One call made on a [`RecordingContext`].
///
/// Variants mirror the [`DrawContext`] and [`PathSink`] methods of the same name.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    NewPath,
    SetTolerance(f64),
    SetFillRule(FillRule),
    SetStroke(StrokeStyle),
    SetSource(PaintSource),
    Fill,
    Stroke,
    BeginClip,
    ClipFill,
    PushClip,
    /// A mask layer was pushed; `drawn` holds what was drawn into the mask.
    PushMask {
        drawn: Vec<DrawCommand>,
    },
    PushOpacity(f32),
    PopLayer,
    /// An off-screen tile was requested; `drawn` holds what was drawn into it.
    RasterizeTile {
        width: u32,
        height: u32,
        drawn: Vec<DrawCommand>,
    },
}

/// [`DrawContext`] that records every call instead of drawing.
///
/// Layer pushes and tile allocations can be made to fail, to exercise the paths where a
/// backend cannot provide an off-screen buffer.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    fail_layers: bool,
    fail_tiles: bool,
}

impl RecordingContext {
    /// Empty recorder whose layers always succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `push_clip`, `push_mask` and `push_opacity_layer` report failure.
    pub fn with_failing_layers(mut self, fail: bool) -> Self {
        self.fail_layers = fail;
        self
    }

    /// Make `rasterize_tile` report allocation failure.
    pub fn with_failing_tiles(mut self, fail: bool) -> Self {
        self.fail_tiles = fail;
        self
    }

    /// Commands recorded so far, oldest first.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded commands equal to `cmd`.
    pub fn count(&self, cmd: &DrawCommand) -> usize {
        self.commands.iter().filter(|c| *c == cmd).count()
    }

    /// Number of `fill` plus `stroke` calls.
    pub fn paint_ops(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill | DrawCommand::Stroke))
            .count()
    }
}

impl PathSink for RecordingContext {
    fn move_to(&mut self, p: Point) {
        self.commands.push(DrawCommand::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.commands.push(DrawCommand::LineTo(p));
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.commands.push(DrawCommand::CurveTo(c1, c2, p));
    }
}

impl DrawContext for RecordingContext {
    fn new_path(&mut self) {
        self.commands.push(DrawCommand::NewPath);
    }

    fn set_tolerance(&mut self, tolerance: f64) {
        self.commands.push(DrawCommand::SetTolerance(tolerance));
    }

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.commands.push(DrawCommand::SetFillRule(rule));
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.commands.push(DrawCommand::SetStroke(style.clone()));
    }

    fn set_source(&mut self, source: &PaintSource) {
        self.commands.push(DrawCommand::SetSource(source.clone()));
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn begin_clip(&mut self) {
        self.commands.push(DrawCommand::BeginClip);
    }

    fn clip_fill(&mut self) {
        self.commands.push(DrawCommand::ClipFill);
    }

    fn push_clip(&mut self) -> bool {
        if self.fail_layers {
            return false;
        }
        self.commands.push(DrawCommand::PushClip);
        true
    }

    fn push_mask(&mut self, draw: &mut dyn FnMut(&mut dyn DrawContext) -> bool) -> bool {
        if self.fail_layers {
            return false;
        }
        let mut inner = RecordingContext::new();
        if !draw(&mut inner) {
            return false;
        }
        self.commands.push(DrawCommand::PushMask {
            drawn: inner.commands,
        });
        true
    }

    fn push_opacity_layer(&mut self, opacity: f32) -> bool {
        if self.fail_layers {
            return false;
        }
        self.commands.push(DrawCommand::PushOpacity(opacity));
        true
    }

    fn pop_layer(&mut self) {
        self.commands.push(DrawCommand::PopLayer);
    }

    fn rasterize_tile(
        &mut self,
        width: u32,
        height: u32,
        draw: &mut dyn FnMut(&mut dyn DrawContext),
    ) -> Option<TileImage> {
        if self.fail_tiles {
            return None;
        }
        let mut inner = RecordingContext::new();
        draw(&mut inner);
        self.commands.push(DrawCommand::RasterizeTile {
            width,
            height,
            drawn: inner.commands,
        });
        Some(TileImage {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;

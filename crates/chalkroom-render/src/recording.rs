//! Surface that records paint calls instead of rasterizing them.

use crate::surface::{FontSpec, Surface};
use kurbo::{Affine, BezPath, Point, Size, Stroke};
use peniko::Color;

/// One recorded paint call. Colors are kept as 8-bit RGBA.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Clear {
        viewport: Size,
        background: [u8; 4],
    },
    Stroke {
        width: f64,
        transform: Affine,
        color: [u8; 4],
        path: BezPath,
    },
    Fill {
        transform: Affine,
        color: [u8; 4],
        path: BezPath,
    },
    Text {
        text: String,
        font: FontSpec,
        transform: Affine,
        color: [u8; 4],
        origin: Point,
    },
}

/// Records the paint calls of the current frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<PaintOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint calls since the last clear.
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<PaintOp> {
        std::mem::take(&mut self.ops)
    }
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

impl Surface for RecordingSurface {
    fn clear(&mut self, viewport: Size, background: Color) {
        self.ops.clear();
        self.ops.push(PaintOp::Clear {
            viewport,
            background: rgba(background),
        });
    }

    fn stroke(&mut self, style: &Stroke, transform: Affine, color: Color, path: &BezPath) {
        self.ops.push(PaintOp::Stroke {
            width: style.width,
            transform,
            color: rgba(color),
            path: path.clone(),
        });
    }

    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath) {
        self.ops.push(PaintOp::Fill {
            transform,
            color: rgba(color),
            path: path.clone(),
        });
    }

    fn fill_text(&mut self, text: &str, font: &FontSpec, transform: Affine, color: Color, origin: Point) {
        self.ops.push(PaintOp::Text {
            text: text.to_string(),
            font: *font,
            transform,
            color: rgba(color),
            origin,
        });
    }
}

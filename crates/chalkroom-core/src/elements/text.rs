//! Text labels and code blocks.

use super::{Geometry, SerializableColor, point_is_finite};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default font size for text labels.
pub const TEXT_FONT_SIZE: f64 = 20.0;

/// Fixed-width font size for code blocks.
pub const CODE_FONT_SIZE: f64 = 14.0;

/// Baseline-to-baseline distance between code lines.
pub const CODE_LINE_HEIGHT: f64 = 20.0;

/// Width of the translucent panel behind a code block.
pub const CODE_PANEL_WIDTH: f64 = 400.0;

/// Offset of the panel's top-left corner from the code anchor.
pub const CODE_PANEL_INSET: Vec2 = Vec2::new(-5.0, -15.0);

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;

fn default_text_size() -> f64 {
    TEXT_FONT_SIZE
}

fn default_code_size() -> f64 {
    CODE_FONT_SIZE
}

/// A single-line text label anchored at its baseline start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(rename = "fontSize", default = "default_text_size")]
    pub font_size: f64,
    #[serde(default)]
    pub color: SerializableColor,
}

impl Text {
    pub fn new(anchor: Point, text: String, color: SerializableColor) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            text,
            font_size: TEXT_FONT_SIZE,
            color,
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl Geometry for Text {
    fn bounds(&self) -> Rect {
        let width = self.text.chars().count() as f64 * self.font_size * GLYPH_ADVANCE;
        Rect::new(self.x, self.y - self.font_size, self.x + width, self.y)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn is_finite(&self) -> bool {
        point_is_finite(self.anchor()) && self.font_size.is_finite()
    }

    fn drag_to(&mut self, _start: Point, _current: Point) {}
}

/// A multi-line code block painted over a translucent panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(rename = "fontSize", default = "default_code_size")]
    pub font_size: f64,
    #[serde(default)]
    pub color: SerializableColor,
}

impl CodeBlock {
    pub fn new(anchor: Point, text: String, color: SerializableColor) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            text,
            font_size: CODE_FONT_SIZE,
            color,
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Source lines, split on `\n` (a trailing newline yields an empty last line).
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Background panel: fixed width, height proportional to the line count.
    pub fn panel(&self) -> Rect {
        let origin = self.anchor() + CODE_PANEL_INSET;
        let height = self.line_count() as f64 * CODE_LINE_HEIGHT + 10.0;
        Rect::new(origin.x, origin.y, origin.x + CODE_PANEL_WIDTH, origin.y + height)
    }
}

impl Geometry for CodeBlock {
    fn bounds(&self) -> Rect {
        self.panel()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.panel().inflate(tolerance, tolerance).contains(point)
    }

    fn is_finite(&self) -> bool {
        point_is_finite(self.anchor()) && self.font_size.is_finite()
    }

    fn drag_to(&mut self, _start: Point, _current: Point) {}
}

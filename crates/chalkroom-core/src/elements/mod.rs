//! Element definitions for the whiteboard.
//!
//! Every drawable object on a board is an [`Element`]. The enum is the wire
//! format as well: it serializes to the JSON objects the room service stores
//! (`{"type": "pen", "points": [...], "color": "#00ff00"}` and friends).

mod frame;
mod segment;
mod stroke;
mod text;

pub use frame::Frame;
pub use segment::{ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, Segment};
pub use stroke::Stroke;
pub use text::{
    CODE_FONT_SIZE, CODE_LINE_HEIGHT, CODE_PANEL_INSET, CODE_PANEL_WIDTH, CodeBlock, TEXT_FONT_SIZE,
    Text,
};

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stroke width of outlines and polylines, in logical units at scale 1.0.
pub const STROKE_WIDTH: f64 = 2.0;

/// Accent color given to elements that don't carry one.
pub const ACCENT_COLOR: SerializableColor = SerializableColor::new(0x00, 0xff, 0x00, 0xff);

/// Errors raised while building an element from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    #[error("input rejected: {0} payload is empty")]
    InputRejected(&'static str),
    #[error("stroke needs at least one point")]
    EmptyStroke,
    #[error("element geometry contains a non-finite number")]
    NonFinite,
    #[error("font size must be positive")]
    BadFontSize,
    #[error("tool `{0}` cannot build an element from pointer samples")]
    UnsupportedTool(ToolKind),
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
}

/// RGBA8 color that travels as a CSS hex string (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
                255,
            )),
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        ACCENT_COLOR
    }
}

impl From<String> for SerializableColor {
    fn from(value: String) -> Self {
        Self::parse_hex(&value).unwrap_or_else(|| {
            log::debug!("Unrecognised color {value:?}, using accent");
            ACCENT_COLOR
        })
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Drawing tools the shell can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Text,
    Code,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Rectangle => "rect",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Line => "line",
            ToolKind::Arrow => "arrow",
            ToolKind::Text => "text",
            ToolKind::Code => "code",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pen" | "stroke" | "freehand" => Ok(ToolKind::Pen),
            "rect" | "rectangle" => Ok(ToolKind::Rectangle),
            "ellipse" => Ok(ToolKind::Ellipse),
            "line" => Ok(ToolKind::Line),
            "arrow" => Ok(ToolKind::Arrow),
            "text" => Ok(ToolKind::Text),
            "code" => Ok(ToolKind::Code),
            other => Err(ElementError::UnknownTool(other.to_string())),
        }
    }
}

/// Geometry shared by every element kind.
pub trait Geometry {
    /// Axis-aligned bounding box in logical coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a logical point hits this element.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Whether every coordinate is a finite number.
    fn is_finite(&self) -> bool;

    /// Follow the pointer while the element is being drawn.
    fn drag_to(&mut self, start: Point, current: Point);
}

/// A drawable object. Array position on the board is its z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Element {
    #[serde(rename = "pen")]
    Stroke(Stroke),
    #[serde(rename = "rect")]
    Rectangle(Frame),
    #[serde(rename = "ellipse")]
    Ellipse(Frame),
    #[serde(rename = "line")]
    Line(Segment),
    #[serde(rename = "arrow")]
    Arrow(Segment),
    #[serde(rename = "text")]
    Text(Text),
    #[serde(rename = "code")]
    Code(CodeBlock),
}

impl Element {
    /// Build an element from a drag tool and its pointer samples (logical space).
    ///
    /// Pen keeps every sample; shape tools use the first sample as anchor and
    /// the last as the far corner or endpoint.
    pub fn from_samples(
        tool: ToolKind,
        samples: &[Point],
        color: SerializableColor,
    ) -> Result<Self, ElementError> {
        let (Some(&first), Some(&last)) = (samples.first(), samples.last()) else {
            return Err(ElementError::EmptyStroke);
        };
        let delta = last - first;
        let element = match tool {
            ToolKind::Pen => Element::Stroke(Stroke::from_points(samples.to_vec(), color)),
            ToolKind::Rectangle => Element::Rectangle(Frame::new(first, delta, color)),
            ToolKind::Ellipse => Element::Ellipse(Frame::new(first, delta, color)),
            ToolKind::Line => Element::Line(Segment::new(first, delta, color)),
            ToolKind::Arrow => Element::Arrow(Segment::new(first, delta, color)),
            ToolKind::Text | ToolKind::Code => return Err(ElementError::UnsupportedTool(tool)),
        };
        element.validate()?;
        Ok(element)
    }

    /// Start the in-progress element for a drag tool at `start`.
    pub fn begin(tool: ToolKind, start: Point, color: SerializableColor) -> Result<Self, ElementError> {
        Self::from_samples(tool, &[start], color)
    }

    /// Build a text element. Empty payloads are rejected.
    pub fn text(anchor: Point, content: &str, color: SerializableColor) -> Result<Self, ElementError> {
        if content.is_empty() {
            return Err(ElementError::InputRejected("text"));
        }
        let element = Element::Text(Text::new(anchor, content.to_string(), color));
        element.validate()?;
        Ok(element)
    }

    /// Build a code block. Empty payloads are rejected.
    pub fn code(anchor: Point, source: &str, color: SerializableColor) -> Result<Self, ElementError> {
        if source.is_empty() {
            return Err(ElementError::InputRejected("code"));
        }
        let element = Element::Code(CodeBlock::new(anchor, source.to_string(), color));
        element.validate()?;
        Ok(element)
    }

    /// Check the geometry invariants: finite numbers, non-empty strokes,
    /// positive font sizes.
    pub fn validate(&self) -> Result<(), ElementError> {
        if !self.geometry().is_finite() {
            return Err(ElementError::NonFinite);
        }
        match self {
            Element::Stroke(stroke) if stroke.points.is_empty() => Err(ElementError::EmptyStroke),
            Element::Text(Text { font_size, .. }) | Element::Code(CodeBlock { font_size, .. })
                if *font_size <= 0.0 =>
            {
                Err(ElementError::BadFontSize)
            }
            _ => Ok(()),
        }
    }

    /// The tool that produces this kind of element.
    pub fn tool(&self) -> ToolKind {
        match self {
            Element::Stroke(_) => ToolKind::Pen,
            Element::Rectangle(_) => ToolKind::Rectangle,
            Element::Ellipse(_) => ToolKind::Ellipse,
            Element::Line(_) => ToolKind::Line,
            Element::Arrow(_) => ToolKind::Arrow,
            Element::Text(_) => ToolKind::Text,
            Element::Code(_) => ToolKind::Code,
        }
    }

    pub fn color(&self) -> SerializableColor {
        match self {
            Element::Stroke(s) => s.color,
            Element::Rectangle(f) | Element::Ellipse(f) => f.color,
            Element::Line(s) | Element::Arrow(s) => s.color,
            Element::Text(t) => t.color,
            Element::Code(c) => c.color,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Element::Arrow(s) => s.arrow_bounds(),
            _ => self.geometry().bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Element::Ellipse(f) => f.hit_test_ellipse(point, tolerance),
            _ => self.geometry().hit_test(point, tolerance),
        }
    }

    /// Follow the pointer from `start` to `current` (no-op for text and code).
    pub fn drag_to(&mut self, start: Point, current: Point) {
        match self {
            Element::Stroke(s) => s.drag_to(start, current),
            Element::Rectangle(f) | Element::Ellipse(f) => f.drag_to(start, current),
            Element::Line(s) | Element::Arrow(s) => s.drag_to(start, current),
            Element::Text(t) => t.drag_to(start, current),
            Element::Code(c) => c.drag_to(start, current),
        }
    }

    fn geometry(&self) -> &dyn Geometry {
        match self {
            Element::Stroke(s) => s,
            Element::Rectangle(f) | Element::Ellipse(f) => f,
            Element::Line(s) | Element::Arrow(s) => s,
            Element::Text(t) => t,
            Element::Code(c) => c,
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

pub(crate) fn point_is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

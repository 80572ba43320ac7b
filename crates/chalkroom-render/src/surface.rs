//! Paint surface abstraction.
//!
//! A [`Surface`] receives fully resolved paint calls: geometry, the transform
//! it is drawn under, and a color. Backends never see board types.

use kurbo::{Affine, BezPath, Point, Size, Stroke};
use peniko::Color;

/// Generic font family for text paint calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    SansSerif,
    Monospace,
}

impl FontFamily {
    /// CSS-style family list.
    pub fn css(self) -> &'static str {
        match self {
            FontFamily::SansSerif => "Inter, sans-serif",
            FontFamily::Monospace => "'JetBrains Mono', monospace",
        }
    }
}

/// Horizontal anchor of a text run relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
}

/// Font used by a text paint call. `size` is in the units of the call's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f64,
    pub bold: bool,
    pub align: TextAlign,
}

impl FontSpec {
    pub fn new(family: FontFamily, size: f64) -> Self {
        Self {
            family,
            size,
            bold: false,
            align: TextAlign::Start,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }
}

/// Target of paint calls.
pub trait Surface {
    /// Start a new frame, discarding everything painted so far.
    fn clear(&mut self, viewport: Size, background: Color);

    /// Stroke `path` under `transform`.
    fn stroke(&mut self, style: &Stroke, transform: Affine, color: Color, path: &BezPath);

    /// Fill `path` (non-zero winding) under `transform`.
    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath);

    /// Fill a text run with its baseline at `origin`.
    fn fill_text(&mut self, text: &str, font: &FontSpec, transform: Affine, color: Color, origin: Point);
}

/// `#rrggbb` plus opacity for a color, as used by text-based backends.
pub(crate) fn css_color(color: Color) -> (String, f64) {
    let rgba = color.to_rgba8();
    (
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b),
        f64::from(rgba.a) / 255.0,
    )
}

//! SVG surface for headless snapshots.

use crate::renderer::RenderResult;
use crate::surface::{FontSpec, Surface, TextAlign, css_color};
use kurbo::{Affine, BezPath, Cap, Join, Point, Size, Stroke};
use peniko::Color;
use std::fmt::Write as _;
use std::path::Path;

/// Builds an SVG document from paint calls.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    size: Size,
    body: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The complete SVG document for the current frame.
    pub fn document(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = fmt_num(self.size.width),
            h = fmt_num(self.size.height),
            body = self.body,
        )
    }

    /// Write the document to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.document())?;
        log::info!("Wrote SVG snapshot to {}", path.display());
        Ok(())
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, viewport: Size, background: Color) {
        self.size = viewport;
        self.body.clear();
        let (fill, opacity) = css_color(background);
        let _ = writeln!(
            self.body,
            "<rect width=\"100%\" height=\"100%\" fill=\"{fill}\" fill-opacity=\"{}\"/>",
            fmt_num(opacity)
        );
    }

    fn stroke(&mut self, style: &Stroke, transform: Affine, color: Color, path: &BezPath) {
        let (stroke, opacity) = css_color(color);
        let _ = writeln!(
            self.body,
            "<path d=\"{}\" transform=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-opacity=\"{}\" stroke-width=\"{}\" stroke-linecap=\"{}\" stroke-linejoin=\"{}\"/>",
            path.to_svg(),
            matrix(transform),
            fmt_num(opacity),
            fmt_num(style.width),
            cap_name(style.start_cap),
            join_name(style.join),
        );
    }

    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath) {
        let (fill, opacity) = css_color(color);
        let _ = writeln!(
            self.body,
            "<path d=\"{}\" transform=\"{}\" fill=\"{fill}\" fill-opacity=\"{}\"/>",
            path.to_svg(),
            matrix(transform),
            fmt_num(opacity),
        );
    }

    fn fill_text(&mut self, text: &str, font: &FontSpec, transform: Affine, color: Color, origin: Point) {
        let (fill, opacity) = css_color(color);
        let anchor = match font.align {
            TextAlign::Start => "start",
            TextAlign::Center => "middle",
        };
        let weight = if font.bold { "bold" } else { "normal" };
        let _ = writeln!(
            self.body,
            "<text x=\"{}\" y=\"{}\" transform=\"{}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{weight}\" text-anchor=\"{anchor}\" fill=\"{fill}\" fill-opacity=\"{}\" xml:space=\"preserve\">{}</text>",
            fmt_num(origin.x),
            fmt_num(origin.y),
            matrix(transform),
            escape(font.family.css()),
            fmt_num(font.size),
            fmt_num(opacity),
            escape(text),
        );
    }
}

fn matrix(transform: Affine) -> String {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_num(a),
        fmt_num(b),
        fmt_num(c),
        fmt_num(d),
        fmt_num(e),
        fmt_num(f)
    )
}

/// Shortest stable form: at most 4 decimals, no trailing zeros.
fn fmt_num(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn cap_name(cap: Cap) -> &'static str {
    match cap {
        Cap::Butt => "butt",
        Cap::Square => "square",
        Cap::Round => "round",
    }
}

fn join_name(join: Join) -> &'static str {
    match join {
        Join::Bevel => "bevel",
        Join::Miter => "miter",
        Join::Round => "round",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

//! Board renderer: projects a board and camera onto a [`Surface`].

use crate::renderer::{ElementRenderer, RenderContext, Renderer};
use crate::surface::{FontFamily, FontSpec, Surface};
use chalkroom_core::elements::{CODE_LINE_HEIGHT, Element, STROKE_WIDTH};
use kurbo::{Affine, BezPath, Cap, Ellipse, Join, Point, Shape as KurboShape, Stroke};
use peniko::Color;
use std::f64::consts::FRAC_PI_4;

/// Watermark font size in device pixels.
const WATERMARK_FONT_SIZE: f64 = 80.0;

/// Flattening tolerance when converting curves to paths.
const PATH_TOLERANCE: f64 = 0.1;

fn watermark_color() -> Color {
    // rgba(255, 255, 255, 0.03)
    Color::from_rgba8(255, 255, 255, 8)
}

fn code_panel_color() -> Color {
    // rgba(0, 255, 0, 0.05)
    Color::from_rgba8(0, 255, 0, 13)
}

/// Renders boards through any [`Surface`] backend.
#[derive(Debug, Default)]
pub struct BoardRenderer<S: Surface> {
    surface: S,
}

impl<S: Surface> BoardRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Diagonal brand text centered in device space, unaffected by the camera.
    fn render_watermark(&mut self, ctx: &RenderContext, text: &str) {
        let center = Point::new(ctx.viewport_size.width / 2.0, ctx.viewport_size.height / 2.0);
        let transform = Affine::translate(center.to_vec2()) * Affine::rotate(-FRAC_PI_4);
        let font = FontSpec::new(FontFamily::SansSerif, WATERMARK_FONT_SIZE)
            .bold()
            .centered();
        self.surface
            .fill_text(text, &font, transform, watermark_color(), Point::ZERO);
    }
}

/// Stroke style whose on-screen width stays constant under zoom.
fn line_style(zoom: f64) -> Stroke {
    Stroke::new(STROKE_WIDTH / zoom)
        .with_caps(Cap::Round)
        .with_join(Join::Round)
}

fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some(first) = points.first() {
        path.move_to(*first);
        for point in points {
            path.line_to(*point);
        }
    }
    path
}

fn segment_path(start: Point, end: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(end);
    path
}

impl<S: Surface> ElementRenderer for BoardRenderer<S> {
    fn render_element(&mut self, element: &Element, transform: Affine, zoom: f64) {
        let color: Color = element.color().into();
        let style = line_style(zoom);

        match element {
            Element::Stroke(stroke) => {
                self.surface
                    .stroke(&style, transform, color, &polyline(&stroke.points));
            }
            Element::Rectangle(frame) => {
                let path = frame.rect().to_path(PATH_TOLERANCE);
                self.surface.stroke(&style, transform, color, &path);
            }
            Element::Ellipse(frame) => {
                let (center, radii) = frame.ellipse();
                let path = Ellipse::new(center, radii, 0.0).to_path(PATH_TOLERANCE);
                self.surface.stroke(&style, transform, color, &path);
            }
            Element::Line(segment) => {
                let path = segment_path(segment.start(), segment.end());
                self.surface.stroke(&style, transform, color, &path);
            }
            Element::Arrow(segment) => {
                let end = segment.end();
                let [left, right] = segment.arrow_head();
                let mut path = segment_path(segment.start(), end);
                path.move_to(end);
                path.line_to(left);
                path.move_to(end);
                path.line_to(right);
                self.surface.stroke(&style, transform, color, &path);
            }
            Element::Text(text) => {
                let font = FontSpec::new(FontFamily::SansSerif, text.font_size / zoom);
                self.surface
                    .fill_text(&text.text, &font, transform, color, text.anchor());
            }
            Element::Code(code) => {
                let panel = code.panel().to_path(PATH_TOLERANCE);
                self.surface.fill(transform, code_panel_color(), &panel);

                let font = FontSpec::new(FontFamily::Monospace, code.font_size / zoom);
                let anchor = code.anchor();
                for (i, line) in code.lines().enumerate() {
                    let origin = Point::new(anchor.x, anchor.y + i as f64 * CODE_LINE_HEIGHT);
                    self.surface.fill_text(line, &font, transform, color, origin);
                }
            }
        }
    }
}

impl<S: Surface> Renderer for BoardRenderer<S> {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let background = self.background_color(ctx);
        self.surface.clear(ctx.viewport_size, background);

        if let Some(text) = ctx.watermark.as_deref() {
            self.render_watermark(ctx, text);
        }

        let transform = ctx.camera.transform();
        let zoom = ctx.camera.zoom;

        // Committed elements back to front, then the live preview on top.
        for element in ctx.board.elements() {
            self.render_element(element, transform, zoom);
        }
        if let Some(preview) = ctx.board.in_progress() {
            self.render_element(preview, transform, zoom);
        }
    }
}

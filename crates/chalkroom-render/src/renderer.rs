//! Renderer trait abstraction.

use chalkroom_core::board::Board;
use chalkroom_core::camera::Camera;
use chalkroom_core::elements::Element;
use chalkroom_core::session::Session;
use kurbo::{Affine, Size};
use peniko::Color;
use thiserror::Error;

/// Default watermark text painted behind the board.
pub const DEFAULT_WATERMARK: &str = "chalkroom";

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid viewport: {0:?}")]
    InvalidViewport(Size),
    #[error("Surface error: {0}")]
    Surface(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board to render.
    pub board: &'a Board,
    /// View transform.
    pub camera: &'a Camera,
    /// Viewport size in device pixels.
    pub viewport_size: Size,
    /// Background color.
    pub background_color: Color,
    /// Diagonal brand text painted in device space, if any.
    pub watermark: Option<String>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(board: &'a Board, camera: &'a Camera, viewport_size: Size) -> Self {
        Self {
            board,
            camera,
            viewport_size,
            background_color: Color::from_rgba8(0, 0, 0, 255),
            watermark: Some(DEFAULT_WATERMARK.to_string()),
        }
    }

    /// Context for a session's current board and view.
    pub fn for_session(session: &'a Session, viewport_size: Size) -> Self {
        Self::new(session.board(), session.camera(), viewport_size)
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the watermark text.
    pub fn with_watermark(mut self, text: impl Into<String>) -> Self {
        self.watermark = Some(text.into());
        self
    }

    pub fn without_watermark(mut self) -> Self {
        self.watermark = None;
        self
    }

    /// Check that the viewport can be painted.
    pub fn validate(&self) -> RenderResult<()> {
        let Size { width, height } = self.viewport_size;
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(())
        } else {
            Err(RendererError::InvalidViewport(self.viewport_size))
        }
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Paint a full frame for `ctx`.
    ///
    /// Must be a pure function of the context: two calls with identical
    /// inputs issue identical paint calls.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Helper trait for element rendering (used internally by renderers).
pub trait ElementRenderer {
    /// Paint one element under the board transform at the given zoom.
    fn render_element(&mut self, element: &Element, transform: Affine, zoom: f64);
}

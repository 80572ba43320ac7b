//! Chalkroom Render Library
//!
//! Renderer abstraction for chalkroom boards. [`BoardRenderer`] turns a board
//! and camera into paint calls on any [`Surface`]; the crate ships a
//! recording surface and an SVG surface.

mod board_renderer;
mod recording;
mod renderer;
mod surface;
mod svg;

pub use board_renderer::BoardRenderer;
pub use recording::{PaintOp, RecordingSurface};
pub use renderer::{
    DEFAULT_WATERMARK, ElementRenderer, RenderContext, RenderResult, Renderer, RendererError,
};
pub use surface::{FontFamily, FontSpec, Surface, TextAlign};
pub use svg::SvgSurface;

/// Paint one frame to an SVG document.
pub fn render_svg(ctx: &RenderContext) -> RenderResult<SvgSurface> {
    ctx.validate()?;
    let mut renderer = BoardRenderer::new(SvgSurface::new());
    renderer.build_scene(ctx);
    Ok(renderer.into_surface())
}

//! Card rendering: scene description, bitmap face and rasterizer.

pub mod glyphs;
mod paint;
pub mod scene;

pub use paint::{encode_png, paint_scene};
pub use scene::{Align, Background, CardScene, Color, Element, Glow, Palette};

use crate::export::ExportError;

/// Anything that can turn a [`CardScene`] into PNG bytes.
pub trait RenderSurface {
    /// Block until fonts and any other resources are usable.
    fn wait_until_ready(&self) -> Result<(), ExportError> {
        Ok(())
    }

    /// Rasterize `scene` at exactly `width` x `height` pixels, painting
    /// internally at `supersample` times that size.
    fn render_to_image_bytes(
        &self,
        scene: &CardScene,
        width: u32,
        height: u32,
        supersample: u32,
    ) -> Result<Vec<u8>, ExportError>;
}

/// In-process rasterizer built on `image` and `imageproc`.
///
/// Its glyph face is compiled in, so it is ready immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterSurface;

impl RenderSurface for RasterSurface {
    fn render_to_image_bytes(
        &self,
        scene: &CardScene,
        width: u32,
        height: u32,
        supersample: u32,
    ) -> Result<Vec<u8>, ExportError> {
        if (scene.width, scene.height) != (width, height) {
            return Err(ExportError::SizeMismatch {
                expected: (width, height),
                actual: (scene.width, scene.height),
            });
        }
        let image = paint_scene(scene, supersample);
        tracing::debug!(width, height, supersample, "scene rasterized");
        Ok(encode_png(image)?)
    }
}

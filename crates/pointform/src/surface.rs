//! Contracts between the device-free core and whatever actually draws.

use crate::camera::{Camera, Viewport};
use crate::error::RenderError;
use crate::scene::SceneGraph;
use std::path::Path;

/// A drawing backend. The render loop owns the handle it returns and passes
/// it back on every call, so a backend never has to keep a global device.
pub trait RenderSurface {
    type Handle;

    fn create_surface(&mut self, viewport: Viewport) -> Result<Self::Handle, RenderError>;

    fn resize_surface(&mut self, handle: &mut Self::Handle, width: u32, height: u32);

    fn draw_frame(
        &mut self,
        handle: &mut Self::Handle,
        graph: &SceneGraph<'_>,
        camera: &Camera,
    ) -> Result<(), RenderError>;

    /// Releases everything behind `handle`.
    fn destroy_surface(&mut self, handle: Self::Handle);
}

/// Opaque reference to a texture owned by a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

pub trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, RenderError>;
}

/// Loader for contexts with nothing to load into. Every request fails.
#[derive(Debug, Default)]
pub struct NoTextures;

impl TextureLoader for NoTextures {
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, RenderError> {
        Err(RenderError::AssetLoad {
            path: path.to_path_buf(),
            reason: "no texture backend".into(),
        })
    }
}

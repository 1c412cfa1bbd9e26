//! The window-backed render surface handed to a [`pointform::RenderLoop`].

use crate::renderer::Renderer;
use crate::textures::TextureStore;
use pointform::{Camera, RenderError, RenderSurface, SceneGraph, Viewport};
use std::sync::Arc;
use winit::window::Window;

pub struct WgpuSurface {
    window: Arc<Window>,
    textures: TextureStore,
}

impl WgpuSurface {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            textures: TextureStore::new(),
        }
    }

    /// Loader for scene construction. Decoded images are uploaded on first draw.
    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.textures
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl RenderSurface for WgpuSurface {
    type Handle = Renderer;

    fn create_surface(&mut self, viewport: Viewport) -> Result<Renderer, RenderError> {
        pollster::block_on(Renderer::new(self.window.clone(), viewport))
            .map_err(|e| RenderError::DeviceInit(format!("{e:#}")))
    }

    fn resize_surface(&mut self, handle: &mut Renderer, width: u32, height: u32) {
        handle.resize(width, height);
    }

    fn draw_frame(
        &mut self,
        handle: &mut Renderer,
        graph: &SceneGraph<'_>,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        handle.render(graph, camera, &self.textures)
    }

    fn destroy_surface(&mut self, handle: Renderer) {
        log::debug!("releasing GPU surface");
        drop(handle);
    }
}

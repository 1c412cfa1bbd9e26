use crate::{camera::OrbitController, config::Config, surface::WgpuSurface};
use anyhow::Result;
use pointform::{presets, MountId, SceneHost, Viewport};
use std::sync::Arc;
use std::time::Instant;
use winit::{event::WindowEvent, window::Window};

pub struct App {
    host: SceneHost<WgpuSurface>,
    mounted: Option<MountId>,
    controller: OrbitController,
    started: Instant,
}

impl App {
    /// Builds the configured scene and mounts it on `window`.
    pub fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("preset {} with seed {seed}", config.preset.name());

        let mut surface = WgpuSurface::new(window.clone());
        let vis = presets::build(config.preset, &config.preset_config(seed), surface.textures_mut())?;
        let controller = OrbitController::new(vis.orbit);

        let size = window.inner_size();
        let started = Instant::now();
        let mut host = SceneHost::new();
        let mounted = host.mount(vis, surface, Viewport::new(size.width, size.height), started.elapsed())?;

        Ok(Self {
            host,
            mounted: Some(mounted),
            controller,
            started,
        })
    }

    /// Returns `true` if the event was consumed.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        let Some(id) = self.mounted else {
            return false;
        };
        if let WindowEvent::Resized(size) = event {
            self.host.resize(id, Viewport::new(size.width, size.height));
            return true;
        }
        match self.host.get_mut(id) {
            Some(render_loop) => self.controller.handle_event(event, render_loop.camera_mut()),
            None => false,
        }
    }

    /// Runs whatever ticks are due.
    pub fn tick(&mut self) {
        if let Some(render_loop) = self.mounted.and_then(|id| self.host.get_mut(id)) {
            self.controller.update(render_loop.camera_mut());
        }
        self.host.pump(self.started.elapsed());
    }

    /// When the next tick is due, or `None` once nothing is running.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.host.next_deadline().map(|d| self.started + d)
    }

    pub fn shutdown(&mut self) {
        if let Some(id) = self.mounted.take() {
            self.host.unmount(id);
        }
    }
}

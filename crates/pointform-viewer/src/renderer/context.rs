use anyhow::{anyhow, Result};
use pointform::Viewport;
use std::sync::Arc;
use winit::window::Window;

/// Device, queue and the configured window surface.
pub struct GfxContext {
    pub surface: wgpu::Surface<'static>,
    pub device:  wgpu::Device,
    pub queue:   wgpu::Queue,
    pub config:  wgpu::SurfaceConfiguration,
}

impl GfxContext {
    /// Binds a new device to `window`, sized to `viewport`.
    pub async fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        // `Arc` keeps the window alive as long as the surface.
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference:       wgpu::PowerPreference::HighPerformance,
                compatible_surface:     Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no GPU adapter compatible with the window surface"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label:             Some("pointform device"),
                    required_features: wgpu::Features::empty(),
                    required_limits:   wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage:                         wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width:                         viewport.width.max(1),
            height:                        viewport.height.max(1),
            present_mode:                  wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats:                  vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "GPU: {} ({:?}), surface {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    pub fn size(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    /// Reconfigures the swap chain. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
        }
    }

    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

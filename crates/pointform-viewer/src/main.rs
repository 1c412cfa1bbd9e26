//! Entry point for the pointform viewer.

use anyhow::Result;
use clap::Parser;
use pointform_viewer::{app::App, config::Config};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(format!("pointform - {}", config.preset.name()))
            .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height))
            .build(&event_loop)?,
    );

    let mut app = App::new(window.clone(), &config)?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => {
            if app.handle_event(&event) {
                return;
            }
            match event {
                WindowEvent::CloseRequested => {
                    app.shutdown();
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. }
                    if event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
                {
                    app.shutdown();
                    elwt.exit();
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            app.tick();
            // Sleep until the next tick; nothing left to draw means we are done.
            match app.next_wakeup() {
                Some(deadline) => elwt.set_control_flow(ControlFlow::WaitUntil(deadline)),
                None => elwt.exit(),
            }
        }
        _ => {}
    })?;

    Ok(())
}

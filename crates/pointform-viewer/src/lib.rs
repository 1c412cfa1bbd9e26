//! Desktop viewer for pointform scenes.
//!
//! Implements the core's render-surface and texture-loader contracts on top
//! of wgpu and winit, and wires one mounted visualization to a window.

pub mod app;
pub mod camera;
pub mod config;
pub mod renderer;
pub mod surface;
pub mod textures;

//! Pointform: procedural point clouds and the loop that draws them.
//!
//! - `shape`: seeded sampling of organic point sets (berry body, leaf cluster,
//!   particle ball) from a base distribution, a warp and a colour rule.
//! - `geometry` / `point_cloud`: flat, immutable GPU-ready buffers and the
//!   drawable that pairs them with a material and a transform.
//! - `scene`: objects, groups, lights and the per-frame scene graph.
//! - `render_loop`: Idle -> Running -> Stopped state machine driving one draw
//!   per cadence tick through a [`surface::RenderSurface`].
//! - `host` / `presets`: mount lifecycle and the built-in visualizations.
//!
//! Nothing here touches a GPU; the viewer crate supplies the surface.

pub mod camera;
pub mod error;
pub mod geometry;
pub mod host;
pub mod point_cloud;
pub mod presets;
pub mod render_loop;
pub mod scene;
pub mod scheduler;
pub mod shape;
pub mod surface;
pub mod transform;

pub use camera::{Camera, OrbitBounds, Viewport};
pub use error::{RenderError, ShapeError};
pub use geometry::{GeometryBuffer, GeometryId, PointVertex};
pub use host::{MountId, SceneHost};
pub use point_cloud::{ColorMode, PointCloud, PointMaterial};
pub use presets::{Preset, PresetConfig, Visualization};
pub use render_loop::{Cadence, LoopPhase, LoopState, RenderLoop, TickOutcome};
pub use scene::{DrawItem, Light, Mesh, MeshMaterial, MeshShape, Scene, SceneGraph, SceneNode, Surface};
pub use scheduler::{Scheduler, TimerHandle, TimerQueue};
pub use shape::{generate, Point, PointSet, ShapeSpec};
pub use surface::{RenderSurface, TextureHandle, TextureLoader};
pub use transform::{Motion, Transform};

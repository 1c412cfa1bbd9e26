//! Error taxonomy for shape construction and the render loop.

use std::path::PathBuf;

/// Construction-time failures. These are raised before any geometry exists.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("point count must be non-negative, got {0}")]
    NegativeCount(i64),

    #[error("invalid range for {name}: [{min}, {max})")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{name} out of range: {value}")]
    OutOfRange { name: &'static str, value: f32 },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },

    #[error("spoke count must be at least 1")]
    NoSpokes,

    #[error("composite distribution has no passes")]
    EmptyComposite,

    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    #[error("object {0} is not a group")]
    NotAGroup(usize),

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
}

/// Runtime failures of a render surface or the loop that drives it.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The device or surface could not be created. Fatal to `start()`.
    #[error("device initialisation failed: {0}")]
    DeviceInit(String),

    /// An asset could not be loaded. The visualization degrades without it.
    #[error("failed to load asset {path}: {reason}")]
    AssetLoad { path: PathBuf, reason: String },

    /// A single frame failed. The loop logs it and keeps its cadence.
    #[error("draw failed: {0}")]
    TransientDraw(String),

    #[error("cannot {action} a loop that is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
}

impl RenderError {
    /// Whether the loop should keep running after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, RenderError::TransientDraw(_))
    }
}

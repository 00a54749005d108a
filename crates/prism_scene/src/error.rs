//! Error types shared by the registries, encoders and scene context.

use thiserror::Error;

use crate::primitive::{PrimitiveId, Shape};

/// Errors surfaced by the registries and the scene context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("{registry} registry overflow: {live} live objects exceed capacity {capacity}")]
    CapacityOverflow {
        registry: &'static str,
        live: usize,
        capacity: usize,
    },

    #[error("{0:?} has no material bound")]
    UnboundMaterial(Shape),

    #[error("{registry} registry does not accept {shape:?} primitives")]
    KindMismatch {
        registry: &'static str,
        shape: Shape,
    },

    #[error("Unknown primitive: {0}")]
    UnknownPrimitive(PrimitiveId),

    #[error("Invalid scene config: {0}")]
    InvalidConfig(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

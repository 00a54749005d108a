//! Prism Scene - CPU-side scene state for the GPU ray tracer.
//!
//! This crate provides:
//!
//! - **Scene model**: `Primitive`, `Material`, `Transform` and the id-keyed `PrimitiveStore`
//! - **GPU records**: fixed-stride `Pod` layouts for spheres, boxes, planes and samples
//! - **Registries**: per-shape live lists with dirty tracking and bounded buffers
//! - **Bounding tree**: flat AABB hierarchy over spheres and boxes
//! - **Sampling**: spherical Fibonacci directions with a per-frame cursor
//! - **Frame protocol**: `SceneContext::prepare_frame` driving a `FrameSink`
//!
//! # Example
//!
//! ```ignore
//! use prism_scene::{Material, Primitive, SceneConfig, SceneContext};
//!
//! let mut scene = SceneContext::new(SceneConfig::default())?;
//! scene.spawn(Primitive::sphere(Vec3::ZERO, 1.0, Material::default()))?;
//!
//! // Once per frame, before dispatching the kernel
//! let report = scene.prepare_frame(dt, &mut gpu_sink)?;
//! ```

pub mod bvh;
pub mod config;
pub mod context;
pub mod error;
pub mod material;
pub mod primitive;
pub mod record;
pub mod registry;
pub mod sampling;
pub mod store;

// Re-export commonly used types
pub use bvh::{AabbNode, AabbTree};
pub use config::{ConfigError, SceneConfig};
pub use context::{BufferSlot, FrameReport, FrameSink, SceneContext};
pub use error::{SceneError, SceneResult};
pub use material::{Material, MaterialKind, MaterialType};
pub use primitive::{Primitive, PrimitiveId, Shape, Transform};
pub use record::{GeometryRecord, GpuRecord, MaterialRecord, PlaneRecord, SampleRecord};
pub use registry::{Rebuild, RecordBuffer, Registry};
pub use sampling::{CursorStep, SampleSet};
pub use store::PrimitiveStore;

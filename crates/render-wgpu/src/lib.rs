//! wgpu render backend.
//!
//! Flattens the layer stack into draw items and renders them as instanced
//! quads in surface pixel space. Outlines become four thin quads.
//!
//! # Invariants
//! - The renderer never mutates the scene graph.
//! - Surface size is never zero; callers pass the engine's resolved size.

mod gpu;
mod quads;
mod shaders;

pub use gpu::{GpuError, WgpuRenderer};
pub use quads::{QuadInstance, build_instances};

//! Rendering adapter: a retained scene graph of layered containers and the
//! trait every backend implements to draw it.
//!
//! # Invariants
//! - Paint order is child order: earlier children are drawn first.
//! - Renderers read the scene graph; they never restructure it.
//! - Handles are single-threaded (`Rc`); the whole client runs on one thread.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, Renderer, RendererConfig, ScaleMode};
pub use scene::{DisplayObject, DrawItem, Layer, Shape, ShapeHandle, ShapeStyle};

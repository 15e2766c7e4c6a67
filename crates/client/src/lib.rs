//! The client render/update loop.
//!
//! [`GameEngine`] ties an injected simulation, frame loop, renderer, host
//! environment and asset loader together. It owns the layer stack, the camera,
//! keyboard and pointer capture, the resource table and the policy that
//! suspends the loop while the window is unfocused.
//!
//! # Invariants
//! - Within a tick, update precedes render. Within update, keyboard sampling
//!   precedes the simulation step. Within render, entity hooks precede camera
//!   placement, which precedes the draw.
//! - The loop is never started while running nor stopped while stopped.
//! - Each blur installs at most one resume listener, removed after it fires.
//! - After `destroy()` no listener registered by the engine remains.

pub mod camera;
mod config;
mod engine;
mod focus;

pub use camera::{Camera, CameraStrategy, FixedView, FollowTarget, Placement};
pub use config::{ConfigError, EngineConfig};
pub use engine::GameEngine;
pub use focus::{FocusState, FocusSuspension};

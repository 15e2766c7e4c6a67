//! Simulation kernel: the contracts the client loop drives, plus reference
//! implementations of each.
//!
//! # Invariants
//! - `Simulation::update` runs once per update tick, never concurrently with render.
//! - Entity iteration order is deterministic (BTreeMap keyed by `EntityId`).
//! - A stopped `FrameLoop` produces no ticks and accumulates no time.

mod entity;
mod frame_loop;
mod timer;
pub mod world;

pub use entity::{Entity, RenderHook, Simulation, TickContext};
pub use frame_loop::{FixedStepLoop, FrameLoop, FrameTicks};
pub use timer::FrameTimer;
pub use world::{World, WorldEvent};

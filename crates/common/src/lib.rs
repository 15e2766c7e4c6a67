//! Shared value types used by every skyview crate.
//!
//! Nothing in here owns behaviour; these are plain values that cross crate
//! boundaries (ids, sizes, rectangles, colours, keyboard snapshots).

mod keys;
mod types;

pub use glam::Vec2;
pub use keys::{Key, KeyboardSnapshot};
pub use types::{Color, EntityId, Rect, Size};

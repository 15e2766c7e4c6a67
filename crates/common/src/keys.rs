use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keys the client tracks. Anything else arrives as `Other(code)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Enter,
    Escape,
    Shift,
    Control,
    W,
    A,
    S,
    D,
    Other(u32),
}

/// Keyboard state as sampled at the start of one update tick.
///
/// - `held` is level-triggered: true on every tick the key is down.
/// - `just_pressed` / `just_released` are edge-triggered: true only on the
///   tick the transition was first sampled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardSnapshot {
    pub held: HashSet<Key>,
    pub just_pressed: HashSet<Key>,
    pub just_released: HashSet<Key>,
}

impl KeyboardSnapshot {
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Signed axis from a negative/positive key pair: -1, 0 or 1.
    pub fn axis(&self, negative: Key, positive: Key) -> f32 {
        let mut v = 0.0;
        if self.is_held(negative) {
            v -= 1.0;
        }
        if self.is_held(positive) {
            v += 1.0;
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_empty() {
        let s = KeyboardSnapshot::default();
        assert!(!s.is_held(Key::Left));
        assert!(!s.is_just_pressed(Key::Left));
        assert!(!s.is_just_released(Key::Left));
    }

    #[test]
    fn axis_cancels_opposing_keys() {
        let mut s = KeyboardSnapshot::default();
        s.held.insert(Key::Left);
        assert_eq!(s.axis(Key::Left, Key::Right), -1.0);
        s.held.insert(Key::Right);
        assert_eq!(s.axis(Key::Left, Key::Right), 0.0);
    }
}

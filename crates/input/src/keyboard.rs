//! Keyboard poller.
//!
//! Key events land between ticks; `update()` turns everything seen since the
//! previous sample into one `KeyboardSnapshot`. A press and release that both
//! happen between two samples still show up as just-pressed and
//! just-released on the next tick, so short taps are never lost.

use skyview_common::{Key, KeyboardSnapshot};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Keyboard {
    down: HashSet<Key>,
    pressed_since_sample: HashSet<Key>,
    released_since_sample: HashSet<Key>,
    snapshot: KeyboardSnapshot,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw key event. Auto-repeat presses of a held key are ignored.
    pub fn key_event(&mut self, key: Key, pressed: bool) {
        if pressed {
            if self.down.insert(key) {
                self.pressed_since_sample.insert(key);
            }
        } else if self.down.remove(&key) {
            self.released_since_sample.insert(key);
        }
    }

    /// Release every held key, e.g. when the window loses focus and key-up
    /// events will not arrive.
    pub fn release_all(&mut self) {
        for key in self.down.drain() {
            self.released_since_sample.insert(key);
        }
    }

    /// Sample the raw state into a new snapshot. Call once per update tick.
    pub fn update(&mut self) -> &KeyboardSnapshot {
        self.snapshot = KeyboardSnapshot {
            held: self.down.clone(),
            just_pressed: std::mem::take(&mut self.pressed_since_sample),
            just_released: std::mem::take(&mut self.released_since_sample),
        };
        &self.snapshot
    }

    /// The snapshot taken by the latest `update()`.
    pub fn snapshot(&self) -> &KeyboardSnapshot {
        &self.snapshot
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_invisible_until_sampled() {
        let mut kb = Keyboard::new();
        kb.key_event(Key::Left, true);
        assert!(!kb.snapshot().is_held(Key::Left));
        let snap = kb.update();
        assert!(snap.is_held(Key::Left));
        assert!(snap.is_just_pressed(Key::Left));
    }

    #[test]
    fn just_pressed_lasts_one_sample() {
        let mut kb = Keyboard::new();
        kb.key_event(Key::Space, true);
        kb.update();
        let snap = kb.update();
        assert!(snap.is_held(Key::Space));
        assert!(!snap.is_just_pressed(Key::Space));
    }

    #[test]
    fn tap_between_samples_is_not_lost() {
        let mut kb = Keyboard::new();
        kb.key_event(Key::Enter, true);
        kb.key_event(Key::Enter, false);
        let snap = kb.update();
        assert!(!snap.is_held(Key::Enter));
        assert!(snap.is_just_pressed(Key::Enter));
        assert!(snap.is_just_released(Key::Enter));
    }

    #[test]
    fn repeat_press_does_not_retrigger() {
        let mut kb = Keyboard::new();
        kb.key_event(Key::A, true);
        kb.update();
        kb.key_event(Key::A, true);
        assert!(!kb.update().is_just_pressed(Key::A));
    }

    #[test]
    fn release_without_press_is_no_op() {
        let mut kb = Keyboard::new();
        kb.key_event(Key::D, false);
        assert!(!kb.update().is_just_released(Key::D));
    }

    #[test]
    fn release_all_clears_held_keys() {
        let mut kb = Keyboard::new();
        kb.key_event(Key::W, true);
        kb.key_event(Key::Shift, true);
        kb.update();
        kb.release_all();
        assert!(!kb.is_down(Key::W));
        let snap = kb.update();
        assert!(snap.held.is_empty());
        assert!(snap.is_just_released(Key::W));
        assert!(snap.is_just_released(Key::Shift));
    }
}

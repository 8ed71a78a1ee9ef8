use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Keys the simulation responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Jump,
    DebugToggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Press,
    Release,
}

/// A single key transition, stamped with the simulated time it was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    pub key: Key,
    pub timestamp: Duration,
}

impl InputEvent {
    pub fn press(key: Key) -> Self {
        Self {
            kind: InputKind::Press,
            key,
            timestamp: Duration::ZERO,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            kind: InputKind::Release,
            key,
            timestamp: Duration::ZERO,
        }
    }

    pub fn at(mut self, timestamp: Duration) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_press(&self, key: Key) -> bool {
        self.kind == InputKind::Press && self.key == key
    }

    pub fn is_release(&self, key: Key) -> bool {
        self.kind == InputKind::Release && self.key == key
    }
}

/// Keys currently held down, rebuilt from the delivered event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl HeldKeys {
    pub fn apply(&mut self, event: &InputEvent) {
        let down = event.kind == InputKind::Press;
        match event.key {
            Key::Left => self.left = down,
            Key::Right => self.right = down,
            Key::Jump => self.jump = down,
            Key::DebugToggle => {},
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_follow_events() {
        let mut held = HeldKeys::default();
        held.apply(&InputEvent::press(Key::Left));
        held.apply(&InputEvent::press(Key::Jump));
        assert!(held.left && held.jump && !held.right);

        held.apply(&InputEvent::release(Key::Left));
        assert!(!held.left);
        assert!(held.jump);
    }

    #[test]
    fn debug_toggle_is_not_held() {
        let mut held = HeldKeys::default();
        held.apply(&InputEvent::press(Key::DebugToggle));
        assert_eq!(held, HeldKeys::default());
    }

    #[test]
    fn event_predicates() {
        let ev = InputEvent::press(Key::Jump).at(Duration::from_millis(5));
        assert!(ev.is_press(Key::Jump));
        assert!(!ev.is_release(Key::Jump));
        assert_eq!(ev.timestamp, Duration::from_millis(5));
    }
}

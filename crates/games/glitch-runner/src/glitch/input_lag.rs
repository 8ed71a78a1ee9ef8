use std::collections::VecDeque;
use std::time::Duration;

use glitch_core::input::InputEvent;
use glitch_core::time::frames_to_millis;

/// Holds key events back for a number of ticks' worth of time.
///
/// Events are stamped when captured and released in capture order once
/// their age reaches the delay.
#[derive(Debug, Clone)]
pub struct InputLagBuffer {
    delay_ticks: u32,
    tick_rate_hz: f32,
    pending: VecDeque<InputEvent>,
}

impl InputLagBuffer {
    pub fn new(tick_rate_hz: f32) -> Self {
        Self {
            delay_ticks: 0,
            tick_rate_hz,
            pending: VecDeque::new(),
        }
    }

    /// Start lagging input by `delay_ticks`, dropping anything still queued.
    pub fn activate(&mut self, delay_ticks: u32) {
        self.delay_ticks = delay_ticks;
        self.pending.clear();
    }

    /// Stop lagging and drop queued events.
    pub fn clear(&mut self) {
        self.delay_ticks = 0;
        self.pending.clear();
    }

    pub fn is_active(&self) -> bool {
        self.delay_ticks > 0
    }

    pub fn delay_ticks(&self) -> u32 {
        self.delay_ticks
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Queue `event`, stamped with `now`.
    pub fn push(&mut self, event: InputEvent, now: Duration) {
        self.pending.push_back(event.at(now));
    }

    /// Pop every event old enough to deliver at `now`.
    pub fn release(&mut self, now: Duration) -> Vec<InputEvent> {
        let threshold_ms = frames_to_millis(self.delay_ticks, self.tick_rate_hz);
        let mut ready = Vec::new();
        while let Some(front) = self.pending.front() {
            let age_ms = now.saturating_sub(front.timestamp).as_secs_f64() * 1000.0;
            if age_ms < threshold_ms {
                break;
            }
            if let Some(event) = self.pending.pop_front() {
                ready.push(event);
            }
        }
        if !ready.is_empty() {
            tracing::debug!(released = ready.len(), pending = self.pending.len(), "Lagged input");
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitch_core::input::Key;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn releases_after_delay_in_order() {
        let mut buf = InputLagBuffer::new(60.0);
        buf.activate(6);
        buf.push(InputEvent::press(Key::Left), ms(0));
        buf.push(InputEvent::press(Key::Jump), ms(20));

        assert!(buf.release(ms(99)).is_empty());

        let first = buf.release(ms(101));
        assert_eq!(first.len(), 1);
        assert!(first[0].is_press(Key::Left));

        let second = buf.release(ms(130));
        assert_eq!(second.len(), 1);
        assert!(second[0].is_press(Key::Jump));
        assert_eq!(buf.pending(), 0);
    }

    #[test]
    fn activate_drops_queued_events() {
        let mut buf = InputLagBuffer::new(60.0);
        buf.activate(10);
        buf.push(InputEvent::press(Key::Right), ms(0));
        buf.activate(5);
        assert_eq!(buf.pending(), 0);
        assert_eq!(buf.delay_ticks(), 5);
    }

    #[test]
    fn clear_deactivates() {
        let mut buf = InputLagBuffer::new(60.0);
        buf.activate(10);
        buf.push(InputEvent::press(Key::Right), ms(0));
        buf.clear();
        assert!(!buf.is_active());
        assert_eq!(buf.pending(), 0);
    }

    #[test]
    fn events_keep_capture_stamp() {
        let mut buf = InputLagBuffer::new(60.0);
        buf.activate(5);
        buf.push(InputEvent::press(Key::Jump), ms(40));
        let out = buf.release(ms(500));
        assert_eq!(out[0].timestamp, ms(40));
    }
}

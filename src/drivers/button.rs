//! Polled, debounced button with short-press and long-press-start
//! detection. Poll once per event-loop iteration; events are edges and
//! fire exactly once per physical press.

use embassy_time::Instant;
use esp_hal::gpio::Input;

use crate::{DEBOUNCE_MS, LONG_PRESS_MS};

#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum ButtonEvent {
    /// Released before the long-press window elapsed
    ShortPress,
    /// Fired the moment the hold crosses the long-press window, while
    /// the button is still down
    LongPressStart,
}

pub struct Button {
    pin: Input<'static>,
    // Debounce filter
    last_raw: bool,
    last_change: Instant,
    // Press tracking
    down: bool,
    pressed_at: Instant,
    long_fired: bool,
}

impl Button {
    /// `pin` is expected to be pulled up, active low.
    pub fn new(pin: Input<'static>) -> Self {
        let now = Instant::now();
        Self {
            pin,
            last_raw: false,
            last_change: now,
            down: false,
            pressed_at: now,
            long_fired: false,
        }
    }

    /// Advance the debouncer one tick. At most one event per call.
    pub fn poll(&mut self) -> Option<ButtonEvent> {
        let now = Instant::now();
        let raw = self.pin.is_low();

        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change = now;
            return None;
        }
        if (now - self.last_change).as_millis() < DEBOUNCE_MS {
            return None;
        }

        // Stable level from here on.
        if raw && !self.down {
            self.down = true;
            self.pressed_at = now;
            self.long_fired = false;
            return None;
        }

        if raw && self.down && !self.long_fired && (now - self.pressed_at).as_millis() >= LONG_PRESS_MS
        {
            self.long_fired = true;
            return Some(ButtonEvent::LongPressStart);
        }

        if !raw && self.down {
            self.down = false;
            if !self.long_fired {
                return Some(ButtonEvent::ShortPress);
            }
        }

        None
    }
}

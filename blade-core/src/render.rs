//! Pixel-pattern composition.
//!
//! Pure function of `(mode, blade length, colour)` to a full strip
//! frame plus the external power-rail level. The strip is wired up one
//! side of the blade and back down the other, so a blade of length `n`
//! lights the first `n` pixels from both ends.

use smart_leds::RGB8;

use crate::color::flash_color;
use crate::{BLADE_MAX, Mode, NUM_PIXELS};

pub type Frame = [RGB8; NUM_PIXELS];

const DARK: RGB8 = RGB8::new(0, 0, 0);

/// Compose one frame. Returns true when the external power rail should
/// be energised (every mode except fully off).
pub fn compose(mode: Mode, blade_length: u8, color: RGB8, frame: &mut Frame) -> bool {
    match mode {
        Mode::Idle | Mode::Hero | Mode::Configure => {
            frame.fill(color);
            true
        }
        Mode::PoweringOn | Mode::PoweringOff => {
            assert!(blade_length <= BLADE_MAX, "blade length out of range");
            frame.fill(DARK);
            for i in 0..blade_length as usize {
                frame[i] = color;
                frame[NUM_PIXELS - 1 - i] = color;
            }
            true
        }
        Mode::Hit | Mode::Swing => {
            frame.fill(flash_color(color));
            true
        }
        Mode::Off => {
            frame.fill(DARK);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{GREEN, RED};

    fn lit(frame: &Frame) -> usize {
        frame.iter().filter(|p| **p != DARK).count()
    }

    #[test]
    fn off_is_dark_and_unpowered() {
        let mut frame = [RED; NUM_PIXELS];
        assert!(!compose(Mode::Off, 0, RED, &mut frame));
        assert_eq!(lit(&frame), 0);
    }

    #[test]
    fn idle_fills_whole_strip() {
        let mut frame = [DARK; NUM_PIXELS];
        assert!(compose(Mode::Idle, BLADE_MAX, GREEN, &mut frame));
        assert!(frame.iter().all(|p| *p == GREEN));
    }

    #[test]
    fn ignition_lights_symmetrically_from_both_ends() {
        let mut frame = [DARK; NUM_PIXELS];
        assert!(compose(Mode::PoweringOn, 5, RED, &mut frame));
        assert_eq!(lit(&frame), 10);
        for i in 0..5 {
            assert_eq!(frame[i], RED);
            assert_eq!(frame[NUM_PIXELS - 1 - i], RED);
        }
        assert_eq!(frame[5], DARK);
        assert_eq!(frame[NUM_PIXELS - 6], DARK);
    }

    #[test]
    fn full_ignition_meets_in_the_middle() {
        let mut frame = [DARK; NUM_PIXELS];
        compose(Mode::PoweringOff, BLADE_MAX, RED, &mut frame);
        assert_eq!(lit(&frame), NUM_PIXELS);
    }

    #[test]
    fn hit_flash_is_tinted_not_blade_coloured() {
        let mut frame = [DARK; NUM_PIXELS];
        assert!(compose(Mode::Hit, BLADE_MAX, RED, &mut frame));
        assert_eq!(frame[0], flash_color(RED));
        assert_ne!(frame[0], RED);
    }
}

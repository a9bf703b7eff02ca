//! Blade colour palette and the active-colour selector.
//!
//! Short presses in configure mode cycle through the fixed palette plus
//! one extra "rainbow" pseudo-colour appended after it. While rainbow is
//! selected the hue is rotated by the render loop at a fixed sub-cadence.

use smart_leds::{
    RGB8,
    hsv::{Hsv, hsv2rgb},
};

pub const RED: RGB8 = RGB8::new(255, 0, 0);
pub const YELLOW: RGB8 = RGB8::new(125, 255, 0);
pub const GREEN: RGB8 = RGB8::new(0, 255, 0);
pub const CYAN: RGB8 = RGB8::new(0, 125, 255);
pub const BLUE: RGB8 = RGB8::new(0, 0, 255);
pub const PURPLE: RGB8 = RGB8::new(125, 0, 255);
pub const WHITE: RGB8 = RGB8::new(255, 255, 255);

/// Fixed palette cycled in configure mode
pub const PALETTE: [RGB8; 7] = [RED, YELLOW, GREEN, CYAN, BLUE, PURPLE, WHITE];

/// Palette entries plus the rainbow pseudo-colour
pub const CYCLE_LEN: u8 = PALETTE.len() as u8 + 1;

/// Selector index of the rainbow pseudo-colour
pub const RAINBOW_INDEX: u8 = PALETTE.len() as u8;

/// The active colour selection, owned by the blade state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorWheel {
    index: u8,
    hue: u8,
}

impl ColorWheel {
    /// Boots on cyan, like the original prop
    pub const fn new() -> Self {
        Self { index: 3, hue: 0 }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn is_rainbow(&self) -> bool {
        self.index == RAINBOW_INDEX
    }

    /// Advance to the next palette entry, wrapping through rainbow
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % CYCLE_LEN;
    }

    /// Rotate the rainbow hue one step. No effect on plain palette entries.
    pub fn spin(&mut self) {
        if self.is_rainbow() {
            self.hue = self.hue.wrapping_add(1);
        }
    }

    /// Resolve the selection to a concrete colour
    pub fn color(&self) -> RGB8 {
        if self.is_rainbow() {
            hsv2rgb(Hsv {
                hue: self.hue,
                sat: 255,
                val: 255,
            })
        } else {
            PALETTE[self.index as usize]
        }
    }
}

impl Default for ColorWheel {
    fn default() -> Self {
        Self::new()
    }
}

/// Flash colour for hit/swing frames: white pulled slightly towards the
/// active blade colour so clashes read as "this" blade, not a bare strobe.
pub fn flash_color(active: RGB8) -> RGB8 {
    RGB8::new(
        192 + (active.r >> 2),
        192 + (active.g >> 2),
        192 + (active.b >> 2),
    )
}

#![cfg_attr(not(test), no_std)]

//! Hardware-independent control logic for the ion-blade prop.
//!
//! Everything in here is a pure function of state and injected events:
//! the mode state machine, blade-length animation stepping, motion
//! classification, the render patterns and the sound-cue catalogue.
//! The firmware crate owns the pins, the clocks and the tasks.

pub mod color;
pub mod motion;
pub mod render;
pub mod sounds;
pub mod state;

pub use state::{Action, BladeState, Event, Mode, Settled};

// Re-exported so driver and demo code speak the same pixel type.
pub use smart_leds::RGB8;

/// Total number of pixels on the strip (wired up one side, back down the other)
pub const NUM_PIXELS: usize = 38;

/// Maximum blade length in pixels, counted from each end of the strip
pub const BLADE_MAX: u8 = (NUM_PIXELS / 2) as u8;

/// Tap (hit) click threshold written to the accelerometer. Smaller = more sensitive
pub const HIT_THRESHOLD: u8 = 120;

/// Swing threshold compared against the squared acceleration magnitude, inclusive
pub const SWING_THRESHOLD: f32 = 130.0;

/// Blade extend/retract animation step interval in milliseconds
pub const ANIMATION_STEP_MS: u64 = 25;

/// Render/sound loop interval in milliseconds
pub const RENDER_INTERVAL_MS: u64 = 10;

/// The rainbow hue advances once every this many render frames
pub const RAINBOW_SPIN_FRAMES: u32 = 3;

/// Auto-revert delay used when a cue has no catalogued duration
pub const DEFAULT_REVERT_MS: u32 = 500;

/// Global strip brightness (0.7 of full scale)
pub const STRIP_BRIGHTNESS: u8 = 178;

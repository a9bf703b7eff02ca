//! Accelerometer event classification.
//!
//! Taps are detected in hardware (the click engine) and arrive as an
//! edge-triggered flag; swings are derived in software from the squared
//! acceleration magnitude. The Y axis runs along the blade, so only X
//! and Z contribute to the swing magnitude.

use crate::{Event, SWING_THRESHOLD};

/// Squared acceleration magnitude perpendicular to the blade axis
pub fn swing_magnitude(accel: (f32, f32, f32)) -> f32 {
    let (x, _, z) = accel;
    x * x + z * z
}

/// Classify one sensor sample. Taps win over swings when both are
/// present in the same sample; the swing boundary is inclusive.
pub fn classify(tapped: bool, accel: (f32, f32, f32)) -> Option<Event> {
    if tapped {
        Some(Event::Tap)
    } else if swing_magnitude(accel) >= SWING_THRESHOLD {
        Some(Event::Swing)
    } else {
        None
    }
}

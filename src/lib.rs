#![no_std]

pub mod drivers;
pub mod tasks;

use blade_core::BladeState;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex, signal::Signal};

/// How long the button must stay down to count as a long press
pub const LONG_PRESS_MS: u64 = 1000;

/// Debounce window for both buttons in milliseconds
pub const DEBOUNCE_MS: u64 = 20;

/// Serial sound module baud rate
pub const SOUND_BAUD: u32 = 9600;

/// The shared blade state. The event loop, the animation task, the
/// revert task and the render loop all run on the one cooperative
/// executor, so this mutex is only ever contended at await points and
/// a transition's side effects are applied atomically before yielding.
pub static STATE: Mutex<CriticalSectionRawMutex, BladeState> = Mutex::new(BladeState::new());

/// Command for the perpetual animation task. Signalling a new command
/// replaces any pending one, which is what cancels a run in flight.
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum AnimCommand {
    /// Step the blade towards this length, one pixel per tick
    RunTo(u8),
    /// Stop whatever is running and go back to waiting
    Cancel,
}

/// Command for the perpetual auto-revert task
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum RevertCommand {
    /// Drop back to idle after this many milliseconds
    After(u32),
    /// Forget any pending revert
    Cancel,
}

/// One slot each for the animation and the revert task: starting a new
/// transition overwrites (cancels) whatever was pending before it.
pub static ANIM: Signal<CriticalSectionRawMutex, AnimCommand> = Signal::new();
pub static REVERT: Signal<CriticalSectionRawMutex, RevertCommand> = Signal::new();

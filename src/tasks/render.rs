//! The render/sound loop: a fixed 10 ms cadence mapping the current
//! `(mode, blade length, colour)` snapshot to a strip frame, the
//! external power rail and the idle-cue watchdog.

use blade_core::sounds::{PlaybackFix, SoundCue, playback_watchdog};
use blade_core::{NUM_PIXELS, RAINBOW_SPIN_FRAMES, RENDER_INTERVAL_MS, RGB8, STRIP_BRIGHTNESS, render};
use defmt::info;
use embassy_time::{Duration, Ticker};
use esp_hal::gpio::Output;

use crate::STATE;
use crate::drivers::neopixel::{LedBuffer, LedDriver};
use crate::tasks::animation::SharedSound;

#[embassy_executor::task]
pub async fn render_task(led: &'static mut LedDriver, mut power: Output<'static>, sound: SharedSound) {
    info!("RENDER_TASK: started");
    let mut ticker = Ticker::every(Duration::from_millis(RENDER_INTERVAL_MS));
    let mut frame: LedBuffer = [RGB8::default(); NUM_PIXELS];
    let mut frame_count: u32 = 0;

    loop {
        ticker.next().await;
        frame_count = frame_count.wrapping_add(1);

        let (mode, blade_length, color) = {
            let mut state = STATE.lock().await;
            if state.is_rainbow() && frame_count % RAINBOW_SPIN_FRAMES == 0 {
                state.spin_rainbow();
            }
            (state.mode(), state.blade_length(), state.active_color())
        };

        let powered = render::compose(mode, blade_length, color, &mut frame);
        if powered {
            power.set_high();
        } else {
            power.set_low();
        }
        led.update_from_buffer(&frame, STRIP_BRIGHTNESS).await;

        // Playback watchdog: the mode transition started the cue once,
        // but the module may have finished or hiccuped. Re-arm the idle
        // loop while idle, and force silence once the blade is dark.
        // Waits out the module's busy-line lag after each command so a
        // fresh cue is not restarted on every tick.
        let mut sound = sound.lock().await;
        match playback_watchdog(mode, sound.is_playing(), sound.command_settled()) {
            Some(PlaybackFix::RestartIdle) => sound.play(SoundCue::IdleLoop).await,
            Some(PlaybackFix::Silence) => sound.stop().await,
            None => {}
        }
    }
}

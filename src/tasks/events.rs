//! The event loop: polls the buttons and the accelerometer, feeds at
//! most one derived event per iteration into the state machine, and
//! carries out the side effects of the resulting transition before
//! yielding. Button events take priority over motion events.

use blade_core::sounds::{CLASH_COUNT, SWING_COUNT, SoundCue};
use blade_core::{Action, Event, motion};
use defmt::{debug, info, warn};
use embassy_futures::yield_now;
use embassy_time::Instant;

use crate::drivers::accel::Accelerometer;
use crate::drivers::button::{Button, ButtonEvent};
use crate::tasks::animation::SharedSound;
use crate::{ANIM, AnimCommand, REVERT, RevertCommand, STATE};

/// Runs forever. Owns both buttons and the accelerometer; nothing else
/// reads them.
pub async fn event_loop(
    mut power_button: Button,
    mut hero_button: Button,
    mut accel: Accelerometer,
    sound: SharedSound,
) -> ! {
    info!("EVENT_LOOP: started");
    let mut rng = fastrand::Rng::with_seed(Instant::now().as_ticks());
    loop {
        if let Some(event) = derive_event(&mut power_button, &mut hero_button, &mut accel).await {
            dispatch(event, sound, &mut rng).await;
        }
        yield_now().await;
    }
}

/// At most one event per iteration; buttons outrank motion, and motion
/// is only sampled while the mode accepts it.
async fn derive_event(
    power_button: &mut Button,
    hero_button: &mut Button,
    accel: &mut Accelerometer,
) -> Option<Event> {
    if let Some(event) = power_button.poll() {
        return Some(match event {
            ButtonEvent::ShortPress => Event::ShortPress,
            ButtonEvent::LongPressStart => Event::LongPressStart,
        });
    }
    if let Some(ButtonEvent::ShortPress) = hero_button.poll() {
        return Some(Event::HeroPress);
    }

    if !STATE.lock().await.mode().accepts_motion() {
        return None;
    }
    let tapped = match accel.tapped().await {
        Ok(tapped) => tapped,
        Err(_) => {
            warn!("EVENT_LOOP: accelerometer click read failed");
            return None;
        }
    };
    let acceleration = match accel.acceleration().await {
        Ok(sample) => sample,
        Err(_) => {
            warn!("EVENT_LOOP: accelerometer sample failed");
            return None;
        }
    };
    motion::classify(tapped, acceleration)
}

/// Apply one event and its side effects atomically: the state lock is
/// held until every pending-task cancellation, cue and schedule for the
/// transition has been issued, so no other task can observe a mode
/// whose side effects are still missing.
async fn dispatch(event: Event, sound: SharedSound, rng: &mut fastrand::Rng) {
    let mut state = STATE.lock().await;
    let Some(action) = state.apply_transition(event) else {
        return;
    };
    debug!("EVENT_LOOP: {} -> {}", event, state.mode());

    match action {
        Action::StartAnimation { target } => {
            REVERT.signal(RevertCommand::Cancel);
            ANIM.signal(AnimCommand::RunTo(target));
        }
        Action::PlayClash => {
            let cue = SoundCue::Clash(rng.u8(0..CLASH_COUNT));
            sound.lock().await.play(cue).await;
            REVERT.signal(RevertCommand::After(cue.duration_ms()));
        }
        Action::PlaySwing => {
            let cue = SoundCue::Swing(rng.u8(0..SWING_COUNT));
            sound.lock().await.play(cue).await;
            REVERT.signal(RevertCommand::After(cue.duration_ms()));
        }
        Action::PlayHero(theme) => {
            let cue = SoundCue::Hero(theme);
            let mut sound = sound.lock().await;
            sound.stop().await;
            sound.play(cue).await;
            REVERT.signal(RevertCommand::After(cue.duration_ms()));
        }
        Action::EnterConfigure => {
            // A stale auto-revert must not fire into configure mode.
            REVERT.signal(RevertCommand::Cancel);
            ANIM.signal(AnimCommand::Cancel);
            let mut sound = sound.lock().await;
            sound.stop().await;
            sound.play(SoundCue::ColorCycle).await;
        }
        Action::ExitConfigure => {
            let mut sound = sound.lock().await;
            sound.stop().await;
            sound.play(SoundCue::IdleLoop).await;
        }
    }
}

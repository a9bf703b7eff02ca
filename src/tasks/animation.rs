//! The two cancellable timed workers: blade extend/retract and the
//! auto-revert back to idle.
//!
//! Both are perpetual tasks that sleep on their command signal. A run
//! in flight re-arms on the same signal at every tick, so signalling a
//! new command (or `Cancel`) takes effect at the next yield point and
//! never interrupts a step mid-way. Because a signal holds at most one
//! value, at most one animation and one revert can ever be pending.
//!
//! When the tick timer and a fresh command race, the command wins: an
//! expired timer drains the signal before acting, so a command latched
//! in the same tick never loses to a stale step or a stale revert.

use blade_core::{ANIMATION_STEP_MS, Settled, sounds::SoundCue};
use defmt::{debug, info};
use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::{Duration, Timer};

use crate::drivers::sound::SoundModule;
use crate::{ANIM, AnimCommand, REVERT, RevertCommand, STATE};

pub type SharedSound = &'static Mutex<CriticalSectionRawMutex, SoundModule>;

/// Drives the blade length towards the commanded target, one pixel per
/// tick. Plays the extend or retract cue exactly once at the start of
/// each run; on completion settles the mode and sound. A superseding
/// command abandons the run with the blade left wherever it got to.
#[embassy_executor::task]
pub async fn animation_task(sound: SharedSound) {
    info!("ANIMATION_TASK: started");
    let mut command = ANIM.wait().await;
    loop {
        let target = match command {
            AnimCommand::RunTo(target) => target,
            AnimCommand::Cancel => {
                command = ANIM.wait().await;
                continue;
            }
        };

        {
            let state = STATE.lock().await;
            let cue = state.ignition_cue(target);
            debug!("ANIMATION_TASK: run to {}, cue {}", target, cue);
            sound.lock().await.play(cue).await;
        }

        command = 'run: loop {
            match select(
                Timer::after(Duration::from_millis(ANIMATION_STEP_MS)),
                ANIM.wait(),
            )
            .await
            {
                Either::First(()) => {
                    // A command latched while the timer expired
                    // supersedes this run before it steps again.
                    if let Some(next) = ANIM.try_take() {
                        break 'run next;
                    }
                    let mut state = STATE.lock().await;
                    if state.animation_step(target) {
                        let mut sound = sound.lock().await;
                        match state.settle(target) {
                            Some(Settled::Idle) => sound.play(SoundCue::IdleLoop).await,
                            Some(Settled::Off) => sound.stop().await,
                            None => {}
                        }
                        drop(sound);
                        drop(state);
                        break 'run ANIM.wait().await;
                    }
                }
                Either::Second(next) => break 'run next,
            }
        };
    }
}

/// Waits out the scheduled delay, then drops the mode back to idle and
/// restarts the idle loop cue. A new command while waiting replaces the
/// pending revert.
#[embassy_executor::task]
pub async fn revert_task(sound: SharedSound) {
    info!("REVERT_TASK: started");
    let mut command = REVERT.wait().await;
    loop {
        let delay_ms = match command {
            RevertCommand::After(ms) => ms,
            RevertCommand::Cancel => {
                command = REVERT.wait().await;
                continue;
            }
        };

        match select(
            Timer::after(Duration::from_millis(u64::from(delay_ms))),
            REVERT.wait(),
        )
        .await
        {
            Either::First(()) => {
                // Same race as the animation task: a command latched
                // in the expiring tick replaces this revert.
                if let Some(next) = REVERT.try_take() {
                    command = next;
                    continue;
                }
                let mut state = STATE.lock().await;
                if state.revert_to_idle() {
                    sound.lock().await.play(SoundCue::IdleLoop).await;
                }
                drop(state);
                command = REVERT.wait().await;
            }
            Either::Second(next) => command = next,
        }
    }
}

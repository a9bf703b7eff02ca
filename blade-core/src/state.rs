//! The mode state machine.
//!
//! `BladeState` owns the three fields the whole prop revolves around:
//! the current mode, the blade length and the colour selection. All
//! mode changes go through [`BladeState::apply_transition`], the
//! animation stepping helpers or [`BladeState::revert_to_idle`]; no
//! other code mutates them. Transitions are pure: side effects (sound,
//! task scheduling) are described by the returned [`Action`] and
//! carried out by the caller before it yields.

use smart_leds::RGB8;

use crate::BLADE_MAX;
use crate::color::ColorWheel;
use crate::sounds::{HeroTheme, SoundCue, hero_theme};

/// Operating mode. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Off,
    PoweringOff,
    PoweringOn,
    Idle,
    Hit,
    Swing,
    Configure,
    Hero,
}

impl Mode {
    /// An extend/retract animation is driving the blade length
    pub fn is_powering(self) -> bool {
        matches!(self, Mode::PoweringOn | Mode::PoweringOff)
    }

    /// Motion events are only honoured while resting in idle
    pub fn accepts_motion(self) -> bool {
        self == Mode::Idle
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Off => "off",
            Mode::PoweringOff => "powering-off",
            Mode::PoweringOn => "powering-on",
            Mode::Idle => "idle",
            Mode::Hit => "hit",
            Mode::Swing => "swing",
            Mode::Configure => "configure",
            Mode::Hero => "hero",
        }
    }
}

/// Discrete inputs fed to the state machine, one per event-loop
/// iteration at most. Button events outrank motion events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    ShortPress,
    LongPressStart,
    HeroPress,
    Tap,
    Swing,
}

/// Side effect a transition asks its caller to perform. The caller
/// must apply it (cancel pending work, start sounds, schedule tasks)
/// before yielding control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Cancel pending work and run the blade animation towards `target`
    StartAnimation { target: u8 },
    /// Play a random clash cue and schedule auto-revert after it
    PlayClash,
    /// Play a random swing cue and schedule auto-revert after it
    PlaySwing,
    /// Stop playback, play the theme, schedule auto-revert after it
    PlayHero(HeroTheme),
    /// Cancel pending auto-revert, start the colour-cycle cue looping
    EnterConfigure,
    /// Stop the colour-cycle cue and resume the idle loop
    ExitConfigure,
}

/// Where a completed animation left the blade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Settled {
    Off,
    Idle,
}

pub struct BladeState {
    mode: Mode,
    blade_length: u8,
    color: ColorWheel,
}

impl BladeState {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Off,
            blade_length: 0,
            color: ColorWheel::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn blade_length(&self) -> u8 {
        self.blade_length
    }

    pub fn color_index(&self) -> u8 {
        self.color.index()
    }

    pub fn is_rainbow(&self) -> bool {
        self.color.is_rainbow()
    }

    /// Concrete colour for the current selection
    pub fn active_color(&self) -> RGB8 {
        self.color.color()
    }

    /// Advance the rainbow hue one step (render-loop sub-cadence)
    pub fn spin_rainbow(&mut self) {
        self.color.spin();
    }

    /// Apply one event to the transition table. Returns the side effect
    /// the caller has to carry out, if any. A short press during an
    /// extend/retract reverses the direction immediately rather than
    /// queueing behind it.
    pub fn apply_transition(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::ShortPress => match self.mode {
                Mode::Configure => {
                    self.color.advance();
                    None
                }
                Mode::Off | Mode::PoweringOff => {
                    self.mode = Mode::PoweringOn;
                    Some(Action::StartAnimation { target: BLADE_MAX })
                }
                _ => {
                    self.mode = Mode::PoweringOff;
                    Some(Action::StartAnimation { target: 0 })
                }
            },
            Event::LongPressStart => match self.mode {
                Mode::Configure => {
                    self.mode = Mode::Idle;
                    Some(Action::ExitConfigure)
                }
                // Not while an ignition animation is running.
                mode if mode.is_powering() => None,
                _ => {
                    self.mode = Mode::Configure;
                    Some(Action::EnterConfigure)
                }
            },
            Event::HeroPress => match self.mode {
                Mode::Idle => {
                    self.mode = Mode::Hero;
                    Some(Action::PlayHero(hero_theme(self.color.index())))
                }
                _ => None,
            },
            Event::Tap => match self.mode {
                Mode::Idle => {
                    self.mode = Mode::Hit;
                    Some(Action::PlayClash)
                }
                _ => None,
            },
            Event::Swing => match self.mode {
                Mode::Idle => {
                    self.mode = Mode::Swing;
                    Some(Action::PlaySwing)
                }
                _ => None,
            },
        }
    }

    /// Which cue to fire once when an animation towards `target` starts
    pub fn ignition_cue(&self, target: u8) -> SoundCue {
        if target > self.blade_length {
            SoundCue::PowerOn
        } else {
            SoundCue::PowerOff
        }
    }

    /// Move the blade one pixel towards `target`, clamped to
    /// `[0, BLADE_MAX]`. Returns true once the target is reached.
    /// A blade length outside its domain is a programming error and
    /// panics rather than being patched up.
    pub fn animation_step(&mut self, target: u8) -> bool {
        assert!(target <= BLADE_MAX, "animation target out of range");
        assert!(self.blade_length <= BLADE_MAX, "blade length out of range");
        if self.blade_length == target {
            return true;
        }
        if target > self.blade_length {
            self.blade_length += 1;
        } else {
            self.blade_length -= 1;
        }
        self.blade_length == target
    }

    /// Resolve a finished animation: fully retracted goes dark, fully
    /// extended rests in idle. The caller starts or stops sound
    /// accordingly.
    ///
    /// Returns `None` when the mode no longer matches the animation
    /// direction, which means a reversal superseded the run between
    /// its last step and this call. The superseding transition owns
    /// the mode; a stale completion must not take it over.
    pub fn settle(&mut self, target: u8) -> Option<Settled> {
        assert_eq!(self.blade_length, target, "settle before target reached");
        if target == 0 {
            if self.mode != Mode::PoweringOff {
                return None;
            }
            self.mode = Mode::Off;
            Some(Settled::Off)
        } else {
            if self.mode != Mode::PoweringOn {
                return None;
            }
            self.mode = Mode::Idle;
            Some(Settled::Idle)
        }
    }

    /// Timed fallback out of the transient modes (hit, swing, hero).
    /// Blade length is left untouched. Returns false, and leaves the
    /// mode alone, when a newer transition already moved the prop out
    /// of the transient mode the revert was scheduled for.
    pub fn revert_to_idle(&mut self) -> bool {
        if matches!(self.mode, Mode::Hit | Mode::Swing | Mode::Hero) {
            self.mode = Mode::Idle;
            true
        } else {
            false
        }
    }
}

impl Default for BladeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::CYCLE_LEN;

    /// Drive the animation to completion, checking single-pixel steps.
    fn run_animation(state: &mut BladeState, target: u8) -> u32 {
        let mut ticks = 0;
        loop {
            let before = state.blade_length();
            let done = state.animation_step(target);
            ticks += 1;
            assert!(state.blade_length() <= BLADE_MAX);
            assert!(state.blade_length().abs_diff(before) <= 1);
            if done {
                state.settle(target);
                return ticks;
            }
        }
    }

    #[test]
    fn power_cycle_alternates_and_returns_to_extremes() {
        let mut state = BladeState::new();
        for _ in 0..3 {
            assert_eq!(state.mode(), Mode::Off);
            assert_eq!(state.blade_length(), 0);

            let action = state.apply_transition(Event::ShortPress);
            assert_eq!(state.mode(), Mode::PoweringOn);
            assert_eq!(action, Some(Action::StartAnimation { target: BLADE_MAX }));
            let ticks = run_animation(&mut state, BLADE_MAX);
            assert_eq!(ticks as u8, BLADE_MAX);
            assert_eq!(state.mode(), Mode::Idle);
            assert_eq!(state.blade_length(), BLADE_MAX);

            let action = state.apply_transition(Event::ShortPress);
            assert_eq!(state.mode(), Mode::PoweringOff);
            assert_eq!(action, Some(Action::StartAnimation { target: 0 }));
            let ticks = run_animation(&mut state, 0);
            assert_eq!(ticks as u8, BLADE_MAX);
            assert_eq!(state.mode(), Mode::Off);
            assert_eq!(state.blade_length(), 0);
        }
    }

    #[test]
    fn short_press_mid_ignition_reverses_without_waiting() {
        let mut state = BladeState::new();
        state.apply_transition(Event::ShortPress);
        for _ in 0..5 {
            state.animation_step(BLADE_MAX);
        }
        assert_eq!(state.blade_length(), 5);

        let action = state.apply_transition(Event::ShortPress);
        assert_eq!(state.mode(), Mode::PoweringOff);
        assert_eq!(action, Some(Action::StartAnimation { target: 0 }));
        // Retracting from 5 takes 5 ticks, not BLADE_MAX.
        assert_eq!(run_animation(&mut state, 0), 5);
        assert_eq!(state.mode(), Mode::Off);
    }

    #[test]
    fn reversal_mid_retract_reignites() {
        let mut state = BladeState::new();
        state.apply_transition(Event::ShortPress);
        run_animation(&mut state, BLADE_MAX);
        state.apply_transition(Event::ShortPress);
        for _ in 0..4 {
            state.animation_step(0);
        }
        assert_eq!(state.blade_length(), BLADE_MAX - 4);

        let action = state.apply_transition(Event::ShortPress);
        assert_eq!(state.mode(), Mode::PoweringOn);
        assert_eq!(action, Some(Action::StartAnimation { target: BLADE_MAX }));
    }

    #[test]
    fn tap_hits_then_reverts_to_idle() {
        let mut state = BladeState::new();
        state.apply_transition(Event::ShortPress);
        run_animation(&mut state, BLADE_MAX);

        assert_eq!(state.apply_transition(Event::Tap), Some(Action::PlayClash));
        assert_eq!(state.mode(), Mode::Hit);
        // The scheduled revert task fires after the cue duration.
        assert!(state.revert_to_idle());
        assert_eq!(state.mode(), Mode::Idle);
        assert_eq!(state.blade_length(), BLADE_MAX);
    }

    #[test]
    fn reversal_wins_over_a_stale_final_step() {
        let mut state = BladeState::new();
        state.apply_transition(Event::ShortPress);
        for _ in 0..(BLADE_MAX - 1) {
            state.animation_step(BLADE_MAX);
        }
        assert_eq!(state.blade_length(), BLADE_MAX - 1);

        // Reverse one step short of full extension.
        state.apply_transition(Event::ShortPress);
        assert_eq!(state.mode(), Mode::PoweringOff);

        // A step the old ignition had already committed to may still
        // land, but its completion must not settle into idle over the
        // retraction that now owns the mode.
        state.animation_step(BLADE_MAX);
        assert_eq!(state.settle(BLADE_MAX), None);
        assert_eq!(state.mode(), Mode::PoweringOff);

        assert_eq!(run_animation(&mut state, 0) as u8, BLADE_MAX);
        assert_eq!(state.mode(), Mode::Off);
        assert_eq!(state.blade_length(), 0);
    }

    #[test]
    fn stale_revert_does_not_fire_into_a_new_mode() {
        let mut state = BladeState::new();
        state.apply_transition(Event::ShortPress);
        run_animation(&mut state, BLADE_MAX);
        state.apply_transition(Event::Tap);

        // Retraction pressed before the revert delay elapsed.
        state.apply_transition(Event::ShortPress);
        assert_eq!(state.mode(), Mode::PoweringOff);
        assert!(!state.revert_to_idle());
        assert_eq!(state.mode(), Mode::PoweringOff);
    }

    #[test]
    fn motion_is_ignored_outside_idle() {
        let mut state = BladeState::new();

        // Off, PoweringOn, PoweringOff, Configure, Hit, Swing, Hero.
        assert_eq!(state.apply_transition(Event::Tap), None);
        assert_eq!(state.mode(), Mode::Off);

        state.apply_transition(Event::ShortPress);
        assert_eq!(state.apply_transition(Event::Swing), None);
        assert_eq!(state.mode(), Mode::PoweringOn);
        run_animation(&mut state, BLADE_MAX);

        state.apply_transition(Event::LongPressStart);
        assert_eq!(state.mode(), Mode::Configure);
        assert_eq!(state.apply_transition(Event::Tap), None);
        assert_eq!(state.mode(), Mode::Configure);
        state.apply_transition(Event::LongPressStart);

        state.apply_transition(Event::Tap);
        assert_eq!(state.mode(), Mode::Hit);
        assert_eq!(state.apply_transition(Event::Swing), None);
        assert_eq!(state.mode(), Mode::Hit);
        state.revert_to_idle();

        state.apply_transition(Event::HeroPress);
        assert_eq!(state.mode(), Mode::Hero);
        assert_eq!(state.apply_transition(Event::Tap), None);
        assert_eq!(state.mode(), Mode::Hero);
    }

    #[test]
    fn hero_only_fires_from_idle() {
        let mut state = BladeState::new();
        assert_eq!(state.apply_transition(Event::HeroPress), None);
        assert_eq!(state.mode(), Mode::Off);

        state.apply_transition(Event::ShortPress);
        run_animation(&mut state, BLADE_MAX);
        match state.apply_transition(Event::HeroPress) {
            Some(Action::PlayHero(_)) => {}
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn configure_cycles_colour_and_leaves_it_on_exit() {
        let mut state = BladeState::new();
        state.apply_transition(Event::ShortPress);
        run_animation(&mut state, BLADE_MAX);

        assert_eq!(
            state.apply_transition(Event::LongPressStart),
            Some(Action::EnterConfigure)
        );
        let entry_index = state.color_index();
        for _ in 0..5 {
            assert_eq!(state.apply_transition(Event::ShortPress), None);
        }
        assert_eq!(state.color_index(), (entry_index + 5) % CYCLE_LEN);

        assert_eq!(
            state.apply_transition(Event::LongPressStart),
            Some(Action::ExitConfigure)
        );
        assert_eq!(state.mode(), Mode::Idle);
        assert_eq!(state.color_index(), (entry_index + 5) % CYCLE_LEN);
    }

    #[test]
    fn long_press_ignored_while_powering() {
        let mut state = BladeState::new();
        state.apply_transition(Event::ShortPress);
        assert_eq!(state.apply_transition(Event::LongPressStart), None);
        assert_eq!(state.mode(), Mode::PoweringOn);
    }

    #[test]
    fn configure_reachable_from_off() {
        let mut state = BladeState::new();
        assert_eq!(
            state.apply_transition(Event::LongPressStart),
            Some(Action::EnterConfigure)
        );
        assert_eq!(state.mode(), Mode::Configure);
        // Exit lands in idle even though the blade never ignited.
        state.apply_transition(Event::LongPressStart);
        assert_eq!(state.mode(), Mode::Idle);
        assert_eq!(state.blade_length(), 0);
    }

    #[test]
    fn ignition_cue_follows_step_direction() {
        let mut state = BladeState::new();
        assert_eq!(state.ignition_cue(BLADE_MAX), SoundCue::PowerOn);
        state.apply_transition(Event::ShortPress);
        run_animation(&mut state, BLADE_MAX);
        assert_eq!(state.ignition_cue(0), SoundCue::PowerOff);
    }

    #[test]
    #[should_panic(expected = "animation target out of range")]
    fn overlong_target_panics() {
        let mut state = BladeState::new();
        state.animation_step(BLADE_MAX + 1);
    }
}

//! Sound-cue catalogue.
//!
//! Each cue carries a serial sound-module track number, the wav asset
//! it was mastered from, and an approximate playback duration. The
//! durations exist purely to schedule the auto-revert back to idle;
//! nothing here attempts sample-accurate sync with the module.

use crate::{DEFAULT_REVERT_MS, Mode};

/// Number of clash variants kept on the sound module
pub const CLASH_COUNT: u8 = 8;

/// Number of swing variants kept on the sound module
pub const SWING_COUNT: u8 = 8;

/// Themed cue for the hero trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeroTheme {
    March,
    Anthem,
    Duel,
}

/// Every sound the prop can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundCue {
    PowerOn,
    IdleLoop,
    PowerOff,
    ColorCycle,
    /// One of the clash variants, index taken modulo [`CLASH_COUNT`]
    Clash(u8),
    /// One of the swing variants, index taken modulo [`SWING_COUNT`]
    Swing(u8),
    Hero(HeroTheme),
}

const CLASH_MS: [u32; CLASH_COUNT as usize] = [540, 480, 620, 500, 580, 460, 640, 520];
const SWING_MS: [u32; SWING_COUNT as usize] = [700, 660, 720, 640, 750, 610, 690, 730];

const CLASH_FILES: [&str; CLASH_COUNT as usize] = [
    "clash1.wav",
    "clash2.wav",
    "clash3.wav",
    "clash4.wav",
    "clash5.wav",
    "clash6.wav",
    "clash7.wav",
    "clash8.wav",
];
const SWING_FILES: [&str; SWING_COUNT as usize] = [
    "swing1.wav",
    "swing2.wav",
    "swing3.wav",
    "swing4.wav",
    "swing5.wav",
    "swing6.wav",
    "swing7.wav",
    "swing8.wav",
];

impl SoundCue {
    /// Track number on the sound module, matching the flash card layout
    pub fn track(self) -> u16 {
        match self {
            SoundCue::PowerOn => 1,
            SoundCue::IdleLoop => 2,
            SoundCue::PowerOff => 3,
            SoundCue::ColorCycle => 4,
            SoundCue::Clash(n) => 5 + u16::from(n % CLASH_COUNT),
            SoundCue::Swing(n) => 13 + u16::from(n % SWING_COUNT),
            SoundCue::Hero(HeroTheme::March) => 21,
            SoundCue::Hero(HeroTheme::Anthem) => 22,
            SoundCue::Hero(HeroTheme::Duel) => 23,
        }
    }

    /// The wav asset the track was mastered from
    pub fn file_name(self) -> &'static str {
        match self {
            SoundCue::PowerOn => "0_on.wav",
            SoundCue::IdleLoop => "1_idle.wav",
            SoundCue::PowerOff => "2_off.wav",
            SoundCue::ColorCycle => "z_color.wav",
            SoundCue::Clash(n) => CLASH_FILES[(n % CLASH_COUNT) as usize],
            SoundCue::Swing(n) => SWING_FILES[(n % SWING_COUNT) as usize],
            SoundCue::Hero(HeroTheme::March) => "zz_march.wav",
            SoundCue::Hero(HeroTheme::Anthem) => "zz_anthem.wav",
            SoundCue::Hero(HeroTheme::Duel) => "zz_duel.wav",
        }
    }

    /// Approximate playback duration, used only to schedule auto-revert.
    /// Unknown variant indices fall back to [`DEFAULT_REVERT_MS`].
    pub fn duration_ms(self) -> u32 {
        match self {
            SoundCue::PowerOn => 1500,
            SoundCue::IdleLoop => 4200,
            SoundCue::PowerOff => 1200,
            SoundCue::ColorCycle => 2600,
            SoundCue::Clash(n) => *CLASH_MS.get(n as usize).unwrap_or(&DEFAULT_REVERT_MS),
            SoundCue::Swing(n) => *SWING_MS.get(n as usize).unwrap_or(&DEFAULT_REVERT_MS),
            SoundCue::Hero(HeroTheme::March) => 10_750,
            SoundCue::Hero(HeroTheme::Anthem) => 9_800,
            SoundCue::Hero(HeroTheme::Duel) => 8_200,
        }
    }

    /// Whether the cue is meant to play as a loop
    pub fn loops(self) -> bool {
        matches!(self, SoundCue::IdleLoop | SoundCue::ColorCycle)
    }
}

/// Corrective action the render loop should take on the sound module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackFix {
    /// Restart the idle loop, it should be playing but is not
    RestartIdle,
    /// Stop playback, the blade is dark
    Silence,
}

/// Playback watchdog policy. `settled` is false while the module is
/// still reacting to the last command it was sent; its busy line lags
/// a command by tens of milliseconds, and correcting on the stale
/// level would restart the track on every check.
pub fn playback_watchdog(mode: Mode, playing: bool, settled: bool) -> Option<PlaybackFix> {
    if !settled {
        return None;
    }
    match mode {
        Mode::Idle if !playing => Some(PlaybackFix::RestartIdle),
        Mode::Off if playing => Some(PlaybackFix::Silence),
        _ => None,
    }
}

/// Pick the hero theme for the active colour index.
///
/// Only the first two palette entries get their own theme; every other
/// index (rainbow included) shares the duel theme. That collapse matches
/// the shipped prop and is deliberate, not a missing arm.
pub fn hero_theme(color_index: u8) -> HeroTheme {
    if color_index == 0 {
        HeroTheme::March
    } else if color_index == 1 {
        HeroTheme::Anthem
    } else {
        HeroTheme::Duel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_are_unique() {
        let mut tracks = std::vec::Vec::new();
        tracks.extend([
            SoundCue::PowerOn.track(),
            SoundCue::IdleLoop.track(),
            SoundCue::PowerOff.track(),
            SoundCue::ColorCycle.track(),
            SoundCue::Hero(HeroTheme::March).track(),
            SoundCue::Hero(HeroTheme::Anthem).track(),
            SoundCue::Hero(HeroTheme::Duel).track(),
        ]);
        for n in 0..CLASH_COUNT {
            tracks.push(SoundCue::Clash(n).track());
        }
        for n in 0..SWING_COUNT {
            tracks.push(SoundCue::Swing(n).track());
        }
        let count = tracks.len();
        tracks.sort_unstable();
        tracks.dedup();
        assert_eq!(tracks.len(), count);
    }

    #[test]
    fn out_of_range_variant_uses_fallback_delay() {
        assert_eq!(SoundCue::Clash(200).duration_ms(), DEFAULT_REVERT_MS);
        assert_eq!(SoundCue::Swing(200).duration_ms(), DEFAULT_REVERT_MS);
    }

    #[test]
    fn hero_themes_collapse_above_two() {
        assert_eq!(hero_theme(0), HeroTheme::March);
        assert_eq!(hero_theme(1), HeroTheme::Anthem);
        // Indices 2.. all land on the same theme, matching the shipped prop.
        assert_eq!(hero_theme(2), hero_theme(6));
        assert_eq!(hero_theme(7), HeroTheme::Duel);
    }

    #[test]
    fn watchdog_waits_out_the_command_lag() {
        // Just entered idle: the play command went out but the busy
        // line has not caught up. No correction until it settles.
        assert_eq!(playback_watchdog(Mode::Idle, false, false), None);
        assert_eq!(
            playback_watchdog(Mode::Idle, false, true),
            Some(PlaybackFix::RestartIdle)
        );
        assert_eq!(playback_watchdog(Mode::Off, true, false), None);
        assert_eq!(
            playback_watchdog(Mode::Off, true, true),
            Some(PlaybackFix::Silence)
        );
    }

    #[test]
    fn watchdog_leaves_healthy_playback_alone() {
        assert_eq!(playback_watchdog(Mode::Idle, true, true), None);
        assert_eq!(playback_watchdog(Mode::Off, false, true), None);
        // Transient and configure modes manage their own cues.
        assert_eq!(playback_watchdog(Mode::Hit, false, true), None);
        assert_eq!(playback_watchdog(Mode::Configure, false, true), None);
    }

    #[test]
    fn only_idle_and_colour_cues_loop() {
        assert!(SoundCue::IdleLoop.loops());
        assert!(SoundCue::ColorCycle.loops());
        assert!(!SoundCue::PowerOn.loops());
        assert!(!SoundCue::Clash(0).loops());
    }
}

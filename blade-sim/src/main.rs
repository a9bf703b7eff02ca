//! Terminal walk-through of the blade state machine.
//!
//! Runs the same `blade-core` logic as the firmware against a simulated
//! clock, with keyboard commands standing in for the buttons and the
//! accelerometer. The strip is drawn as a 38-character bar, lit from
//! both ends like the real thing.

use std::io::{self, Write};

use blade_core::render::{self, Frame};
use blade_core::sounds::SoundCue;
use blade_core::{
    ANIMATION_STEP_MS, Action, BLADE_MAX, BladeState, DEFAULT_REVERT_MS, Event, NUM_PIXELS, RGB8,
    Settled,
};

const COLOR_NAMES: [&str; 8] = [
    "red", "yellow", "green", "cyan", "blue", "purple", "white", "rainbow",
];

/// What the firmware's animation and revert tasks hold in their two
/// command slots, replayed here against a simulated clock.
struct Sim {
    state: BladeState,
    now_ms: u64,
    animation: Option<u8>,
    revert_at: Option<u64>,
    playing: Option<SoundCue>,
}

impl Sim {
    fn new() -> Self {
        Sim {
            state: BladeState::new(),
            now_ms: 0,
            animation: None,
            revert_at: None,
            playing: None,
        }
    }

    fn inject(&mut self, event: Event) {
        let Some(action) = self.state.apply_transition(event) else {
            return;
        };
        match action {
            Action::StartAnimation { target } => {
                self.revert_at = None;
                self.playing = Some(self.state.ignition_cue(target));
                self.animation = Some(target);
            }
            Action::PlayClash => self.play_transient(SoundCue::Clash(0)),
            Action::PlaySwing => self.play_transient(SoundCue::Swing(0)),
            Action::PlayHero(theme) => self.play_transient(SoundCue::Hero(theme)),
            Action::EnterConfigure => {
                self.revert_at = None;
                self.animation = None;
                self.playing = Some(SoundCue::ColorCycle);
            }
            Action::ExitConfigure => {
                self.playing = Some(SoundCue::IdleLoop);
            }
        }
    }

    fn play_transient(&mut self, cue: SoundCue) {
        self.playing = Some(cue);
        self.revert_at = Some(self.now_ms + u64::from(cue.duration_ms()));
    }

    /// Advance the simulated clock, firing animation steps and the
    /// pending auto-revert exactly as the firmware tasks would.
    fn advance(&mut self, mut ms: u64) {
        while ms > 0 {
            let step = ms.min(ANIMATION_STEP_MS);
            self.now_ms += step;
            ms -= step;

            if let Some(target) = self.animation {
                if self.state.animation_step(target) {
                    self.animation = None;
                    self.playing = match self.state.settle(target) {
                        Some(Settled::Idle) => Some(SoundCue::IdleLoop),
                        _ => None,
                    };
                }
            }
            if let Some(at) = self.revert_at {
                if self.now_ms >= at {
                    self.revert_at = None;
                    if self.state.revert_to_idle() {
                        self.playing = Some(SoundCue::IdleLoop);
                    }
                }
            }
        }
    }

    fn draw(&self) {
        let mut frame: Frame = [RGB8::default(); NUM_PIXELS];
        let powered = render::compose(
            self.state.mode(),
            self.state.blade_length(),
            self.state.active_color(),
            &mut frame,
        );
        let bar: String = frame
            .iter()
            .map(|p| if *p == RGB8::default() { ' ' } else { '#' })
            .collect();
        let cue = self.playing.map_or("-", SoundCue::file_name);
        println!(
            "  [{}]  t={:>6}ms  mode={:<12} len={:>2}/{}  colour={:<7} cue={}  rail={}",
            bar,
            self.now_ms,
            self.state.mode().name(),
            self.state.blade_length(),
            BLADE_MAX,
            COLOR_NAMES[self.state.color_index() as usize],
            cue,
            if powered { "on" } else { "off" },
        );
    }
}

fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}

fn print_menu() {
    println!();
    println!("  p        short press (ignite / retract / next colour)");
    println!("  l        long press (enter or leave configure)");
    println!("  x        hero trigger");
    println!("  t        tap the blade (hit)");
    println!("  s        swing the blade");
    println!("  n [MS]   advance time (default one animation step)");
    println!("  r        run until the blade settles");
    println!("  q        quit");
    println!();
}

fn main() {
    println!();
    println!("ion-blade state machine demo, {NUM_PIXELS} pixel strip, blade max {BLADE_MAX}");
    print_menu();

    let mut sim = Sim::new();
    sim.draw();

    loop {
        let line = read_line("> ");
        let line = line.trim();
        let mut parts = line.split_whitespace();
        match parts.next().unwrap_or("") {
            "p" => sim.inject(Event::ShortPress),
            "l" => sim.inject(Event::LongPressStart),
            "x" => sim.inject(Event::HeroPress),
            "t" => sim.inject(Event::Tap),
            "s" => sim.inject(Event::Swing),
            "n" => {
                let ms = parts
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(ANIMATION_STEP_MS);
                sim.advance(ms);
            }
            "r" => {
                let deadline = u64::from(DEFAULT_REVERT_MS).max(
                    u64::from(BLADE_MAX) * ANIMATION_STEP_MS + ANIMATION_STEP_MS,
                );
                sim.advance(deadline);
            }
            "q" => break,
            "" => {}
            other => {
                println!("  unknown command {other:?}");
                print_menu();
                continue;
            }
        }
        sim.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blade_core::Mode;

    #[test]
    fn scripted_power_cycle() {
        let mut sim = Sim::new();
        sim.inject(Event::ShortPress);
        assert_eq!(sim.state.mode(), Mode::PoweringOn);
        sim.advance(u64::from(BLADE_MAX) * ANIMATION_STEP_MS);
        assert_eq!(sim.state.mode(), Mode::Idle);
        assert_eq!(sim.state.blade_length(), BLADE_MAX);

        sim.inject(Event::ShortPress);
        sim.advance(u64::from(BLADE_MAX) * ANIMATION_STEP_MS);
        assert_eq!(sim.state.mode(), Mode::Off);
        assert_eq!(sim.state.blade_length(), 0);
    }

    #[test]
    fn hit_reverts_after_cue_duration() {
        let mut sim = Sim::new();
        sim.inject(Event::ShortPress);
        sim.advance(u64::from(BLADE_MAX) * ANIMATION_STEP_MS);

        sim.inject(Event::Tap);
        assert_eq!(sim.state.mode(), Mode::Hit);
        let wait = u64::from(SoundCue::Clash(0).duration_ms());
        sim.advance(wait - ANIMATION_STEP_MS);
        assert_eq!(sim.state.mode(), Mode::Hit);
        sim.advance(2 * ANIMATION_STEP_MS);
        assert_eq!(sim.state.mode(), Mode::Idle);
    }

    #[test]
    fn reversal_mid_ignition_settles_off() {
        let mut sim = Sim::new();
        sim.inject(Event::ShortPress);
        sim.advance(5 * ANIMATION_STEP_MS);
        assert_eq!(sim.state.blade_length(), 5);

        sim.inject(Event::ShortPress);
        assert_eq!(sim.state.mode(), Mode::PoweringOff);
        sim.advance(5 * ANIMATION_STEP_MS);
        assert_eq!(sim.state.mode(), Mode::Off);
        assert_eq!(sim.state.blade_length(), 0);
    }
}

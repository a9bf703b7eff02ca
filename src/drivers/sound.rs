//! Serial sound-module driver (DFPlayer-style command frames).
//!
//! The module keeps the wav tracks on its own flash card and does all
//! decoding internally; we only address tracks by number over UART and
//! read a busy pin to see whether anything is still playing. A cue that
//! fails to go out is logged and dropped, the prop never stalls on it.

use blade_core::sounds::SoundCue;
use embassy_time::{Duration, Instant};
use esp_hal::{
    Async,
    gpio::Input,
    uart::{Uart, UartTx},
};

/// How long the module takes to act on a command and move its busy
/// line. Until this has elapsed the line still shows the old state.
const COMMAND_GRACE: Duration = Duration::from_millis(100);

const FRAME_LEN: usize = 10;
const START: u8 = 0x7E;
const VERSION: u8 = 0xFF;
const LENGTH: u8 = 0x06;
const END: u8 = 0xEF;

const CMD_PLAY_TRACK: u8 = 0x03;
const CMD_SET_VOLUME: u8 = 0x06;
const CMD_LOOP_TRACK: u8 = 0x08;
const CMD_STOP: u8 = 0x16;

pub struct SoundModule {
    tx: UartTx<'static, Async>,
    busy: Input<'static>,
    last_command: Instant,
}

impl SoundModule {
    /// `busy` is the module's busy line, driven low while a track plays.
    pub fn new(uart: Uart<'static, Async>, busy: Input<'static>) -> Self {
        let (_, tx) = uart.split();
        Self {
            tx,
            busy,
            last_command: Instant::now(),
        }
    }

    /// Set the output volume, 0..=30.
    pub async fn set_volume(&mut self, volume: u8) {
        self.send(CMD_SET_VOLUME, u16::from(volume.min(30))).await;
    }

    /// Start a cue, replacing whatever is currently playing. Looping
    /// cues loop on the module itself.
    pub async fn play(&mut self, cue: SoundCue) {
        let cmd = if cue.loops() {
            CMD_LOOP_TRACK
        } else {
            CMD_PLAY_TRACK
        };
        self.send(cmd, cue.track()).await;
    }

    /// Stop playback.
    pub async fn stop(&mut self) {
        self.send(CMD_STOP, 0).await;
    }

    /// Busy line is active low while a track is playing.
    pub fn is_playing(&self) -> bool {
        self.busy.is_low()
    }

    /// Whether the busy line reflects the last command yet.
    pub fn command_settled(&self) -> bool {
        Instant::now() - self.last_command >= COMMAND_GRACE
    }

    async fn send(&mut self, cmd: u8, param: u16) {
        self.last_command = Instant::now();
        let frame = encode(cmd, param);
        if self.tx.write_async(&frame).await.is_err() {
            defmt::warn!("sound module write failed, dropping cue");
        }
    }
}

fn encode(cmd: u8, param: u16) -> [u8; FRAME_LEN] {
    let [hi, lo] = param.to_be_bytes();
    // No feedback frame requested; the busy pin is our only status.
    let payload = [VERSION, LENGTH, cmd, 0x00, hi, lo];
    let sum: u16 = payload.iter().map(|b| u16::from(*b)).sum();
    let checksum = 0u16.wrapping_sub(sum);
    let [ck_hi, ck_lo] = checksum.to_be_bytes();
    [
        START, VERSION, LENGTH, cmd, 0x00, hi, lo, ck_hi, ck_lo, END,
    ]
}

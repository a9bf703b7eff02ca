//! Register-level LIS3DH driver over async I2C.
//!
//! Only the slice of the chip this prop needs: wake the part at 400 Hz
//! in the ±2 g range, arm the single-click (tap) engine with the hit
//! threshold, and expose acceleration in m/s² plus the latched click
//! flag. Kept in-tree instead of pulling a full driver crate so the
//! tap configuration stays exactly what the prop was tuned with.

use embedded_hal_async::i2c::I2c;
use esp_hal::{Async, i2c::master::I2c as I2cMaster};

pub const LIS3DH_ADDR: u8 = 0x18;

const REG_WHO_AM_I: u8 = 0x0F;
const REG_CTRL_REG1: u8 = 0x20;
const REG_CTRL_REG2: u8 = 0x21;
const REG_CTRL_REG4: u8 = 0x23;
const REG_OUT_X_L: u8 = 0x28;
const REG_CLICK_CFG: u8 = 0x38;
const REG_CLICK_SRC: u8 = 0x39;
const REG_CLICK_THS: u8 = 0x3A;
const REG_TIME_LIMIT: u8 = 0x3B;
const REG_TIME_LATENCY: u8 = 0x3C;

const WHO_AM_I_EXPECTED: u8 = 0x33;
/// Auto-increment flag for multi-byte reads
const AUTO_INC: u8 = 0x80;
/// Click interrupt-active bit in CLICK_SRC
const CLICK_IA: u8 = 0x40;

/// 12-bit left-justified counts per g in the ±2 g range
const COUNTS_PER_G: f32 = 1024.0;
const STANDARD_GRAVITY: f32 = 9.80665;

pub type AccelError = esp_hal::i2c::master::Error;

pub struct Accelerometer {
    i2c: I2cMaster<'static, Async>,
}

impl Accelerometer {
    pub fn new(i2c: I2cMaster<'static, Async>) -> Self {
        Self { i2c }
    }

    /// Verify the device answers on the bus.
    pub async fn is_connected(&mut self) -> bool {
        let mut buf = [0u8; 1];
        match self
            .i2c
            .write_read(LIS3DH_ADDR, &[REG_WHO_AM_I], &mut buf)
            .await
        {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the chip and arm the click engine.
    ///
    /// `click_threshold` maps straight onto the 7-bit CLICK_THS
    /// register; smaller values tap more easily.
    pub async fn init(&mut self, click_threshold: u8) -> Result<(), AccelError> {
        // 400 Hz, normal mode, X/Y/Z enabled.
        self.write(REG_CTRL_REG1, 0x77).await?;
        // High-pass filter on the click input only.
        self.write(REG_CTRL_REG2, 0x04).await?;
        // ±2 g, high-resolution mode.
        self.write(REG_CTRL_REG4, 0x08).await?;
        // Single click on all three axes.
        self.write(REG_CLICK_CFG, 0x15).await?;
        self.write(REG_CLICK_THS, click_threshold & 0x7F).await?;
        // Impact window / dead time in ODR cycles.
        self.write(REG_TIME_LIMIT, 10).await?;
        self.write(REG_TIME_LATENCY, 20).await?;
        Ok(())
    }

    /// Burst-read all three axes, converted to m/s².
    pub async fn acceleration(&mut self) -> Result<(f32, f32, f32), AccelError> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(LIS3DH_ADDR, &[REG_OUT_X_L | AUTO_INC], &mut raw)
            .await?;
        Ok((
            convert(raw[0], raw[1]),
            convert(raw[2], raw[3]),
            convert(raw[4], raw[5]),
        ))
    }

    /// Whether a tap was registered since the last call. Reading the
    /// click source register clears the latched flag, so this is
    /// edge-triggered by construction.
    pub async fn tapped(&mut self) -> Result<bool, AccelError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(LIS3DH_ADDR, &[REG_CLICK_SRC], &mut buf)
            .await?;
        Ok(buf[0] & CLICK_IA != 0)
    }

    async fn write(&mut self, reg: u8, value: u8) -> Result<(), AccelError> {
        self.i2c.write(LIS3DH_ADDR, &[reg, value]).await
    }
}

fn convert(lo: u8, hi: u8) -> f32 {
    let counts = i16::from_le_bytes([lo, hi]) >> 4;
    f32::from(counts) / COUNTS_PER_G * STANDARD_GRAVITY
}

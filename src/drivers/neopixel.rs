use blade_core::NUM_PIXELS;
use esp_hal::{
    Async,
    gpio::interconnect::PeripheralOutput,
    rmt::{ConstChannelAccess, Rmt, Tx},
};
use esp_hal_smartled::{SmartLedsAdapterAsync, buffer_size_async};
use smart_leds::{RGB8, SmartLedsWriteAsync};

/// We must know what the LED TX buffer size is as a constant for the types involved here
const LED_INTERNAL_BUF_LEN: usize = buffer_size_async(NUM_PIXELS);

/// Strip-sized frame, shared with the pattern code in blade-core
pub type LedBuffer = [RGB8; NUM_PIXELS];

/// Holds the state needed to drive the LED strip
pub struct LedDriver {
    /// Driver for the led array, sized to exactly what
    /// `SmartLedsAdapterAsync::new()` hands back for our strip
    led: SmartLedsAdapterAsync<ConstChannelAccess<Tx, 0>, LED_INTERNAL_BUF_LEN>,
}

impl LedDriver {
    /// Create a new driver for the LED strip.
    ///
    /// # Parameters
    /// * `rmt` - The RMT peripheral device to use for driving the LED strip
    /// * `pin` - The GPIO pin to which the LED strip is connected
    pub fn new<'a>(rmt: Rmt<Async>, pin: impl PeripheralOutput<'a>) -> Self {
        let channel = rmt.channel0;
        let buffer = [0_u32; buffer_size_async(NUM_PIXELS)];
        let led = SmartLedsAdapterAsync::new(channel, pin, buffer);
        Self { led }
    }

    /// Push a frame to the strip, applying gamma correction and global
    /// brightness on the way out. A render write failing is a transient
    /// fault on a toy; log it and carry on with the old frame showing.
    pub async fn update_from_buffer(&mut self, led_buffer: &LedBuffer, brightness: u8) {
        let adjusted =
            smart_leds::brightness(smart_leds::gamma(led_buffer.iter().cloned()), brightness);
        if self.led.write(adjusted).await.is_err() {
            defmt::warn!("LED strip write failed, keeping previous frame");
        }
    }
}

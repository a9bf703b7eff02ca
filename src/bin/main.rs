#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use blade_core::HIT_THRESHOLD;
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use esp_hal::{
    Config,
    clock::CpuClock,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    rmt::Rmt,
    time::Rate,
    timer::systimer::SystemTimer,
    uart::{Config as UartConfig, Uart},
};
use ion_blade::{
    SOUND_BAUD,
    drivers::{accel::Accelerometer, button::Button, neopixel::LedDriver, sound::SoundModule},
    tasks::{animation_task, event_loop, render_task, revert_task},
};
use panic_rtt_target as _;
use static_cell::StaticCell;

/// Our LED driver that underlies the render task
static LED_DRIVER: StaticCell<LedDriver> = StaticCell::new();

/// Sound module shared between the event loop, the timed tasks and the
/// render loop's watchdog
static SOUND: StaticCell<Mutex<CriticalSectionRawMutex, SoundModule>> = StaticCell::new();

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    #[cfg(all(feature = "rtt", feature = "defmt"))]
    rtt_target::rtt_init_defmt!();

    let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));
    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    // LED strip on the RMT peripheral
    let rmt = Rmt::new(peripherals.RMT, Rate::from_mhz(80))
        .expect("Failed to initialise RMT0")
        .into_async();
    let led_driver = LED_DRIVER.init(LedDriver::new(rmt, peripherals.GPIO2));

    // External power rail for strip and amplifier, off until first render
    let power_rail = Output::new(peripherals.GPIO10, Level::Low, OutputConfig::default());

    // Serial sound module plus its busy line
    let uart = Uart::new(
        peripherals.UART1,
        UartConfig::default().with_baudrate(SOUND_BAUD),
    )
    .expect("Failed to initialise UART1")
    .with_tx(peripherals.GPIO21)
    .with_rx(peripherals.GPIO20)
    .into_async();
    let busy = Input::new(peripherals.GPIO7, InputConfig::default().with_pull(Pull::Up));
    let mut sound_module = SoundModule::new(uart, busy);
    sound_module.set_volume(24).await;
    let sound = &*SOUND.init(Mutex::new(sound_module));

    // Accelerometer on I2C
    let i2c = I2c::new(peripherals.I2C0, I2cConfig::default())
        .expect("Failed to initialise I2C0")
        .with_scl(peripherals.GPIO6)
        .with_sda(peripherals.GPIO5)
        .into_async();
    let mut accel = Accelerometer::new(i2c);
    if accel.is_connected().await {
        if accel.init(HIT_THRESHOLD).await.is_err() {
            warn!("MAIN: accelerometer configuration failed, motion disabled");
        }
    } else {
        warn!("MAIN: accelerometer not responding, motion disabled");
    }

    // Buttons: main (ignite/configure) and hero trigger
    let config = InputConfig::default().with_pull(Pull::Up);
    let power_button = Button::new(Input::new(peripherals.GPIO9, config));
    let hero_button = Button::new(Input::new(peripherals.GPIO3, config));

    spawner
        .spawn(render_task(led_driver, power_rail, sound))
        .expect("Failed to spawn render task");
    spawner
        .spawn(animation_task(sound))
        .expect("Failed to spawn animation task");
    spawner
        .spawn(revert_task(sound))
        .expect("Failed to spawn revert task");

    info!("MAIN: entering event loop");
    event_loop(power_button, hero_button, accel, sound).await
}

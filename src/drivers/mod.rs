pub mod accel;
pub mod button;
pub mod neopixel;
pub mod sound;

#![cfg_attr(not(test), no_std)]

//! ESP32-S3 board glue for the perforator panel: keypad sampling, the hole
//! sensor, the stepper pulse driver, the OLED canvas and flash persistence.

pub mod input;
pub mod motion;
pub mod render;
pub mod sensor;
// ROM flash routines only exist on the chip.
#[cfg(target_arch = "xtensa")]
pub mod storage;

#![cfg_attr(not(test), no_std)]

//! Board-independent core of the perforator control panel: keypad events,
//! carriage motion intent, the menu graph, and the dispatcher that ties them
//! together.

pub mod app;
pub mod input;
pub mod menu;
pub mod motion;
pub mod render;
pub mod settings;

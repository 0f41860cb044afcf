//! Resistor-ladder keypad decoding.
//!
//! All four buttons share one ADC pin; each pulls the divider to a distinct
//! level and the idle level sits above every button level. The decoder
//! classifies raw samples, debounces them, and turns stable changes into
//! click/release edges.

use log::debug;

use super::{Button, InputEvent};

const BUTTONS: [Button; 4] = [Button::Back, Button::Select, Button::Left, Button::Right];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct KeypadConfig {
    /// Nominal raw readings for Back, Select, Left, Right.
    levels: [u16; 4],
    tolerance: u16,
    debounce_polls: u8,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self {
            levels: [0, 820, 1_650, 2_480],
            tolerance: 300,
            debounce_polls: 3,
        }
    }
}

impl KeypadConfig {
    pub const fn with_levels(mut self, back: u16, select: u16, left: u16, right: u16) -> Self {
        self.levels = [back, select, left, right];
        self
    }

    pub const fn with_tolerance(mut self, tolerance: u16) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }

    /// Nearest button whose level lies within the tolerance, if any.
    pub fn classify(&self, sample: u16) -> Option<Button> {
        BUTTONS
            .iter()
            .zip(self.levels.iter())
            .map(|(&button, &level)| (button, sample.abs_diff(level)))
            .filter(|&(_, distance)| distance <= self.tolerance)
            .min_by_key(|&(_, distance)| distance)
            .map(|(button, _)| button)
    }
}

#[derive(Debug, Clone)]
pub struct KeypadDecoder {
    config: KeypadConfig,
    raw: Option<Button>,
    stable: Option<Button>,
    stable_count: u8,
    pending_event: Option<InputEvent>,
}

impl KeypadDecoder {
    pub const fn new(config: KeypadConfig) -> Self {
        Self {
            config,
            raw: None,
            stable: None,
            stable_count: 0,
            pending_event: None,
        }
    }

    /// Button currently held after debouncing.
    pub fn held(&self) -> Option<Button> {
        self.stable
    }

    /// Edge queued behind a release when one button slid directly into another.
    pub fn take_pending(&mut self) -> Option<InputEvent> {
        self.pending_event.take()
    }

    /// Feeds one raw ADC sample.
    pub fn feed(&mut self, sample: u16) -> Option<InputEvent> {
        let reading = self.config.classify(sample);

        if reading == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = reading;
            self.stable_count = 0;
        }

        let debounce_threshold = self.config.debounce_polls.max(1);
        if self.stable_count < debounce_threshold || self.stable == self.raw {
            return None;
        }

        let previous = self.stable;
        self.stable = self.raw;
        debug!("keypad: {:?} -> {:?} (sample={})", previous, self.stable, sample);

        match (previous, self.stable) {
            (None, Some(button)) => Some(InputEvent::click(button)),
            (Some(button), None) => Some(InputEvent::release(button)),
            (Some(old), Some(new)) => {
                self.pending_event = Some(InputEvent::click(new));
                Some(InputEvent::release(old))
            }
            (None, None) => None,
        }
    }
}

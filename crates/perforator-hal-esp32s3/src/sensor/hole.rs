use embedded_hal::digital::InputPin;

use perforator_core::motion::MotionState;

#[derive(Debug, Clone, Copy)]
pub struct HoleSensorConfig {
    active_low: bool,
    debounce_polls: u8,
}

impl Default for HoleSensorConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_polls: 2,
        }
    }
}

impl HoleSensorConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }
}

/// Optical or inductive hole detector on a digital input.
///
/// Every debounced inactive-to-active edge counts as one hole passed in the
/// commanded direction.
#[derive(Debug)]
pub struct HoleSensor<PIN> {
    pin: PIN,
    config: HoleSensorConfig,
    raw: bool,
    stable: bool,
    stable_count: u8,
}

impl<PIN> HoleSensor<PIN>
where
    PIN: InputPin,
{
    pub fn new(mut pin: PIN, config: HoleSensorConfig) -> Result<Self, PIN::Error> {
        let active = level_is_active(pin.is_high()?, config.active_low);

        Ok(Self {
            pin,
            config,
            raw: active,
            stable: active,
            stable_count: 0,
        })
    }

    /// Samples the pin once; returns `true` when a hole was recorded.
    pub fn poll(&mut self, motion: &mut MotionState) -> Result<bool, PIN::Error> {
        let active = level_is_active(self.pin.is_high()?, self.config.active_low);

        if active == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = active;
            self.stable_count = 0;
        }

        if self.stable_count < self.config.debounce_polls.max(1) || self.stable == self.raw {
            return Ok(false);
        }

        self.stable = self.raw;
        if self.stable {
            motion.record_hole();
            return Ok(true);
        }

        Ok(false)
    }
}

#[inline]
fn level_is_active(high: bool, active_low: bool) -> bool {
    if active_low { !high } else { high }
}

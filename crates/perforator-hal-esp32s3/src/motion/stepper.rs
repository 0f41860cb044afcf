use embedded_hal::digital::OutputPin;
use log::debug;

use perforator_core::motion::{Direction, MotionState};

#[derive(Debug, Clone, Copy)]
pub struct StepperConfig {
    step_period_us: u32,
    up_is_high: bool,
    enable_active_low: bool,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            step_period_us: 2_000,
            up_is_high: true,
            enable_active_low: true,
        }
    }
}

impl StepperConfig {
    pub const fn with_step_period_us(mut self, step_period_us: u32) -> Self {
        self.step_period_us = step_period_us;
        self
    }

    pub const fn with_up_is_high(mut self, up_is_high: bool) -> Self {
        self.up_is_high = up_is_high;
        self
    }

    pub const fn with_enable_active_low(mut self, enable_active_low: bool) -> Self {
        self.enable_active_low = enable_active_low;
        self
    }
}

#[derive(Debug)]
pub enum StepperError<StepErr, DirErr, EnErr> {
    Step(StepErr),
    Dir(DirErr),
    Enable(EnErr),
}

type StepperResult<StepErr, DirErr, EnErr> = Result<(), StepperError<StepErr, DirErr, EnErr>>;

/// STEP/DIR/EN driver stage (A4988, DRV8825 and friends) run at one fixed rate.
///
/// The STEP pin toggles every half period while the carriage is commanded to
/// run; the driver is disabled whenever a stop edge is consumed.
#[derive(Debug)]
pub struct StepperDriver<STEP, DIR, EN> {
    step: STEP,
    dir: DIR,
    en: EN,
    config: StepperConfig,
    enabled: bool,
    step_high: bool,
    direction: Option<Direction>,
    next_edge_us: u64,
}

impl<STEP, DIR, EN> StepperDriver<STEP, DIR, EN>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
{
    pub fn new(
        step: STEP,
        dir: DIR,
        en: EN,
        config: StepperConfig,
    ) -> Result<Self, StepperError<STEP::Error, DIR::Error, EN::Error>> {
        let mut driver = Self {
            step,
            dir,
            en,
            config,
            enabled: true,
            step_high: true,
            direction: None,
            next_edge_us: 0,
        };
        driver.disable()?;
        Ok(driver)
    }

    /// Follows the motion flags; call once per control-loop pass.
    pub fn service(
        &mut self,
        motion: &mut MotionState,
        now_us: u64,
    ) -> StepperResult<STEP::Error, DIR::Error, EN::Error> {
        if motion.take_stop() {
            self.disable()?;
        }

        if !motion.is_running() {
            return Ok(());
        }

        let direction = motion.direction();
        if self.direction != Some(direction) {
            let high = (direction == Direction::Up) == self.config.up_is_high;
            if high {
                self.dir.set_high().map_err(StepperError::Dir)?;
            } else {
                self.dir.set_low().map_err(StepperError::Dir)?;
            }
            self.direction = Some(direction);
        }

        if !self.enabled {
            self.set_enable(true)?;
            self.next_edge_us = now_us;
            debug!("stepper: enabled {:?}", direction);
        }

        if now_us < self.next_edge_us {
            return Ok(());
        }

        if self.step_high {
            self.step.set_low().map_err(StepperError::Step)?;
        } else {
            self.step.set_high().map_err(StepperError::Step)?;
        }
        self.step_high = !self.step_high;
        self.next_edge_us = now_us + u64::from(self.config.step_period_us.max(2) / 2);

        Ok(())
    }

    fn disable(&mut self) -> StepperResult<STEP::Error, DIR::Error, EN::Error> {
        if self.step_high {
            self.step.set_low().map_err(StepperError::Step)?;
            self.step_high = false;
        }
        if self.enabled {
            self.set_enable(false)?;
            debug!("stepper: disabled");
        }
        Ok(())
    }

    fn set_enable(&mut self, enabled: bool) -> StepperResult<STEP::Error, DIR::Error, EN::Error> {
        let high = enabled != self.config.enable_active_low;
        if high {
            self.en.set_high().map_err(StepperError::Enable)?;
        } else {
            self.en.set_low().map_err(StepperError::Enable)?;
        }
        self.enabled = enabled;
        Ok(())
    }
}

//! Calibration persistence abstraction.
//!
//! Only the carriage position survives a reboot: a calibration reset writes
//! it, boot reads it back.

/// Abstract calibration persistence backend.
pub trait CalibrationStore {
    type Error;

    fn load(&mut self) -> Result<Option<i32>, Self::Error>;
    fn save(&mut self, position_holes: i32) -> Result<(), Self::Error>;
}

/// Volatile store for bring-up and tests.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct RamCalibrationStore {
    position_holes: Option<i32>,
}

impl RamCalibrationStore {
    pub const fn new() -> Self {
        Self {
            position_holes: None,
        }
    }
}

impl CalibrationStore for RamCalibrationStore {
    type Error = core::convert::Infallible;

    fn load(&mut self) -> Result<Option<i32>, Self::Error> {
        Ok(self.position_holes)
    }

    fn save(&mut self, position_holes: i32) -> Result<(), Self::Error> {
        self.position_holes = Some(position_holes);
        Ok(())
    }
}

#![cfg_attr(not(test), no_std)]

//! SH1106 (1.3" 128x64 OLED) driver primitives.

mod framebuffer;
pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use framebuffer::FrameBuffer;

use core::convert::TryFrom;

use embedded_hal::i2c::I2c;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// 7-bit I2C address.
    pub address: u8,
    /// First RAM column of the visible area.
    pub column_offset: u8,
    /// Contrast applied after the init sequence.
    pub contrast: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: protocol::DEFAULT_ADDRESS,
            column_offset: protocol::DEFAULT_COLUMN_OFFSET,
            contrast: 0xCF,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<I2cErr> {
    /// I2C transaction failed.
    I2c(I2cErr),
    /// Input parameters are outside supported bounds.
    InvalidInput,
}

pub type DriverResult<I2cErr> = Result<(), Error<I2cErr>>;

/// SH1106 driver.
#[derive(Debug)]
pub struct Sh1106<I2C> {
    i2c: I2C,
    config: Config,
}

impl<I2C> Sh1106<I2C>
where
    I2C: I2c,
{
    /// Creates a new driver instance.
    pub fn new(i2c: I2C, config: Config) -> Self {
        Self { i2c, config }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases the owned bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Runs the power-up sequence and applies the configured contrast.
    pub fn initialize(&mut self) -> DriverResult<I2C::Error> {
        let mut packet = [0u8; 1 + protocol::INIT_SEQUENCE.len()];
        packet[0] = protocol::CONTROL_COMMAND;
        packet[1..].copy_from_slice(&protocol::INIT_SEQUENCE);
        self.write(&packet)?;
        self.set_contrast(self.config.contrast)
    }

    pub fn set_contrast(&mut self, level: u8) -> DriverResult<I2C::Error> {
        self.write(&protocol::build_contrast(level))
    }

    pub fn display_on(&mut self) -> DriverResult<I2C::Error> {
        self.write(&[protocol::CONTROL_COMMAND, protocol::CMD_DISPLAY_ON])
    }

    pub fn display_off(&mut self) -> DriverResult<I2C::Error> {
        self.write(&[protocol::CONTROL_COMMAND, protocol::CMD_DISPLAY_OFF])
    }

    /// Writes one page (0..8) of column bytes.
    pub fn write_page(
        &mut self,
        page: u8,
        data: &[u8; protocol::WIDTH],
    ) -> DriverResult<I2C::Error> {
        let address = protocol::build_page_address(page, self.config.column_offset)
            .ok_or(Error::InvalidInput)?;
        self.write(&address)?;
        self.write(&protocol::build_page_packet(data))
    }

    /// Flushes a full framebuffer.
    pub fn flush_full(&mut self, buffer: &[u8; protocol::BUFFER_SIZE]) -> DriverResult<I2C::Error> {
        for (page, data) in buffer.chunks_exact(protocol::WIDTH).enumerate() {
            let data = <&[u8; protocol::WIDTH]>::try_from(data).map_err(|_| Error::InvalidInput)?;
            self.write_page(page as u8, data)?;
        }

        Ok(())
    }

    /// Flushes a [`FrameBuffer`].
    pub fn flush_frame(&mut self, frame: &FrameBuffer) -> DriverResult<I2C::Error> {
        self.flush_full(frame.bytes())
    }

    fn write(&mut self, bytes: &[u8]) -> DriverResult<I2C::Error> {
        self.i2c
            .write(self.config.address, bytes)
            .map_err(Error::I2c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, Operation};

    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for RecordingBus {
        type Error = core::convert::Infallible;
    }

    impl I2c for RecordingBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn initialize_sends_command_stream_then_contrast() {
        let mut display = Sh1106::new(RecordingBus::default(), Config::default());
        display.initialize().unwrap();

        let bus = display.release();
        assert_eq!(bus.writes.len(), 2);
        assert_eq!(bus.writes[0].0, protocol::DEFAULT_ADDRESS);
        assert_eq!(bus.writes[0].1[0], protocol::CONTROL_COMMAND);
        assert_eq!(&bus.writes[0].1[1..], &protocol::INIT_SEQUENCE[..]);
        assert_eq!(bus.writes[1].1, [0x00, protocol::CMD_SET_CONTRAST, 0xCF]);
    }

    #[test]
    fn flush_writes_every_page_with_offset() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(0, 63, true);

        let mut display = Sh1106::new(RecordingBus::default(), Config::default());
        display.flush_frame(&frame).unwrap();

        let bus = display.release();
        assert_eq!(bus.writes.len(), protocol::PAGES * 2);
        assert_eq!(bus.writes[14].1, [0x00, 0xB7, 0x02, 0x10]);
        let last_page = &bus.writes[15].1;
        assert_eq!(last_page[0], protocol::CONTROL_DATA);
        assert_eq!(last_page[1], 0b1000_0000);
    }

    #[test]
    fn panel_power_commands_are_single_bytes() {
        let mut display = Sh1106::new(RecordingBus::default(), Config::default());
        display.display_off().unwrap();
        display.display_on().unwrap();

        let bus = display.release();
        assert_eq!(bus.writes[0].1, [protocol::CONTROL_COMMAND, protocol::CMD_DISPLAY_OFF]);
        assert_eq!(bus.writes[1].1, [protocol::CONTROL_COMMAND, protocol::CMD_DISPLAY_ON]);
    }
}

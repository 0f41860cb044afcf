use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use log::info;
use perforator_core::settings::CalibrationStore;

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 16 * 1024 * 1024;

const CALIBRATION_MAGIC: u32 = 0x3143_5250; // "PRC1"
const CALIBRATION_VERSION: u8 = 1;
// magic(4) version(1) reserved(3) position(4) checksum(4)
const CALIBRATION_RECORD_LEN: usize = 16;
const CHECKSUM_OFFSET: usize = CALIBRATION_RECORD_LEN - 4;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashCalibrationError {
    PartitionTable,
    PartitionMissing,
    FlashOpFailed(i32),
    Corrupted,
    Unsupported,
}

/// Word-aligned access to the SPI flash through the ROM routines.
#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashCalibrationError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashCalibrationError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashCalibrationError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashCalibrationError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashCalibrationError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashCalibrationError> {
        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashCalibrationError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashCalibrationError> {
        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashCalibrationError::FlashOpFailed(rc));
        }
        Ok(())
    }

    /// Reads `out.len()` bytes starting at the word-aligned `addr`.
    fn read_aligned(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashCalibrationError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashCalibrationError::Unsupported);
        }

        for (index, chunk) in out.chunks_mut(4).enumerate() {
            let word = self.read_word(addr + (index as u32) * 4)?.to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }

    /// Programs `data` into erased flash at the word-aligned `addr`.
    fn write_aligned(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashCalibrationError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashCalibrationError::Unsupported);
        }

        for (index, chunk) in data.chunks(4).enumerate() {
            let mut word = [0xFFu8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            self.write_word(addr + (index as u32) * 4, u32::from_le_bytes(word))?;
        }
        Ok(())
    }
}

// The partition-table reader only needs reads; the table sits word-aligned.
impl ReadStorage for RawFlash {
    type Error = FlashCalibrationError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_aligned(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(FlashCalibrationError::Unsupported)
    }
}

/// Calibration record in the last sector of the first writable data
/// partition (NVS as a fallback).
#[derive(Debug)]
pub struct FlashCalibrationStore {
    flash: RawFlash,
    record_addr: u32,
}

impl FlashCalibrationStore {
    pub fn new() -> Result<Self, FlashCalibrationError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashCalibrationError::PartitionTable)?;

        let mut data_undefined: Option<(u32, u32)> = None;
        let mut fallback_nvs: Option<(u32, u32)> = None;

        for entry in table.iter() {
            if entry.is_read_only() || entry.len() < FLASH_SECTOR_SIZE {
                continue;
            }

            match entry.partition_type() {
                PartitionType::Data(DataPartitionSubType::Undefined) => {
                    data_undefined = Some((entry.offset(), entry.len()));
                    break;
                }
                PartitionType::Data(DataPartitionSubType::Nvs) if fallback_nvs.is_none() => {
                    fallback_nvs = Some((entry.offset(), entry.len()));
                }
                _ => {}
            }
        }

        let (offset, len) = data_undefined
            .or(fallback_nvs)
            .ok_or(FlashCalibrationError::PartitionMissing)?;
        let record_addr = offset + len - FLASH_SECTOR_SIZE;
        info!("calibration: record at 0x{:08x}", record_addr);

        Ok(Self { flash, record_addr })
    }
}

impl CalibrationStore for FlashCalibrationStore {
    type Error = FlashCalibrationError;

    fn load(&mut self) -> Result<Option<i32>, Self::Error> {
        let mut buf = [0u8; CALIBRATION_RECORD_LEN];
        self.flash.read_aligned(self.record_addr, &mut buf)?;
        decode_record(&buf)
    }

    fn save(&mut self, position_holes: i32) -> Result<(), Self::Error> {
        let buf = encode_record(position_holes);
        self.flash.erase_sector(self.record_addr)?;
        self.flash.write_aligned(self.record_addr, &buf)
    }
}

fn encode_record(position_holes: i32) -> [u8; CALIBRATION_RECORD_LEN] {
    let mut buf = [0u8; CALIBRATION_RECORD_LEN];
    buf[0..4].copy_from_slice(&CALIBRATION_MAGIC.to_le_bytes());
    buf[4] = CALIBRATION_VERSION;
    buf[8..12].copy_from_slice(&position_holes.to_le_bytes());
    let checksum = checksum32(&buf[..CHECKSUM_OFFSET]);
    buf[CHECKSUM_OFFSET..].copy_from_slice(&checksum.to_le_bytes());
    buf
}

/// Erased or foreign sectors read as "nothing stored"; a record with our
/// magic but a bad checksum is corruption.
fn decode_record(buf: &[u8; CALIBRATION_RECORD_LEN]) -> Result<Option<i32>, FlashCalibrationError> {
    if buf.iter().all(|b| *b == 0xFF) {
        return Ok(None);
    }

    let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if magic != CALIBRATION_MAGIC {
        return Ok(None);
    }
    if buf[4] != CALIBRATION_VERSION {
        return Err(FlashCalibrationError::Unsupported);
    }

    let expected = u32::from_le_bytes([
        buf[CHECKSUM_OFFSET],
        buf[CHECKSUM_OFFSET + 1],
        buf[CHECKSUM_OFFSET + 2],
        buf[CHECKSUM_OFFSET + 3],
    ]);
    if checksum32(&buf[..CHECKSUM_OFFSET]) != expected {
        return Err(FlashCalibrationError::Corrupted);
    }

    Ok(Some(i32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]])))
}

fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

//! Wire-level protocol helpers for the SH1106 132x64 OLED controller.

/// Visible panel width in pixels.
pub const WIDTH: usize = 128;
/// Panel height in pixels.
pub const HEIGHT: usize = 64;
/// Number of 8-row pages.
pub const PAGES: usize = HEIGHT / 8;
/// Total framebuffer size in bytes (one byte per column per page).
pub const BUFFER_SIZE: usize = WIDTH * PAGES;

/// Default 7-bit I2C address (SA0 low).
pub const DEFAULT_ADDRESS: u8 = 0x3C;
/// The controller RAM is 132 columns wide; 128-column glass starts at column 2.
pub const DEFAULT_COLUMN_OFFSET: u8 = 2;

/// Control byte announcing a command stream.
pub const CONTROL_COMMAND: u8 = 0x00;
/// Control byte announcing a display data stream.
pub const CONTROL_DATA: u8 = 0x40;

pub const CMD_DISPLAY_OFF: u8 = 0xAE;
pub const CMD_DISPLAY_ON: u8 = 0xAF;
pub const CMD_SET_CONTRAST: u8 = 0x81;
pub const CMD_NORMAL_DISPLAY: u8 = 0xA6;
pub const CMD_INVERT_DISPLAY: u8 = 0xA7;
const CMD_PAGE_ADDRESS: u8 = 0xB0;
const CMD_COLUMN_LOW: u8 = 0x00;
const CMD_COLUMN_HIGH: u8 = 0x10;

/// Packet size for one page write: control byte plus 128 column bytes.
pub const PAGE_PACKET_SIZE: usize = 1 + WIDTH;

/// Power-up sequence for a 128x64 module with the internal DC-DC enabled.
///
/// Sent as one command stream after [`CONTROL_COMMAND`].
pub const INIT_SEQUENCE: [u8; 25] = [
    CMD_DISPLAY_OFF,
    0xD5, 0x80, // clock divide ratio / oscillator frequency
    0xA8, 0x3F, // multiplex ratio 1/64
    0xD3, 0x00, // display offset
    0x40,       // start line 0
    0xAD, 0x8B, // DC-DC on
    0xA1,       // segment remap
    0xC8,       // COM scan direction: remapped
    0xDA, 0x12, // COM pins hardware configuration
    CMD_SET_CONTRAST, 0xCF,
    0xD9, 0x1F, // pre-charge period
    0xDB, 0x40, // VCOMH deselect level
    0x32,       // pump voltage 8.0 V
    0xA4,       // resume to RAM content
    CMD_NORMAL_DISPLAY,
    0x00,       // column low nibble
    CMD_DISPLAY_ON,
];

/// Builds the command stream positioning the RAM pointer at `page`, column 0
/// of the visible area.
///
/// Returns `None` for pages outside `0..8`.
#[inline]
pub fn build_page_address(page: u8, column_offset: u8) -> Option<[u8; 4]> {
    if page as usize >= PAGES {
        return None;
    }

    Some([
        CONTROL_COMMAND,
        CMD_PAGE_ADDRESS | page,
        CMD_COLUMN_LOW | (column_offset & 0x0F),
        CMD_COLUMN_HIGH | (column_offset >> 4),
    ])
}

/// Builds a data packet carrying one page of column bytes.
#[inline]
pub fn build_page_packet(page_data: &[u8; WIDTH]) -> [u8; PAGE_PACKET_SIZE] {
    let mut packet = [0u8; PAGE_PACKET_SIZE];
    packet[0] = CONTROL_DATA;
    packet[1..].copy_from_slice(page_data);
    packet
}

/// Builds the two-byte contrast command stream.
#[inline]
pub fn build_contrast(level: u8) -> [u8; 3] {
    [CONTROL_COMMAND, CMD_SET_CONTRAST, level]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_address_carries_offset_nibbles() {
        assert_eq!(build_page_address(0, 2), Some([0x00, 0xB0, 0x02, 0x10]));
        assert_eq!(build_page_address(7, 0x12), Some([0x00, 0xB7, 0x02, 0x11]));
    }

    #[test]
    fn invalid_page_is_rejected() {
        assert_eq!(build_page_address(8, 2), None);
    }

    #[test]
    fn page_packet_starts_with_data_control_byte() {
        let mut data = [0u8; WIDTH];
        data[0] = 0xAA;
        data[WIDTH - 1] = 0x55;

        let packet = build_page_packet(&data);
        assert_eq!(packet.len(), PAGE_PACKET_SIZE);
        assert_eq!(packet[0], CONTROL_DATA);
        assert_eq!(packet[1], 0xAA);
        assert_eq!(packet[PAGE_PACKET_SIZE - 1], 0x55);
    }

    #[test]
    fn init_sequence_turns_display_on_last() {
        assert_eq!(INIT_SEQUENCE[0], CMD_DISPLAY_OFF);
        assert_eq!(INIT_SEQUENCE[INIT_SEQUENCE.len() - 1], CMD_DISPLAY_ON);
    }
}

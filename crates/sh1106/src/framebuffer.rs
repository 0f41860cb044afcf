//! In-memory framebuffer for SH1106 panels.

use core::convert::TryFrom;

use crate::protocol::{BUFFER_SIZE, HEIGHT, PAGES, WIDTH};

/// 1bpp page-major framebuffer.
///
/// Byte `page * WIDTH + x` holds column `x` of rows `page*8..page*8+8`; bit 0
/// is the topmost row of the page.
#[derive(Clone)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Creates a new dark framebuffer.
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; BUFFER_SIZE],
        }
    }

    /// Returns the underlying framebuffer bytes.
    pub fn bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.bytes
    }

    /// Clears the framebuffer to dark (`on = false`) or lit (`on = true`).
    pub fn clear(&mut self, on: bool) {
        self.bytes.fill(if on { 0xFF } else { 0x00 });
    }

    /// Sets a pixel state.
    ///
    /// Returns `true` when pixel is in bounds, `false` otherwise.
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }

        let byte_index = (y / 8) * WIDTH + x;
        let bit_mask = 1u8 << (y % 8);

        if on {
            self.bytes[byte_index] |= bit_mask;
        } else {
            self.bytes[byte_index] &= !bit_mask;
        }

        true
    }

    /// Reads a pixel state.
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }

        let byte_index = (y / 8) * WIDTH + x;
        let bit_mask = 1u8 << (y % 8);
        Some((self.bytes[byte_index] & bit_mask) != 0)
    }

    /// Returns the column bytes of page 0..8.
    pub fn page(&self, page: u8) -> Option<&[u8; WIDTH]> {
        if page as usize >= PAGES {
            return None;
        }

        let start = page as usize * WIDTH;
        <&[u8; WIDTH]>::try_from(&self.bytes[start..start + WIDTH]).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_bit_mapping_is_lsb_top_within_page() {
        let mut fb = FrameBuffer::new();

        assert!(fb.set_pixel(0, 0, true));
        assert!(fb.set_pixel(0, 7, true));
        assert!(fb.set_pixel(1, 8, true));

        let page0 = fb.page(0).unwrap();
        assert_eq!(page0[0], 0b1000_0001);
        let page1 = fb.page(1).unwrap();
        assert_eq!(page1[1], 0b0000_0001);
    }

    #[test]
    fn out_of_bounds_pixel_is_ignored() {
        let mut fb = FrameBuffer::new();

        assert!(!fb.set_pixel(WIDTH, 0, true));
        assert!(!fb.set_pixel(0, HEIGHT, true));
        assert!(fb.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn set_and_clear_last_pixel() {
        let mut fb = FrameBuffer::new();

        assert!(fb.set_pixel(WIDTH - 1, HEIGHT - 1, true));
        assert_eq!(fb.pixel(WIDTH - 1, HEIGHT - 1), Some(true));
        assert!(fb.set_pixel(WIDTH - 1, HEIGHT - 1, false));
        assert_eq!(fb.pixel(WIDTH - 1, HEIGHT - 1), Some(false));
        assert_eq!(fb.pixel(WIDTH, HEIGHT), None);
        assert_eq!(fb.page(PAGES as u8), None);
    }
}

use embedded_graphics::{
    Drawable,
    geometry::Point,
    image::{Image, ImageRaw},
    mono_font::{
        MonoFont, MonoTextStyle,
        ascii::{FONT_6X10, FONT_7X13},
    },
    pixelcolor::BinaryColor,
    text::{Baseline, Text},
};
use perforator_core::render::{DisplaySink, FontId};
use sh1106::FrameBuffer;

/// `DisplaySink` that draws into an SH1106 frame buffer; flush with
/// [`sh1106::Sh1106::flush_frame`].
pub struct OledCanvas {
    frame: FrameBuffer,
    font: &'static MonoFont<'static>,
    cursor: Point,
}

impl Default for OledCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl OledCanvas {
    pub fn new() -> Self {
        Self {
            frame: FrameBuffer::new(),
            font: font_for(FontId::Regular),
            cursor: Point::zero(),
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}

impl DisplaySink for OledCanvas {
    fn clear(&mut self) {
        self.frame.clear(false);
        self.cursor = Point::zero();
    }

    fn select_font(&mut self, font: FontId) {
        self.font = font_for(font);
    }

    fn set_cursor(&mut self, x: i16, y: i16) {
        self.cursor = Point::new(i32::from(x), i32::from(y));
    }

    fn write_text(&mut self, text: &str) {
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let Ok(next) =
            Text::with_baseline(text, self.cursor, style, Baseline::Alphabetic).draw(&mut self.frame);
        self.cursor = next;
    }

    fn text_width(&self, text: &str) -> u16 {
        let glyphs = text.chars().count() as u32;
        if glyphs == 0 {
            return 0;
        }

        let width = glyphs * self.font.character_size.width
            + (glyphs - 1) * self.font.character_spacing;
        width.min(u32::from(u16::MAX)) as u16
    }

    fn draw_bitmap(&mut self, x: i16, y: i16, width: u16, _height: u16, data: &[u8]) {
        let raw = ImageRaw::<BinaryColor>::new(data, u32::from(width));
        let Ok(()) = Image::new(&raw, Point::new(i32::from(x), i32::from(y))).draw(&mut self.frame);
    }
}

fn font_for(font: FontId) -> &'static MonoFont<'static> {
    match font {
        FontId::Small => &FONT_6X10,
        FontId::Regular => &FONT_7X13,
    }
}

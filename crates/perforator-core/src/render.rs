//! Screen view models and the display command interface.

use core::fmt::Write;

use heapless::String;

/// Canvas width in pixels.
pub const CANVAS_WIDTH: i16 = 128;
/// Canvas height in pixels.
pub const CANVAS_HEIGHT: i16 = 64;

const TITLE_BASELINE: i16 = 39;
const LINE1_BASELINE: i16 = 26;
const LINE2_BASELINE: i16 = 43;
const TEXT_LEFT: i16 = 10;
const ARROW_W: u16 = 4;
const ARROW_H: u16 = 7;
const ARROW_TOP: i16 = 29;

const ARROW_LEFT: [u8; 7] = [0x10, 0x30, 0x70, 0xF0, 0x70, 0x30, 0x10];
const ARROW_RIGHT: [u8; 7] = [0x80, 0xC0, 0xE0, 0xF0, 0xE0, 0xC0, 0x80];

/// Buffer large enough for any rendered number.
pub type NumberText = String<24>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FontId {
    /// Small labels, roughly helvR08.
    Small,
    /// Titles and headline values, roughly helvR10.
    Regular,
}

/// Draw-command sink implemented by the board display adapter.
///
/// Cursor coordinates address the text baseline. Bitmaps are row-major, one
/// bit per pixel, MSB first, each row padded to a whole byte.
pub trait DisplaySink {
    fn clear(&mut self);
    fn select_font(&mut self, font: FontId);
    fn set_cursor(&mut self, x: i16, y: i16);
    /// Draws `text` at the cursor and advances the cursor past it.
    fn write_text(&mut self, text: &str);
    /// Width of `text` in the selected font.
    fn text_width(&self, text: &str) -> u16;
    fn draw_bitmap(&mut self, x: i16, y: i16, width: u16, height: u16, data: &[u8]);

    /// Writes `value` with two decimals.
    fn write_number(&mut self, value: f64) {
        self.write_text(&format_number(value));
    }
}

pub fn format_number(value: f64) -> NumberText {
    let mut text = NumberText::new();
    let _ = write!(text, "{:.2}", value);
    text
}

/// App-level view model consumed by the display adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Screen<'a> {
    Menu {
        title: &'a str,
        position: u8,
        siblings: u8,
    },
    Calibration {
        position_mm: f64,
    },
    ManualMode {
        position_mm: f64,
    },
    SemiAutomatic {
        current_mm: f64,
        target_mm: f64,
        running: bool,
    },
    Template {
        title: &'a str,
        target_mm: f64,
        current_mm: f64,
        running: bool,
    },
    Blank,
}

/// Lays out `screen` on the 128x64 canvas.
pub fn draw_screen<D>(screen: Screen<'_>, sink: &mut D)
where
    D: DisplaySink + ?Sized,
{
    sink.clear();

    match screen {
        Screen::Menu {
            title,
            position,
            siblings,
        } => draw_menu(sink, title, position, siblings),
        Screen::Calibration { position_mm } => draw_position(sink, "Calibration:", position_mm),
        Screen::ManualMode { position_mm } => draw_position(sink, "Manual mode:", position_mm),
        Screen::SemiAutomatic {
            current_mm,
            target_mm,
            running,
        } => {
            sink.select_font(FontId::Small);
            draw_labelled_mm(sink, LINE1_BASELINE, "Current: ", current_mm);
            draw_labelled_mm(sink, LINE2_BASELINE, "Target: ", target_mm);
            if running {
                draw_running_marker(sink);
            }
        }
        Screen::Template {
            title,
            target_mm,
            current_mm,
            running,
        } => {
            sink.select_font(FontId::Regular);
            sink.set_cursor(TEXT_LEFT, 16);
            sink.write_text(title);
            sink.select_font(FontId::Small);
            draw_labelled_mm(sink, 34, "Target: ", target_mm);
            draw_labelled_mm(sink, 50, "Current: ", current_mm);
            if running {
                draw_running_marker(sink);
            }
        }
        Screen::Blank => {}
    }
}

fn draw_menu<D>(sink: &mut D, title: &str, position: u8, siblings: u8)
where
    D: DisplaySink + ?Sized,
{
    sink.select_font(FontId::Regular);
    let width = sink.text_width(title) as i16;
    sink.set_cursor(CANVAS_WIDTH / 2 - width / 2, TITLE_BASELINE);
    sink.write_text(title);

    if siblings < 2 {
        return;
    }

    if position > 0 {
        sink.draw_bitmap(2, ARROW_TOP, ARROW_W, ARROW_H, &ARROW_LEFT);
    }
    if position.saturating_add(1) < siblings {
        let x = CANVAS_WIDTH - 2 - ARROW_W as i16;
        sink.draw_bitmap(x, ARROW_TOP, ARROW_W, ARROW_H, &ARROW_RIGHT);
    }

    let mut indicator = String::<8>::new();
    let _ = write!(indicator, "{}/{}", position.saturating_add(1), siblings);
    sink.select_font(FontId::Small);
    let width = sink.text_width(&indicator) as i16;
    sink.set_cursor(CANVAS_WIDTH - 2 - width, CANVAS_HEIGHT - 2);
    sink.write_text(&indicator);
}

fn draw_position<D>(sink: &mut D, heading: &str, position_mm: f64)
where
    D: DisplaySink + ?Sized,
{
    sink.select_font(FontId::Regular);
    sink.set_cursor(TEXT_LEFT, LINE1_BASELINE);
    sink.write_text(heading);

    let number = format_number(position_mm);
    let width = sink.text_width(&number) as i16 + sink.text_width(" mm") as i16;
    sink.set_cursor(CANVAS_WIDTH / 2 - width / 2, LINE2_BASELINE);
    sink.write_number(position_mm);
    sink.write_text(" mm");
}

fn draw_labelled_mm<D>(sink: &mut D, baseline: i16, label: &str, value_mm: f64)
where
    D: DisplaySink + ?Sized,
{
    sink.set_cursor(TEXT_LEFT, baseline);
    sink.write_text(label);
    sink.write_number(value_mm);
    sink.write_text(" mm");
}

fn draw_running_marker<D>(sink: &mut D)
where
    D: DisplaySink + ?Sized,
{
    sink.select_font(FontId::Small);
    sink.set_cursor(CANVAS_WIDTH - 2 - sink.text_width("RUN") as i16, 10);
    sink.write_text("RUN");
}

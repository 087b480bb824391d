//! Screen layout and rendering
//!
//! Composes every screen in a full-frame RGB565 buffer and pushes
//! full-width bands to the panel. Fixed column layout: line label,
//! departure time, delay, destination; footer carries the clock, the
//! price ticker, and the connectivity indicator.

use core::fmt::Write;

use heapless::String;

use abfahrt_core::board::Departure;
use abfahrt_display::{color, font, Sprite, Surface, TextStyle};

use super::st7789::{DisplayError, St7789, HEIGHT, WIDTH};
use embassy_rp::spi::Instance;

/// Column x positions
pub const POS_BUS: u16 = 3;
pub const POS_TIME: u16 = 53;
pub const POS_DELAY: u16 = 97;
pub const POS_TO: u16 = 130;

/// First departure row y and row pitch
pub const POS_FIRST_ROW: u16 = 32;
pub const ROW_INC: u16 = 18;

/// Footer band height at the bottom of the panel
pub const FOOTER_HEIGHT: u16 = 25;

const MAIN_HEIGHT: u16 = HEIGHT - FOOTER_HEIGHT;
const STATUS_RADIUS: u16 = 5;

/// Full-frame pixel count
pub const FRAME_PIXELS: usize = WIDTH as usize * HEIGHT as usize;

/// Screen renderer over the TFT driver and a static frame buffer
pub struct Renderer<'d, T: Instance> {
    lcd: St7789<'d, T>,
    frame: &'static mut [u16; FRAME_PIXELS],
}

impl<'d, T: Instance> Renderer<'d, T> {
    pub fn new(lcd: St7789<'d, T>, frame: &'static mut [u16; FRAME_PIXELS]) -> Self {
        Self { lcd, frame }
    }

    /// Boot splash with a status line
    pub fn render_boot(&mut self, status: &str) -> Result<(), DisplayError> {
        let mut frame = sprite(self.frame)?;
        frame.clear(color::BLACK);
        frame.draw_str(POS_BUS, 8, "ABFAHRT", TextStyle::scaled(color::YELLOW, 3));
        frame.draw_str(POS_BUS, 48, status, TextStyle::new(color::WHITE));
        self.flush_band(0, HEIGHT)
    }

    /// Station header plus the departure rows
    pub fn render_board(
        &mut self,
        station: &str,
        departures: &[Departure],
    ) -> Result<(), DisplayError> {
        let mut frame = sprite(self.frame)?;
        frame.fill_rect(0, 0, WIDTH, MAIN_HEIGHT, color::BLACK);
        frame.draw_str(POS_BUS, 6, station, TextStyle::scaled(color::YELLOW, 2));

        let mut row = 0u16;
        for dep in departures.iter().filter(|d| !d.is_null_entry()) {
            let y = POS_FIRST_ROW + row * ROW_INC;
            if y + font::GLYPH_HEIGHT > MAIN_HEIGHT {
                break;
            }

            frame.draw_str(POS_BUS, y, &line_label(dep), TextStyle::new(color::ORANGE));
            frame.draw_str(POS_TIME, y, &dep.departure, TextStyle::new(color::WHITE));
            if let Some(delay) = visible_delay(dep) {
                frame.draw_str(POS_DELAY, y, &delay, TextStyle::new(color::RED));
            }
            frame.draw_str(POS_TO, y, &dep.destination, TextStyle::new(color::WHITE));
            row += 1;
        }
        self.flush_band(0, MAIN_HEIGHT)
    }

    /// Footer: clock/date left, price right, then the status circle
    pub fn render_footer(
        &mut self,
        datetime: &str,
        price: Option<&str>,
        online: bool,
    ) -> Result<(), DisplayError> {
        let mut frame = sprite(self.frame)?;
        let y0 = MAIN_HEIGHT;
        frame.fill_rect(0, y0, WIDTH, FOOTER_HEIGHT, color::GRAY);
        let style = TextStyle::new(color::BLACK).on(color::GRAY);
        let text_y = y0 + (FOOTER_HEIGHT - font::GLYPH_HEIGHT) / 2;
        frame.draw_str(POS_BUS, text_y, datetime, style);

        if let Some(price) = price {
            let x = WIDTH
                .saturating_sub(font::text_width(price, 1))
                .saturating_sub(STATUS_RADIUS * 2 + 8);
            frame.draw_str(x, text_y, price, style);
        }

        let status = if online { color::GREEN } else { color::RED };
        frame.fill_circle(
            WIDTH - STATUS_RADIUS - 2,
            HEIGHT - STATUS_RADIUS - 2,
            STATUS_RADIUS,
            status,
        );
        self.flush_band(y0, FOOTER_HEIGHT)
    }

    /// Full-screen message, used by the portal and OTA screens
    pub fn render_message(&mut self, title: &str, line: &str) -> Result<(), DisplayError> {
        let mut frame = sprite(self.frame)?;
        frame.clear(color::BLACK);
        frame.draw_str(POS_BUS, 20, title, TextStyle::scaled(color::YELLOW, 2));
        frame.draw_str(POS_BUS, 56, line, TextStyle::new(color::WHITE));
        self.flush_band(0, HEIGHT)
    }

    /// Black screen for night-dark
    pub fn render_dark(&mut self) -> Result<(), DisplayError> {
        let mut frame = sprite(self.frame)?;
        frame.clear(color::BLACK);
        self.flush_band(0, HEIGHT)
    }

    /// Push full-width rows `y0 .. y0 + h` to the panel
    fn flush_band(&mut self, y0: u16, h: u16) -> Result<(), DisplayError> {
        let start = y0 as usize * WIDTH as usize;
        let end = (y0 + h) as usize * WIDTH as usize;
        self.lcd.flush_region(0, y0, WIDTH, h, &self.frame[start..end])
    }
}

fn sprite(frame: &mut [u16; FRAME_PIXELS]) -> Result<Sprite<'_>, DisplayError> {
    Sprite::new(frame, WIDTH, HEIGHT).ok_or(DisplayError::OutOfBounds)
}

/// "S1", "IR75", or just the category when the number was discarded
fn line_label(dep: &Departure) -> String<16> {
    let mut label = String::new();
    let _ = write!(label, "{}{}", dep.category, dep.number);
    label
}

/// Delay column text, only for a real positive delay
fn visible_delay(dep: &Departure) -> Option<String<12>> {
    let minutes: i32 = dep.delay.parse().ok()?;
    if minutes <= 0 {
        return None;
    }
    let mut text = String::new();
    let _ = write!(text, "+{}", minutes);
    Some(text)
}

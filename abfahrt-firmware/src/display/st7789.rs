//! ST7789 TFT driver
//!
//! 240x135 panel over blocking SPI, landscape orientation. The renderer
//! composes pixels off-screen and pushes whole regions; the driver only
//! sets address windows and streams pixel data. Backlight is a separate
//! PWM output.

use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Config as PwmConfig, Pwm, SetDutyCycle};
use embassy_rp::spi::{Blocking, Instance, Spi};
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;

/// Visible panel size, landscape
pub const WIDTH: u16 = 240;
pub const HEIGHT: u16 = 135;

// The 240x135 window sits offset inside the controller's 240x320 RAM
const X_OFFSET: u16 = 40;
const Y_OFFSET: u16 = 53;

// Command set
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// MADCTL: row/column exchange for landscape, RGB order
const MADCTL_LANDSCAPE: u8 = 0x60;
// COLMOD: 16-bit RGB565
const COLMOD_RGB565: u8 = 0x55;

/// Display communication error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// SPI transfer failed
    Spi,
    /// Region outside the panel
    OutOfBounds,
}

/// ST7789 over blocking SPI
pub struct St7789<'d, T: Instance> {
    spi: Spi<'d, T, Blocking>,
    dc: Output<'d>,
    cs: Output<'d>,
    rst: Output<'d>,
}

impl<'d, T: Instance> St7789<'d, T> {
    pub fn new(spi: Spi<'d, T, Blocking>, dc: Output<'d>, cs: Output<'d>, rst: Output<'d>) -> Self {
        Self { spi, dc, cs, rst }
    }

    /// Hardware reset and panel init sequence
    pub fn init(&mut self) -> Result<(), DisplayError> {
        let mut delay = Delay;
        self.rst.set_low();
        delay.delay_ms(20);
        self.rst.set_high();
        delay.delay_ms(120);

        self.command(SWRESET, &[])?;
        delay.delay_ms(120);
        self.command(SLPOUT, &[])?;
        delay.delay_ms(10);
        self.command(COLMOD, &[COLMOD_RGB565])?;
        self.command(MADCTL, &[MADCTL_LANDSCAPE])?;
        // This panel expects inverted colors in RGB565 mode
        self.command(INVON, &[])?;
        self.command(NORON, &[])?;
        self.command(DISPON, &[])?;
        delay.delay_ms(10);
        Ok(())
    }

    /// Push a pixel region, row-major, top-left at (`x`, `y`)
    pub fn flush_region(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: &[u16],
    ) -> Result<(), DisplayError> {
        if x + w > WIDTH || y + h > HEIGHT || pixels.len() < w as usize * h as usize {
            return Err(DisplayError::OutOfBounds);
        }
        let (x0, x1) = (x + X_OFFSET, x + X_OFFSET + w - 1);
        let (y0, y1) = (y + Y_OFFSET, y + Y_OFFSET + h - 1);
        self.command(CASET, &x0.to_be_bytes())?;
        self.data(&x1.to_be_bytes())?;
        self.command(RASET, &y0.to_be_bytes())?;
        self.data(&y1.to_be_bytes())?;
        self.command(RAMWR, &[])?;

        self.cs.set_low();
        self.dc.set_high();
        let mut row = [0u8; WIDTH as usize * 2];
        for chunk in pixels[..w as usize * h as usize].chunks(w as usize) {
            for (i, &px) in chunk.iter().enumerate() {
                let [hi, lo] = px.to_be_bytes();
                row[i * 2] = hi;
                row[i * 2 + 1] = lo;
            }
            if self.spi.blocking_write(&row[..chunk.len() * 2]).is_err() {
                self.cs.set_high();
                return Err(DisplayError::Spi);
            }
        }
        self.cs.set_high();
        Ok(())
    }

    fn command(&mut self, cmd: u8, args: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low();
        self.dc.set_low();
        let result = self.spi.blocking_write(&[cmd]);
        self.cs.set_high();
        result.map_err(|_| DisplayError::Spi)?;
        if !args.is_empty() {
            self.data(args)?;
        }
        Ok(())
    }

    fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low();
        self.dc.set_high();
        let result = self.spi.blocking_write(data);
        self.cs.set_high();
        result.map_err(|_| DisplayError::Spi)
    }
}

/// PWM backlight
pub struct Backlight<'d> {
    pwm: Pwm<'d>,
}

impl<'d> Backlight<'d> {
    /// Wrap a configured PWM output; starts dark
    pub fn new(mut pwm: Pwm<'d>, config: &mut PwmConfig) -> Self {
        config.top = 255;
        pwm.set_config(config);
        let _ = pwm.set_duty_cycle(0);
        Self { pwm }
    }

    /// Set the backlight level, 0-255
    pub fn set_level(&mut self, level: u8) {
        let _ = self.pwm.set_duty_cycle(level as u16);
    }
}

//! Display hardware and screen rendering

mod renderer;
mod st7789;

pub use renderer::{Renderer, FRAME_PIXELS};
pub use st7789::{Backlight, DisplayError, St7789, HEIGHT, WIDTH};

//! The render-primitive trait
//!
//! Everything the firmware draws goes through these primitives: text,
//! filled rectangles, the status circle, and sprite blits. Coordinates
//! outside the surface are clipped, never a panic.

use crate::font;
use crate::sprite::Sprite;

/// How text is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextStyle {
    /// Foreground RGB565 color
    pub color: u16,
    /// Background fill behind glyphs; `None` leaves pixels untouched
    pub background: Option<u16>,
    /// Integer glyph scale, minimum 1
    pub scale: u16,
}

impl TextStyle {
    /// Unscaled text in `color` over a transparent background
    pub const fn new(color: u16) -> Self {
        Self {
            color,
            background: None,
            scale: 1,
        }
    }

    /// Same style at an integer scale
    pub const fn scaled(color: u16, scale: u16) -> Self {
        Self {
            color,
            background: None,
            scale,
        }
    }

    /// Fill the glyph background too
    pub const fn on(self, background: u16) -> Self {
        Self {
            background: Some(background),
            ..self
        }
    }
}

/// A drawable RGB565 pixel surface
pub trait Surface {
    fn width(&self) -> u16;
    fn height(&self) -> u16;

    /// Set one pixel; out-of-bounds coordinates are ignored
    fn set_pixel(&mut self, x: u16, y: u16, color: u16);

    /// Fill the whole surface
    fn clear(&mut self, color: u16) {
        self.fill_rect(0, 0, self.width(), self.height(), color);
    }

    /// Fill a rectangle, clipped to the surface
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) {
        let x1 = (x.saturating_add(w)).min(self.width());
        let y1 = (y.saturating_add(h)).min(self.height());
        for py in y..y1 {
            for px in x..x1 {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Fill a circle centered at (`cx`, `cy`), clipped to the surface
    fn fill_circle(&mut self, cx: u16, cy: u16, r: u16, color: u16) {
        let (cx, cy, r) = (cx as i32, cy as i32, r as i32);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    let (px, py) = (cx + dx, cy + dy);
                    if px >= 0 && py >= 0 {
                        self.set_pixel(px as u16, py as u16, color);
                    }
                }
            }
        }
    }

    /// Draw a string with its top-left corner at (`x`, `y`)
    fn draw_str(&mut self, x: u16, y: u16, text: &str, style: TextStyle) {
        let scale = style.scale.max(1);
        let mut pen_x = x;
        for c in text.chars() {
            let columns = font::glyph(c);
            for col in 0..font::GLYPH_WIDTH {
                // The sixth column is inter-glyph spacing
                let bits = if col < 5 { columns[col as usize] } else { 0 };
                for row in 0..font::GLYPH_HEIGHT {
                    let on = bits >> row & 1 == 1;
                    let color = match (on, style.background) {
                        (true, _) => style.color,
                        (false, Some(bg)) => bg,
                        (false, None) => continue,
                    };
                    self.fill_rect(
                        pen_x.saturating_add(col * scale),
                        y.saturating_add(row as u16 * scale),
                        scale,
                        scale,
                        color,
                    );
                }
            }
            pen_x = pen_x.saturating_add(font::GLYPH_WIDTH * scale);
        }
    }

    /// Copy a sprite onto this surface with its top-left at (`x`, `y`)
    fn blit(&mut self, src: &Sprite<'_>, x: u16, y: u16) {
        for sy in 0..src.height() {
            for sx in 0..src.width() {
                if let Some(color) = src.pixel(sx, sy) {
                    self.set_pixel(x.saturating_add(sx), y.saturating_add(sy), color);
                }
            }
        }
    }
}

//! Off-screen sprite buffer
//!
//! A sprite borrows a caller-provided RGB565 buffer, so the firmware keeps
//! one static scratch area and composes screen regions in it before
//! blitting. Row-major, no transparency.

use crate::surface::Surface;

/// An off-screen drawing target over a borrowed pixel buffer
#[derive(Debug)]
pub struct Sprite<'a> {
    buf: &'a mut [u16],
    width: u16,
    height: u16,
}

impl<'a> Sprite<'a> {
    /// Wrap `buf` as a `width` × `height` sprite
    ///
    /// Returns `None` when the buffer is smaller than the requested area.
    pub fn new(buf: &'a mut [u16], width: u16, height: u16) -> Option<Self> {
        if buf.len() < width as usize * height as usize {
            return None;
        }
        Some(Self { buf, width, height })
    }

    /// Read one pixel; `None` out of bounds
    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        if x < self.width && y < self.height {
            Some(self.buf[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }
}

impl Surface for Sprite<'_> {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn set_pixel(&mut self, x: u16, y: u16, color: u16) {
        if x < self.width && y < self.height {
            self.buf[y as usize * self.width as usize + x as usize] = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::surface::TextStyle;

    fn count_pixels(buf: &[u16], color: u16) -> usize {
        buf.iter().filter(|&&p| p == color).count()
    }

    #[test]
    fn test_undersized_buffer_is_rejected() {
        let mut buf = [0u16; 8];
        assert!(Sprite::new(&mut buf, 3, 3).is_none());
        assert!(Sprite::new(&mut buf, 4, 2).is_some());
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut buf = [0u16; 16];
        let mut s = Sprite::new(&mut buf, 4, 4).unwrap();
        s.fill_rect(2, 2, 10, 10, color::RED);
        assert_eq!(s.pixel(2, 2), Some(color::RED));
        assert_eq!(s.pixel(3, 3), Some(color::RED));
        assert_eq!(s.pixel(1, 1), Some(color::BLACK));
        drop(s);
        assert_eq!(count_pixels(&buf, color::RED), 4);
    }

    #[test]
    fn test_clear_fills_everything() {
        let mut buf = [0u16; 16];
        let mut s = Sprite::new(&mut buf, 4, 4).unwrap();
        s.clear(color::BLUE);
        drop(s);
        assert_eq!(count_pixels(&buf, color::BLUE), 16);
    }

    #[test]
    fn test_fill_circle_is_symmetric() {
        let mut buf = [0u16; 81];
        let mut s = Sprite::new(&mut buf, 9, 9).unwrap();
        s.fill_circle(4, 4, 3, color::GREEN);
        for (a, b) in [((4, 1), (4, 7)), ((1, 4), (7, 4)), ((2, 2), (6, 6))] {
            assert_eq!(s.pixel(a.0, a.1), s.pixel(b.0, b.1));
        }
        assert_eq!(s.pixel(4, 4), Some(color::GREEN));
        assert_eq!(s.pixel(0, 0), Some(color::BLACK));
    }

    #[test]
    fn test_draw_str_renders_glyph_columns() {
        let mut buf = [0u16; 6 * 8];
        let mut s = Sprite::new(&mut buf, 6, 8).unwrap();
        // '!' is a single lit column (0x5F in column 2)
        s.draw_str(0, 0, "!", TextStyle::new(color::WHITE));
        for row in 0..7 {
            let expect = if row == 5 { color::BLACK } else { color::WHITE };
            assert_eq!(s.pixel(2, row).unwrap(), expect, "row {}", row);
        }
        assert_eq!(s.pixel(0, 0), Some(color::BLACK));
        assert_eq!(s.pixel(5, 3), Some(color::BLACK));
    }

    #[test]
    fn test_draw_str_background_fill() {
        let mut buf = [0u16; 6 * 8];
        let mut s = Sprite::new(&mut buf, 6, 8).unwrap();
        s.draw_str(0, 0, " ", TextStyle::new(color::WHITE).on(color::GRAY));
        drop(s);
        assert_eq!(count_pixels(&buf, color::GRAY), 48);
    }

    #[test]
    fn test_scaled_text_doubles_coverage() {
        let mut small = [0u16; 6 * 8];
        let mut big = [0u16; 12 * 16];
        let mut s = Sprite::new(&mut small, 6, 8).unwrap();
        let mut b = Sprite::new(&mut big, 12, 16).unwrap();
        s.draw_str(0, 0, "8", TextStyle::new(color::WHITE));
        b.draw_str(0, 0, "8", TextStyle::scaled(color::WHITE, 2));
        drop(s);
        drop(b);
        assert_eq!(count_pixels(&big, color::WHITE), 4 * count_pixels(&small, color::WHITE));
    }

    #[test]
    fn test_blit_offsets_and_clips() {
        let mut src_buf = [color::RED; 4];
        let mut dst_buf = [0u16; 16];
        let src = Sprite::new(&mut src_buf, 2, 2).unwrap();
        let mut dst = Sprite::new(&mut dst_buf, 4, 4).unwrap();
        dst.blit(&src, 3, 3);
        assert_eq!(dst.pixel(3, 3), Some(color::RED));
        assert_eq!(dst.pixel(2, 2), Some(color::BLACK));
        drop(dst);
        assert_eq!(count_pixels(&dst_buf, color::RED), 1);
    }
}

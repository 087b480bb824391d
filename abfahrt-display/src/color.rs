//! RGB565 color constants

pub const BLACK: u16 = rgb(0, 0, 0);
pub const WHITE: u16 = rgb(255, 255, 255);
pub const RED: u16 = rgb(255, 0, 0);
pub const GREEN: u16 = rgb(0, 255, 0);
pub const BLUE: u16 = rgb(0, 0, 255);
pub const YELLOW: u16 = rgb(255, 255, 0);
pub const ORANGE: u16 = rgb(255, 165, 0);
pub const GRAY: u16 = rgb(132, 130, 132);

/// Pack 8-bit channels into RGB565
pub const fn rgb(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_packing() {
        assert_eq!(WHITE, 0xFFFF);
        assert_eq!(BLACK, 0x0000);
        assert_eq!(RED, 0xF800);
        assert_eq!(GREEN, 0x07E0);
        assert_eq!(BLUE, 0x001F);
        assert_eq!(ORANGE, 0xFD20);
        assert_eq!(GRAY, 0x8410);
    }
}

//! Color helpers for the single LED
//!
//! Colors are `smart_leds::RGB8`, the type the WS2812 driver consumes directly.

use libm::floorf;
pub use smart_leds::RGB8;

pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Convert HSV to RGB
///
/// h: hue in degrees, 0..360
/// s: saturation, 0..1
/// v: value, 0..1
pub fn hsv(h: f32, s: f32, v: f32) -> RGB8 {
    let (r, g, b) = if s == 0.0 {
        // achromatic
        (v, v, v)
    } else {
        let h = h / 60.0;
        let i = floorf(h);
        let f = h - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match i as i32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        }
    };
    RGB8 {
        r: (255.0 * r) as u8,
        g: (255.0 * g) as u8,
        b: (255.0 * b) as u8,
    }
}

/// Scale each channel by `level / 255`
pub fn scale(color: RGB8, level: u8) -> RGB8 {
    let s = |c: u8| (c as u16 * level as u16 / 255) as u8;
    RGB8 {
        r: s(color.r),
        g: s(color.g),
        b: s(color.b),
    }
}

/// Multiply each channel by `factor`, expected in 0..1
pub fn dim(color: RGB8, factor: f32) -> RGB8 {
    let s = |c: u8| (c as f32 * factor) as u8;
    RGB8 {
        r: s(color.r),
        g: s(color.g),
        b: s(color.b),
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> RGB8 {
        RGB8 { r, g, b }
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv(0.0, 1.0, 1.0), rgb(255, 0, 0));
        assert_eq!(hsv(120.0, 1.0, 1.0), rgb(0, 255, 0));
        assert_eq!(hsv(240.0, 1.0, 1.0), rgb(0, 0, 255));
        assert_eq!(hsv(60.0, 1.0, 1.0), rgb(255, 255, 0));
        assert_eq!(hsv(180.0, 1.0, 1.0), rgb(0, 255, 255));
        assert_eq!(hsv(300.0, 1.0, 1.0), rgb(255, 0, 255));
    }

    #[test]
    fn test_hsv_between_sectors() {
        // Halfway from red to yellow
        assert_eq!(hsv(30.0, 1.0, 1.0), rgb(255, 127, 0));
        // Halfway from magenta back to red
        assert_eq!(hsv(330.0, 1.0, 1.0), rgb(255, 0, 127));
    }

    #[test]
    fn test_hsv_grey_and_value() {
        assert_eq!(hsv(200.0, 0.0, 0.5), rgb(127, 127, 127));
        assert_eq!(hsv(0.0, 1.0, 0.0), BLACK);
        // Out of range hue falls through to the last sector
        assert_eq!(hsv(360.0, 1.0, 1.0), rgb(255, 0, 255));
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(rgb(255, 128, 10), 255), rgb(255, 128, 10));
        assert_eq!(scale(rgb(255, 128, 10), 0), BLACK);
        assert_eq!(scale(rgb(255, 200, 100), 128), rgb(128, 100, 50));
    }

    #[test]
    fn test_dim() {
        assert_eq!(dim(rgb(200, 100, 10), 0.5), rgb(100, 50, 5));
        assert_eq!(dim(rgb(200, 100, 10), 0.0), BLACK);
    }
}

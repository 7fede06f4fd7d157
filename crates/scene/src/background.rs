use duckview_common::Color;
use image::{Rgba, RgbaImage};

pub const GRADIENT_WIDTH: u32 = 1;
pub const GRADIENT_HEIGHT: u32 = 256;

/// What the renderer fills the viewport with before drawing objects.
#[derive(Debug, Clone)]
pub enum Background {
    Color(Color),
    Gradient(GradientTexture),
}

/// A 1 × 256 vertical gradient, row 0 at the top of the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientTexture {
    pub top: Color,
    pub bottom: Color,
    image: RgbaImage,
}

impl GradientTexture {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn row(&self, y: u32) -> [u8; 4] {
        self.image.get_pixel(0, y).0
    }

    /// Tightly packed RGBA8 rows, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Build the vertical gradient from `top` (row 0) to `bottom` (last row).
pub fn gradient_background(top: Color, bottom: Color) -> GradientTexture {
    let last = (GRADIENT_HEIGHT - 1) as f32;
    let image = RgbaImage::from_fn(GRADIENT_WIDTH, GRADIENT_HEIGHT, |_, y| {
        let [r, g, b] = top.lerp(bottom, y as f32 / last).to_rgb8();
        Rgba([r, g, b, 255])
    });
    GradientTexture { top, bottom, image }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sky() -> GradientTexture {
        gradient_background(Color::from_hex(0xadd8e6), Color::from_hex(0xe0f2f7))
    }

    #[test]
    fn dimensions() {
        let g = sky();
        assert_eq!((g.width(), g.height()), (1, 256));
        assert_eq!(g.as_bytes().len(), 256 * 4);
    }

    #[test]
    fn endpoints_match_colors() {
        let g = sky();
        assert_eq!(g.row(0), [0xad, 0xd8, 0xe6, 0xff]);
        assert_eq!(g.row(255), [0xe0, 0xf2, 0xf7, 0xff]);
    }

    #[test]
    fn channels_monotonic() {
        // top is darker than bottom on every channel
        let g = sky();
        for y in 1..g.height() {
            let (prev, cur) = (g.row(y - 1), g.row(y));
            for c in 0..3 {
                assert!(cur[c] >= prev[c], "row {y} channel {c}");
            }
        }
    }

    #[test]
    fn monotonic_when_decreasing() {
        let g = gradient_background(Color::from_hex(0xff8000), Color::from_hex(0x000080));
        assert_eq!(g.row(0), [0xff, 0x80, 0x00, 0xff]);
        assert_eq!(g.row(255), [0x00, 0x00, 0x80, 0xff]);
        for y in 1..g.height() {
            let (prev, cur) = (g.row(y - 1), g.row(y));
            assert!(cur[0] <= prev[0]);
            assert!(cur[1] <= prev[1]);
            assert!(cur[2] >= prev[2]);
        }
    }

    #[test]
    fn deterministic() {
        assert_eq!(sky(), sky());
    }
}

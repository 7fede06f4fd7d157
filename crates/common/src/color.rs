use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An sRGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("expected '#RRGGBB' or '0xRRGGBB', got {0:?}")]
    Format(String),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb8([
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        ])
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::rgb(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_hex(self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    /// Channel-wise linear interpolation in sRGB space.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgb(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Convert to linear light for shading.
    pub fn to_linear(self) -> [f32; 3] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ColorParseError::Format(s.to_string()))?;
        if digits.len() != 6 {
            return Err(ColorParseError::Format(s.to_string()));
        }
        let hex = u32::from_str_radix(digits, 16)
            .map_err(|_| ColorParseError::Digits(s.to_string()))?;
        Ok(Self::from_hex(hex))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.to_hex())
    }
}

// Serialized as "#RRGGBB" so config files stay readable.
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_css_hex() {
        let c: Color = "#ADD8E6".parse().unwrap();
        assert_eq!(c.to_rgb8(), [0xAD, 0xD8, 0xE6]);
        assert_eq!(c.to_string(), "#ADD8E6");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "ADD8E6".parse::<Color>(),
            Err(ColorParseError::Format(_))
        ));
        assert!(matches!(
            "#GGGGGG".parse::<Color>(),
            Err(ColorParseError::Digits(_))
        ));
        assert!("#FFF".parse::<Color>().is_err());
    }

    #[test]
    fn hex_roundtrip() {
        assert_eq!(Color::from_hex(0xe0f2f7).to_hex(), 0xe0f2f7);
        assert_eq!("0xA0C0D0".parse::<Color>().unwrap().to_hex(), 0xa0c0d0);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::rgb(0.5, 0.5, 0.5));
    }

    #[test]
    fn linear_conversion_fixed_points() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let white = Color::WHITE.to_linear();
        assert!((white[0] - 1.0).abs() < 1e-6);
    }
}

//! 8-bit sRGB colors and hex notation
//!
//! Hex strings are accepted with or without a leading `#` and in either
//! case, but always written back as `#RRGGBB` in uppercase.

use serde::{Deserialize, Serialize};

/// sRGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb8 {
    /// Red component (0 to 255)
    pub r: u8,
    /// Green component (0 to 255)
    pub g: u8,
    /// Blue component (0 to 255)
    pub b: u8,
}

impl Rgb8 {
    /// Create a new RGB color
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create RGB from an array
    #[inline]
    pub const fn from_array(arr: [u8; 3]) -> Self {
        Self {
            r: arr[0],
            g: arr[1],
            b: arr[2],
        }
    }

    /// Convert to array
    #[inline]
    pub const fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channels normalized to 0.0-255.0 floats
    #[inline]
    pub fn to_f64(&self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }

    /// Build from float channels, clamping to [0, 255] and rounding
    #[inline]
    pub fn from_f64_clamped(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Canonical `#RRGGBB` form
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// True when all channels are equal
    #[inline]
    pub fn is_achromatic(&self) -> bool {
        self.r == self.g && self.g == self.b
    }

    /// Black color
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// White color
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Red primary
    pub const RED: Self = Self::new(255, 0, 0);

    /// Green primary
    pub const GREEN: Self = Self::new(0, 255, 0);

    /// Blue primary
    pub const BLUE: Self = Self::new(0, 0, 255);
}

impl From<[u8; 3]> for Rgb8 {
    fn from(arr: [u8; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(rgb: Rgb8) -> Self {
        rgb.to_array()
    }
}

#[inline]
fn clamp_channel(value: f64) -> u8 {
    // NaN saturates to 0 in the cast
    value.round().clamp(0.0, 255.0) as u8
}

/// Parse a 6-digit hex color, `#` optional, case-insensitive
///
/// Any other length or a non-hex digit yields `None`.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb8> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgb8::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Format float channels as `#RRGGBB`, clamping and rounding each channel
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    Rgb8::from_f64_clamped(r, g, b).to_hex()
}

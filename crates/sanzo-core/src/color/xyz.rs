//! CIE XYZ Color Space
//!
//! XYZ sits between sRGB and LAB. Values here use the 0-100 scale,
//! so sRGB white lands on roughly (95.05, 100.0, 108.9).

use serde::{Deserialize, Serialize};

use crate::color::Rgb8;

/// Linear sRGB to XYZ (D65), row-major
pub const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// XYZ (D65) to linear sRGB, row-major
pub const XYZ_TO_SRGB: [[f64; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// CIE 1931 XYZ color coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Xyz {
    /// X tristimulus value (mix of cone responses, roughly red)
    pub x: f64,
    /// Y tristimulus value (luminance)
    pub y: f64,
    /// Z tristimulus value (roughly blue)
    pub z: f64,
}

impl Xyz {
    /// Create a new XYZ color
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create XYZ from an array
    #[inline]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }

    /// Convert to array
    #[inline]
    pub const fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Check if approximately equal to another XYZ color
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl From<[f64; 3]> for Xyz {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Xyz> for [f64; 3] {
    fn from(xyz: Xyz) -> Self {
        xyz.to_array()
    }
}

/// sRGB decode: encoded channel in [0, 1] to linear light
///
/// - Linear segment: c / 12.92 for c <= 0.04045
/// - Power segment: ((c + 0.055) / 1.055)^2.4 otherwise
#[inline]
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB encode: linear light to encoded channel in [0, 1]
#[inline]
pub fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Float-channel variant of [`rgb_to_xyz`]; channels are on 0-255
#[inline]
pub fn rgb_channels_to_xyz(r: f64, g: f64, b: f64) -> Xyz {
    let lin = [
        srgb_to_linear(r / 255.0),
        srgb_to_linear(g / 255.0),
        srgb_to_linear(b / 255.0),
    ];
    let m = &SRGB_TO_XYZ;
    Xyz::new(
        (m[0][0] * lin[0] + m[0][1] * lin[1] + m[0][2] * lin[2]) * 100.0,
        (m[1][0] * lin[0] + m[1][1] * lin[1] + m[1][2] * lin[2]) * 100.0,
        (m[2][0] * lin[0] + m[2][1] * lin[1] + m[2][2] * lin[2]) * 100.0,
    )
}

/// Convert 8-bit sRGB to XYZ (D65, 0-100 scale)
#[inline]
pub fn rgb_to_xyz(rgb: Rgb8) -> Xyz {
    rgb_channels_to_xyz(rgb.r as f64, rgb.g as f64, rgb.b as f64)
}

/// Convert XYZ back to 8-bit sRGB, clamping out-of-gamut values
pub fn xyz_to_rgb(xyz: Xyz) -> Rgb8 {
    let v = [xyz.x / 100.0, xyz.y / 100.0, xyz.z / 100.0];
    let m = &XYZ_TO_SRGB;
    let encode = |row: &[f64; 3]| {
        let lin = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
        linear_to_srgb(lin.clamp(0.0, 1.0)) * 255.0
    };
    Rgb8::from_f64_clamped(encode(&m[0]), encode(&m[1]), encode(&m[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_maps_to_d65() {
        let xyz = rgb_to_xyz(Rgb8::WHITE);
        assert!((xyz.x - 95.05).abs() < 0.5, "X = {}", xyz.x);
        assert!((xyz.y - 100.0).abs() < 0.5, "Y = {}", xyz.y);
        assert!((xyz.z - 108.9).abs() < 0.5, "Z = {}", xyz.z);
    }

    #[test]
    fn test_black_is_origin() {
        let xyz = rgb_to_xyz(Rgb8::BLACK);
        assert!(xyz.approx_eq(&Xyz::new(0.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn test_gamma_threshold() {
        assert!((srgb_to_linear(0.04045) - 0.04045 / 12.92).abs() < 1e-12);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rgb_xyz_roundtrip() {
        for rgb in [
            Rgb8::new(255, 128, 64),
            Rgb8::new(12, 200, 99),
            Rgb8::new(3, 3, 3),
            Rgb8::BLUE,
        ] {
            assert_eq!(xyz_to_rgb(rgb_to_xyz(rgb)), rgb);
        }
    }
}

//! CIELAB under D65
//!
//! Every distance in the crate is measured here. L runs from 0 (black) to
//! 100 (white); a is the green-red axis and b the blue-yellow axis.
//!
//! The forward transfer uses the classic 0.008856 / 7.787 constants rather
//! than the exact 216/24389 rational form.

use serde::{Deserialize, Serialize};

use crate::color::white_point::D65;
use crate::color::xyz::{rgb_to_xyz, xyz_to_rgb};
use crate::color::{Rgb8, Xyz, hex_to_rgb};

/// CIELAB color coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Lab {
    /// Lightness (0 to 100)
    pub l: f64,
    /// Green-red axis (typically -128 to 127)
    pub a: f64,
    /// Blue-yellow axis (typically -128 to 127)
    pub b: f64,
}

impl Lab {
    #[inline]
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// From `[L, a, b]`
    #[inline]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self {
            l: arr[0],
            a: arr[1],
            b: arr[2],
        }
    }

    #[inline]
    pub const fn to_array(&self) -> [f64; 3] {
        [self.l, self.a, self.b]
    }

    /// XYZ (0-100 scale) to LAB under D65
    pub fn from_xyz(xyz: Xyz) -> Self {
        let white = D65.xyz;
        let fy = forward(xyz.y / white.y);
        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (forward(xyz.x / white.x) - fy),
            b: 200.0 * (fy - forward(xyz.z / white.z)),
        }
    }

    /// LAB to XYZ (0-100 scale) under D65
    pub fn to_xyz(&self) -> Xyz {
        let white = D65.xyz;
        let fy = (self.l + 16.0) / 116.0;
        Xyz::new(
            inverse(self.a / 500.0 + fy) * white.x,
            inverse(fy) * white.y,
            inverse(fy - self.b / 200.0) * white.z,
        )
    }

    /// C*ab
    #[inline]
    pub fn chroma(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// Hue angle h*ab in degrees, 0 to 360
    #[inline]
    pub fn hue_degrees(&self) -> f64 {
        let h = self.b.atan2(self.a).to_degrees();
        if h < 0.0 { h + 360.0 } else { h }
    }

    /// All three components within `epsilon`
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array())
            .all(|(x, y)| (x - y).abs() < epsilon)
    }
}

/// Ratio below which the transfer curve is linear
const LINEAR_LIMIT: f64 = 0.008856;

/// Slope of the linear segment
const LINEAR_SLOPE: f64 = 7.787;

#[inline]
fn forward(t: f64) -> f64 {
    if t > LINEAR_LIMIT {
        t.cbrt()
    } else {
        LINEAR_SLOPE * t + 16.0 / 116.0
    }
}

#[inline]
fn inverse(f: f64) -> f64 {
    let cubed = f * f * f;
    if cubed > LINEAR_LIMIT {
        cubed
    } else {
        (f - 16.0 / 116.0) / LINEAR_SLOPE
    }
}

/// XYZ (0-100 scale) to LAB under D65
#[inline]
pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    Lab::from_xyz(xyz)
}

/// LAB to XYZ (0-100 scale) under D65
#[inline]
pub fn lab_to_xyz(lab: Lab) -> Xyz {
    lab.to_xyz()
}

/// 8-bit sRGB to LAB
#[inline]
pub fn rgb_to_lab(rgb: Rgb8) -> Lab {
    xyz_to_lab(rgb_to_xyz(rgb))
}

/// LAB to 8-bit sRGB, clamped to the sRGB gamut
#[inline]
pub fn lab_to_rgb(lab: Lab) -> Rgb8 {
    xyz_to_rgb(lab_to_xyz(lab))
}

/// Hex string to LAB; `None` when the hex is malformed
#[inline]
pub fn hex_to_lab(hex: &str) -> Option<Lab> {
    hex_to_rgb(hex).map(rgb_to_lab)
}

impl From<[f64; 3]> for Lab {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Lab> for [f64; 3] {
    fn from(lab: Lab) -> Self {
        lab.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_reference_white_and_black() {
        let lab = xyz_to_lab(D65.xyz);
        assert!(lab.approx_eq(&Lab::new(100.0, 0.0, 0.0), EPSILON), "{lab:?}");
        assert!(xyz_to_lab(Xyz::default()).l.abs() < EPSILON);
    }

    #[test]
    fn test_srgb_white_and_black() {
        let white = rgb_to_lab(Rgb8::WHITE);
        assert!((white.l - 100.0).abs() < 1.0, "white L = {}", white.l);
        assert!(white.a.abs() < 0.5 && white.b.abs() < 0.5);

        let black = rgb_to_lab(Rgb8::BLACK);
        assert!(black.l.abs() < 1.0, "black L = {}", black.l);
    }

    #[test]
    fn test_pure_red_reference() {
        let red = rgb_to_lab(Rgb8::RED);
        assert!((red.l - 53.24).abs() < 0.05, "L = {}", red.l);
        assert!((red.a - 80.09).abs() < 0.1, "a = {}", red.a);
        assert!((red.b - 67.20).abs() < 0.1, "b = {}", red.b);
    }

    #[test]
    fn test_composition_matches_steps() {
        let rgb = Rgb8::new(34, 139, 34);
        let composed = rgb_to_lab(rgb);
        let stepped = xyz_to_lab(rgb_to_xyz(rgb));
        assert!(composed.approx_eq(&stepped, 1e-12));
        assert_eq!(hex_to_lab("#228B22"), Some(composed));
        assert_eq!(hex_to_lab("#228B2"), None);
    }

    #[test]
    fn test_roundtrip() {
        let original = Lab::new(50.0, 25.0, -30.0);
        let back = xyz_to_lab(lab_to_xyz(original));
        assert!(original.approx_eq(&back, 1e-9), "{original:?} vs {back:?}");
    }

    #[test]
    fn test_lab_to_rgb() {
        let rgb = Rgb8::new(70, 130, 180);
        assert_eq!(lab_to_rgb(rgb_to_lab(rgb)), rgb);
    }

    #[test]
    fn test_chroma() {
        let lab = Lab::new(50.0, 3.0, 4.0);
        assert!((lab.chroma() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_hue_degrees() {
        assert!(Lab::new(50.0, 1.0, 0.0).hue_degrees().abs() < EPSILON);
        assert!((Lab::new(50.0, 0.0, -1.0).hue_degrees() - 270.0).abs() < EPSILON);
    }
}

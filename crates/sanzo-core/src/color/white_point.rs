//! Reference white for the LAB conversion
//!
//! Coordinates are on the 0-100 scale used throughout this crate,
//! i.e. the reference white has Y = 100.

use crate::color::Xyz;

/// A white point definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhitePoint {
    /// Name of the illuminant
    pub name: &'static str,
    /// CIE XYZ coordinates (Y normalized to 100)
    pub xyz: Xyz,
}

impl WhitePoint {
    /// Create a new white point
    pub const fn new(name: &'static str, x: f64, y: f64, z: f64) -> Self {
        Self {
            name,
            xyz: Xyz::new(x, y, z),
        }
    }
}

/// CIE Standard Illuminant D65 (Noon Daylight), 2° observer
///
/// Correlated Color Temperature: ~6504K
/// White point of sRGB.
pub const D65: WhitePoint = WhitePoint::new("D65", 95.047, 100.0, 108.883);

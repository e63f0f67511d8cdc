//! Reference implementation wrappers
//!
//! Thin adapters over the `palette` crate with plain-array signatures.

use palette::color_difference::Ciede2000;
use palette::white_point::D65;
use palette::{IntoColor, Lab, Srgb};

/// sRGB (8-bit) to LAB (D65) via palette
pub fn srgb_to_lab(rgb: [u8; 3]) -> [f64; 3] {
    let srgb: Srgb<f64> = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format();
    let lab: Lab<D65, f64> = srgb.into_linear().into_color();
    [lab.l, lab.a, lab.b]
}

/// CIEDE2000 via palette
pub fn ciede2000(lab1: [f64; 3], lab2: [f64; 3]) -> f64 {
    let a: Lab<D65, f64> = Lab::new(lab1[0], lab1[1], lab1[2]);
    let b: Lab<D65, f64> = Lab::new(lab2[0], lab2[1], lab2[2]);
    a.difference(b)
}

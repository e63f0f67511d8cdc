//! Test color generation
//!
//! Deterministic sample sets for conversion, distance and clustering tests.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sanzo_core::{Hsl, Lab, hsl_to_rgb};

/// Kinds of RGB sample sets
#[derive(Debug, Clone, Copy)]
pub enum SamplePattern {
    /// The 8 corners of the RGB cube
    ColorCube,
    /// Hue ramp at full saturation
    HueRamp,
    /// Grayscale ramp 0-255
    Grayscale,
    /// Random colors with seed
    Random(u64),
    /// Skin tone samples
    SkinTones,
    /// Saturated colors near gamut boundary
    GamutBoundary,
}

/// Generate `count` RGB samples
pub fn generate_samples(pattern: SamplePattern, count: usize) -> Vec<[u8; 3]> {
    match pattern {
        SamplePattern::ColorCube => {
            let channel = |bit: usize, i: usize| if i & bit == 0 { 0 } else { 255 };
            (0..count)
                .map(|i| {
                    let corner = i % 8;
                    [channel(1, corner), channel(2, corner), channel(4, corner)]
                })
                .collect()
        }
        SamplePattern::HueRamp => (0..count)
            .map(|i| {
                let hue = i as f64 / count as f64 * 360.0;
                hsl_to_rgb(Hsl::new(hue, 100.0, 50.0)).to_array()
            })
            .collect(),
        SamplePattern::Grayscale => (0..count)
            .map(|i| {
                let v = ((i as f32 / count.max(1) as f32) * 255.0) as u8;
                [v, v, v]
            })
            .collect(),
        SamplePattern::Random(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..count).map(|_| rng.r#gen::<[u8; 3]>()).collect()
        }
        SamplePattern::SkinTones => {
            let tones: [[u8; 3]; 6] = [
                [255, 224, 189],
                [241, 194, 125],
                [224, 172, 105],
                [198, 134, 66],
                [141, 85, 36],
                [89, 47, 42],
            ];
            (0..count).map(|i| tones[i % 6]).collect()
        }
        SamplePattern::GamutBoundary => {
            let colors: [[u8; 3]; 8] = [
                [255, 0, 0],
                [0, 255, 0],
                [0, 0, 255],
                [255, 255, 0],
                [255, 0, 255],
                [0, 255, 255],
                [255, 128, 0],
                [128, 0, 255],
            ];
            (0..count).map(|i| colors[i % 8]).collect()
        }
    }
}

/// Random LAB points covering the practical gamut
pub fn random_labs(seed: u64, count: usize) -> Vec<Lab> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Lab::new(
                rng.gen_range(0.0..=100.0),
                rng.gen_range(-128.0..=127.0),
                rng.gen_range(-128.0..=127.0),
            )
        })
        .collect()
}

/// Random 6-digit hex strings in mixed case, some with `#`
pub fn random_hex(seed: u64, count: usize) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let value: u32 = rng.gen_range(0..=0xFF_FFFF);
            let digits = if rng.gen_bool(0.5) {
                format!("{value:06x}")
            } else {
                format!("{value:06X}")
            };
            if rng.gen_bool(0.5) { format!("#{digits}") } else { digits }
        })
        .collect()
}

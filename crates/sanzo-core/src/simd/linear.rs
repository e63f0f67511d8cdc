//! Channel decoding and the sRGB → XYZ step
//!
//! Input channels arrive on 0-255 as floats. Decoding folds the scale and
//! the sRGB transfer curve into one pass; the matrix step then works on
//! whole triples.

use multiversion::multiversion;

use crate::color::xyz::SRGB_TO_XYZ;

const DECODE_THRESHOLD: f64 = 0.04045;

/// 0-255 channels to linear light on [0, 1]
///
/// Out-of-range channels clamp to the nearest end.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn decode_channels_batch(channels: &[f64], linear: &mut [f64]) {
    assert!(linear.len() >= channels.len());

    for (c, out) in channels.iter().zip(linear.iter_mut()) {
        let v = c.clamp(0.0, 255.0) / 255.0;
        *out = if v <= DECODE_THRESHOLD {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        };
    }
}

/// Linear sRGB triples to XYZ on the 0-1 scale (D65)
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn linear_rgb_to_xyz_batch(rgb: &[[f64; 3]], xyz: &mut [[f64; 3]]) {
    assert!(xyz.len() >= rgb.len());

    let [[xr, xg, xb], [yr, yg, yb], [zr, zg, zb]] = SRGB_TO_XYZ;
    for ([r, g, b], out) in rgb.iter().zip(xyz.iter_mut()) {
        *out = [
            xr * r + xg * g + xb * b,
            yr * r + yg * g + yb * b,
            zr * r + zg * g + zb * b,
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::xyz::srgb_to_linear;

    #[test]
    fn test_decode_matches_scalar() {
        let channels: Vec<f64> = (0..256).map(f64::from).collect();
        let mut linear = vec![0.0; 256];
        decode_channels_batch(&channels, &mut linear);

        for (i, value) in linear.iter().enumerate() {
            let expected = srgb_to_linear(i as f64 / 255.0);
            assert!((value - expected).abs() < 1e-12, "channel {i}: {value} vs {expected}");
        }
    }

    #[test]
    fn test_decode_clamps() {
        let mut linear = [0.0; 2];
        decode_channels_batch(&[-20.0, 300.0], &mut linear);
        assert_eq!(linear, [0.0, 1.0]);
    }

    #[test]
    fn test_white_lands_on_d65() {
        let mut xyz = [[0.0; 3]];
        linear_rgb_to_xyz_batch(&[[1.0, 1.0, 1.0]], &mut xyz);
        assert!((xyz[0][0] - 0.9505).abs() < 0.001);
        assert!((xyz[0][1] - 1.0).abs() < 0.001);
        assert!((xyz[0][2] - 1.0889).abs() < 0.001);
    }
}

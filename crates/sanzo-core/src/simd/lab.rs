//! Batch sRGB → LAB pipeline
//!
//! decode → matrix → LAB, each stage a flat batch kernel.

use multiversion::multiversion;

use super::linear::{decode_channels_batch, linear_rgb_to_xyz_batch};
use crate::color::D65;

/// XYZ on the 0-1 scale to LAB (D65), in place
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn xyz_to_lab_batch(data: &mut [[f64; 3]]) {
    let xn = D65.xyz.x / 100.0;
    let yn = D65.xyz.y / 100.0;
    let zn = D65.xyz.z / 100.0;

    let f = |t: f64| {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    };

    for v in data.iter_mut() {
        let fx = f(v[0] / xn);
        let fy = f(v[1] / yn);
        let fz = f(v[2] / zn);
        *v = [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)];
    }
}

/// Convert RGB triples (channels 0-255 as floats) to LAB
pub fn rgb_to_lab_batch(input: &[[f64; 3]], output: &mut [[f64; 3]]) {
    assert!(output.len() >= input.len());

    let mut linear = vec![[0.0; 3]; input.len()];
    decode_channels_batch(bytemuck::cast_slice(input), bytemuck::cast_slice_mut(&mut linear));

    let out = &mut output[..input.len()];
    linear_rgb_to_xyz_batch(&linear, out);
    xyz_to_lab_batch(out);
}

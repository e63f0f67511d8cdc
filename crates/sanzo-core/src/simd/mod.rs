//! Batch color kernels
//!
//! The accelerated backend runs on these: batch sRGB → LAB and Delta E
//! over many candidates. Each kernel is compiled per instruction set with
//! `multiversion` and picked at runtime.
//!
//! Supported instruction sets:
//! - x86-64: SSE4.1, AVX2
//! - ARM64: NEON
//!
//! The scalar build is always available.

mod delta_e;
mod lab;
mod linear;

pub use delta_e::{delta_e_batch, distance_matrix, nearest};
pub use lab::{rgb_to_lab_batch, xyz_to_lab_batch};
pub use linear::{decode_channels_batch, linear_rgb_to_xyz_batch};

/// Instruction set the kernels dispatch to on this machine
pub fn active_features() -> &'static str {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            "AVX2"
        } else if is_x86_feature_detected!("sse4.1") {
            "SSE4.1"
        } else {
            "scalar"
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        "NEON"
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        "scalar"
    }
}

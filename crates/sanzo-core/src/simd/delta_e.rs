//! Batch Delta E kernels
//!
//! One target against many candidates, and the full pairwise matrix.
//! The per-pair formulas are the scalar ones from [`crate::difference`];
//! multiversion compiles each loop once per instruction set.

use multiversion::multiversion;

use crate::color::Lab;
use crate::difference::{Cie94Constants, DeltaEAlgorithm, cie76, cie94, ciede2000, is_closer};

/// Distances from `target` to each candidate
///
/// For CIE94 the target is the first (reference) operand.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn delta_e_batch(
    target: [f64; 3],
    candidates: &[[f64; 3]],
    algorithm: DeltaEAlgorithm,
    output: &mut [f64],
) {
    assert!(output.len() >= candidates.len());

    let t = Lab::from_array(target);
    match algorithm {
        DeltaEAlgorithm::Cie76 => {
            for (c, out) in candidates.iter().zip(output.iter_mut()) {
                *out = cie76(t, Lab::from_array(*c));
            }
        }
        DeltaEAlgorithm::Cie94 => {
            for (c, out) in candidates.iter().zip(output.iter_mut()) {
                *out = cie94(t, Lab::from_array(*c), &Cie94Constants::GRAPHIC_ARTS);
            }
        }
        DeltaEAlgorithm::Ciede2000 => {
            for (c, out) in candidates.iter().zip(output.iter_mut()) {
                *out = ciede2000(t, Lab::from_array(*c));
            }
        }
    }
}

/// Row-major n×n matrix; entry (i, j) is the distance from i to j
pub fn distance_matrix(labs: &[[f64; 3]], algorithm: DeltaEAlgorithm, output: &mut [f64]) {
    let n = labs.len();
    assert!(output.len() >= n * n);

    for (i, row) in output.chunks_exact_mut(n.max(1)).take(n).enumerate() {
        delta_e_batch(labs[i], labs, algorithm, row);
    }
}

/// Index and distance of the closest candidate; ties keep the first, NaN never beats a number
pub fn nearest(target: [f64; 3], candidates: &[[f64; 3]], algorithm: DeltaEAlgorithm) -> Option<(usize, f64)> {
    let mut distances = vec![0.0; candidates.len()];
    delta_e_batch(target, candidates, algorithm, &mut distances);

    let mut best: Option<(usize, f64)> = None;
    for (index, &distance) in distances.iter().enumerate() {
        if is_closer(distance, best) {
            best = Some((index, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_diagonal_zero() {
        let labs = [[50.0, 10.0, -10.0], [70.0, -20.0, 30.0], [20.0, 0.0, 0.0]];
        let mut out = vec![f64::NAN; 9];
        distance_matrix(&labs, DeltaEAlgorithm::Ciede2000, &mut out);
        for i in 0..3 {
            assert_eq!(out[i * 3 + i], 0.0);
        }
        assert!((out[1] - out[3]).abs() < 1e-9, "CIEDE2000 should be symmetric");
    }

    #[test]
    fn test_nearest() {
        let candidates = [[0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [100.0, 0.0, 0.0]];
        assert_eq!(
            nearest([60.0, 0.0, 0.0], &candidates, DeltaEAlgorithm::Cie76),
            Some((1, 10.0))
        );
        assert_eq!(nearest([60.0, 0.0, 0.0], &[], DeltaEAlgorithm::Cie76), None);

        let with_nan = [[f64::NAN, 0.0, 0.0], [50.0, 0.0, 0.0], [-f64::NAN, 0.0, 0.0]];
        assert_eq!(
            nearest([60.0, 0.0, 0.0], &with_nan, DeltaEAlgorithm::Cie76),
            Some((1, 10.0))
        );
    }
}

//! Math backend strategy
//!
//! [`MathBackend`] is the seam between the bridge and an implementation of
//! the hot numeric paths. The portable backend here is the reference; the
//! accelerated backend in [`super::accelerated`] must agree with it.

use crate::Result;
use crate::color::{Lab, xyz::rgb_channels_to_xyz};
use crate::difference::{Cie94Constants, DeltaEAlgorithm, cie76, cie94, ciede2000, is_closer};

/// Hot-path numeric operations
///
/// RGB inputs are channel values on 0-255 as floats. Distance matrices are
/// row-major `n × n`, with entry `(i, j)` the distance from `labs[i]` to
/// `labs[j]`.
pub trait MathBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    fn rgb_to_lab(&self, rgb: [f64; 3]) -> Result<Lab>;

    fn delta_e_cie76(&self, a: Lab, b: Lab) -> Result<f64>;

    /// Graphic-arts constants; `a` is the reference operand
    fn delta_e_cie94(&self, a: Lab, b: Lab) -> Result<f64>;

    fn delta_e_2000(&self, a: Lab, b: Lab) -> Result<f64>;

    fn batch_rgb_to_lab(&self, rgb: &[[f64; 3]]) -> Result<Vec<Lab>>;

    fn distance_matrix(&self, labs: &[Lab], algorithm: DeltaEAlgorithm) -> Result<Vec<f64>>;

    /// Index and distance of the closest candidate, `None` when there are none
    fn find_nearest(
        &self,
        target: Lab,
        candidates: &[Lab],
        algorithm: DeltaEAlgorithm,
    ) -> Result<Option<(usize, f64)>>;
}

/// Scalar implementation, always available
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableBackend;

impl MathBackend for PortableBackend {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn rgb_to_lab(&self, rgb: [f64; 3]) -> Result<Lab> {
        Ok(Lab::from_xyz(rgb_channels_to_xyz(rgb[0], rgb[1], rgb[2])))
    }

    fn delta_e_cie76(&self, a: Lab, b: Lab) -> Result<f64> {
        Ok(cie76(a, b))
    }

    fn delta_e_cie94(&self, a: Lab, b: Lab) -> Result<f64> {
        Ok(cie94(a, b, &Cie94Constants::GRAPHIC_ARTS))
    }

    fn delta_e_2000(&self, a: Lab, b: Lab) -> Result<f64> {
        Ok(ciede2000(a, b))
    }

    fn batch_rgb_to_lab(&self, rgb: &[[f64; 3]]) -> Result<Vec<Lab>> {
        rgb.iter().map(|&c| self.rgb_to_lab(c)).collect()
    }

    fn distance_matrix(&self, labs: &[Lab], algorithm: DeltaEAlgorithm) -> Result<Vec<f64>> {
        let mut matrix = Vec::with_capacity(labs.len() * labs.len());
        for &a in labs {
            matrix.extend(labs.iter().map(|&b| algorithm.distance(a, b)));
        }
        Ok(matrix)
    }

    fn find_nearest(
        &self,
        target: Lab,
        candidates: &[Lab],
        algorithm: DeltaEAlgorithm,
    ) -> Result<Option<(usize, f64)>> {
        let mut best: Option<(usize, f64)> = None;
        for (index, &candidate) in candidates.iter().enumerate() {
            let distance = algorithm.distance(target, candidate);
            if is_closer(distance, best) {
                best = Some((index, distance));
            }
        }
        Ok(best)
    }
}

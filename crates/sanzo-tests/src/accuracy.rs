//! Accuracy measurement using perceptual color difference metrics
//!
//! CIEDE2000 from the `palette` crate is the measuring stick, so a bug in
//! our own CIEDE2000 cannot hide a conversion error.

use sanzo_core::Lab;

use crate::reference;

/// Statistics from a deltaE comparison
#[derive(Debug, Clone)]
pub struct DeltaEStats {
    /// Mean deltaE across all samples
    pub mean: f64,
    /// Maximum deltaE
    pub max: f64,
    /// 95th percentile deltaE
    pub p95: f64,
    /// Number of samples
    pub count: usize,
}

impl DeltaEStats {
    /// Summarize a list of differences; all zeros when empty
    pub fn from_differences(mut differences: Vec<f64>) -> Self {
        if differences.is_empty() {
            return Self {
                mean: 0.0,
                max: 0.0,
                p95: 0.0,
                count: 0,
            };
        }
        differences.sort_by(f64::total_cmp);
        let count = differences.len();
        let p95_index = ((count as f64 * 0.95).ceil() as usize).clamp(1, count) - 1;
        Self {
            mean: differences.iter().sum::<f64>() / count as f64,
            max: differences[count - 1],
            p95: differences[p95_index],
            count,
        }
    }

    /// Check if all differences are imperceptible (deltaE < 1.0)
    pub fn is_excellent(&self) -> bool {
        self.max < 1.0
    }

    /// Check if differences are barely perceptible (deltaE < 2.0)
    pub fn is_good(&self) -> bool {
        self.max < 2.0
    }
}

/// Compare our LAB values against reference LAB values
pub fn compare_labs(reference: &[[f64; 3]], result: &[Lab]) -> DeltaEStats {
    assert_eq!(reference.len(), result.len());

    let differences = reference
        .iter()
        .zip(result)
        .map(|(r, ours)| reference::ciede2000(*r, ours.to_array()))
        .collect();
    DeltaEStats::from_differences(differences)
}

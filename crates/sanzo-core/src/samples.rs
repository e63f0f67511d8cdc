//! Dominant colors from raw RGB samples
//!
//! Image decoding happens upstream; this module only receives sampled
//! pixels. Samples are clustered greedily in LAB: each joins the closest
//! existing cluster when its CIEDE2000 distance to that cluster's running
//! mean is below the merge threshold, otherwise it starts a new cluster.

use serde::{Deserialize, Serialize};

use crate::color::{Lab, Rgb8, lab_to_rgb, rgb_to_lab};
use crate::difference::ciede2000;

/// Distance below which a sample joins a cluster
pub const DEFAULT_MERGE_THRESHOLD: f64 = 10.0;

/// One dominant color and its share of the samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    pub hex: String,
    /// Share of all samples, 0 to 100, one decimal
    pub percentage: f64,
    pub rgb: Rgb8,
    /// Labeling is left to the caller
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
struct Cluster {
    sum: [f64; 3],
    mean: Lab,
    count: usize,
}

impl Cluster {
    fn new(lab: Lab) -> Self {
        Self {
            sum: lab.to_array(),
            mean: lab,
            count: 1,
        }
    }

    fn add(&mut self, lab: Lab) {
        let v = lab.to_array();
        for (s, x) in self.sum.iter_mut().zip(v) {
            *s += x;
        }
        self.count += 1;
        let n = self.count as f64;
        self.mean = Lab::new(self.sum[0] / n, self.sum[1] / n, self.sum[2] / n);
    }
}

/// Summarize samples into at most `max_colors` dominant colors
///
/// Sorted by descending share. The percentages are shares of all samples,
/// so they sum to about 100 only when every cluster is returned.
pub fn summarize_samples(samples: &[[u8; 3]], max_colors: usize, merge_threshold: f64) -> Vec<DominantColor> {
    if samples.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    for &sample in samples {
        let lab = rgb_to_lab(Rgb8::from_array(sample));
        let closest = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (i, ciede2000(lab, c.mean)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match closest {
            Some((i, distance)) if distance < merge_threshold => clusters[i].add(lab),
            _ => clusters.push(Cluster::new(lab)),
        }
    }

    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters.truncate(max_colors);

    let total = samples.len() as f64;
    clusters
        .into_iter()
        .map(|cluster| {
            let rgb = lab_to_rgb(cluster.mean);
            DominantColor {
                hex: rgb.to_hex(),
                percentage: (cluster.count as f64 / total * 1000.0).round() / 10.0,
                rgb,
                category: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(summarize_samples(&[], 5, DEFAULT_MERGE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_two_regions() {
        let mut samples = vec![[250, 250, 245]; 70];
        samples.extend(vec![[30, 60, 140]; 30]);
        // near-duplicates of the dominant tone merge into it
        samples.extend(vec![[248, 249, 244]; 10]);

        let dominant = summarize_samples(&samples, 5, DEFAULT_MERGE_THRESHOLD);
        assert_eq!(dominant.len(), 2);
        assert!((dominant[0].percentage - 72.7).abs() < 0.05, "{dominant:?}");
        assert!((dominant[1].percentage - 27.3).abs() < 0.05, "{dominant:?}");
        assert_eq!(dominant[1].rgb, Rgb8::new(30, 60, 140));
        assert!(dominant.iter().all(|d| d.category.is_none()));

        let total: f64 = dominant.iter().map(|d| d.percentage).sum();
        assert!((total - 100.0).abs() < 0.2);
    }

    #[test]
    fn test_max_colors() {
        let samples = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 0, 0]];
        let dominant = summarize_samples(&samples, 1, DEFAULT_MERGE_THRESHOLD);
        assert_eq!(dominant.len(), 1);
        assert_eq!(dominant[0].hex, "#FF0000");
        assert_eq!(dominant[0].percentage, 50.0);
    }
}

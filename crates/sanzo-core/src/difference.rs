//! Perceptual color difference (Delta E)
//!
//! Three CIE formulas of increasing accuracy:
//!
//! - **CIE76**: Euclidean distance in LAB. A true metric.
//! - **CIE94**: chroma/hue weighted. The weights use the chroma of the
//!   *first* operand, so `cie94(a, b) != cie94(b, a)` in general. This is
//!   part of the published formula and is kept as is.
//! - **CIEDE2000**: adds a hue rotation term and blue-region correction.
//!   Symmetric.
//!
//! NaN or infinite inputs propagate through every formula unchanged.

use serde::{Deserialize, Serialize};

use crate::color::{Color, Lab};

/// Delta E formula selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaEAlgorithm {
    Cie76,
    Cie94,
    #[default]
    Ciede2000,
}

impl DeltaEAlgorithm {
    /// Distance from `a` to `b` under this formula
    #[inline]
    pub fn distance(self, a: Lab, b: Lab) -> f64 {
        match self {
            Self::Cie76 => cie76(a, b),
            Self::Cie94 => cie94(a, b, &Cie94Constants::GRAPHIC_ARTS),
            Self::Ciede2000 => ciede2000(a, b),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Cie76 => "cie76",
            Self::Cie94 => "cie94",
            Self::Ciede2000 => "ciede2000",
        }
    }
}

/// Weighting constants for CIE94
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cie94Constants {
    pub k_l: f64,
    pub k_c: f64,
    pub k_h: f64,
    pub k1: f64,
    pub k2: f64,
}

impl Cie94Constants {
    /// Graphic arts application (the default)
    pub const GRAPHIC_ARTS: Self = Self {
        k_l: 1.0,
        k_c: 1.0,
        k_h: 1.0,
        k1: 0.045,
        k2: 0.015,
    };

    /// Textiles application
    pub const TEXTILES: Self = Self {
        k_l: 2.0,
        k_c: 1.0,
        k_h: 1.0,
        k1: 0.048,
        k2: 0.014,
    };
}

impl Default for Cie94Constants {
    fn default() -> Self {
        Self::GRAPHIC_ARTS
    }
}

/// CIE76: Euclidean distance in LAB
#[inline]
pub fn cie76(lab1: Lab, lab2: Lab) -> f64 {
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// CIE94 color difference
///
/// Sc and Sh are scaled by the chroma of `lab1`; swapping the operands
/// changes the result.
pub fn cie94(lab1: Lab, lab2: Lab, k: &Cie94Constants) -> f64 {
    let delta_l = lab1.l - lab2.l;
    let c1 = lab1.chroma();
    let c2 = lab2.chroma();
    let delta_c = c1 - c2;

    let delta_a = lab1.a - lab2.a;
    let delta_b = lab1.b - lab2.b;
    // Rounding can push this a hair below zero for near-identical colors
    let delta_h_sq = (delta_a * delta_a + delta_b * delta_b - delta_c * delta_c).max(0.0);

    let s_l = 1.0;
    let s_c = 1.0 + k.k1 * c1;
    let s_h = 1.0 + k.k2 * c1;

    let term_l = delta_l / (k.k_l * s_l);
    let term_c = delta_c / (k.k_c * s_c);
    let term_h_sq = delta_h_sq / ((k.k_h * s_h) * (k.k_h * s_h));

    (term_l * term_l + term_c * term_c + term_h_sq).sqrt()
}

/// Calculate CIEDE2000 color difference
///
/// This is the industry-standard color difference formula.
/// A difference of 1.0 is approximately the just-noticeable difference.
/// Reference: Sharma, Wu, Dalal (2005).
pub fn ciede2000(lab1: Lab, lab2: Lab) -> f64 {
    let l1 = lab1.l;
    let a1 = lab1.a;
    let b1 = lab1.b;
    let l2 = lab2.l;
    let a2 = lab2.a;
    let b2 = lab2.b;

    // Step 1: Calculate C' and h'
    let c1 = (a1 * a1 + b1 * b1).sqrt();
    let c2 = (a2 * a2 + b2 * b2).sqrt();
    let c_bar = (c1 + c2) / 2.0;

    let c_bar_7 = c_bar.powi(7);
    let g = 0.5 * (1.0 - (c_bar_7 / (c_bar_7 + POW25_7)).sqrt());

    let a1_prime = a1 * (1.0 + g);
    let a2_prime = a2 * (1.0 + g);

    let c1_prime = (a1_prime * a1_prime + b1 * b1).sqrt();
    let c2_prime = (a2_prime * a2_prime + b2 * b2).sqrt();

    let h1_prime = hue_prime(a1_prime, b1);
    let h2_prime = hue_prime(a2_prime, b2);

    // Step 2: Calculate deltas
    let delta_l_prime = l2 - l1;
    let delta_c_prime = c2_prime - c1_prime;

    let delta_h_prime = if c1_prime * c2_prime == 0.0 {
        0.0
    } else {
        let diff = h2_prime - h1_prime;
        if diff.abs() <= 180.0 {
            diff
        } else if diff > 180.0 {
            diff - 360.0
        } else {
            diff + 360.0
        }
    };

    let delta_big_h_prime =
        2.0 * (c1_prime * c2_prime).sqrt() * (delta_h_prime.to_radians() / 2.0).sin();

    // Step 3: Weighting functions
    let l_bar_prime = (l1 + l2) / 2.0;
    let c_bar_prime = (c1_prime + c2_prime) / 2.0;

    let h_bar_prime = if c1_prime * c2_prime == 0.0 {
        h1_prime + h2_prime
    } else if (h1_prime - h2_prime).abs() <= 180.0 {
        (h1_prime + h2_prime) / 2.0
    } else if h1_prime + h2_prime < 360.0 {
        (h1_prime + h2_prime + 360.0) / 2.0
    } else {
        (h1_prime + h2_prime - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_bar_prime - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_bar_prime).to_radians().cos()
        + 0.32 * (3.0 * h_bar_prime + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_bar_prime - 63.0).to_radians().cos();

    // Blue-region rotation
    let delta_theta = 30.0 * (-((h_bar_prime - 275.0) / 25.0).powi(2)).exp();
    let c_bar_prime_7 = c_bar_prime.powi(7);
    let r_c = 2.0 * (c_bar_prime_7 / (c_bar_prime_7 + POW25_7)).sqrt();
    let l_offset_sq = (l_bar_prime - 50.0).powi(2);
    let s_l = 1.0 + (0.015 * l_offset_sq) / (20.0 + l_offset_sq).sqrt();
    let s_c = 1.0 + 0.045 * c_bar_prime;
    let s_h = 1.0 + 0.015 * c_bar_prime * t;
    let r_t = -(2.0 * delta_theta).to_radians().sin() * r_c;

    // Parametric factors kL = kC = kH = 1
    let term1 = delta_l_prime / s_l;
    let term2 = delta_c_prime / s_c;
    let term3 = delta_big_h_prime / s_h;

    (term1 * term1 + term2 * term2 + term3 * term3 + r_t * term2 * term3).sqrt()
}

/// 25^7
const POW25_7: f64 = 6_103_515_625.0;

#[inline]
fn hue_prime(a_prime: f64, b: f64) -> f64 {
    if a_prime == 0.0 && b == 0.0 {
        0.0
    } else {
        let h = b.atan2(a_prime).to_degrees();
        if h < 0.0 { h + 360.0 } else { h }
    }
}

/// How noticeable a difference is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptualLevel {
    Imperceptible,
    BarelyPerceptible,
    Perceptible,
    WellPerceptible,
    Significant,
    VerySignificant,
}

/// Match quality implied by a difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRating {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

/// Classification of a Delta E value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptualClassification {
    pub level: PerceptualLevel,
    pub rating: MatchRating,
    /// 0 to 100
    pub confidence: u8,
    pub description: String,
}

/// Classify a Delta E value against fixed thresholds
///
/// Lower bounds are inclusive: exactly 1.0 is already barely perceptible.
/// NaN lands in the last tier.
pub fn perceptual_difference(delta_e: f64) -> PerceptualClassification {
    use MatchRating::*;
    use PerceptualLevel::*;

    let (level, rating, confidence, description) = if delta_e < 1.0 {
        (Imperceptible, Excellent, 100, "Difference is not perceptible to the human eye")
    } else if delta_e < 2.0 {
        (BarelyPerceptible, Excellent, 95, "Difference is perceptible only through close observation")
    } else if delta_e < 3.5 {
        (Perceptible, VeryGood, 85, "Difference is perceptible at a glance")
    } else if delta_e < 5.0 {
        (WellPerceptible, Good, 70, "Colors are noticeably different but still related")
    } else if delta_e < 10.0 {
        (Significant, Fair, 50, "Colors are clearly different")
    } else {
        (VerySignificant, Poor, 25, "Colors are very different")
    };

    PerceptualClassification {
        level,
        rating,
        confidence,
        description: description.to_owned(),
    }
}

/// Anything that can be located in LAB space
pub trait AsLab {
    fn as_lab(&self) -> Lab;
}

impl AsLab for Lab {
    #[inline]
    fn as_lab(&self) -> Lab {
        *self
    }
}

impl AsLab for Color {
    #[inline]
    fn as_lab(&self) -> Lab {
        self.lab()
    }
}

/// Whether `distance` should replace the current best
///
/// NaN ranks after every number whatever its sign bit, and equal
/// distances keep the earlier best.
#[inline]
pub(crate) fn is_closer(distance: f64, best: Option<(usize, f64)>) -> bool {
    match best {
        None => true,
        Some((_, best)) if best.is_nan() => !distance.is_nan(),
        Some((_, best)) => distance < best,
    }
}

/// Closest palette entry with its distance and position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosestColor<T> {
    #[serde(flatten)]
    pub entry: T,
    pub distance: f64,
    pub index: usize,
    pub perceptual: PerceptualClassification,
}

/// Linear scan for the palette entry closest to `target`
///
/// Ties keep the earliest entry and NaN distances lose to any number.
/// Returns `None` for an empty palette.
pub fn find_closest_color<T: AsLab + Clone>(
    target: Lab,
    palette: &[T],
    algorithm: DeltaEAlgorithm,
) -> Option<ClosestColor<T>> {
    let mut best: Option<(usize, f64)> = None;
    for (index, entry) in palette.iter().enumerate() {
        let distance = algorithm.distance(target, entry.as_lab());
        if is_closer(distance, best) {
            best = Some((index, distance));
        }
    }

    best.map(|(index, distance)| ClosestColor {
        entry: palette[index].clone(),
        distance,
        index,
        perceptual: perceptual_difference(distance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgb8, rgb_to_lab};

    const EPSILON: f64 = 1e-9;

    /// Sharma et al. (2005) test pairs with published CIEDE2000 values
    const SHARMA_PAIRS: &[([f64; 3], [f64; 3], f64)] = &[
        ([50.0, 2.6772, -79.7751], [50.0, 0.0, -82.7485], 2.0425),
        ([50.0, 3.1571, -77.2803], [50.0, 0.0, -82.7485], 2.8615),
        ([50.0, 2.8361, -74.0200], [50.0, 0.0, -82.7485], 3.4412),
        ([50.0, -1.3802, -84.2814], [50.0, 0.0, -82.7485], 1.0000),
        ([50.0, 0.0, 0.0], [50.0, -1.0, 2.0], 2.3669),
        ([50.0, 2.5, 0.0], [73.0, 25.0, -18.0], 27.1492),
        ([50.0, 2.5, 0.0], [50.0, 3.1736, 0.5854], 1.0000),
        ([60.2574, -34.0099, 36.2677], [60.4626, -34.1751, 39.4387], 1.2644),
        ([22.7233, 20.0904, -46.6940], [23.0331, 14.9730, -42.5619], 2.0373),
        ([90.8027, -2.0831, 1.4410], [91.1528, -1.6435, 0.0447], 1.4441),
        ([2.0776, 0.0795, -1.1350], [0.9033, -0.0636, -0.5514], 0.9082),
    ];

    #[test]
    fn test_ciede2000_reference_pairs() {
        for &(a, b, expected) in SHARMA_PAIRS {
            let de = ciede2000(Lab::from_array(a), Lab::from_array(b));
            assert!(
                (de - expected).abs() < 1e-4,
                "{a:?} vs {b:?}: got {de:.4}, expected {expected:.4}"
            );
        }
    }

    #[test]
    fn test_identity_all_algorithms() {
        let lab = Lab::new(50.0, 25.0, -30.0);
        for algorithm in [DeltaEAlgorithm::Cie76, DeltaEAlgorithm::Cie94, DeltaEAlgorithm::Ciede2000] {
            assert!(algorithm.distance(lab, lab).abs() < EPSILON, "{algorithm:?}");
        }
    }

    #[test]
    fn test_cie76_white_to_black() {
        let de = cie76(rgb_to_lab(Rgb8::WHITE), rgb_to_lab(Rgb8::BLACK));
        assert!((de - 100.0).abs() < 1.0, "white-black = {de}");
    }

    #[test]
    fn test_cie94_is_order_sensitive() {
        let saturated = Lab::new(50.0, 60.0, 40.0);
        let muted = Lab::new(55.0, 10.0, 5.0);
        let forward = cie94(saturated, muted, &Cie94Constants::GRAPHIC_ARTS);
        let backward = cie94(muted, saturated, &Cie94Constants::GRAPHIC_ARTS);
        assert!((forward - backward).abs() > 1.0, "{forward} vs {backward}");
    }

    #[test]
    fn test_cie94_lightness_only() {
        let a = Lab::new(40.0, 0.0, 0.0);
        let b = Lab::new(45.0, 0.0, 0.0);
        assert!((cie94(a, b, &Cie94Constants::GRAPHIC_ARTS) - 5.0).abs() < EPSILON);
        assert!((cie94(a, b, &Cie94Constants::TEXTILES) - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_ciede2000_symmetric() {
        let a = Lab::new(30.0, -40.0, 12.0);
        let b = Lab::new(35.0, 20.0, -60.0);
        assert!((ciede2000(a, b) - ciede2000(b, a)).abs() < EPSILON);
    }

    #[test]
    fn test_nan_propagates() {
        let a = Lab::new(f64::NAN, 0.0, 0.0);
        let b = Lab::new(50.0, 0.0, 0.0);
        assert!(cie76(a, b).is_nan());
        assert!(ciede2000(a, b).is_nan());
    }

    #[test]
    fn test_perceptual_boundaries() {
        let cases = [
            (0.0, PerceptualLevel::Imperceptible, 100),
            (0.99, PerceptualLevel::Imperceptible, 100),
            (1.0, PerceptualLevel::BarelyPerceptible, 95),
            (2.0, PerceptualLevel::Perceptible, 85),
            (3.5, PerceptualLevel::WellPerceptible, 70),
            (5.0, PerceptualLevel::Significant, 50),
            (10.0, PerceptualLevel::VerySignificant, 25),
            (250.0, PerceptualLevel::VerySignificant, 25),
        ];
        for (de, level, confidence) in cases {
            let class = perceptual_difference(de);
            assert_eq!(class.level, level, "deltaE {de}");
            assert_eq!(class.confidence, confidence, "deltaE {de}");
            assert!(!class.description.is_empty());
        }
        assert_eq!(perceptual_difference(2.5).rating, MatchRating::VeryGood);
    }

    #[test]
    fn test_find_closest_exact_member() {
        let palette: Vec<Lab> = [Rgb8::RED, Rgb8::GREEN, Rgb8::BLUE, Rgb8::WHITE]
            .into_iter()
            .map(rgb_to_lab)
            .collect();
        let found = find_closest_color(palette[2], &palette, DeltaEAlgorithm::Ciede2000).unwrap();
        assert_eq!(found.index, 2);
        assert_eq!(found.distance, 0.0);
        assert_eq!(found.perceptual.level, PerceptualLevel::Imperceptible);
    }

    #[test]
    fn test_find_closest_empty_palette() {
        let empty: [Lab; 0] = [];
        assert!(find_closest_color(Lab::default(), &empty, DeltaEAlgorithm::Cie76).is_none());
    }

    #[test]
    fn test_find_closest_skips_nan_entries() {
        let target = Lab::new(50.0, 0.0, 0.0);
        let finite = Lab::new(60.0, 0.0, 0.0);
        for nan in [f64::NAN, -f64::NAN] {
            let broken = Lab::new(nan, 0.0, 0.0);
            for algorithm in [DeltaEAlgorithm::Cie76, DeltaEAlgorithm::Cie94, DeltaEAlgorithm::Ciede2000] {
                let after = find_closest_color(target, &[finite, broken], algorithm).unwrap();
                assert_eq!(after.index, 0, "{algorithm:?}");
                let before = find_closest_color(target, &[broken, finite, broken], algorithm).unwrap();
                assert_eq!(before.index, 1, "{algorithm:?}");
                assert!(before.distance.is_finite());
            }
        }
    }

    #[test]
    fn test_is_closer_ordering() {
        assert!(is_closer(f64::NAN, None));
        assert!(is_closer(1.0, Some((0, f64::NAN))));
        assert!(is_closer(1.0, Some((0, -f64::NAN))));
        assert!(!is_closer(f64::NAN, Some((0, 5.0))));
        assert!(!is_closer(-f64::NAN, Some((0, 5.0))));
        assert!(!is_closer(f64::NAN, Some((0, f64::NAN))));
        assert!(!is_closer(5.0, Some((0, 5.0))));
        assert!(is_closer(4.0, Some((0, 5.0))));
    }

    #[test]
    fn test_find_closest_nearby() {
        let palette = vec![
            Color::parse("#000000").unwrap(),
            Color::parse("#FF0000").unwrap(),
            Color::parse("#FFFFFF").unwrap(),
        ];
        let target = rgb_to_lab(Rgb8::new(240, 10, 20));
        let found = find_closest_color(target, &palette, DeltaEAlgorithm::Cie76).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.entry.hex(), "#FF0000");
    }
}

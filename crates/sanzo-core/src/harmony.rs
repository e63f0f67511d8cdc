//! Color harmony
//!
//! Scoring a set of colors, generating palettes from a base color by
//! harmony rule, and improving a palette by local search.
//!
//! A harmony score combines three things:
//! - the relationship type inferred from hue layout (weight 0.5)
//! - consistency, from the spread of pairwise CIEDE2000 distances (0.3)
//! - contrast, from the average pairwise distance (0.2)

use serde::{Deserialize, Serialize};

use crate::color::{Color, Hsl, hsl_to_rgb, hue_separation, normalize_hue};
use crate::difference::ciede2000;
use crate::{Error, Result};

/// Relationship between the hues of a color set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonyType {
    Monochromatic,
    Analogous,
    Complementary,
    Triadic,
    Tetradic,
    Other,
}

impl HarmonyType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "monochromatic" => Some(Self::Monochromatic),
            "analogous" => Some(Self::Analogous),
            "complementary" => Some(Self::Complementary),
            "triadic" => Some(Self::Triadic),
            "tetradic" => Some(Self::Tetradic),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    fn base_score(self) -> f64 {
        match self {
            Self::Monochromatic => 90.0,
            Self::Complementary => 88.0,
            Self::Analogous => 85.0,
            Self::Triadic => 82.0,
            Self::Tetradic => 78.0,
            Self::Other => 55.0,
        }
    }
}

/// Harmony evaluation of a color set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonyScore {
    /// 0 to 100
    pub score: f64,
    #[serde(rename = "type")]
    pub kind: HarmonyType,
    /// Mean pairwise CIEDE2000 distance
    pub average_distance: f64,
    /// 0 to 100; 100 when all pairwise distances are equal
    pub consistency: f64,
    pub description: String,
}

/// Hues below this saturation are treated as neutral
const MIN_CHROMATIC_SATURATION: f64 = 10.0;

/// Hues closer than this belong to the same group
const HUE_GROUP_TOLERANCE: f64 = 30.0;

/// Score a set of colors
///
/// One color is a perfect monochromatic set. An empty set scores 0.
pub fn calculate_harmony_score(colors: &[Color]) -> HarmonyScore {
    match colors.len() {
        0 => {
            return finish(HarmonyType::Other, 0.0, 0.0, 0.0);
        }
        1 => {
            return finish(HarmonyType::Monochromatic, 100.0, 0.0, 100.0);
        }
        _ => {}
    }

    let mut distances = Vec::with_capacity(colors.len() * (colors.len() - 1) / 2);
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            distances.push(ciede2000(a.lab(), b.lab()));
        }
    }

    let n = distances.len() as f64;
    let mean = distances.iter().sum::<f64>() / n;
    let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    let cv = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };
    let consistency = (1.0 - cv).clamp(0.0, 1.0) * 100.0;

    let kind = infer_harmony_type(colors);
    let score = 0.5 * kind.base_score() + 0.3 * consistency + 0.2 * contrast_score(mean);

    finish(kind, score, mean, consistency)
}

fn finish(kind: HarmonyType, score: f64, average_distance: f64, consistency: f64) -> HarmonyScore {
    let score = round1(score.clamp(0.0, 100.0));
    HarmonyScore {
        score,
        kind,
        average_distance: round1(average_distance),
        consistency: round1(consistency),
        description: harmony_description(kind, score),
    }
}

#[inline]
fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// 100 inside the comfortable band, falling off for near-duplicates and
/// for sets that clash
fn contrast_score(average_distance: f64) -> f64 {
    if average_distance < 15.0 {
        average_distance / 15.0 * 100.0
    } else if average_distance <= 60.0 {
        100.0
    } else {
        (100.0 - (average_distance - 60.0) * 2.0).max(0.0)
    }
}

/// Infer the relationship type from the distribution of hues
pub fn infer_harmony_type(colors: &[Color]) -> HarmonyType {
    let mut hues: Vec<f64> = colors
        .iter()
        .map(Color::hsl)
        .filter(|hsl| hsl.s >= MIN_CHROMATIC_SATURATION && hsl.l > 5.0 && hsl.l < 95.0)
        .map(|hsl| hsl.h)
        .collect();

    if hues.len() <= 1 {
        return HarmonyType::Monochromatic;
    }

    hues.sort_by(f64::total_cmp);

    // Start just after the widest gap so no group straddles 0°
    let n = hues.len();
    let gap_after = |i: usize| -> f64 {
        let next = hues[(i + 1) % n];
        if i + 1 == n { next + 360.0 - hues[i] } else { next - hues[i] }
    };
    let widest = (0..n)
        .max_by(|&i, &j| gap_after(i).total_cmp(&gap_after(j)))
        .unwrap_or(0);
    let start = (widest + 1) % n;

    let mut unwrapped = Vec::with_capacity(n);
    for k in 0..n {
        let h = hues[(start + k) % n];
        let h = match unwrapped.last() {
            Some(&prev) if h < prev => h + 360.0,
            _ => h,
        };
        unwrapped.push(h);
    }

    let span = unwrapped[n - 1] - unwrapped[0];
    if span <= 15.0 {
        return HarmonyType::Monochromatic;
    }
    if span <= 60.0 {
        return HarmonyType::Analogous;
    }

    let mut centers = Vec::new();
    let mut group: Vec<f64> = vec![unwrapped[0]];
    for pair in unwrapped.windows(2) {
        if pair[1] - pair[0] > HUE_GROUP_TOLERANCE {
            centers.push(group.iter().sum::<f64>() / group.len() as f64);
            group.clear();
        }
        group.push(pair[1]);
    }
    centers.push(group.iter().sum::<f64>() / group.len() as f64);

    let gaps: Vec<f64> = (0..centers.len())
        .map(|i| {
            let next = centers[(i + 1) % centers.len()];
            hue_separation(normalize_hue(centers[i]), normalize_hue(next))
        })
        .collect();
    let all_near = |target: f64| gaps.iter().all(|g| (g - target).abs() <= HUE_GROUP_TOLERANCE);

    match centers.len() {
        1 => HarmonyType::Analogous,
        2 if gaps[0] >= 150.0 => HarmonyType::Complementary,
        3 if all_near(120.0) => HarmonyType::Triadic,
        4 if all_near(90.0) => HarmonyType::Tetradic,
        _ => HarmonyType::Other,
    }
}

fn quality(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent"
    } else if score >= 60.0 {
        "Good"
    } else if score >= 40.0 {
        "Fair"
    } else {
        "Poor"
    }
}

/// Fixed English description for a harmony type and score
pub fn harmony_description(kind: HarmonyType, score: f64) -> String {
    let quality = quality(score);
    match kind {
        HarmonyType::Monochromatic => {
            format!("{quality} monochromatic harmony built from variations of a single hue")
        }
        HarmonyType::Analogous => {
            format!("{quality} analogous harmony using neighboring hues for a cohesive feel")
        }
        HarmonyType::Complementary => {
            format!("{quality} complementary harmony pairing opposite hues for vibrant contrast")
        }
        HarmonyType::Triadic => {
            format!("{quality} triadic harmony with evenly spaced hues for balanced variety")
        }
        HarmonyType::Tetradic => {
            format!("{quality} tetradic harmony combining two complementary pairs")
        }
        HarmonyType::Other => generic_description(quality),
    }
}

/// Description lookup by type name; unknown names get the generic phrase
pub fn harmony_description_for(type_name: &str, score: f64) -> String {
    match HarmonyType::from_name(type_name) {
        Some(kind) => harmony_description(kind, score),
        None => generic_description(quality(score)),
    }
}

fn generic_description(quality: &str) -> String {
    format!("{quality} color combination with a custom relationship")
}

/// One generated palette color
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    #[serde(flatten)]
    pub color: Color,
    /// "base", "analogous", "complement", ...
    pub role: &'static str,
    /// Hue rotation applied to the base, in degrees
    pub hue_offset: f64,
}

/// Generated palette plus its harmony evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonicPalette {
    pub harmony_type: HarmonyType,
    pub colors: Vec<PaletteEntry>,
    pub harmony: HarmonyScore,
}

/// Default palette size for the open-ended rules
pub const DEFAULT_PALETTE_SIZE: usize = 5;

/// Largest `count` a palette request may ask for
pub const MAX_PALETTE_SIZE: usize = 64;

/// Build a palette from `base` by harmony rule
///
/// The base color is always element 0. `count` applies to the analogous
/// and monochromatic rules; the others have a fixed shape. A `count`
/// above [`MAX_PALETTE_SIZE`] is rejected.
pub fn generate_harmonic_palette(
    base: &Color,
    kind: HarmonyType,
    count: Option<usize>,
) -> Result<HarmonicPalette> {
    let count = count.unwrap_or(DEFAULT_PALETTE_SIZE).max(1);
    if count > MAX_PALETTE_SIZE {
        return Err(Error::InvalidRequest(format!(
            "palette size {count} exceeds {MAX_PALETTE_SIZE}"
        )));
    }
    let hsl = base.hsl();

    let mut colors = vec![PaletteEntry {
        color: base.clone(),
        role: "base",
        hue_offset: 0.0,
    }];
    let mut push = |role: &'static str, hue_offset: f64, derived: Hsl| {
        colors.push(PaletteEntry {
            color: Color::from_rgb(hsl_to_rgb(derived)),
            role,
            hue_offset,
        });
    };

    match kind {
        HarmonyType::Analogous => {
            for i in 1..count {
                let step = i.div_ceil(2);
                let sign = if i % 2 == 1 { 1.0 } else { -1.0 };
                let offset = sign * 30.0 * step as f64;
                let saturation = hsl.s * (1.0 - 0.1 * step as f64).max(0.0);
                push("analogous", offset, Hsl::new(hsl.h + offset, saturation, hsl.l));
            }
        }
        HarmonyType::Complementary => {
            push("complement", 180.0, hsl.rotate(180.0));
            push("split_complement", 150.0, hsl.rotate(150.0));
            push("split_complement", 210.0, hsl.rotate(210.0));
        }
        HarmonyType::Triadic => {
            push("triad", 120.0, hsl.rotate(120.0));
            push("triad", 240.0, hsl.rotate(240.0));
        }
        HarmonyType::Tetradic => {
            push("tetrad", 90.0, hsl.rotate(90.0));
            push("tetrad", 180.0, hsl.rotate(180.0));
            push("tetrad", 270.0, hsl.rotate(270.0));
        }
        HarmonyType::Monochromatic => {
            for i in 1..count {
                let step = i.div_ceil(2);
                let sign = if i % 2 == 1 { 1.0 } else { -1.0 };
                let lightness = (hsl.l + sign * 15.0 * step as f64).clamp(5.0, 95.0);
                push("shade", 0.0, Hsl::new(hsl.h, hsl.s, lightness));
            }
        }
        HarmonyType::Other => {
            return Err(Error::InvalidRequest(
                "no palette rule for harmony type 'other'".into(),
            ));
        }
    }

    let plain: Vec<Color> = colors.iter().map(|entry| entry.color.clone()).collect();
    Ok(HarmonicPalette {
        harmony_type: kind,
        harmony: calculate_harmony_score(&plain),
        colors,
    })
}

/// Local search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizeOptions {
    pub max_iterations: usize,
    pub target_harmony_score: f64,
    pub hue_step: f64,
    pub saturation_step: f64,
    pub lightness_step: f64,
    /// Indices of colors that must not change
    pub locked: Vec<usize>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            target_harmony_score: 90.0,
            hue_step: 10.0,
            saturation_step: 5.0,
            lightness_step: 5.0,
            locked: Vec::new(),
        }
    }
}

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetReached,
    /// No single move improved the score
    Converged,
    MaxIterations,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub iteration: usize,
    pub score: f64,
}

/// Outcome of [`optimize_palette`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedPalette {
    pub original: Vec<Color>,
    pub optimized: Vec<Color>,
    pub initial_score: f64,
    pub final_score: f64,
    pub harmony: HarmonyScore,
    pub iterations: usize,
    pub improvements: usize,
    pub stop_reason: StopReason,
    /// Score at iteration 0 and every 10th iteration
    pub history: Vec<HistorySample>,
}

/// Hill-climb toward a better harmony score
///
/// Each iteration tries ±hue, ±saturation and ±lightness on every unlocked
/// color and applies the single best move, and only if it strictly improves
/// the score. The tracked score therefore never decreases.
pub fn optimize_palette(colors: &[Color], options: &OptimizeOptions) -> OptimizedPalette {
    let moves = [
        (options.hue_step, 0.0, 0.0),
        (-options.hue_step, 0.0, 0.0),
        (0.0, options.saturation_step, 0.0),
        (0.0, -options.saturation_step, 0.0),
        (0.0, 0.0, options.lightness_step),
        (0.0, 0.0, -options.lightness_step),
    ];

    let mut current = colors.to_vec();
    let initial_score = calculate_harmony_score(&current).score;
    let mut score = initial_score;
    let mut history = vec![HistorySample { iteration: 0, score }];
    let mut iterations = 0;
    let mut improvements = 0;
    let mut stop_reason = StopReason::MaxIterations;

    for iteration in 1..=options.max_iterations {
        if score >= options.target_harmony_score {
            stop_reason = StopReason::TargetReached;
            break;
        }

        let mut best: Option<(usize, Color, f64)> = None;
        for index in (0..current.len()).filter(|i| !options.locked.contains(i)) {
            let hsl = current[index].hsl();
            for &(dh, ds, dl) in &moves {
                let candidate = Color::from_rgb(hsl_to_rgb(Hsl::new(hsl.h + dh, hsl.s + ds, hsl.l + dl)));
                if candidate.rgb() == current[index].rgb() {
                    continue;
                }

                let mut trial = current.clone();
                trial[index] = candidate.clone();
                let trial_score = calculate_harmony_score(&trial).score;
                let best_so_far = best.as_ref().map_or(score, |(_, _, s)| *s);
                if trial_score > best_so_far {
                    best = Some((index, candidate, trial_score));
                }
            }
        }

        let Some((index, candidate, new_score)) = best else {
            stop_reason = StopReason::Converged;
            break;
        };
        current[index] = candidate;
        score = new_score;
        improvements += 1;
        iterations = iteration;

        if iteration % 10 == 0 {
            history.push(HistorySample { iteration, score });
        }
    }

    if score >= options.target_harmony_score {
        stop_reason = StopReason::TargetReached;
    }

    let harmony = calculate_harmony_score(&current);
    OptimizedPalette {
        original: colors.to_vec(),
        optimized: current,
        initial_score,
        final_score: harmony.score,
        harmony,
        iterations,
        improvements,
        stop_reason,
        history,
    }
}

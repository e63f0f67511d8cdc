//! Reference color catalog checks
//!
//! A catalog is a list of named reference colors plus curated combinations
//! of them. Validation reports every problem found rather than stopping at
//! the first; fields the checks do not use are ignored on load.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Result;
use crate::color::{Lab, hex_to_lab};
use crate::difference::ciede2000;

/// Stored LAB further than this from the hex-derived LAB is inconsistent
pub const LAB_TOLERANCE: f64 = 2.0;

/// Channel values as stored, which may be out of range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRgb {
    pub r: i64,
    pub g: i64,
    pub b: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogColor {
    pub id: String,
    #[serde(default)]
    pub name_english: Option<String>,
    pub hex: String,
    pub rgb: StoredRgb,
    #[serde(default)]
    pub lab: Option<Lab>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaEScore {
    pub colors: Vec<String>,
    pub delta_e: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub color_ids: Vec<String>,
    #[serde(default)]
    pub harmony_type: Option<String>,
    #[serde(default)]
    pub delta_e_scores: Vec<DeltaEScore>,
    /// 0 to 10
    pub overall_harmony_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub colors: Vec<CatalogColor>,
    #[serde(default)]
    pub combinations: Vec<Combination>,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogIssue {
    #[error("Duplicate color ID: {0}")]
    DuplicateColorId(String),

    #[error("Color {id}: invalid hex format: {hex}")]
    InvalidHex { id: String, hex: String },

    #[error("Color {id}: RGB {channel} value out of range: {value}")]
    RgbOutOfRange { id: String, channel: char, value: i64 },

    #[error("Color {id}: stored LAB is {delta_e:.2} from the LAB of its hex")]
    LabMismatch { id: String, delta_e: f64 },

    #[error("Duplicate combination ID: {0}")]
    DuplicateCombinationId(String),

    #[error("Combination {combination}: references unknown color ID: {color}")]
    UnknownColor { combination: String, color: String },

    #[error("Combination {id}: harmony score out of range (0-10): {score}")]
    ScoreOutOfRange { id: String, score: f64 },

    #[error("Combination {id}: delta E score must compare exactly 2 colors, got {count}")]
    DeltaEArity { id: String, count: usize },
}

/// Counts per category and per harmony type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatistics {
    pub total_colors: usize,
    pub categories: BTreeMap<String, usize>,
    pub total_combinations: usize,
    pub harmony_types: BTreeMap<String, usize>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every problem found, in catalog order; empty when the catalog is clean
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        let mut color_ids = HashSet::new();
        for color in &self.colors {
            if !color_ids.insert(color.id.as_str()) {
                issues.push(CatalogIssue::DuplicateColorId(color.id.clone()));
            }
            check_color(color, &mut issues);
        }

        let mut combination_ids = HashSet::new();
        for combination in &self.combinations {
            let id = &combination.id;
            if !combination_ids.insert(id.as_str()) {
                issues.push(CatalogIssue::DuplicateCombinationId(id.clone()));
            }
            for color in &combination.color_ids {
                if !color_ids.contains(color.as_str()) {
                    issues.push(CatalogIssue::UnknownColor {
                        combination: id.clone(),
                        color: color.clone(),
                    });
                }
            }
            let score = combination.overall_harmony_score;
            if !(0.0..=10.0).contains(&score) {
                issues.push(CatalogIssue::ScoreOutOfRange { id: id.clone(), score });
            }
            for entry in &combination.delta_e_scores {
                if entry.colors.len() != 2 {
                    issues.push(CatalogIssue::DeltaEArity {
                        id: id.clone(),
                        count: entry.colors.len(),
                    });
                }
            }
        }

        issues
    }

    pub fn statistics(&self) -> CatalogStatistics {
        let mut stats = CatalogStatistics {
            total_colors: self.colors.len(),
            total_combinations: self.combinations.len(),
            ..Default::default()
        };
        for color in &self.colors {
            let category = color.category.clone().unwrap_or_else(|| "unknown".into());
            *stats.categories.entry(category).or_default() += 1;
        }
        for combination in &self.combinations {
            let kind = combination.harmony_type.clone().unwrap_or_else(|| "unknown".into());
            *stats.harmony_types.entry(kind).or_default() += 1;
        }
        stats
    }
}

fn check_color(color: &CatalogColor, issues: &mut Vec<CatalogIssue>) {
    let id = &color.id;
    let derived = if color.hex.starts_with('#') {
        hex_to_lab(&color.hex)
    } else {
        None
    };
    if derived.is_none() {
        issues.push(CatalogIssue::InvalidHex {
            id: id.clone(),
            hex: color.hex.clone(),
        });
    }

    for (channel, value) in [('r', color.rgb.r), ('g', color.rgb.g), ('b', color.rgb.b)] {
        if !(0..=255).contains(&value) {
            issues.push(CatalogIssue::RgbOutOfRange {
                id: id.clone(),
                channel,
                value,
            });
        }
    }

    if let (Some(stored), Some(derived)) = (color.lab, derived) {
        let delta_e = ciede2000(stored, derived);
        if delta_e > LAB_TOLERANCE || delta_e.is_nan() {
            issues.push(CatalogIssue::LabMismatch { id: id.clone(), delta_e });
        }
    }
}

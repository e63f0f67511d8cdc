//! Warm/cool classification from the red-blue balance

use serde::{Deserialize, Serialize};

use crate::color::Rgb8;

/// Temperature class of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureKind {
    Warm,
    Cool,
    Neutral,
}

impl TemperatureKind {
    /// Fixed description for the class
    pub fn description(&self) -> &'static str {
        match self {
            Self::Warm => "Warm color that creates energy and intimacy",
            Self::Cool => "Cool color that promotes calm and spaciousness",
            Self::Neutral => "Balanced neutral color that adapts to surrounding tones",
        }
    }
}

/// Temperature of a color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperature {
    #[serde(rename = "type")]
    pub kind: TemperatureKind,
    /// Red-minus-blue balance, -100 to 100
    pub warmth: i32,
    pub description: String,
}

/// Classify a color as warm, cool or neutral
///
/// warmth = round((R - B) / 255 * 100); warm above 20, cool below -20.
pub fn color_temperature(rgb: Rgb8) -> Temperature {
    let warmth = ((rgb.r as f64 - rgb.b as f64) / 255.0 * 100.0).round() as i32;
    let kind = if warmth > 20 {
        TemperatureKind::Warm
    } else if warmth < -20 {
        TemperatureKind::Cool
    } else {
        TemperatureKind::Neutral
    };

    Temperature {
        kind,
        warmth,
        description: kind.description().to_owned(),
    }
}

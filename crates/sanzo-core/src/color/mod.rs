//! Color space types and conversions
//!
//! This module provides:
//! - 8-bit sRGB and hex notation
//! - CIE XYZ and CIELAB (D65)
//! - HSL
//! - Warm/cool temperature classification
//! - The single validation gate, [`validate_and_normalize`], which turns
//!   any accepted [`ColorInput`] into a fully enriched [`Color`]

pub mod hsl;
pub mod lab;
pub mod names;
pub mod rgb;
pub mod temperature;
pub mod white_point;
pub mod xyz;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use hsl::{Hsl, hsl_to_rgb, hue_separation, normalize_hue, rgb_to_hsl};
pub use lab::{Lab, hex_to_lab, lab_to_rgb, lab_to_xyz, rgb_to_lab, xyz_to_lab};
pub use rgb::{Rgb8, hex_to_rgb, rgb_to_hex};
pub use temperature::{Temperature, TemperatureKind, color_temperature};
pub use white_point::{D65, WhitePoint};
pub use xyz::{Xyz, rgb_to_xyz, xyz_to_rgb};

/// A validated color with every representation derived from one RGB source
///
/// Only [`validate_and_normalize`] and [`Color::from_rgb`] construct these,
/// so the fields are always mutually consistent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Color {
    hex: String,
    rgb: Rgb8,
    lab: Lab,
    hsl: Hsl,
    temperature: Temperature,
}

impl Color {
    /// Derive every representation from an RGB triple
    pub fn from_rgb(rgb: Rgb8) -> Self {
        Self {
            hex: rgb.to_hex(),
            rgb,
            lab: rgb_to_lab(rgb),
            hsl: rgb_to_hsl(rgb),
            temperature: color_temperature(rgb),
        }
    }

    /// Shorthand for validating a string input
    pub fn parse(input: &str) -> Option<Self> {
        validate_and_normalize(&ColorInput::parse(input))
    }

    /// Canonical `#RRGGBB`
    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn rgb(&self) -> Rgb8 {
        self.rgb
    }

    pub fn lab(&self) -> Lab {
        self.lab
    }

    pub fn hsl(&self) -> Hsl {
        self.hsl
    }

    pub fn temperature(&self) -> &Temperature {
        &self.temperature
    }
}

/// Any color representation accepted at the validation boundary
///
/// RGB components are held as `i64` so out-of-range values survive parsing
/// and are rejected by validation rather than silently truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorInput {
    /// 6 hex digits, `#` optional
    Hex(String),
    /// Three channel values, expected in [0, 255]
    Rgb([i64; 3]),
    /// A known color name
    Name(String),
}

impl ColorInput {
    /// Classify a string as hex-shaped or a name
    pub fn parse(input: &str) -> Self {
        let digits = input.strip_prefix('#').unwrap_or(input);
        let hex_shaped = input.starts_with('#')
            || (digits.len() == 6 && digits.bytes().all(|c| c.is_ascii_hexdigit()));
        if hex_shaped {
            Self::Hex(input.to_owned())
        } else {
            Self::Name(input.to_owned())
        }
    }

    /// Interpret a JSON value as a color input
    ///
    /// Strings, `{"r","g","b"}` objects and three-element arrays are
    /// recognized; channel values must be JSON integers. Anything else
    /// (floats, extra or missing channels, booleans, null) yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::parse(s)),
            Value::Array(items) if items.len() == 3 => {
                let mut channels = [0i64; 3];
                for (slot, item) in channels.iter_mut().zip(items) {
                    *slot = item.as_i64()?;
                }
                Some(Self::Rgb(channels))
            }
            Value::Object(map) => {
                let channel = |key: &str| map.get(key).and_then(Value::as_i64);
                Some(Self::Rgb([channel("r")?, channel("g")?, channel("b")?]))
            }
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ColorInput {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("not a color input: {value}")))
    }
}

impl From<&str> for ColorInput {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl From<Rgb8> for ColorInput {
    fn from(rgb: Rgb8) -> Self {
        Self::Rgb([rgb.r as i64, rgb.g as i64, rgb.b as i64])
    }
}

/// The single validation gate
///
/// Returns the enriched [`Color`] or `None` for malformed, out-of-range,
/// wrong-typed or unrecognized input.
pub fn validate_and_normalize(input: &ColorInput) -> Option<Color> {
    let rgb = match input {
        ColorInput::Hex(hex) => hex_to_rgb(hex)?,
        ColorInput::Rgb(channels) => {
            let mut out = [0u8; 3];
            for (slot, &c) in out.iter_mut().zip(channels) {
                *slot = u8::try_from(c).ok()?;
            }
            Rgb8::from_array(out)
        }
        ColorInput::Name(name) => names::lookup(name).and_then(hex_to_rgb)?,
    };
    Some(Color::from_rgb(rgb))
}

/// Validate a raw JSON value, see [`ColorInput::from_value`]
pub fn validate_value(value: &Value) -> Option<Color> {
    ColorInput::from_value(value).and_then(|input| validate_and_normalize(&input))
}

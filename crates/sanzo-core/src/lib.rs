//! # sanzo-core - Color science engine
//!
//! Perceptual color math for palette recommendation: conversions between
//! sRGB, XYZ, LAB and HSL, Delta E distances, nearest-color search, harmony
//! scoring and palette generation, plus a background worker for bulk jobs.
//!
//! ## Components
//!
//! - [`color`]: value types, conversions and the validation gate
//! - [`difference`]: CIE76, CIE94 and CIEDE2000, perceptual classification
//! - [`harmony`]: harmony scores, harmonic palettes, palette optimization
//! - [`index`]: k-d tree for k-nearest queries in LAB
//! - [`bridge`]: accelerated (SIMD) and portable math behind one interface
//! - [`worker`]: task envelopes, the compute engine and the batch worker
//! - [`samples`] and [`catalog`]: dominant colors and reference data checks
//!
//! ## Quick Start
//!
//! ```
//! use sanzo_core::{Color, DeltaEAlgorithm, find_closest_color};
//!
//! let target = Color::parse("#E2725B").unwrap();
//! let palette: Vec<Color> = ["#FF7F50", "#4682B4", "#9CAF88"]
//!     .iter()
//!     .filter_map(|hex| Color::parse(hex))
//!     .collect();
//!
//! let closest = find_closest_color(target.lab(), &palette, DeltaEAlgorithm::Ciede2000).unwrap();
//! assert_eq!(closest.index, 0);
//! ```
//!
//! Logging goes through the `log` facade; install any logger to see bridge
//! state changes and fallbacks.

pub mod bridge;
pub mod catalog;
pub mod color;
pub mod config;
pub mod difference;
pub mod error;
pub mod harmony;
pub mod index;
pub mod samples;
pub mod simd;
pub mod worker;

pub use bridge::{BridgeMetrics, BridgeState, MathBackend, MathBridge};
pub use catalog::{Catalog, CatalogIssue, CatalogStatistics};
pub use color::{
    Color, ColorInput, Hsl, Lab, Rgb8, Temperature, TemperatureKind, Xyz, color_temperature, hex_to_lab,
    hex_to_rgb, hsl_to_rgb, lab_to_rgb, rgb_to_hex, rgb_to_hsl, rgb_to_lab, rgb_to_xyz,
    validate_and_normalize, validate_value, xyz_to_lab,
};
pub use config::{AcceleratedConfig, EngineConfig};
pub use difference::{
    Cie94Constants, ClosestColor, DeltaEAlgorithm, PerceptualClassification, cie76, cie94, ciede2000,
    find_closest_color, perceptual_difference,
};
pub use error::{Error, Result};
pub use harmony::{
    HarmonyScore, HarmonyType, calculate_harmony_score, generate_harmonic_palette, harmony_description,
    optimize_palette,
};
pub use index::SpatialIndex;
pub use samples::{DominantColor, summarize_samples};
pub use worker::{BatchWorker, ComputeEngine, ComputeResult, ComputeTask, Operation, WorkerEvent};

/// Version of sanzo-core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # sanzo-tests
//!
//! Cross-checks and scenario tests for sanzo-core.
//!
//! This crate provides:
//! - Reference conversions and CIEDE2000 from the `palette` crate
//! - Accuracy statistics over many color pairs
//! - Deterministic test color generation (seeded ChaCha8)
//! - Fixtures for worker requests and reference catalogs
//!
//! ## Test Categories
//!
//! 1. **Palette parity**: sRGB → LAB and CIEDE2000 against `palette`
//! 2. **Distance properties**: symmetry, identity, triangle inequality
//! 3. **Worker scenarios**: batch conversion, progress, request errors
//! 4. **Bridge fallback**: accelerated path disabled or undersized
//! 5. **Catalog validation**: reference data consistency

pub mod accuracy;
pub mod fixtures;
pub mod patterns;
pub mod reference;

pub use accuracy::{DeltaEStats, compare_labs};
pub use patterns::{SamplePattern, generate_samples, random_hex, random_labs};

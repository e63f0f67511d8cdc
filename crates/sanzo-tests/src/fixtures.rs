//! Request and catalog fixtures

use anyhow::{Context, Result};
use sanzo_core::{Catalog, ComputeResult};
use serde_json::{Value, json};

/// A small clean reference catalog
pub const SAMPLE_CATALOG: &str = r##"{
    "metadata": {"source": "fixture"},
    "colors": [
        {"id": "hermosa-pink", "name_english": "Hermosa Pink", "hex": "#F9C4D2",
         "rgb": {"r": 249, "g": 196, "b": 210}, "category": "red",
         "lab": {"l": 84.11, "a": 20.97, "b": 0.27}},
        {"id": "corinthian-pink", "name_english": "Corinthian Pink", "hex": "#FFA6D9",
         "rgb": {"r": 255, "g": 166, "b": 217}, "category": "red"},
        {"id": "cameo-pink", "name_english": "Cameo Pink", "hex": "#E7A0B8",
         "rgb": {"r": 231, "g": 160, "b": 184}, "category": "red"},
        {"id": "olympic-blue", "name_english": "Olympic Blue", "hex": "#4F8FE6",
         "rgb": {"r": 79, "g": 143, "b": 230}, "category": "blue"},
        {"id": "sulphur-yellow", "name_english": "Sulphur Yellow", "hex": "#F5F570",
         "rgb": {"r": 245, "g": 245, "b": 112}, "category": "yellow"}
    ],
    "combinations": [
        {"id": "c-001", "name": "Soft Blush", "color_ids": ["hermosa-pink", "cameo-pink"],
         "harmony_type": "analogous", "overall_harmony_score": 8.2,
         "delta_e_scores": [{"colors": ["hermosa-pink", "cameo-pink"], "delta_e": 12.4}]},
        {"id": "c-002", "name": "Sky Lemon", "color_ids": ["olympic-blue", "sulphur-yellow"],
         "harmony_type": "complementary", "overall_harmony_score": 7.5,
         "delta_e_scores": [{"colors": ["olympic-blue", "sulphur-yellow"], "delta_e": 58.0}]}
    ]
}"##;

/// Parse [`SAMPLE_CATALOG`]
pub fn sample_catalog() -> Result<Catalog> {
    Catalog::from_json(SAMPLE_CATALOG).context("sample catalog should parse")
}

/// Hex colors with every `stride`-th entry replaced by a malformed one
pub fn hex_batch_with_errors(count: usize, stride: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            if stride > 0 && i % stride == stride - 1 {
                json!(format!("#ZZ{i:04}"))
            } else {
                let v = (i as u64 * 2_654_435_761) % 0x100_0000;
                json!(format!("#{v:06X}"))
            }
        })
        .collect()
}

/// Build a JSON request string
pub fn request(id: &str, operation: &str, data: Value, options: Value) -> String {
    json!({
        "id": id,
        "operation": operation,
        "data": data,
        "options": options,
    })
    .to_string()
}

/// The `result` body of a successful response
pub fn body(result: &ComputeResult) -> Result<&Value> {
    anyhow::ensure!(result.success, "task {} failed: {:?}", result.id, result.error);
    result.result.as_ref().context("successful result has no body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog_clean() {
        let catalog = sample_catalog().unwrap();
        assert!(catalog.validate().is_empty(), "{:?}", catalog.validate());
    }

    #[test]
    fn test_batch_error_positions() {
        let batch = hex_batch_with_errors(200, 100);
        let bad: Vec<usize> = batch
            .iter()
            .enumerate()
            .filter(|(_, v)| v.as_str().is_some_and(|s| s.starts_with("#ZZ")))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(bad, vec![99, 199]);
    }
}

//! Request and response envelopes
//!
//! Requests arrive as JSON objects of the form
//! `{"id": "...", "operation": "<name>", "data": {...}, "options": {...}}`.
//! Color items inside `data` stay as raw JSON values until the engine
//! resolves them one by one, so a bad item never fails a whole request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::difference::DeltaEAlgorithm;
use crate::harmony::OptimizeOptions;
use crate::{Error, Result};

/// One unit of work for the engine
#[derive(Debug, Clone, Deserialize)]
pub struct ComputeTask {
    /// Caller-chosen correlation id, echoed back on the result
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(flatten)]
    pub operation: Operation,
}

impl ComputeTask {
    pub fn new(id: impl Into<String>, operation: Operation) -> Self {
        Self {
            id: id.into(),
            operation,
        }
    }

    /// Decode a JSON request
    ///
    /// Distinguishes an unknown operation and a missing `operation` field
    /// from other shape errors.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Some(object) = value.as_object() else {
            return Err(Error::InvalidRequest("request is not a JSON object".into()));
        };
        let name = match object.get("operation") {
            Some(Value::String(name)) => name,
            Some(other) => return Err(Error::InvalidRequest(format!("operation must be a string, got {other}"))),
            None => return Err(Error::MissingField("operation")),
        };
        if !Operation::NAMES.contains(&name.as_str()) {
            return Err(Error::UnknownOperation(name.clone()));
        }
        if !object.contains_key("id") {
            return Err(Error::MissingField("id"));
        }
        serde_json::from_value(value).map_err(|err| Error::InvalidRequest(err.to_string()))
    }
}

/// Best-effort `(id, operation)` from a request that failed to decode
pub fn recover_envelope(json: &str) -> (String, String) {
    let Ok(value) = serde_json::from_str::<Value>(json) else {
        return (String::new(), String::new());
    };
    let id = match value.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let operation = value
        .get("operation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    (id, operation)
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("id must be a string or number, got {other}"))),
    }
}

/// Operations the engine provides, with their payloads
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum Operation {
    BatchConvertColors {
        data: ColorList,
        #[serde(default)]
        options: BatchConvertOptions,
    },
    CalculateColorDistances {
        data: ColorList,
        #[serde(default)]
        options: DistanceOptions,
    },
    FindNearestColors {
        data: NearestData,
        #[serde(default)]
        options: NearestOptions,
    },
    GenerateHarmonicPalette {
        data: PaletteData,
        #[serde(default)]
        options: PaletteOptions,
    },
    CalculateHarmonyScores {
        data: CombinationList,
    },
    OptimizeColorPalette {
        data: ColorList,
        #[serde(default)]
        options: OptimizeOptions,
    },
    BuildColorIndex {
        data: ColorList,
        #[serde(default)]
        options: IndexOptions,
    },
    GetWorkerMetrics {},
    ExtractDominantColors {
        data: SampleData,
        #[serde(default)]
        options: DominantOptions,
    },
}

impl Operation {
    /// Wire names of every operation
    pub const NAMES: &'static [&'static str] = &[
        "batchConvertColors",
        "calculateColorDistances",
        "findNearestColors",
        "generateHarmonicPalette",
        "calculateHarmonyScores",
        "optimizeColorPalette",
        "buildColorIndex",
        "getWorkerMetrics",
        "extractDominantColors",
    ];

    /// Wire name of this operation
    pub fn name(&self) -> &'static str {
        match self {
            Self::BatchConvertColors { .. } => "batchConvertColors",
            Self::CalculateColorDistances { .. } => "calculateColorDistances",
            Self::FindNearestColors { .. } => "findNearestColors",
            Self::GenerateHarmonicPalette { .. } => "generateHarmonicPalette",
            Self::CalculateHarmonyScores { .. } => "calculateHarmonyScores",
            Self::OptimizeColorPalette { .. } => "optimizeColorPalette",
            Self::BuildColorIndex { .. } => "buildColorIndex",
            Self::GetWorkerMetrics {} => "getWorkerMetrics",
            Self::ExtractDominantColors { .. } => "extractDominantColors",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorList {
    pub colors: Vec<Value>,
}

impl ColorList {
    pub fn new(colors: Vec<Value>) -> Self {
        Self { colors }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchConvertOptions {
    /// Overrides the engine's chunk size for this batch
    pub chunk_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DistanceOptions {
    pub algorithm: Option<DeltaEAlgorithm>,
    /// Compute the upper triangle and mirror it
    pub symmetric: bool,
    pub include_matrix: bool,
    /// Report this many closest pairs
    pub top_k: Option<usize>,
}

impl Default for DistanceOptions {
    fn default() -> Self {
        Self {
            algorithm: None,
            symmetric: true,
            include_matrix: false,
            top_k: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NearestData {
    pub targets: Vec<Value>,
    /// Required unless `indexName` names a retained index
    #[serde(default)]
    pub candidates: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NearestOptions {
    pub k: usize,
    pub algorithm: Option<DeltaEAlgorithm>,
    /// Search an index retained by `buildColorIndex` instead of `candidates`
    pub index_name: Option<String>,
}

impl Default for NearestOptions {
    fn default() -> Self {
        Self {
            k: 5,
            algorithm: None,
            index_name: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteData {
    pub base_color: Value,
    pub harmony_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaletteOptions {
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinationList {
    /// Each entry is an array of colors or `{"id": ..., "colors": [...]}`
    pub combinations: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Name the index is retained under
    pub name: String,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            name: "default".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleData {
    pub samples: Vec<[u8; 3]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DominantOptions {
    pub max_colors: usize,
    pub merge_threshold: f64,
}

impl Default for DominantOptions {
    fn default() -> Self {
        Self {
            max_colors: 5,
            merge_threshold: crate::samples::DEFAULT_MERGE_THRESHOLD,
        }
    }
}

/// Timing attached to every result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetrics {
    /// Milliseconds
    pub processing_time: f64,
    pub operation: String,
}

/// Response to one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResult {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metrics: TaskMetrics,
}

impl ComputeResult {
    pub fn ok(id: String, result: Value, metrics: TaskMetrics) -> Self {
        Self {
            id,
            success: true,
            result: Some(result),
            error: None,
            metrics,
        }
    }

    pub fn failed(id: String, error: &Error, metrics: TaskMetrics) -> Self {
        Self {
            id,
            success: false,
            result: None,
            error: Some(error.to_string()),
            metrics,
        }
    }
}

/// Unsolicited progress report for a long batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub operation: String,
    pub completed: usize,
    pub total: usize,
    /// Rounded to a whole percent
    pub percentage: u32,
}

impl Progress {
    pub fn new(operation: &str, completed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            operation: operation.to_owned(),
            completed,
            total,
            percentage,
        }
    }
}

/// Everything a worker sends back for a task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerEvent {
    Progress(Progress),
    Completed(ComputeResult),
}

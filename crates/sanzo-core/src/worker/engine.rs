//! Synchronous task execution
//!
//! [`ComputeEngine`] runs one [`ComputeTask`] at a time on the calling
//! thread. [`super::BatchWorker`] puts it behind a channel; it is also
//! usable directly.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Value, json};

use super::task::{
    ComputeResult, ComputeTask, DistanceOptions, NearestData, NearestOptions, Operation, Progress,
    TaskMetrics, recover_envelope,
};
use crate::bridge::{BridgeMetrics, MathBridge};
use crate::color::{Color, Lab, validate_value};
use crate::config::EngineConfig;
use crate::difference::{PerceptualClassification, perceptual_difference};
use crate::harmony::{
    HarmonyScore, HarmonyType, calculate_harmony_score, generate_harmonic_palette, optimize_palette,
};
use crate::index::SpatialIndex;
use crate::samples::summarize_samples;
use crate::{Error, Result};

/// Per-item failure inside a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub original_index: usize,
    pub error: String,
    pub original_color: Value,
}

impl ItemError {
    fn invalid(original_index: usize, value: &Value) -> Self {
        Self {
            original_index,
            error: format!("Invalid color format: {value}"),
            original_color: value.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertedColor {
    original_index: usize,
    #[serde(flatten)]
    color: Color,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PairDistance {
    from: usize,
    to: usize,
    colors: [String; 2],
    distance: f64,
    perceptual: PerceptualClassification,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NearestMatch {
    index: usize,
    distance: f64,
    color: Color,
    perceptual: PerceptualClassification,
}

/// A `buildColorIndex` result kept for later `findNearestColors` calls
#[derive(Debug, Clone)]
struct RetainedIndex {
    index: SpatialIndex,
    colors: Vec<Color>,
}

/// Cumulative engine activity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerMetrics {
    pub tasks_processed: u64,
    pub tasks_failed: u64,
    /// Milliseconds
    pub total_processing_time: f64,
    pub average_processing_time: f64,
    /// Task count per operation name
    pub operations: BTreeMap<String, u64>,
    pub retained_indexes: Vec<String>,
    pub bridge: BridgeMetrics,
}

/// Executes tasks against a shared [`MathBridge`]
#[derive(Debug)]
pub struct ComputeEngine {
    config: EngineConfig,
    bridge: Arc<MathBridge>,
    indexes: HashMap<String, RetainedIndex>,
    tasks_processed: u64,
    tasks_failed: u64,
    total_processing_ms: f64,
    operations: BTreeMap<String, u64>,
}

impl ComputeEngine {
    /// Engine with its own bridge, configured from `config.accelerated`
    pub fn new(config: EngineConfig) -> Self {
        let bridge = Arc::new(MathBridge::new(config.accelerated.clone()));
        Self::with_bridge(config, bridge)
    }

    pub fn with_bridge(config: EngineConfig, bridge: Arc<MathBridge>) -> Self {
        Self {
            config,
            bridge,
            indexes: HashMap::new(),
            tasks_processed: 0,
            tasks_failed: 0,
            total_processing_ms: 0.0,
            operations: BTreeMap::new(),
        }
    }

    pub fn bridge(&self) -> &Arc<MathBridge> {
        &self.bridge
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a task; progress reports go to `progress`
    pub fn process(&mut self, task: ComputeTask, progress: &mut dyn FnMut(Progress)) -> ComputeResult {
        let start = Instant::now();
        let operation = task.operation.name();
        log::debug!("Task {} started: {operation}", task.id);

        let outcome = self.execute(&task.operation, progress);
        let metrics = self.finish(operation, start, outcome.is_ok());
        match outcome {
            Ok(result) => ComputeResult::ok(task.id, result, metrics),
            Err(err) => {
                log::debug!("Task {} failed: {err}", task.id);
                ComputeResult::failed(task.id, &err, metrics)
            }
        }
    }

    /// Decode and run a JSON request
    ///
    /// A request that does not decode produces a failed result carrying
    /// whatever id could be recovered.
    pub fn process_json(&mut self, json: &str, progress: &mut dyn FnMut(Progress)) -> ComputeResult {
        match ComputeTask::from_json(json) {
            Ok(task) => self.process(task, progress),
            Err(err) => {
                let (id, operation) = recover_envelope(json);
                log::debug!("Rejected request {id:?}: {err}");
                let metrics = self.finish_rejected(&operation);
                ComputeResult::failed(id, &err, metrics)
            }
        }
    }

    fn finish(&mut self, operation: &str, start: Instant, success: bool) -> TaskMetrics {
        let processing_time = start.elapsed().as_secs_f64() * 1000.0;
        self.tasks_processed += 1;
        if !success {
            self.tasks_failed += 1;
        }
        self.total_processing_ms += processing_time;
        *self.operations.entry(operation.to_owned()).or_default() += 1;
        log::debug!("{operation} finished in {processing_time:.2}ms");
        TaskMetrics {
            processing_time,
            operation: operation.to_owned(),
        }
    }

    fn finish_rejected(&mut self, operation: &str) -> TaskMetrics {
        self.tasks_processed += 1;
        self.tasks_failed += 1;
        TaskMetrics {
            processing_time: 0.0,
            operation: operation.to_owned(),
        }
    }

    pub fn metrics(&self) -> WorkerMetrics {
        let mut retained_indexes: Vec<String> = self.indexes.keys().cloned().collect();
        retained_indexes.sort();
        WorkerMetrics {
            tasks_processed: self.tasks_processed,
            tasks_failed: self.tasks_failed,
            total_processing_time: self.total_processing_ms,
            average_processing_time: if self.tasks_processed == 0 {
                0.0
            } else {
                self.total_processing_ms / self.tasks_processed as f64
            },
            operations: self.operations.clone(),
            retained_indexes,
            bridge: self.bridge.metrics(),
        }
    }

    fn execute(&mut self, operation: &Operation, progress: &mut dyn FnMut(Progress)) -> Result<Value> {
        match operation {
            Operation::BatchConvertColors { data, options } => {
                let chunk_size = options.chunk_size.unwrap_or(self.config.chunk_size);
                self.batch_convert(&data.colors, chunk_size, progress)
            }
            Operation::CalculateColorDistances { data, options } => self.distances(&data.colors, options),
            Operation::FindNearestColors { data, options } => self.find_nearest(data, options),
            Operation::GenerateHarmonicPalette { data, options } => {
                let base = validate_value(&data.base_color)
                    .ok_or_else(|| Error::InvalidColor(data.base_color.to_string()))?;
                let kind = HarmonyType::from_name(&data.harmony_type)
                    .ok_or_else(|| Error::InvalidRequest(format!("unknown harmony type '{}'", data.harmony_type)))?;
                let palette = generate_harmonic_palette(&base, kind, options.count)?;
                Ok(serde_json::to_value(palette)?)
            }
            Operation::CalculateHarmonyScores { data } => self.harmony_scores(&data.combinations),
            Operation::OptimizeColorPalette { data, options } => {
                let colors = validate_all(&data.colors)?;
                if colors.is_empty() {
                    return Err(Error::MissingField("colors"));
                }
                Ok(serde_json::to_value(optimize_palette(&colors, options))?)
            }
            Operation::BuildColorIndex { data, options } => {
                let start = Instant::now();
                let (colors, errors) = validate_items(&data.colors);
                let labs: Vec<Lab> = colors.iter().map(|(_, c)| c.lab()).collect();
                let index = SpatialIndex::build(&labs);
                let stats = index.stats();
                self.indexes.insert(
                    options.name.clone(),
                    RetainedIndex {
                        index,
                        colors: colors.into_iter().map(|(_, c)| c).collect(),
                    },
                );
                Ok(json!({
                    "name": options.name,
                    "stats": stats,
                    "errors": errors,
                    "buildTime": start.elapsed().as_secs_f64() * 1000.0,
                }))
            }
            Operation::GetWorkerMetrics {} => Ok(serde_json::to_value(self.metrics())?),
            Operation::ExtractDominantColors { data, options } => {
                let dominant = summarize_samples(&data.samples, options.max_colors, options.merge_threshold);
                Ok(json!({
                    "colors": dominant,
                    "sampleCount": data.samples.len(),
                }))
            }
        }
    }

    fn batch_convert(
        &self,
        colors: &[Value],
        chunk_size: usize,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<Value> {
        const OPERATION: &str = "batchConvertColors";

        let total = colors.len();
        let chunk_size = chunk_size.max(1);
        let periodic = total > self.config.progress_threshold;
        let every = self.config.progress_every_chunks.max(1);

        let mut converted = Vec::with_capacity(total);
        let mut errors = Vec::new();
        let mut completed = 0;

        for (n, chunk) in colors.chunks(chunk_size).enumerate() {
            let offset = n * chunk_size;
            let results: Vec<std::result::Result<ConvertedColor, ItemError>> = chunk
                .par_iter()
                .enumerate()
                .map(|(i, value)| {
                    let original_index = offset + i;
                    validate_value(value)
                        .map(|color| ConvertedColor { original_index, color })
                        .ok_or_else(|| ItemError::invalid(original_index, value))
                })
                .collect();

            for result in results {
                match result {
                    Ok(color) => converted.push(color),
                    Err(err) => errors.push(err),
                }
            }

            completed += chunk.len();
            log::trace!("{OPERATION}: chunk {n} done, {completed}/{total}");
            if periodic && (n + 1) % every == 0 && completed < total {
                progress(Progress::new(OPERATION, completed, total));
            }
        }
        if total > 0 {
            progress(Progress::new(OPERATION, completed, total));
        }

        Ok(json!({
            "successCount": converted.len(),
            "errorCount": errors.len(),
            "totalProcessed": total,
            "colors": converted,
            "errors": errors,
        }))
    }

    fn distances(&self, values: &[Value], options: &DistanceOptions) -> Result<Value> {
        let algorithm = options.algorithm.unwrap_or(self.config.default_algorithm);
        let (valid, errors) = validate_items(values);
        let colors: Vec<&Color> = valid.iter().map(|(_, c)| c).collect();
        let labs: Vec<Lab> = colors.iter().map(|c| c.lab()).collect();
        let n = labs.len();

        let full = self.bridge.distance_matrix(&labs, algorithm);
        let mut matrix = vec![vec![0.0; n]; n];
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                if options.symmetric {
                    if j < i {
                        continue;
                    }
                    let d = full[i * n + j];
                    matrix[i][j] = d;
                    matrix[j][i] = d;
                    pairs.push((i, j, d));
                } else {
                    let d = full[i * n + j];
                    matrix[i][j] = d;
                    pairs.push((i, j, d));
                }
            }
        }

        let (average, min, max) = if pairs.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = pairs.iter().map(|p| p.2).sum();
            let min = pairs.iter().map(|p| p.2).fold(f64::INFINITY, f64::min);
            let max = pairs.iter().map(|p| p.2).fold(f64::NEG_INFINITY, f64::max);
            (sum / pairs.len() as f64, min, max)
        };

        let mut result = json!({
            "algorithm": algorithm,
            "count": n,
            "pairCount": pairs.len(),
            "averageDistance": average,
            "minDistance": min,
            "maxDistance": max,
            "colors": colors.iter().map(|c| c.hex()).collect::<Vec<_>>(),
            "errors": errors,
        });

        if options.include_matrix {
            result["matrix"] = json!(matrix);
        }
        if let Some(k) = options.top_k {
            pairs.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));
            let closest: Vec<PairDistance> = pairs
                .iter()
                .take(k)
                .map(|&(from, to, distance)| PairDistance {
                    from,
                    to,
                    colors: [colors[from].hex().to_owned(), colors[to].hex().to_owned()],
                    distance,
                    perceptual: perceptual_difference(distance),
                })
                .collect();
            result["closestPairs"] = serde_json::to_value(closest)?;
        }
        Ok(result)
    }

    fn find_nearest(&self, data: &NearestData, options: &NearestOptions) -> Result<Value> {
        let algorithm = options.algorithm.unwrap_or(self.config.default_algorithm);

        let built;
        let (index, candidates): (&SpatialIndex, &[Color]) = match &options.index_name {
            Some(name) => {
                let retained = self
                    .indexes
                    .get(name)
                    .ok_or_else(|| Error::InvalidRequest(format!("no index named '{name}'")))?;
                (&retained.index, retained.colors.as_slice())
            }
            None => {
                let listed = data.candidates.as_deref().ok_or(Error::MissingField("candidates"))?;
                let (valid, _) = validate_items(listed);
                let colors: Vec<Color> = valid.into_iter().map(|(_, c)| c).collect();
                let labs: Vec<Lab> = colors.iter().map(Color::lab).collect();
                built = (SpatialIndex::build(&labs), colors);
                (&built.0, built.1.as_slice())
            }
        };

        let (targets, errors) = validate_items(&data.targets);
        let results: Vec<Value> = targets
            .par_iter()
            .map(|(target_index, target)| {
                let matches: Vec<NearestMatch> = index
                    .k_nearest(target.lab(), options.k, algorithm)
                    .into_iter()
                    .map(|neighbor| NearestMatch {
                        index: neighbor.index,
                        distance: neighbor.distance,
                        color: candidates[neighbor.index].clone(),
                        perceptual: perceptual_difference(neighbor.distance),
                    })
                    .collect();
                json!({
                    "targetIndex": target_index,
                    "target": target,
                    "matches": matches,
                })
            })
            .collect();

        Ok(json!({
            "algorithm": algorithm,
            "results": results,
            "indexStats": index.stats(),
            "errors": errors,
        }))
    }

    fn harmony_scores(&self, combinations: &[Value]) -> Result<Value> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Scored {
            index: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            id: Option<Value>,
            colors: Vec<String>,
            harmony: HarmonyScore,
        }

        let mut scored = Vec::new();
        let mut invalid = Vec::new();
        for (index, combination) in combinations.iter().enumerate() {
            let (id, items) = match combination {
                Value::Array(items) => (None, Some(items)),
                Value::Object(map) => (map.get("id").cloned(), map.get("colors").and_then(Value::as_array)),
                _ => (None, None),
            };
            let colors = items.and_then(|items| validate_all(items).ok()).filter(|c| !c.is_empty());
            match colors {
                Some(colors) => scored.push(Scored {
                    index,
                    id,
                    colors: colors.iter().map(|c| c.hex().to_owned()).collect(),
                    harmony: calculate_harmony_score(&colors),
                }),
                None => invalid.push(ItemError {
                    original_index: index,
                    error: "Combination has no valid colors or contains an invalid color".into(),
                    original_color: combination.clone(),
                }),
            }
        }

        scored.sort_by(|a, b| b.harmony.score.total_cmp(&a.harmony.score).then(a.index.cmp(&b.index)));
        let average = if scored.is_empty() {
            0.0
        } else {
            scored.iter().map(|s| s.harmony.score).sum::<f64>() / scored.len() as f64
        };

        Ok(json!({
            "best": scored.first(),
            "averageScore": average,
            "validCount": scored.len(),
            "results": scored,
            "errors": invalid,
        }))
    }
}

/// Valid colors with their original positions, plus per-item errors
fn validate_items(values: &[Value]) -> (Vec<(usize, Color)>, Vec<ItemError>) {
    let mut valid = Vec::with_capacity(values.len());
    let mut errors = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match validate_value(value) {
            Some(color) => valid.push((i, color)),
            None => errors.push(ItemError::invalid(i, value)),
        }
    }
    (valid, errors)
}

/// Every value must be a valid color
fn validate_all(values: &[Value]) -> Result<Vec<Color>> {
    values
        .iter()
        .map(|v| validate_value(v).ok_or_else(|| Error::InvalidColor(v.to_string())))
        .collect()
}

//! Engine configuration
//!
//! Every field has a default, so a partial JSON object (or none at all)
//! produces a usable configuration.

use serde::Deserialize;

use crate::difference::DeltaEAlgorithm;

/// Settings for the accelerated backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AcceleratedConfig {
    /// Attempt to load the accelerated backend at all
    pub enabled: bool,
    /// Size of the shared linear memory, in 64-bit words
    pub memory_words: usize,
}

impl Default for AcceleratedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            memory_words: 1 << 16,
        }
    }
}

/// Settings for the compute engine and batch worker
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Items per chunk in batch conversion
    pub chunk_size: usize,
    /// Batches larger than this report progress periodically
    pub progress_threshold: usize,
    /// Chunks between periodic progress reports
    pub progress_every_chunks: usize,
    /// Algorithm used when a request does not name one
    pub default_algorithm: DeltaEAlgorithm,
    pub accelerated: AcceleratedConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            progress_threshold: 5000,
            progress_every_chunks: 10,
            default_algorithm: DeltaEAlgorithm::Ciede2000,
            accelerated: AcceleratedConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `SANZO_ACCELERATED` and `SANZO_CHUNK_SIZE`
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = var("SANZO_ACCELERATED") {
            let value = value.trim().to_ascii_lowercase();
            if matches!(value.as_str(), "0" | "false" | "off") {
                self.accelerated.enabled = false;
            }
        }
        if let Some(value) = var("SANZO_CHUNK_SIZE") {
            match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.chunk_size = n,
                _ => log::warn!("Ignoring invalid SANZO_CHUNK_SIZE={value:?}"),
            }
        }
        self
    }

    /// Set the batch chunk size (minimum 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the item count above which periodic progress is reported
    pub fn with_progress_threshold(mut self, threshold: usize) -> Self {
        self.progress_threshold = threshold;
        self
    }

    /// Set the default distance algorithm
    pub fn with_algorithm(mut self, algorithm: DeltaEAlgorithm) -> Self {
        self.default_algorithm = algorithm;
        self
    }

    /// Never load the accelerated backend
    pub fn without_accelerated(mut self) -> Self {
        self.accelerated.enabled = false;
        self
    }

    /// Set the accelerated backend's linear memory size
    pub fn with_memory_words(mut self, words: usize) -> Self {
        self.accelerated.memory_words = words;
        self
    }
}

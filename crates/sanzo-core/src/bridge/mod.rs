//! Accelerated/portable math bridge
//!
//! [`MathBridge`] fronts the hot numeric paths with two interchangeable
//! [`MathBackend`] implementations. The accelerated backend is loaded once
//! by [`MathBridge::init`]; every call tries it first when it is ready and
//! transparently reruns on the portable backend if it fails. Failures never
//! reach the caller.
//!
//! ```text
//! Uninitialized ──init──▶ Loading ──▶ Ready
//!                                 └─▶ FallbackOnly (terminal)
//! ```
//!
//! Operations do not initialize the bridge themselves; until `init` runs
//! they are served by the portable backend.

mod accelerated;
mod backend;
mod metrics;

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

pub use accelerated::{AcceleratedBackend, Export, HEADER_WORDS, LinearMemory, MIN_REGION_WORDS};
pub use backend::{MathBackend, PortableBackend};
pub use metrics::BridgeMetrics;

use crate::Result;
use crate::color::Lab;
use crate::config::AcceleratedConfig;
use crate::difference::DeltaEAlgorithm;
use metrics::PathCounter;

/// Published L* of pure sRGB red
const SELF_TEST_RED_L: f64 = 53.2;
const SELF_TEST_TOLERANCE: f64 = 2.0;

/// Lifecycle of the accelerated backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum BridgeState {
    Uninitialized = 0,
    Loading = 1,
    Ready = 2,
    /// Load failed; no retry for the lifetime of the bridge
    FallbackOnly = 3,
}

impl BridgeState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Loading,
            2 => Self::Ready,
            _ => Self::FallbackOnly,
        }
    }
}

/// Service object owning both backends and their metrics
///
/// Construct one per host and share it by reference (or `Arc`).
#[derive(Debug)]
pub struct MathBridge {
    config: AcceleratedConfig,
    accelerated: OnceLock<Option<AcceleratedBackend>>,
    portable: PortableBackend,
    state: AtomicU8,
    accelerated_counter: PathCounter,
    portable_counter: PathCounter,
    fallbacks: AtomicU64,
}

impl Default for MathBridge {
    fn default() -> Self {
        Self::new(AcceleratedConfig::default())
    }
}

impl MathBridge {
    pub fn new(config: AcceleratedConfig) -> Self {
        Self {
            config,
            accelerated: OnceLock::new(),
            portable: PortableBackend,
            state: AtomicU8::new(BridgeState::Uninitialized as u8),
            accelerated_counter: PathCounter::default(),
            portable_counter: PathCounter::default(),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Load the accelerated backend
    ///
    /// Idempotent. Concurrent callers block on the one in-flight load and
    /// all observe its outcome. Never fails; a load error is logged and
    /// leaves the bridge in [`BridgeState::FallbackOnly`].
    pub fn init(&self) -> BridgeState {
        self.accelerated.get_or_init(|| self.load());
        self.state()
    }

    fn load(&self) -> Option<AcceleratedBackend> {
        self.set_state(BridgeState::Loading);

        let backend = match AcceleratedBackend::load(&self.config) {
            Ok(backend) => backend,
            Err(err) => {
                log::warn!("Accelerated math unavailable, using portable path: {err}");
                self.set_state(BridgeState::FallbackOnly);
                return None;
            }
        };

        match backend.rgb_to_lab([255.0, 0.0, 0.0]) {
            Ok(lab) if (lab.l - SELF_TEST_RED_L).abs() <= SELF_TEST_TOLERANCE => {}
            Ok(lab) => log::warn!(
                "Accelerated self-test off reference: red L = {:.3}, expected {SELF_TEST_RED_L} ± {SELF_TEST_TOLERANCE}",
                lab.l
            ),
            Err(err) => log::warn!("Accelerated self-test failed: {err}"),
        }

        log::info!("Accelerated math ready ({})", backend.features());
        self.set_state(BridgeState::Ready);
        Some(backend)
    }

    fn set_state(&self, state: BridgeState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn state(&self) -> BridgeState {
        BridgeState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_accelerated_ready(&self) -> bool {
        self.state() == BridgeState::Ready
    }

    /// Run `call` on the accelerated backend, falling back to portable
    fn dispatch<T: Default>(&self, op: &'static str, call: impl Fn(&dyn MathBackend) -> Result<T>) -> T {
        if let Some(Some(backend)) = self.accelerated.get() {
            let start = Instant::now();
            match call(backend as &dyn MathBackend) {
                Ok(value) => {
                    self.accelerated_counter.record(start.elapsed());
                    return value;
                }
                Err(err) => {
                    if self.fallbacks.fetch_add(1, Ordering::Relaxed) == 0 {
                        log::warn!("Accelerated {op} failed, using portable path: {err}");
                    } else {
                        log::debug!("Accelerated {op} failed, using portable path: {err}");
                    }
                }
            }
        }

        let start = Instant::now();
        let result = call(&self.portable as &dyn MathBackend);
        self.portable_counter.record(start.elapsed());
        result.unwrap_or_else(|err| {
            log::error!("Portable {op} failed: {err}");
            T::default()
        })
    }

    /// RGB channels on 0-255 to LAB
    pub fn rgb_to_lab(&self, rgb: [f64; 3]) -> Lab {
        self.dispatch("rgb_to_lab", |b| b.rgb_to_lab(rgb))
    }

    pub fn delta_e_cie76(&self, a: Lab, b: Lab) -> f64 {
        self.dispatch("delta_e_cie76", |backend| backend.delta_e_cie76(a, b))
    }

    /// CIE94 with graphic-arts constants; `a` is the reference
    pub fn delta_e_cie94(&self, a: Lab, b: Lab) -> f64 {
        self.dispatch("delta_e_cie94", |backend| backend.delta_e_cie94(a, b))
    }

    pub fn delta_e_2000(&self, a: Lab, b: Lab) -> f64 {
        self.dispatch("delta_e_2000", |backend| backend.delta_e_2000(a, b))
    }

    /// Distance under `algorithm`
    pub fn delta_e(&self, a: Lab, b: Lab, algorithm: DeltaEAlgorithm) -> f64 {
        match algorithm {
            DeltaEAlgorithm::Cie76 => self.delta_e_cie76(a, b),
            DeltaEAlgorithm::Cie94 => self.delta_e_cie94(a, b),
            DeltaEAlgorithm::Ciede2000 => self.delta_e_2000(a, b),
        }
    }

    pub fn batch_rgb_to_lab(&self, rgb: &[[f64; 3]]) -> Vec<Lab> {
        self.dispatch("batch_rgb_to_lab", |b| b.batch_rgb_to_lab(rgb))
    }

    /// Row-major `n × n` matrix of distances from row color to column color
    pub fn distance_matrix(&self, labs: &[Lab], algorithm: DeltaEAlgorithm) -> Vec<f64> {
        self.dispatch("distance_matrix", |b| b.distance_matrix(labs, algorithm))
    }

    /// Closest candidate by index and distance
    pub fn find_nearest_color(
        &self,
        target: Lab,
        candidates: &[Lab],
        algorithm: DeltaEAlgorithm,
    ) -> Option<(usize, f64)> {
        self.dispatch("find_nearest_color", |b| b.find_nearest(target, candidates, algorithm))
    }

    pub fn metrics(&self) -> BridgeMetrics {
        let features = match self.accelerated.get() {
            Some(Some(backend)) => backend.features(),
            _ => "none",
        };
        BridgeMetrics::collect(
            self.state(),
            &self.accelerated_counter,
            &self.portable_counter,
            self.fallbacks.load(Ordering::Relaxed),
            features,
        )
    }
}

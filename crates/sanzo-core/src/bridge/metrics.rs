//! Per-path call accounting

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use super::BridgeState;

/// Call count and total time for one execution path
#[derive(Debug, Default)]
pub(crate) struct PathCounter {
    calls: AtomicU64,
    nanos: AtomicU64,
}

impl PathCounter {
    pub(crate) fn record(&self, elapsed: Duration) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub(crate) fn average_ms(&self) -> f64 {
        let calls = self.calls();
        if calls == 0 {
            return 0.0;
        }
        self.nanos.load(Ordering::Relaxed) as f64 / calls as f64 / 1e6
    }
}

/// Snapshot of bridge activity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMetrics {
    #[serde(rename = "isWasmReady")]
    pub is_accelerated_ready: bool,
    pub state: BridgeState,
    pub accelerated_calls: u64,
    pub portable_calls: u64,
    /// Accelerated attempts that were served by the portable path
    pub fallback_count: u64,
    pub avg_accelerated_time_ms: f64,
    pub avg_portable_time_ms: f64,
    /// Share of calls served by the accelerated path, as a percentage
    pub accelerated_usage_rate: f64,
    /// Portable average over accelerated average, once both paths have run
    pub speedup: Option<f64>,
    pub active_features: &'static str,
}

impl BridgeMetrics {
    pub(crate) fn collect(
        state: BridgeState,
        accelerated: &PathCounter,
        portable: &PathCounter,
        fallback_count: u64,
        active_features: &'static str,
    ) -> Self {
        let accelerated_calls = accelerated.calls();
        let portable_calls = portable.calls();
        let total = accelerated_calls + portable_calls;
        let avg_accelerated_time_ms = accelerated.average_ms();
        let avg_portable_time_ms = portable.average_ms();

        let speedup = (accelerated_calls > 0 && portable_calls > 0 && avg_accelerated_time_ms > 0.0)
            .then(|| avg_portable_time_ms / avg_accelerated_time_ms);

        Self {
            is_accelerated_ready: state == BridgeState::Ready,
            state,
            accelerated_calls,
            portable_calls,
            fallback_count,
            avg_accelerated_time_ms,
            avg_portable_time_ms,
            accelerated_usage_rate: if total == 0 {
                0.0
            } else {
                accelerated_calls as f64 / total as f64 * 100.0
            },
            speedup,
            active_features,
        }
    }
}

//! Bridge Fallback Tests
//!
//! The accelerated path is optional. With it disabled, or unable to serve
//! a call, every result must still come back through the portable path
//! and the metrics must say which path did the work.

use std::sync::Arc;

use sanzo_core::bridge::{HEADER_WORDS, MIN_REGION_WORDS};
use sanzo_core::{
    AcceleratedConfig, BatchWorker, BridgeState, DeltaEAlgorithm, EngineConfig, Lab, MathBridge,
};
use sanzo_tests::fixtures::{body, request};
use sanzo_tests::patterns::random_labs;
use serde_json::json;

const PALETTE: [&str; 6] = ["#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF7F50", "#4682B4"];

#[test]
fn test_disabled_worker_uses_portable_path() {
    let worker = BatchWorker::spawn(EngineConfig::default().without_accelerated()).unwrap();
    let distances = worker
        .submit_json(request(
            "d",
            "calculateColorDistances",
            json!({ "colors": PALETTE }),
            json!({ "algorithm": "ciede2000", "includeMatrix": true }),
        ))
        .unwrap()
        .wait()
        .unwrap();
    let distances = body(&distances).unwrap();
    assert_eq!(distances["matrix"].as_array().unwrap().len(), PALETTE.len());

    let metrics = worker
        .submit_json(r#"{"id": "m", "operation": "getWorkerMetrics"}"#)
        .unwrap()
        .wait()
        .unwrap();
    let bridge = &body(&metrics).unwrap()["bridge"];
    assert_eq!(bridge["isWasmReady"], false);
    assert_eq!(bridge["state"], "fallbackOnly");
    assert_eq!(bridge["acceleratedCalls"], 0);
    assert!(bridge["portableCalls"].as_u64().unwrap() > 0);
    assert_eq!(bridge["activeFeatures"], "none");
    assert!(bridge["speedup"].is_null());
}

#[test]
fn test_results_identical_across_paths() {
    let accelerated = MathBridge::new(AcceleratedConfig::default());
    let portable = MathBridge::new(AcceleratedConfig {
        enabled: false,
        ..Default::default()
    });
    assert_eq!(accelerated.init(), BridgeState::Ready);
    assert_eq!(portable.init(), BridgeState::FallbackOnly);

    let labs = random_labs(5, 40);
    for algorithm in [DeltaEAlgorithm::Cie76, DeltaEAlgorithm::Cie94, DeltaEAlgorithm::Ciede2000] {
        let fast = accelerated.distance_matrix(&labs, algorithm);
        let slow = portable.distance_matrix(&labs, algorithm);
        assert_eq!(fast.len(), slow.len());
        for (f, s) in fast.iter().zip(&slow) {
            assert!((f - s).abs() < 1e-9, "{}: {f} vs {s}", algorithm.name());
        }

        let target = Lab::new(55.0, 10.0, -20.0);
        assert_eq!(
            accelerated.find_nearest_color(target, &labs, algorithm).map(|(i, _)| i),
            portable.find_nearest_color(target, &labs, algorithm).map(|(i, _)| i),
        );
    }

    let m = portable.metrics();
    assert_eq!(m.accelerated_calls, 0);
    assert_eq!(m.fallback_count, 0);
    assert!(accelerated.metrics().accelerated_usage_rate > 99.0);
}

#[test]
fn test_undersized_memory_falls_back_per_call() {
    let bridge = Arc::new(MathBridge::new(AcceleratedConfig {
        enabled: true,
        memory_words: HEADER_WORDS + 2 * MIN_REGION_WORDS,
    }));
    let worker = BatchWorker::spawn_with_bridge(EngineConfig::default(), Arc::clone(&bridge)).unwrap();

    // a 12 × 12 matrix needs 144 output words, more than one region holds
    let colors: Vec<String> = (0..12).map(|i| format!("#{:02X}4080", i * 20)).collect();
    let result = worker
        .submit_json(request("d", "calculateColorDistances", json!({ "colors": colors }), json!({})))
        .unwrap()
        .wait()
        .unwrap();
    assert!(result.success, "{:?}", result.error);

    let m = bridge.metrics();
    assert_eq!(m.state, BridgeState::Ready);
    assert!(m.is_accelerated_ready);
    assert_eq!(m.fallback_count, 1);
    assert_eq!(m.portable_calls, 1);

    // small requests still fit and go through the accelerated path
    let rgb: Vec<[f64; 3]> = (0..100).map(|i| [i as f64, 128.0, 255.0 - i as f64]).collect();
    assert_eq!(bridge.batch_rgb_to_lab(&rgb).len(), 100);
    assert!(bridge.metrics().accelerated_calls >= 1);
}

#[test]
fn test_uninitialized_bridge_serves_portable() {
    let bridge = MathBridge::default();
    assert_eq!(bridge.state(), BridgeState::Uninitialized);
    let lab = bridge.rgb_to_lab([255.0, 0.0, 0.0]);
    assert!((lab.l - 53.24).abs() < 0.05, "red L = {}", lab.l);
    assert_eq!(bridge.metrics().portable_calls, 1);
}

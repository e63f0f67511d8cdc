//! Palette Parity Tests
//!
//! Compares sanzo-core's sRGB → LAB conversion and CIEDE2000 against the
//! `palette` crate. The two use slightly different constants for the LAB
//! companding threshold, so conversions agree to well under one Delta E
//! rather than bit for bit.

use sanzo_core::bridge::{AcceleratedBackend, MathBackend, PortableBackend};
use sanzo_core::{AcceleratedConfig, Rgb8, ciede2000, rgb_to_lab};
use sanzo_tests::patterns::{SamplePattern, generate_samples, random_labs};
use sanzo_tests::{compare_labs, reference};

fn all_patterns() -> Vec<(&'static str, Vec<[u8; 3]>)> {
    vec![
        ("color_cube", generate_samples(SamplePattern::ColorCube, 8)),
        ("hue_ramp", generate_samples(SamplePattern::HueRamp, 360)),
        ("grayscale", generate_samples(SamplePattern::Grayscale, 256)),
        ("skin_tones", generate_samples(SamplePattern::SkinTones, 6)),
        ("gamut_boundary", generate_samples(SamplePattern::GamutBoundary, 8)),
        ("random", generate_samples(SamplePattern::Random(42), 2000)),
    ]
}

#[test]
fn test_rgb_to_lab_matches_palette() {
    eprintln!("\n=== sRGB → LAB vs palette ===");
    eprintln!("{:<16} {:>6} {:>10} {:>10} {:>10}", "pattern", "count", "mean", "p95", "max");

    for (name, samples) in all_patterns() {
        let reference: Vec<[f64; 3]> = samples.iter().map(|&s| reference::srgb_to_lab(s)).collect();
        let ours: Vec<_> = samples.iter().map(|&s| rgb_to_lab(Rgb8::from_array(s))).collect();
        let stats = compare_labs(&reference, &ours);

        eprintln!(
            "{:<16} {:>6} {:>10.5} {:>10.5} {:>10.5}",
            name, stats.count, stats.mean, stats.p95, stats.max
        );
        assert!(stats.max < 0.1, "{name}: max deltaE {} vs palette", stats.max);
    }
}

#[test]
fn test_backends_match_palette() {
    let accelerated = AcceleratedBackend::load(&AcceleratedConfig::default()).unwrap();
    let samples = generate_samples(SamplePattern::Random(7), 5000);
    let input: Vec<[f64; 3]> = samples.iter().map(|s| Rgb8::from_array(*s).to_f64()).collect();
    let reference: Vec<[f64; 3]> = samples.iter().map(|&s| reference::srgb_to_lab(s)).collect();

    for backend in [&accelerated as &dyn MathBackend, &PortableBackend] {
        let labs = backend.batch_rgb_to_lab(&input).unwrap();
        let stats = compare_labs(&reference, &labs);
        assert!(stats.is_excellent(), "{}: {stats:?}", backend.name());
        assert!(stats.max < 0.1, "{}: {stats:?}", backend.name());
    }
}

#[test]
fn test_ciede2000_matches_palette() {
    let a = random_labs(1, 2000);
    let b = random_labs(2, 2000);

    let mut worst: f64 = 0.0;
    for (x, y) in a.iter().zip(&b) {
        let ours = ciede2000(*x, *y);
        let theirs = reference::ciede2000(x.to_array(), y.to_array());
        worst = worst.max((ours - theirs).abs());
    }
    eprintln!("CIEDE2000 max |ours - palette| over 2000 pairs: {worst:.2e}");
    assert!(worst < 1e-3, "CIEDE2000 differs from palette by {worst}");
}

#[test]
fn test_ciede2000_small_differences_match_palette() {
    // near-identical pairs are where CIEDE2000 is most sensitive
    let base = random_labs(3, 500);
    let offsets = random_labs(4, 500);
    for (x, o) in base.iter().zip(&offsets) {
        let y = sanzo_core::Lab::new(x.l + o.l / 100.0, x.a + o.a / 100.0, x.b + o.b / 100.0);
        let ours = ciede2000(*x, y);
        let theirs = reference::ciede2000(x.to_array(), y.to_array());
        assert!((ours - theirs).abs() < 1e-3, "{x:?} vs {y:?}: {ours} / {theirs}");
    }
}

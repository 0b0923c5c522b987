use std::sync::atomic::AtomicBool;

use image::{DynamicImage, Rgba, RgbaImage};
use loomgen::{generate, validate, LoomError, Params};

fn half_and_half(size: u32) -> DynamicImage {
    let mut img = RgbaImage::new(size, size);
    for (x, _y, pixel) in img.enumerate_pixels_mut() {
        *pixel = if x < size / 2 {
            Rgba([10, 10, 10, 255])
        } else {
            Rgba([245, 245, 245, 255])
        };
    }
    DynamicImage::ImageRgba8(img)
}

#[test]
fn full_pipeline_produces_a_well_formed_sequence() {
    let image = half_and_half(400);
    let params = Params {
        n_pins: 120,
        n_lines: 500,
        line_weight: 18,
        min_distance: 8,
        img_size: 300,
        hoop_diameter: 450.0,
        start_pin: 0,
    };
    let cancel = AtomicBool::new(false);

    let result = generate(&image, params, |_, _, _| {}, &cancel).expect("generate should succeed");

    assert!(result.line_sequence.len() <= 501);
    assert_eq!(result.line_sequence[0], 0);
    assert_eq!(result.pin_coordinates.len(), 120);

    for pair in result.line_sequence.windows(2) {
        let a = pair[0] as u32;
        let b = pair[1] as u32;
        assert!(loomgen::pins::ring_distance(a, b, 120) >= 8);
    }

    let expected_length: f64 = result
        .line_sequence
        .windows(2)
        .map(|pair| {
            let a = result.pin_coordinates[pair[0]];
            let b = result.pin_coordinates[pair[1]];
            params.hoop_diameter / f64::from(params.img_size) * a.distance(b)
        })
        .sum();
    assert!((result.total_thread_length - expected_length).abs() < 1e-6);
}

#[test]
fn determinism_across_two_full_runs() {
    let image = half_and_half(300);
    let params = Params {
        n_pins: 80,
        n_lines: 200,
        line_weight: 20,
        min_distance: 6,
        img_size: 200,
        hoop_diameter: 400.0,
        start_pin: 0,
    };

    let run = || {
        let cancel = AtomicBool::new(false);
        generate(&image, params, |_, _, _| {}, &cancel).unwrap()
    };

    assert_eq!(run().line_sequence, run().line_sequence);
}

#[test]
fn validation_errors_are_reported_before_canonicalisation() {
    let params = Params {
        n_pins: 2,
        img_size: 50,
        ..Params::default()
    };
    let outcome = validate(&params, None);
    assert!(!outcome.is_valid);
    assert!(outcome
        .errors
        .contains(&"Number of pins must be at least 3".to_string()));
    assert!(outcome
        .errors
        .contains(&"Image size must be at least 100 pixels".to_string()));
}

#[test]
fn oversized_source_image_is_rejected_as_a_validation_error() {
    let small = half_and_half(100);
    let oversized = small.resize_exact(5000, 5000, image::imageops::FilterType::Nearest);
    let cancel = AtomicBool::new(false);
    let err = generate(&oversized, Params::default(), |_, _, _| {}, &cancel).unwrap_err();
    assert!(matches!(err, LoomError::ValidationError { .. }));
}

#[test]
fn cancelling_mid_run_still_returns_a_usable_partial_result() {
    let image = half_and_half(300);
    let params = Params {
        n_pins: 100,
        n_lines: 5000,
        line_weight: 20,
        min_distance: 5,
        img_size: 200,
        hoop_diameter: 400.0,
        start_pin: 0,
    };
    let cancel = AtomicBool::new(false);
    let mut ticks = 0usize;

    let result = generate(
        &image,
        params,
        |_, _, _| {
            ticks += 1;
            // Cancel on the very first progress tick so the run stops well
            // short of the requested 5000 lines through `generate`'s own
            // public entry point, not just the solver's internal loop.
            cancel.store(true, std::sync::atomic::Ordering::Relaxed);
        },
        &cancel,
    )
    .unwrap();

    assert!(ticks > 0);
    assert!(!result.line_sequence.is_empty());
    assert!(result.line_sequence.len() < params.n_lines as usize + 1);
}

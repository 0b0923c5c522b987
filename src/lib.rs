//! `loomgen` turns a raster photograph into a thread-art plan: an ordered
//! walk over pins arranged on a circle such that straight thread segments
//! between consecutive pins, superimposed, approximate the source image's
//! tonal distribution.
//!
//! The crate is the *core* described by its design document: image
//! canonicalisation, pin placement, line-pixel caching, and the greedy
//! line-selection loop that drives [`generate`]. Everything else — upload
//! widgets, progressive canvas rendering, file pickers — is a host concern;
//! this crate only exposes parameter validation, a progress callback, and
//! a final result record. See [`loomgen-cli`](../bin/loomgen.rs) for a
//! minimal host built on top of it.
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//!
//! let image = image::open("portrait.jpg").unwrap();
//! let params = loomgen::Params::default();
//! let cancel = AtomicBool::new(false);
//! let result = loomgen::generate(&image, params, |_, _, _| {}, &cancel).unwrap();
//! println!("{} pins drawn, {:.1} units of thread", result.line_sequence.len(), result.total_thread_length);
//! ```

pub mod canonical;
pub mod error;
pub mod linecache;
pub mod params;
pub mod pins;
pub mod progress;
pub mod solver;

pub use error::LoomError;
pub use params::{validate, Params, ValidationOutcome};
pub use pins::Pin;
pub use progress::Progress;

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use image::DynamicImage;

use linecache::LineCache;
use solver::ResidualField;

/// The stable result record described in the design document's external
/// interfaces section: echoed parameters, placed pins, the chosen pin
/// sequence, the physical thread length, and wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResult {
    pub parameters: Params,
    pub pin_coordinates: Vec<Pin>,
    pub line_sequence: Vec<usize>,
    pub total_thread_length: f64,
    pub processing_time_ms: f64,
}

/// Runs the full pipeline: validate, canonicalise, place pins, build the
/// line cache, then greedily solve.
///
/// `on_progress` receives `(progress, sequence_snapshot, pin_coordinates)`
/// every [`solver::PROGRESS_EVERY`] lines and once more on the final line;
/// it must not mutate what it's given (the signature only lends shared
/// references) and any panic inside it is the caller's own problem, not
/// something this function guards against — hosts embedding a callback
/// that can panic should catch it themselves, matching the "exceptions
/// from the callback are swallowed by the host, not the core" policy.
///
/// `cancel` is polled at the same points; on cancellation the function
/// still returns `Ok` with the partial sequence built so far, per the
/// concurrency model's cancellation contract.
pub fn generate(
    image: &DynamicImage,
    params: Params,
    on_progress: impl FnMut(&Progress, &[usize], &[Pin]),
    cancel: &AtomicBool,
) -> Result<GenerateResult, LoomError> {
    let start = Instant::now();

    let (width, height) = (image.width(), image.height());
    let outcome = validate(&params, Some((width, height)));
    if !outcome.is_valid {
        return Err(LoomError::ValidationError {
            errors: outcome.errors,
        });
    }

    log::debug!("generate: {params:?}");

    let (luminance, mask) = canonical::canonicalise(image.clone(), params.img_size)?;
    let pin_coordinates = pins::place_pins(params.n_pins, params.img_size)?;
    let cache = LineCache::build(&pin_coordinates, params.min_distance, params.img_size)?;
    let mut residual = ResidualField::new(&luminance, &mask);

    let solve_result = solver::solve(
        &pin_coordinates,
        &cache,
        &mut residual,
        params.start_pin as usize,
        params.n_lines,
        params.line_weight,
        params.min_distance,
        params.hoop_diameter,
        on_progress,
        cancel,
    );

    Ok(GenerateResult {
        parameters: params,
        pin_coordinates,
        line_sequence: solve_result.line_sequence,
        total_thread_length: solve_result.total_thread_length,
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

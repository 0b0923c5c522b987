//! The greedy solver (§4.4): repeatedly picks the pin whose segment covers
//! the most residual darkness, then subtracts it from the residual field.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::linecache::LineCache;
use crate::pins::Pin;
use crate::progress::Progress;

/// Size of the anti-backtrack window (`spec.md` §3, §4.4): a pin cannot be
/// revisited within this many picks, which kills degenerate A-B-A cycles.
pub const RECENT_WINDOW: usize = 20;

/// How often (in applied lines) a progress tick is published, per `spec.md`
/// §4.5. Independent of `n_lines` so both small and large runs stay
/// observable.
pub const PROGRESS_EVERY: u32 = 10;

/// Residual error field `F`: the darkness still to explain. Starts as
/// `255 - luminance` and only ever decreases as lines are drawn over it.
pub struct ResidualField {
    values: Vec<f32>,
    img_size: u32,
}

impl ResidualField {
    /// Builds `F` from the canonicalised luminance buffer `I` and its
    /// parallel circular mask: `F[k] = 255 - I[k]` inside the disc, `0`
    /// outside. The mask is applied explicitly here (rather than relying on
    /// `I` already being zeroed outside the disc) so a fully black disc on
    /// a fully black background still yields the `255 inside / 0 outside`
    /// split `spec.md` §8's boundary scenario 6 describes; `255 - 0` alone
    /// could not distinguish the two.
    pub fn new(luminance: &[u8], mask: &[u8]) -> Self {
        let img_size = (luminance.len() as f64).sqrt().round() as u32;
        let values = luminance
            .iter()
            .zip(mask.iter())
            .map(|(&l, &m)| if m != 0 { 255.0 - f32::from(l) } else { 0.0 })
            .collect();
        Self { values, img_size }
    }

    pub fn img_size(&self) -> u32 {
        self.img_size
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    fn score(&self, indices: &[u32]) -> f32 {
        indices
            .iter()
            .filter_map(|&idx| self.values.get(idx as usize))
            .sum()
    }

    fn subtract(&mut self, indices: &[u32], line_weight: u8) {
        let weight = f32::from(line_weight);
        for &idx in indices {
            if let Some(v) = self.values.get_mut(idx as usize) {
                *v = (*v - weight).clamp(0.0, 255.0);
            }
        }
    }
}

/// Output of a completed (or cancelled, or early-terminated) solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub line_sequence: Vec<usize>,
    pub total_thread_length: f64,
}

/// Runs the greedy solver for up to `n_lines` steps from `start_pin`.
///
/// `on_progress` is invoked every [`PROGRESS_EVERY`] applied lines and once
/// more on the final line. `cancel` is polled at the same points; on
/// cancellation the solver returns the partial sequence built so far as a
/// successful result, per `spec.md` §5.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    pins: &[Pin],
    cache: &LineCache,
    residual: &mut ResidualField,
    start_pin: usize,
    n_lines: u32,
    line_weight: u8,
    min_distance: u32,
    hoop_diameter: f64,
    mut on_progress: impl FnMut(&Progress, &[usize], &[Pin]),
    cancel: &AtomicBool,
) -> SolveResult {
    let n_pins = pins.len() as u32;
    let mut current_pin = start_pin as u32;
    let mut sequence = vec![start_pin];
    let mut recent: VecDeque<u32> = VecDeque::with_capacity(RECENT_WINDOW);
    let mut thread_length = 0.0f64;
    let img_size = residual.img_size();

    for lines_drawn in 0..n_lines {
        let chosen = match pick_candidate(current_pin, n_pins, min_distance, &recent, cache, residual) {
            Some(pin) => pin,
            None => {
                log::warn!(
                    "greedy solver exhausted candidates after {lines_drawn} of {n_lines} lines"
                );
                break;
            }
        };

        if let Some(indices) = cache.get(current_pin, chosen) {
            residual.subtract(indices, line_weight);
        }

        thread_length += hoop_diameter / f64::from(img_size)
            * pins[current_pin as usize].distance(pins[chosen as usize]);

        sequence.push(chosen as usize);
        recent.push_back(chosen);
        if recent.len() > RECENT_WINDOW {
            recent.pop_front();
        }
        current_pin = chosen;

        let completed = lines_drawn + 1;
        if completed % PROGRESS_EVERY == 0 || completed == n_lines {
            let progress = Progress {
                lines_drawn: completed,
                total_lines: n_lines,
                percent_complete: 100.0 * f64::from(completed) / f64::from(n_lines.max(1)),
                // `next_pin` mirrors `current_pin`: no lookahead pick is
                // computed at tick time, so there is nothing else to report.
                current_pin: current_pin as usize,
                next_pin: current_pin as usize,
                thread_length,
            };
            on_progress(&progress, &sequence, pins);
            log::trace!(
                "progress: {}/{} lines, current pin {}, thread length {:.2}",
                progress.lines_drawn,
                progress.total_lines,
                progress.current_pin,
                progress.thread_length
            );
        }

        if cancel.load(Ordering::Relaxed) {
            break;
        }
    }

    SolveResult {
        line_sequence: sequence,
        total_thread_length: thread_length,
    }
}

/// Enumerates the admissible candidate pins from `current`, in walk order,
/// excluding anything in `exclude` (the `recent` window at call sites).
/// This is the candidate-set step of `spec.md` §4.4 pulled out on its own so
/// it can be tested directly against §8's literal boundary scenarios.
pub fn valid_target_pins(current: u32, min_distance: u32, n_pins: u32, exclude: &[u32]) -> Vec<u32> {
    (min_distance..(n_pins - min_distance))
        .map(|offset| (current + offset) % n_pins)
        .filter(|candidate| !exclude.contains(candidate))
        .collect()
}

/// Scans candidate offsets `[min_distance, n_pins - min_distance)` from
/// `current_pin` (the admissibility predicate of `spec.md` §4.3, spelled as
/// a loop bound per the open question in §9) and returns the one with the
/// strictly-greatest residual score, breaking ties toward the smallest
/// offset by using a strict `>` comparison.
fn pick_candidate(
    current_pin: u32,
    n_pins: u32,
    min_distance: u32,
    recent: &VecDeque<u32>,
    cache: &LineCache,
    residual: &ResidualField,
) -> Option<u32> {
    // Inlined rather than routed through `valid_target_pins` (kept standalone
    // for testing against §8's literal scenarios) to avoid a per-step `Vec`
    // allocation in the hot loop.
    let mut best: Option<(u32, f32)> = None;

    for offset in min_distance..(n_pins - min_distance) {
        let candidate = (current_pin + offset) % n_pins;
        if recent.contains(&candidate) {
            continue;
        }
        let score = cache.get(current_pin, candidate).map_or(0.0, |indices| residual.score(indices));
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }

    best.map(|(pin, _)| pin)
}

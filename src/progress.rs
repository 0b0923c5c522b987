//! Progress reporting (§4.5): periodic snapshots of an in-flight solve.

/// A single progress tick, published every [`crate::solver::PROGRESS_EVERY`]
/// applied lines and once more on the final line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub lines_drawn: u32,
    pub total_lines: u32,
    pub percent_complete: f64,
    pub current_pin: usize,
    pub next_pin: usize,
    pub thread_length: f64,
}

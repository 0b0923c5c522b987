//! Line cache (§4.3): precomputed flat pixel indices for every admissible pin pair.

use ndarray::Array1;
use rayon::prelude::*;

use crate::error::LoomError;
use crate::pins::{ring_distance, Pin};

/// Soft cap on the line cache's estimated footprint. Crossing it returns
/// [`LoomError::ResourceExhaustion`] rather than letting `generate` allocate
/// an unreasonable amount of memory; the reference design in `spec.md` §4.3
/// treats this as a parameter problem, not a crash.
const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 1_500_000_000;

/// For every admissible pin pair, the flat `y*img_size+x` pixel indices of
/// the straight segment between them, stored once per unordered pair.
pub struct LineCache {
    n_pins: u32,
    min_distance: u32,
    row_start: Vec<usize>,
    entries: Vec<Vec<u32>>,
}

fn row_starts(n_pins: u32) -> Vec<usize> {
    let n = n_pins as usize;
    let mut starts = Vec::with_capacity(n.saturating_sub(1));
    let mut acc = 0usize;
    for a in 0..n.saturating_sub(1) {
        starts.push(acc);
        acc += n - 1 - a;
    }
    starts
}

fn triangular_len(n_pins: u32) -> usize {
    let n = n_pins as usize;
    n * n.saturating_sub(1) / 2
}

/// Estimates the cache's memory footprint in bytes, for the
/// `ResourceExhaustion` check in [`LineCache::build`]: one `u32` (4 bytes)
/// per pixel index, across every admissible pair, assuming a segment length
/// on the order of `img_size` as `spec.md` §4.3 notes.
pub fn estimate_bytes(n_pins: u32, img_size: u32, min_distance: u32) -> u64 {
    let mut admissible_pairs: u64 = 0;
    for a in 0..n_pins {
        for b in (a + 1)..n_pins {
            if ring_distance(a, b, n_pins) >= min_distance {
                admissible_pairs += 1;
            }
        }
    }
    admissible_pairs * u64::from(img_size) * 4
}

impl LineCache {
    /// Builds the cache for every admissible pair, per `spec.md` §4.3.
    /// Pair construction is independent and runs in parallel via `rayon`;
    /// this is cache construction, not the greedy inner loop, so it is not
    /// subject to the single-threaded requirement in `spec.md` §5.
    pub fn build(pins: &[Pin], min_distance: u32, img_size: u32) -> Result<Self, LoomError> {
        Self::build_with_limit(pins, min_distance, img_size, DEFAULT_MEMORY_LIMIT_BYTES)
    }

    pub fn build_with_limit(
        pins: &[Pin],
        min_distance: u32,
        img_size: u32,
        memory_limit_bytes: u64,
    ) -> Result<Self, LoomError> {
        let n_pins = pins.len() as u32;
        let estimated = estimate_bytes(n_pins, img_size, min_distance);
        if estimated > memory_limit_bytes {
            return Err(LoomError::ResourceExhaustion {
                estimated_bytes: estimated,
                limit_bytes: memory_limit_bytes,
            });
        }

        let row_start = row_starts(n_pins);
        let mut pairs = Vec::with_capacity(triangular_len(n_pins));
        for a in 0..n_pins {
            for b in (a + 1)..n_pins {
                pairs.push((a, b));
            }
        }

        let entries: Vec<Vec<u32>> = pairs
            .par_iter()
            .map(|&(a, b)| {
                if ring_distance(a, b, n_pins) >= min_distance {
                    segment_pixels(pins[a as usize], pins[b as usize], img_size)
                } else {
                    Vec::new()
                }
            })
            .collect();

        log::debug!(
            "line cache built: {} pairs, ~{} bytes",
            pairs.len(),
            estimated
        );

        Ok(Self {
            n_pins,
            min_distance,
            row_start,
            entries,
        })
    }

    /// Looks up the segment between `a` and `b` (either order). Returns
    /// `None` for pairs closer than `min_distance`, which callers must
    /// treat as "safely skip", not an error.
    pub fn get(&self, a: u32, b: u32) -> Option<&[u32]> {
        if a == b {
            return None;
        }
        if ring_distance(a, b, self.n_pins) < self.min_distance {
            return None;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let idx = self.row_start[lo as usize] + (hi - lo - 1) as usize;
        Some(&self.entries[idx])
    }

    pub fn n_pins(&self) -> u32 {
        self.n_pins
    }

    pub fn min_distance(&self) -> u32 {
        self.min_distance
    }
}

/// Discretises the straight segment between `a` and `b` into flat pixel
/// indices, following the "linspace with floor" rule of `spec.md` §4.3
/// exactly: Bresenham-style alternatives are explicitly disallowed because
/// they would not reproduce this pixel-for-pixel.
fn segment_pixels(a: Pin, b: Pin, img_size: u32) -> Vec<u32> {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let d = (dx * dx + dy * dy).sqrt().floor() as i64;

    if d <= 0 {
        return Vec::new();
    }
    if d == 1 {
        return flat_index(a.x, a.y, img_size).into_iter().collect();
    }

    let xs = Array1::linspace(f64::from(a.x), f64::from(b.x), d as usize);
    let ys = Array1::linspace(f64::from(a.y), f64::from(b.y), d as usize);

    xs.iter()
        .zip(ys.iter())
        .filter_map(|(&x, &y)| flat_index(x.floor() as i64, y.floor() as i64, img_size))
        .collect()
}

fn flat_index(x: i64, y: i64, img_size: u32) -> Option<u32> {
    if x < 0 || y < 0 || x >= i64::from(img_size) || y >= i64::from(img_size) {
        return None;
    }
    Some((y as u32) * img_size + (x as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::place_pins;

    #[test]
    fn inadmissible_pairs_are_absent() {
        let pins = place_pins(10, 200).unwrap();
        let cache = LineCache::build(&pins, 2, 200).unwrap();
        // ring distance between 0 and 1 is 1, below min_distance 2.
        assert!(cache.get(0, 1).is_none());
    }

    #[test]
    fn admissible_pairs_are_present_and_symmetric() {
        let pins = place_pins(10, 200).unwrap();
        let cache = LineCache::build(&pins, 2, 200).unwrap();
        let forward = cache.get(0, 3).unwrap().to_vec();
        let backward = cache.get(3, 0).unwrap().to_vec();
        assert_eq!(forward, backward);
        assert!(!forward.is_empty());
    }

    #[test]
    fn every_pixel_index_is_in_bounds() {
        let img_size = 200;
        let pins = place_pins(24, img_size).unwrap();
        let cache = LineCache::build(&pins, 2, img_size).unwrap();
        for a in 0..24u32 {
            for b in (a + 1)..24u32 {
                if let Some(indices) = cache.get(a, b) {
                    for &idx in indices {
                        assert!((idx as u64) < (img_size as u64) * (img_size as u64));
                    }
                }
            }
        }
    }

    #[test]
    fn diameter_segment_length_matches_floored_euclidean_distance() {
        let pins = place_pins(4, 200).unwrap();
        let cache = LineCache::build(&pins, 1, 200).unwrap();
        let expected_len = pins[0].distance(pins[2]).floor() as usize;
        assert_eq!(cache.get(0, 2).unwrap().len(), expected_len);
    }

    #[test]
    fn resource_exhaustion_is_reported_before_allocating() {
        let pins = place_pins(1000, 2000).unwrap();
        let result = LineCache::build_with_limit(&pins, 1, 2000, 1024);
        assert!(matches!(
            result,
            Err(LoomError::ResourceExhaustion { .. })
        ));
    }
}

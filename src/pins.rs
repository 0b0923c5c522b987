//! Pin placement (§4.2): deterministic, pure positions on the inscribed circle.

use nalgebra::{vector, EuclideanNorm, Norm, Vector2};

use crate::error::LoomError;

/// A pin position, in pixel coordinates of the canonicalised `img_size²` buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub x: i32,
    pub y: i32,
}

impl Pin {
    pub fn as_vector(self) -> Vector2<f64> {
        vector![f64::from(self.x), f64::from(self.y)]
    }

    /// Euclidean distance in pixels to another pin, via `nalgebra`'s
    /// `EuclideanNorm`, matching how the teacher's `thread()` scores
    /// candidate segment lengths.
    pub fn distance(self, other: Pin) -> f64 {
        EuclideanNorm.metric_distance(&self.as_vector(), &other.as_vector())
    }
}

/// Computes the `n_pins` positions of §3's `Pin` definition, laid out
/// counter-clockwise in image coordinates starting on the positive-x axis.
///
/// Each angle is derived directly from `i` (`2*pi*i/n_pins`) rather than by
/// repeated addition, so there is no accumulated floating-point drift as
/// `spec.md` §4.2 requires.
pub fn place_pins(n_pins: u32, img_size: u32) -> Result<Vec<Pin>, LoomError> {
    if !(3..=1000).contains(&n_pins) {
        return Err(LoomError::ValidationError {
            errors: vec![if n_pins < 3 {
                "Number of pins must be at least 3".to_string()
            } else {
                "Number of pins should not exceed 1000 for performance reasons".to_string()
            }],
        });
    }
    if !(100..=2000).contains(&img_size) {
        return Err(LoomError::ValidationError {
            errors: vec![if img_size < 100 {
                "Image size must be at least 100 pixels".to_string()
            } else {
                "Image size should not exceed 2000 pixels for performance reasons".to_string()
            }],
        });
    }

    let centre = f64::from(img_size) / 2.0;
    let radius = centre - 0.5;
    let step = 2.0 * std::f64::consts::PI / f64::from(n_pins);

    Ok((0..n_pins)
        .map(|i| {
            let angle = step * f64::from(i);
            let pos: Vector2<f64> = vector![centre + radius * angle.cos(), centre + radius * angle.sin()];
            Pin {
                x: pos.x.floor() as i32,
                y: pos.y.floor() as i32,
            }
        })
        .collect())
}

/// Ring (shorter-arc) distance between two pin indices, per the glossary.
pub fn ring_distance(a: u32, b: u32, n_pins: u32) -> u32 {
    let diff = if a > b { a - b } else { b - a };
    diff.min(n_pins - diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_requested_pin_count() {
        let pins = place_pins(360, 500).unwrap();
        assert_eq!(pins.len(), 360);
    }

    #[test]
    fn pin_zero_is_on_positive_x_axis() {
        let pins = place_pins(360, 500).unwrap();
        let centre = 250;
        assert_eq!(pins[0].y, centre);
        assert!(pins[0].x > centre);
    }

    #[test]
    fn four_pins_on_a_200px_image_match_the_spec_example() {
        // spec.md §8 boundary scenario 1.
        let pins = place_pins(4, 200).unwrap();
        assert_eq!(pins[0], Pin { x: 199, y: 100 });
        assert_eq!(pins[1], Pin { x: 100, y: 199 });
        assert_eq!(pins[2], Pin { x: 0, y: 100 });
        // Floor-of-a-near-zero-negative-cosine artifact: spec.md §8 gives
        // this as "approximately (100,0)".
        assert_eq!(pins[3], Pin { x: 99, y: 0 });
    }

    #[test]
    fn pins_sit_strictly_inside_the_raster_near_the_inscribed_radius() {
        let img_size = 500u32;
        let pins = place_pins(128, img_size).unwrap();
        let centre = Pin {
            x: (img_size / 2) as i32,
            y: (img_size / 2) as i32,
        };
        for pin in &pins {
            assert!(pin.x >= 0 && pin.x < img_size as i32);
            assert!(pin.y >= 0 && pin.y < img_size as i32);
            let d = pin.distance(centre);
            let radius = f64::from(img_size) / 2.0 - 0.5;
            // Flooring x and y independently can push a pin up to ~1 pixel
            // further from centre than the continuous radius in either
            // direction, depending on quadrant.
            assert!(
                (radius - 1.5..=radius + 1.5).contains(&d),
                "distance {d} out of expected band around radius {radius}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_pin_count() {
        assert!(place_pins(2, 500).is_err());
        assert!(place_pins(1001, 500).is_err());
    }

    #[test]
    fn rejects_out_of_range_image_size() {
        assert!(place_pins(300, 50).is_err());
        assert!(place_pins(300, 2001).is_err());
    }

    #[test]
    fn ring_distance_wraps_around_when_shorter() {
        // spec.md §8 boundary scenario 5.
        assert_eq!(ring_distance(1, 9, 10), 2);
    }

    #[test]
    fn ring_distance_is_symmetric() {
        assert_eq!(ring_distance(3, 7, 20), ring_distance(7, 3, 20));
    }
}

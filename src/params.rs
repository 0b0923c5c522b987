//! Parameter record (P in the design notes) and its pure validation predicate.

/// Immutable solver configuration.
///
/// All fields are plain Rust integer/float types, so "must be an integer"
/// style messages (still emitted by [`validate_pin_count_str`] and
/// [`validate_image_size_str`] for hosts parsing free-form input, e.g. the
/// CLI's `clap` value parsers) can never actually be produced by
/// [`validate`] itself: the type system already rejects non-integers before
/// a `Params` value can exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    pub n_pins: u32,
    pub n_lines: u32,
    pub line_weight: u8,
    pub min_distance: u32,
    pub img_size: u32,
    pub hoop_diameter: f64,
    pub start_pin: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            n_pins: 300,
            n_lines: 3000,
            line_weight: 20,
            min_distance: 20,
            img_size: 500,
            hoop_diameter: 500.0,
            start_pin: 0,
        }
    }
}

/// Result of validating a [`Params`] (and, optionally, a source image shape)
/// before any allocation takes place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }
}

/// Validates `params` in isolation. Pass `source_dims` (the decoded source
/// image's `(width, height)`) to also validate the image shape described in
/// `spec.md` §4.1 up front, before the canonicaliser runs.
pub fn validate(params: &Params, source_dims: Option<(u32, u32)>) -> ValidationOutcome {
    let mut errors = Vec::new();

    if params.n_pins < 3 {
        errors.push("Number of pins must be at least 3".to_string());
    }
    if params.n_pins > 1000 {
        errors.push("Number of pins should not exceed 1000 for performance reasons".to_string());
    }

    if params.img_size < 100 {
        errors.push("Image size must be at least 100 pixels".to_string());
    }
    if params.img_size > 2000 {
        errors
            .push("Image size should not exceed 2000 pixels for performance reasons".to_string());
    }

    if params.min_distance < 1 {
        errors.push("Minimum distance must be at least 1".to_string());
    }
    if 2 * params.min_distance >= params.n_pins {
        errors.push("Minimum distance must be less than half the number of pins".to_string());
    }

    if params.n_lines < 1 {
        errors.push("Number of lines must be at least 1".to_string());
    }

    if params.line_weight < 1 {
        errors.push("Line weight must be between 1 and 255".to_string());
    }

    if params.n_pins > 0 && params.start_pin >= params.n_pins {
        errors.push("Start pin must be less than the number of pins".to_string());
    }

    if !(params.hoop_diameter.is_finite() && params.hoop_diameter > 0.0) {
        errors.push("Hoop diameter must be a positive number".to_string());
    }

    if let Some((width, height)) = source_dims {
        let min_edge = width.min(height);
        let max_edge = width.max(height);
        if min_edge < 100 {
            errors.push("Image width must be at least 100 pixels".to_string());
            errors.push("Image height must be at least 100 pixels".to_string());
        }
        if max_edge > 4000 {
            errors.push(
                "Image width should not exceed 4000 pixels for performance reasons".to_string(),
            );
            errors.push(
                "Image height should not exceed 4000 pixels for performance reasons".to_string(),
            );
        }
        let ratio = f64::from(width) / f64::from(height);
        if !(1.0 / 3.0..=3.0).contains(&ratio) {
            errors.push(
                "Image aspect ratio is too extreme (must be between 1:3 and 3:1)".to_string(),
            );
        }
    }

    if errors.is_empty() {
        ValidationOutcome::ok()
    } else {
        ValidationOutcome {
            is_valid: false,
            errors,
        }
    }
}

/// String-input counterpart used by the CLI's `clap` value parser for
/// `--pins`, so a non-integer CLI argument produces the exact message
/// `spec.md` §6 specifies rather than a generic parse error.
pub fn validate_pin_count_str(raw: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|_| "Number of pins must be an integer".to_string())
}

/// String-input counterpart for `--size`, mirroring
/// [`validate_pin_count_str`] for the image-size message.
pub fn validate_image_size_str(raw: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|_| "Image size must be an integer".to_string())
}

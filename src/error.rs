use thiserror::Error;

/// Failure modes of [`crate::generate`] and its helpers.
///
/// `NoCandidateWarning` from the design notes is deliberately absent here:
/// an exhausted candidate set is not fatal, and surfaces only as a
/// truncated [`crate::solver::SolveResult::line_sequence`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoomError {
    #[error("invalid parameters: {errors:?}")]
    ValidationError { errors: Vec<String> },

    #[error("input image too small: shortest edge {min_edge}px (need at least 100px)")]
    InputTooSmall { min_edge: u32 },

    #[error("input image too large: longest edge {max_edge}px (limit 4000px)")]
    InputTooLarge { max_edge: u32 },

    #[error("input image aspect ratio {ratio:.2} is too extreme (must be within 1:3..3:1)")]
    InputAspectExtreme { ratio: f64 },

    #[error(
        "line cache would need ~{estimated_bytes} bytes, exceeding the {limit_bytes} byte limit"
    )]
    ResourceExhaustion {
        estimated_bytes: u64,
        limit_bytes: u64,
    },
}

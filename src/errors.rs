use thiserror::Error;

/// Error taxonomy for the geometry/pocket-toolpath core.
///
/// `EmptyResult` and `Aborted` from the taxonomy this enum covers are deliberately not
/// variants here: an empty result is represented as an empty `Vec<Curve>`, and an abort is
/// reported on `CAreaProcessingContext` rather than as an `Err` (see `context.rs`), since
/// both are expected, non-exceptional outcomes the caller must accept.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AreaError {
    #[error("invalid geometry: {detail}")]
    InvalidGeometry { detail: String },

    #[error("invalid parameters: {detail}")]
    InvalidParameters { detail: String },

    #[error("numeric failure: {detail}")]
    NumericFailure { detail: String },
}

impl AreaError {
    pub fn invalid_geometry(detail: impl Into<String>) -> Self {
        AreaError::InvalidGeometry {
            detail: detail.into(),
        }
    }

    pub fn invalid_parameters(detail: impl Into<String>) -> Self {
        AreaError::InvalidParameters {
            detail: detail.into(),
        }
    }

    pub fn numeric_failure(detail: impl Into<String>) -> Self {
        AreaError::NumericFailure {
            detail: detail.into(),
        }
    }
}

pub type AreaResult<T> = Result<T, AreaError>;

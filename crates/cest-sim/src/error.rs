//! Simulation-layer errors.

use cest_bloch::BlochError;
use cest_core::CestError;
use thiserror::Error;

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Bloch(#[from] BlochError),

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Unknown catalog key.
    #[error("Unknown metabolite: {key}")]
    UnknownMetabolite { key: String },

    /// The model only supports two or three pools.
    #[error("Unsupported pool count: {count} (expected 2 or 3)")]
    PoolCount { count: usize },

    /// Offsets are not mirrored around 0 ppm.
    #[error("Offsets are not symmetric around 0 ppm: {what}")]
    Asymmetric { what: String },

    /// Z-spectrum evaluation failed at one offset.
    #[error("Z-spectrum failed at {offset_ppm} ppm: {source}")]
    Offset {
        offset_ppm: f64,
        #[source]
        source: BlochError,
    },
}

impl From<CestError> for SimError {
    fn from(err: CestError) -> Self {
        SimError::Bloch(BlochError::Core(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SimError::UnknownMetabolite { key: "xyz".into() };
        assert!(err.to_string().contains("xyz"));

        let err = SimError::PoolCount { count: 4 };
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn core_error_goes_through_bloch() {
        let err: SimError = CestError::InvalidArg { what: "steps" }.into();
        assert!(matches!(err, SimError::Bloch(BlochError::Core(_))));
    }
}

//! Error types for Bloch-McConnell propagation.

use cest_core::CestError;
use thiserror::Error;

/// Errors raised while building or applying a propagator.
///
/// All of them are local to the evaluation that raised them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlochError {
    #[error("Parameter error: {0}")]
    Core(#[from] CestError),

    #[error("Invalid exchange topology: {what}")]
    Topology { what: String },

    #[error("Pulse-amplitude sequence is empty")]
    EmptyPulse,

    #[error("Singular generator: {what}")]
    SingularGenerator { what: String },

    #[error("Non-finite result in {what}")]
    NonFiniteResult { what: &'static str },
}

pub type BlochResult<T> = Result<T, BlochError>;

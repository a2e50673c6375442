//! Error type for the command-line front-end.

use cest_project::ProjectError;
use cest_sim::SimError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Scenario error: {0}")]
    Project(#[from] ProjectError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("Invalid scenario: {0}")]
    Compile(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

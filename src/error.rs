use thiserror::Error;

/// Fatal failures of the modeling core.
///
/// Absent or partially unreadable upstream payloads are NOT errors: they
/// degrade to missing columns in the feature table. A guardrail FAIL is a
/// status value on the calibration report, not an error either.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("simulation precondition violated: {0}")]
    Simulation(String),

    #[error(transparent)]
    Fetch(#[from] anyhow::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;

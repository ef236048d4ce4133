use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Snapshot or price series failed a hard sanity check; the evaluation is aborted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller-supplied configuration is inconsistent; rejected before any computation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A data collaborator failed to deliver inputs.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl AnalysisError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AnalysisError::Config(msg.into())
    }
}

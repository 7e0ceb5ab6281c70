use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the table pipeline and the regression engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("malformed input: {0}")]
    InputMalformed(String),

    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    #[error("model not fitted: call fit() or load() first")]
    ModelNotFitted,

    #[error("model file not found: {}", .0.display())]
    ModelFileMissing(PathBuf),

    #[error("feature mismatch: model expects {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("stage '{stage}' expected {expected}, got {found}")]
    UnexpectedFrame {
        stage: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("failed to write {}: {message}", .path.display())]
    Persist { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status used by the command-line front end.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InputNotFound(_) => 2,
            Error::InputMalformed(_) => 3,
            Error::EmptyDataset(_) => 4,
            Error::ModelNotFitted => 5,
            Error::ModelFileMissing(_) => 6,
            Error::FeatureMismatch { .. } => 7,
            Error::UnexpectedFrame { .. } | Error::Persist { .. } | Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

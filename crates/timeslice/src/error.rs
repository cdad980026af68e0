//! Error types for timeslice operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimesliceError {
    #[error("Invalid step: {0}")]
    InvalidStep(String),

    #[error("Unbounded slice: {0}")]
    UnboundedSlice(String),
}

pub type Result<T> = std::result::Result<T, TimesliceError>;

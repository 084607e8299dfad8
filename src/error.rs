//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Object store error: {0}")]
    Storage(String),

    #[error("Record store error: {0}")]
    Records(String),

    #[error("Another submission is already in progress")]
    SubmissionInFlight,

    #[error("Submission cancelled")]
    Cancelled,

    #[error("{0} timed out")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

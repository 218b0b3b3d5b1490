//! Error types shared by every module of the crate.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid instance: {0}")]
    InvalidInstance(String),
    #[error("failed to parse TSPLIB data: {0}")]
    Parse(String),
    #[error("invalid tour: {0}")]
    InvalidTour(String),
    #[error("node index {index} out of range for instance with {n} nodes")]
    OutOfRange { index: usize, n: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("cannot select from an empty population")]
    EmptyPopulation,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_instance(message: impl Into<String>) -> Self {
        Self::InvalidInstance(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn invalid_tour(message: impl Into<String>) -> Self {
        Self::InvalidTour(message.into())
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}

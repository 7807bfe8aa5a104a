// src/omnixtracker/omnixerror.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[OMNIXTRACKER]Xyn>=====S===t===u===d===i===o===s======[R|$>

use thiserror::Error;
use tracing::{error, info, warn};

// NTMError covers tensor shapes, numerics and problem configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NTMError {
    #[error("Shape mismatch: expected {expected:?}, actual {actual:?}")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    #[error("A computation error occurred.")]
    ComputationError,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Memory error: {0}")]
    MemoryError(String),

    #[error("Problem {problem} requires at least {required} {kind} bits (currently {actual})")]
    InsufficientBits {
        problem: &'static str,
        kind: &'static str,
        required: usize,
        actual: usize,
    },
}

impl NTMError {
    pub fn shape(expected: &[usize], actual: &[usize]) -> Self {
        NTMError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

impl From<ndarray::ShapeError> for NTMError {
    fn from(err: ndarray::ShapeError) -> Self {
        NTMError::InvalidArgument(format!("incompatible array shape: {}", err))
    }
}

// OmniXError enum for general error handling across the application.
#[derive(Error, Debug)]
pub enum OmniXError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // Integrate NTMError variants into OmniXError
    #[error("Shape mismatch: expected {expected:?}, actual {actual:?}")]
    NTMShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    #[error("A computation error occurred.")]
    NTMComputationError,

    #[error("Invalid argument: {0}")]
    NTMInvalidArgument(String),

    #[error("Memory error: {0}")]
    NTMMemoryError(String),
}

impl OmniXError {
    pub fn log(&self) {
        match self {
            OmniXError::NTMComputationError => {
                error!("{}", self);
            }
            OmniXError::ConfigurationError(_) | OmniXError::ValidationError(_) => {
                warn!("{}", self);
            }
            _ => {
                info!("{}", self);
            }
        }
    }
}

impl From<NTMError> for OmniXError {
    fn from(err: NTMError) -> Self {
        match err {
            NTMError::ShapeMismatch { expected, actual } => OmniXError::NTMShapeMismatch { expected, actual },
            NTMError::ComputationError => OmniXError::NTMComputationError,
            NTMError::InvalidArgument(msg) => OmniXError::NTMInvalidArgument(msg),
            NTMError::MemoryError(msg) => OmniXError::NTMMemoryError(msg),
            bits @ NTMError::InsufficientBits { .. } => OmniXError::ConfigurationError(bits.to_string()),
        }
    }
}

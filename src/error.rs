//! Error types.
//!
//! - `ForecastError`: typed failures of the modeling core (preprocessing,
//!   fitting, sampling, aggregation). Always local and synchronous.
//! - `AppError`: what the binary reports, carrying a process exit code.

use thiserror::Error;

/// Errors raised by the forecasting core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The input series has no observations at all.
    #[error("Empty input: the series has no observations")]
    EmptyInput,

    /// Not enough observed points to estimate parameters.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// `sample` was called on a model that has never been fitted.
    #[error("Model must be fitted before sampling")]
    ModelNotFitted,

    /// A numeric parameter is outside its allowed range.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Input or estimated values make the model undefined.
    #[error("Numerical degeneracy: {0}")]
    NumericalDegeneracy(String),
}

impl ForecastError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ForecastError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let exit_code = match err {
            ForecastError::InvalidArgument { .. } => 2,
            ForecastError::EmptyInput | ForecastError::InsufficientData { .. } => 3,
            ForecastError::ModelNotFitted | ForecastError::NumericalDegeneracy(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

//! Solver error handling
//!
//! One error type for the whole crate. Subsystems attach context through
//! [`GpuErrorContext`] instead of calling `unwrap()` on foreign results.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Invalid grid: {reason}")]
    InvalidGrid { reason: String },

    #[error("Grid dimensions ({nx}, {ny}) and data length {actual} do not match (expected {expected})")]
    DimensionMismatch {
        nx: u32,
        ny: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown generation method '{0}'")]
    UnknownInitialCondition(String),

    #[error("Invalid initial condition: {0}")]
    InvalidInitialCondition(String),

    #[error("Invalid time step: {0}")]
    InvalidTimeStep(f32),

    #[error("Pass schema '{pass}' is invalid: {reason}")]
    PassSchema { pass: &'static str, reason: String },

    #[error("Shader preprocessing failed: {0}")]
    ShaderPreprocess(String),

    #[error("No suitable GPU adapter found")]
    AdapterUnavailable,

    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(String),

    #[error("Failed to map readback buffer: {0}")]
    BufferMap(String),

    #[error("GPU operation '{operation}' failed: {error}")]
    GpuOperationFailed { operation: String, error: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the crate
pub type SolverResult<T> = Result<T, SolverError>;

/// Error context for GPU operations
pub trait GpuErrorContext<T> {
    fn gpu_context(self, operation: &str) -> SolverResult<T>;
}

impl<T, E> GpuErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn gpu_context(self, operation: &str) -> SolverResult<T> {
        self.map_err(|e| SolverError::GpuOperationFailed {
            operation: operation.to_string(),
            error: e.to_string(),
        })
    }
}

impl<T> GpuErrorContext<T> for Option<T> {
    fn gpu_context(self, operation: &str) -> SolverResult<T> {
        self.ok_or_else(|| SolverError::GpuOperationFailed {
            operation: operation.to_string(),
            error: "resource unavailable".to_string(),
        })
    }
}

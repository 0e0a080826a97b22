//! Pass, pipeline and configuration errors
//!
//! These are internal-consistency faults, distinct from the user-facing
//! diagnostics collected in [`crate::Problems`]. They are always fatal.

use jolt_ast::Span;
use thiserror::Error;

pub type PassResult<T> = Result<T, PassError>;

#[derive(Debug, Error)]
pub enum PassError {
    #[error("Internal consistency error in pass '{pass}' at {span}: {message}")]
    InternalConsistency {
        pass: &'static str,
        message: String,
        span: Span,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Pass '{pass}' failed on unit '{unit}': {source}")]
    PassFailed {
        pass: &'static str,
        unit: String,
        #[source]
        source: PassError,
    },

    #[error("Pipeline worker panicked while processing units")]
    WorkerPanicked,
}

/// Errors that can occur while loading backend configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

//! Jolt normalization passes
//!
//! Passes rewrite type-checked compilation units into the shape the backend
//! emitter expects. This crate provides:
//! - the [`NormalizationPass`] abstraction and the [`Pipeline`] that runs
//!   passes over many units, optionally in parallel
//! - [`ConversionContextVisitor`], which reports every place a value flows
//!   into a typed slot
//! - [`InsertNotNullAssertions`] and [`VerifyTreeShape`]
//! - diagnostics and configuration

pub mod config;
pub mod conversion;
pub mod diagnostic;
pub mod error;
pub mod not_null;
pub mod pass;
pub mod pipeline;
pub mod verify;

pub use config::{BackendConfig, PassKind, PipelineConfig};
pub use conversion::{ContextRewriter, ConversionContextVisitor, ConversionSite};
pub use diagnostic::{Diagnostic, ErrorCode, Problems, Severity};
pub use error::{ConfigError, PassError, PassResult, PipelineError};
pub use not_null::{
    insert_elvis_if_needed, insert_not_null_assertion_if_needed, is_inferred_as_non_null,
    InsertNotNullAssertions,
};
pub use pass::{NormalizationPass, PassContext};
pub use pipeline::{run, Pipeline, PipelineOutput};
pub use verify::VerifyTreeShape;

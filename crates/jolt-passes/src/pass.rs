//! The normalization pass abstraction

use std::sync::Arc;

use jolt_ast::CompilationUnit;
use jolt_types::TypeContext;

use crate::diagnostic::Problems;
use crate::error::PassResult;

/// A stateless transformation over one compilation unit.
///
/// Passes are shared between pipeline workers, so per-run state lives in the
/// rewriters a pass builds inside `apply_to`, never in the pass itself.
pub trait NormalizationPass: Send + Sync {
    /// Stable name used in logs and errors
    fn name(&self) -> &'static str;

    /// Rewrite `unit`, recording user diagnostics in `ctx`
    fn apply_to(&self, unit: CompilationUnit, ctx: &mut PassContext) -> PassResult<CompilationUnit>;
}

/// Per-unit state threaded through every pass of a pipeline run
#[derive(Debug)]
pub struct PassContext {
    unit_name: String,
    types: Arc<TypeContext>,
    problems: Problems,
}

impl PassContext {
    pub fn new(unit_name: impl Into<String>, types: Arc<TypeContext>) -> Self {
        Self {
            unit_name: unit_name.into(),
            types,
            problems: Problems::new(),
        }
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Shared type interner for the compilation
    pub fn types(&self) -> &TypeContext {
        &self.types
    }

    pub fn problems(&self) -> &Problems {
        &self.problems
    }

    pub fn problems_mut(&mut self) -> &mut Problems {
        &mut self.problems
    }

    pub fn into_problems(self) -> Problems {
        self.problems
    }
}

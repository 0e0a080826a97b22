//! Jolt typed AST
//!
//! The tree handed to the backend after type checking: compilation units,
//! type declarations, statements and expressions, all carrying resolved
//! descriptors from `jolt_types`. Nodes own their children, so the tree is
//! acyclic and `Clone` yields an independent subtree.
//!
//! Two traversal styles are provided:
//! - [`Visitor`] for read-only analysis
//! - [`Rewriter`] for owning, post-order rewriting

pub mod expression;
pub mod rewrite;
pub mod span;
pub mod statement;
pub mod unit;
pub mod variable;
pub mod visitor;

pub use expression::*;
pub use rewrite::*;
pub use span::Span;
pub use statement::*;
pub use unit::*;
pub use variable::{Variable, VariableId};
pub use visitor::*;

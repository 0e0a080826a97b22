//! Jolt Type System
//!
//! Resolved type and member descriptors consumed by the backend passes and
//! the type layout resolver. Everything in this crate is immutable once
//! built and cheap to clone.

#![warn(missing_docs)]

pub mod context;
pub mod descriptor;
pub mod members;
pub mod well_known;

pub use context::TypeContext;
pub use descriptor::{
    ArrayTypeDescriptor, DeclaredTypeDescriptor, Nullability, PrimitiveType, TypeData,
    TypeDescriptor, TypeKind, TypeVariable, TypeVariableKind,
};
pub use members::{FieldDescriptor, MethodDescriptor, Visibility};
pub use well_known::{well_known, WellKnownTypes};

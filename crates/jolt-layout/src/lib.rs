//! Jolt type layout
//!
//! Computes the struct field order and dispatch table of every class the
//! backend emits. Layouts build on their superclass layout and are cached in
//! a [`LayoutResolver`] shared across codegen threads.

pub mod class_info;
pub mod error;
pub mod layout;
pub mod resolver;

pub use class_info::ClassInfo;
pub use error::{LayoutError, LayoutResult};
pub use layout::{FieldSlot, LayoutDescription, TypeLayout, VtableSlot};
pub use resolver::LayoutResolver;

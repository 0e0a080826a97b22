//! Layout resolution errors

use thiserror::Error;

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Array type {type_name} breaks the elements field convention: {message}")]
    ArrayElementsField { type_name: String, message: String },

    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    #[error("Cyclic inheritance: {}", .chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },
}

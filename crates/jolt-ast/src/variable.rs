//! Local variables and parameters

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use jolt_types::TypeDescriptor;

static NEXT_VARIABLE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(u32);

impl VariableId {
    /// Allocate a fresh id
    pub fn fresh() -> Self {
        VariableId(NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A local variable or parameter
///
/// Variables are identified by [`VariableId`]; two variables with the same
/// name and type are still different variables.
#[derive(Debug, Clone)]
pub struct Variable {
    id: VariableId,
    name: Arc<str>,
    type_descriptor: TypeDescriptor,
    is_final: bool,
    is_parameter: bool,
}

impl Variable {
    /// Create a mutable local variable with a fresh id
    pub fn new(name: impl Into<Arc<str>>, type_descriptor: TypeDescriptor) -> Self {
        Self {
            id: VariableId::fresh(),
            name: name.into(),
            type_descriptor,
            is_final: false,
            is_parameter: false,
        }
    }

    /// Create a method parameter with a fresh id
    pub fn parameter(name: impl Into<Arc<str>>, type_descriptor: TypeDescriptor) -> Self {
        Self {
            is_parameter: true,
            ..Self::new(name, type_descriptor)
        }
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_parameter(&self) -> bool {
        self.is_parameter
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_unique() {
        let ty = TypeDescriptor::class("java.lang.String");
        let a = Variable::new("x", ty.clone());
        let b = Variable::new("x", ty);
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_parameter_flag() {
        let p = Variable::parameter("p", TypeDescriptor::class("java.lang.Object"));
        assert!(p.is_parameter());
        assert!(!p.is_final());
    }
}

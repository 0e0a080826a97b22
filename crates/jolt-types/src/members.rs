//! Field and method descriptors
//!
//! Descriptors are immutable handles identifying a member by its enclosing
//! type and name. Members of parameterized types keep a link to the
//! unspecialized *declaration descriptor*, which is where declared parameter,
//! return and field types come from.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{DeclaredTypeDescriptor, TypeDescriptor};
use crate::well_known::{self, GET_CLASS_IMPL};

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// `public`
    #[default]
    Public,
    /// `protected`
    Protected,
    /// Package-private
    Package,
    /// `private`
    Private,
}

/// Immutable handle to a field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    enclosing: DeclaredTypeDescriptor,
    name: Arc<str>,
    type_descriptor: TypeDescriptor,
    is_static: bool,
    is_final: bool,
    declaration: Option<Arc<FieldDescriptor>>,
}

impl FieldDescriptor {
    /// Create an instance field
    pub fn new(
        enclosing: DeclaredTypeDescriptor,
        name: impl Into<Arc<str>>,
        type_descriptor: TypeDescriptor,
    ) -> Self {
        Self {
            enclosing,
            name: name.into(),
            type_descriptor,
            is_static: false,
            is_final: false,
            declaration: None,
        }
    }

    /// Mark the field static
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Mark the field final
    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    /// Attach the unspecialized declaration this field was specialized from
    pub fn with_declaration(mut self, declaration: FieldDescriptor) -> Self {
        self.declaration = Some(Arc::new(declaration));
        self
    }

    /// Type declaring the field
    pub fn enclosing_type(&self) -> &DeclaredTypeDescriptor {
        &self.enclosing
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type as seen at this (possibly specialized) reference
    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    /// Whether the field is static
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the field is final
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// The unspecialized declaration, or `self` when this is the declaration
    pub fn declaration_descriptor(&self) -> &FieldDescriptor {
        match &self.declaration {
            Some(declaration) => declaration,
            None => self,
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enclosing.qualified_name(), self.name)
    }
}

/// Immutable handle to a method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    enclosing: DeclaredTypeDescriptor,
    name: Arc<str>,
    parameter_types: Vec<TypeDescriptor>,
    return_type: TypeDescriptor,
    visibility: Visibility,
    is_static: bool,
    is_abstract: bool,
    is_synthetic: bool,
    is_constructor: bool,
    declaration: Option<Arc<MethodDescriptor>>,
}

impl MethodDescriptor {
    /// Create a public instance method
    pub fn new(
        enclosing: DeclaredTypeDescriptor,
        name: impl Into<Arc<str>>,
        parameter_types: Vec<TypeDescriptor>,
        return_type: TypeDescriptor,
    ) -> Self {
        Self {
            enclosing,
            name: name.into(),
            parameter_types,
            return_type,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_synthetic: false,
            is_constructor: false,
            declaration: None,
        }
    }

    /// Create a constructor of `enclosing`
    pub fn constructor(enclosing: DeclaredTypeDescriptor, parameter_types: Vec<TypeDescriptor>) -> Self {
        let mut ctor = Self::new(
            enclosing,
            "<init>",
            parameter_types,
            TypeDescriptor::primitive(crate::PrimitiveType::Void),
        );
        ctor.is_constructor = true;
        ctor
    }

    /// The synthetic `$getClassImpl` override every class carries in its
    /// dispatch table, enclosed by `enclosing`.
    pub fn get_class_impl(enclosing: DeclaredTypeDescriptor) -> Self {
        let class_type = well_known::well_known().java_lang_class.to_non_nullable();
        Self::new(enclosing, GET_CLASS_IMPL, Vec::new(), class_type).with_synthetic(true)
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the method static
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Mark the method abstract
    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Mark the method compiler-synthesized
    pub fn with_synthetic(mut self, is_synthetic: bool) -> Self {
        self.is_synthetic = is_synthetic;
        self
    }

    /// Attach the unspecialized declaration this method was specialized from
    pub fn with_declaration(mut self, declaration: MethodDescriptor) -> Self {
        self.declaration = Some(Arc::new(declaration));
        self
    }

    /// Retarget the descriptor to another enclosing type
    pub fn with_enclosing_type(mut self, enclosing: DeclaredTypeDescriptor) -> Self {
        self.enclosing = enclosing;
        self
    }

    /// Type declaring the method
    pub fn enclosing_type(&self) -> &DeclaredTypeDescriptor {
        &self.enclosing
    }

    /// Method name (`<init>` for constructors)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter types at this (possibly specialized) reference
    pub fn parameter_types(&self) -> &[TypeDescriptor] {
        &self.parameter_types
    }

    /// Return type at this (possibly specialized) reference
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// Visibility
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the method is private
    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// Whether the method is static
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the method is abstract
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Whether the method was synthesized by the compiler
    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }

    /// Whether this is a constructor
    pub fn is_constructor(&self) -> bool {
        self.is_constructor
    }

    /// Whether calls to this method dispatch through the vtable
    pub fn is_polymorphic(&self) -> bool {
        !self.is_static && !self.is_constructor && !self.is_private()
    }

    /// The unspecialized declaration, or `self` when this is the declaration
    pub fn declaration_descriptor(&self) -> &MethodDescriptor {
        match &self.declaration {
            Some(declaration) => declaration,
            None => self,
        }
    }

    /// Name used for the method's vtable slot and target symbol.
    ///
    /// Built from the declaration's erased parameter types, so a method and
    /// every override of it share one mangled name. The return type is not
    /// part of the name.
    pub fn mangled_name(&self) -> String {
        let declaration = self.declaration_descriptor();
        let mut mangled = if self.is_constructor {
            String::from("ctor")
        } else {
            format!("m_{}", self.name)
        };
        for parameter in declaration.parameter_types() {
            mangled.push_str("__");
            mangled.push_str(&parameter.mangled_erasure());
        }
        if self.is_private() {
            mangled.push_str("_$p_");
            mangled.push_str(&self.enclosing.qualified_name().replace('.', "_"));
        }
        mangled
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.enclosing.qualified_name(), self.name)?;
        for (i, parameter) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", parameter)?;
        }
        write!(f, ")")
    }
}

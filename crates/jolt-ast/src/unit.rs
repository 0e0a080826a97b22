//! Compilation units and type declarations

use jolt_types::{DeclaredTypeDescriptor, FieldDescriptor, MethodDescriptor};

use crate::expression::Expression;
use crate::span::Span;
use crate::statement::Block;
use crate::variable::Variable;

/// A source file's worth of type declarations
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub name: String,
    pub types: Vec<TypeDeclaration>,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>, types: Vec<TypeDeclaration>) -> Self {
        Self {
            name: name.into(),
            types,
        }
    }
}

/// Class or interface declaration
///
/// Interfaces contribute to dispatch only; they never add fields to a
/// layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub descriptor: DeclaredTypeDescriptor,
    pub superclass: Option<DeclaredTypeDescriptor>,
    pub interfaces: Vec<DeclaredTypeDescriptor>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub span: Span,
}

impl TypeDeclaration {
    pub fn new(descriptor: DeclaredTypeDescriptor) -> Self {
        Self {
            descriptor,
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_superclass(mut self, superclass: DeclaredTypeDescriptor) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_interface(mut self, interface: DeclaredTypeDescriptor) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn qualified_name(&self) -> &str {
        self.descriptor.qualified_name()
    }

    pub fn is_interface(&self) -> bool {
        self.descriptor.is_interface()
    }

    /// Non-static fields in declaration order
    pub fn instance_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.descriptor.is_static())
    }

    /// Methods dispatched through the vtable, in declaration order
    pub fn polymorphic_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods
            .iter()
            .map(|m| &m.descriptor)
            .filter(|d| d.is_polymorphic())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub descriptor: FieldDescriptor,
    pub initializer: Option<Expression>,
    pub span: Span,
}

impl Field {
    pub fn new(descriptor: FieldDescriptor) -> Self {
        Self {
            descriptor,
            initializer: None,
            span: Span::default(),
        }
    }

    pub fn with_initializer(mut self, initializer: Expression) -> Self {
        self.initializer = Some(initializer);
        self
    }
}

/// Method or constructor; `body` is `None` for abstract and native methods
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub descriptor: MethodDescriptor,
    pub parameters: Vec<Variable>,
    pub body: Option<Block>,
    pub span: Span,
}

impl Method {
    pub fn new(descriptor: MethodDescriptor, parameters: Vec<Variable>, body: Option<Block>) -> Self {
        Self {
            descriptor,
            parameters,
            body,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

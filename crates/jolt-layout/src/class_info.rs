//! Declaration-level class summaries
//!
//! A [`ClassInfo`] is everything the layout resolver needs to know about a
//! class: its supertypes, instance fields and dispatchable methods, in
//! declaration order. Method bodies are not part of it, so summaries stay
//! valid while passes rewrite the tree.

use jolt_ast::TypeDeclaration;
use jolt_types::{DeclaredTypeDescriptor, FieldDescriptor, MethodDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    descriptor: DeclaredTypeDescriptor,
    superclass: Option<DeclaredTypeDescriptor>,
    interfaces: Vec<DeclaredTypeDescriptor>,
    instance_fields: Vec<FieldDescriptor>,
    polymorphic_methods: Vec<MethodDescriptor>,
}

impl ClassInfo {
    pub fn new(descriptor: DeclaredTypeDescriptor) -> Self {
        Self {
            descriptor,
            superclass: None,
            interfaces: Vec::new(),
            instance_fields: Vec::new(),
            polymorphic_methods: Vec::new(),
        }
    }

    /// Summarize a type declaration
    pub fn from_declaration(decl: &TypeDeclaration) -> Self {
        Self {
            descriptor: decl.descriptor.clone(),
            superclass: decl.superclass.clone(),
            interfaces: decl.interfaces.clone(),
            instance_fields: decl.instance_fields().map(|f| f.descriptor.clone()).collect(),
            polymorphic_methods: decl.polymorphic_methods().cloned().collect(),
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

    /// Add an instance field; static fields are ignored
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        if !field.is_static() {
            self.instance_fields.push(field);
        }
        self
    }

    /// Add a method; only polymorphic methods are kept
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        if method.is_polymorphic() {
            self.polymorphic_methods.push(method);
        }
        self
    }

    pub fn descriptor(&self) -> &DeclaredTypeDescriptor {
        &self.descriptor
    }

    pub fn qualified_name(&self) -> &str {
        self.descriptor.qualified_name()
    }

    pub fn is_interface(&self) -> bool {
        self.descriptor.is_interface()
    }

    pub fn superclass(&self) -> Option<&DeclaredTypeDescriptor> {
        self.superclass.as_ref()
    }

    pub fn interfaces(&self) -> &[DeclaredTypeDescriptor] {
        &self.interfaces
    }

    /// Fields declared by this class, excluding inherited ones
    pub fn instance_fields(&self) -> &[FieldDescriptor] {
        &self.instance_fields
    }

    /// Dispatchable methods declared by this class
    pub fn polymorphic_methods(&self) -> &[MethodDescriptor] {
        &self.polymorphic_methods
    }
}

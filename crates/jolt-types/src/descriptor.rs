//! Core type descriptors
//!
//! A [`TypeDescriptor`] is a shared handle to a [`TypeData`] value. Descriptors
//! compare structurally, so two descriptors built independently for the same
//! declared type are equal. Nullability is part of a descriptor's identity:
//! `java.lang.String` and `java.lang.String?` are different descriptors.

use std::fmt;
use std::sync::Arc;

/// Primitive types of the source language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `void` (method return type only)
    Void,
}

impl PrimitiveType {
    /// Source-level name of the primitive
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }

    /// Qualified name of the wrapper class. `void` has none.
    pub fn boxed_name(&self) -> Option<&'static str> {
        match self {
            PrimitiveType::Boolean => Some("java.lang.Boolean"),
            PrimitiveType::Byte => Some("java.lang.Byte"),
            PrimitiveType::Short => Some("java.lang.Short"),
            PrimitiveType::Char => Some("java.lang.Character"),
            PrimitiveType::Int => Some("java.lang.Integer"),
            PrimitiveType::Long => Some("java.lang.Long"),
            PrimitiveType::Float => Some("java.lang.Float"),
            PrimitiveType::Double => Some("java.lang.Double"),
            PrimitiveType::Void => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Kind of a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A class (including enums and records)
    Class,
    /// An interface
    Interface,
}

/// Nullability annotation of a type variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullability {
    /// Explicitly nullable (`T?`)
    Nullable,
    /// Explicitly annotated non-nullable
    NonNullable,
    /// No annotation: nullability follows the upper bound
    Parametric,
}

/// Origin of a type variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeVariableKind {
    /// Declared type parameter of a class or method
    Declared,
    /// Wildcard (`?`, `? extends T`)
    Wildcard,
    /// Capture of a wildcard produced by inference
    Capture,
}

/// Reference to a class or interface
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredTypeDescriptor {
    qualified_name: Arc<str>,
    kind: TypeKind,
    type_arguments: Vec<TypeDescriptor>,
    nullable: bool,
}

impl DeclaredTypeDescriptor {
    /// Create a nullable reference to a class
    pub fn class(qualified_name: impl Into<Arc<str>>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind: TypeKind::Class,
            type_arguments: Vec::new(),
            nullable: true,
        }
    }

    /// Create a nullable reference to an interface
    pub fn interface(qualified_name: impl Into<Arc<str>>) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::class(qualified_name)
        }
    }

    /// Set the type arguments
    pub fn with_type_arguments(mut self, type_arguments: Vec<TypeDescriptor>) -> Self {
        self.type_arguments = type_arguments;
        self
    }

    /// Set the nullability bit
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Fully qualified name, e.g. `java.lang.String`
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Shared handle to the qualified name
    pub fn qualified_name_arc(&self) -> &Arc<str> {
        &self.qualified_name
    }

    /// Simple name (last segment of the qualified name)
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Class or interface
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Whether this refers to an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Type arguments of a parameterized reference
    pub fn type_arguments(&self) -> &[TypeDescriptor] {
        &self.type_arguments
    }

    /// Whether values of this type may be null
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether both descriptors name the same declaration, ignoring
    /// type arguments and nullability
    pub fn same_declaration(&self, other: &DeclaredTypeDescriptor) -> bool {
        self.qualified_name == other.qualified_name
    }

    /// Wrap into a general type descriptor
    pub fn to_type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::new(TypeData::Declared(self.clone()))
    }
}

/// Array type `component[]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayTypeDescriptor {
    component: TypeDescriptor,
    nullable: bool,
}

impl ArrayTypeDescriptor {
    /// Element type of the array
    pub fn component_type(&self) -> &TypeDescriptor {
        &self.component
    }

    /// Whether the array reference may be null
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// Type variable, wildcard or capture
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVariable {
    name: Arc<str>,
    kind: TypeVariableKind,
    upper_bound: TypeDescriptor,
    nullability: Nullability,
}

impl TypeVariable {
    /// Create a declared type parameter with the given bound
    pub fn new(name: impl Into<Arc<str>>, upper_bound: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            kind: TypeVariableKind::Declared,
            upper_bound,
            nullability: Nullability::Parametric,
        }
    }

    /// Set the origin of the variable
    pub fn with_kind(mut self, kind: TypeVariableKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the nullability annotation
    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    /// Name of the variable
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared, wildcard or capture
    pub fn kind(&self) -> TypeVariableKind {
        self.kind
    }

    /// Upper bound used for erasure
    pub fn upper_bound(&self) -> &TypeDescriptor {
        &self.upper_bound
    }

    /// Nullability annotation
    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    /// Whether this variable comes from a wildcard or a capture
    pub fn is_wildcard_or_capture(&self) -> bool {
        matches!(
            self.kind,
            TypeVariableKind::Wildcard | TypeVariableKind::Capture
        )
    }

    /// Whether the variable carries an explicit non-null annotation
    pub fn is_annotated_non_nullable(&self) -> bool {
        self.nullability == Nullability::NonNullable
    }

    /// Whether values of this variable may be null
    pub fn can_be_null(&self) -> bool {
        match self.nullability {
            Nullability::Nullable => true,
            Nullability::NonNullable => false,
            Nullability::Parametric => self.upper_bound.can_be_null(),
        }
    }
}

/// The structure behind a [`TypeDescriptor`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Primitive type
    Primitive(PrimitiveType),
    /// Class or interface reference
    Declared(DeclaredTypeDescriptor),
    /// Array type
    Array(ArrayTypeDescriptor),
    /// Type variable, wildcard or capture
    TypeVariable(TypeVariable),
    /// Type of the `null` literal
    Null,
}

/// Canonical static type of an expression, field or method
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor(Arc<TypeData>);

impl TypeDescriptor {
    /// Wrap type data into a descriptor
    pub fn new(data: TypeData) -> Self {
        TypeDescriptor(Arc::new(data))
    }

    pub(crate) fn from_arc(data: Arc<TypeData>) -> Self {
        TypeDescriptor(data)
    }

    pub(crate) fn arc(&self) -> &Arc<TypeData> {
        &self.0
    }

    /// Primitive type descriptor
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Self::new(TypeData::Primitive(primitive))
    }

    /// Nullable reference to the class `qualified_name`
    pub fn class(qualified_name: impl Into<Arc<str>>) -> Self {
        DeclaredTypeDescriptor::class(qualified_name).to_type_descriptor()
    }

    /// Nullable reference to the interface `qualified_name`
    pub fn interface(qualified_name: impl Into<Arc<str>>) -> Self {
        DeclaredTypeDescriptor::interface(qualified_name).to_type_descriptor()
    }

    /// Array of `component`
    pub fn array(component: TypeDescriptor, nullable: bool) -> Self {
        Self::new(TypeData::Array(ArrayTypeDescriptor {
            component,
            nullable,
        }))
    }

    /// Type variable descriptor
    pub fn type_variable(variable: TypeVariable) -> Self {
        Self::new(TypeData::TypeVariable(variable))
    }

    /// Type of the `null` literal
    pub fn null_type() -> Self {
        Self::new(TypeData::Null)
    }

    /// Borrow the underlying structure
    pub fn data(&self) -> &TypeData {
        &self.0
    }

    /// Whether a value of this type may be null
    pub fn can_be_null(&self) -> bool {
        match self.data() {
            TypeData::Primitive(_) => false,
            TypeData::Declared(declared) => declared.is_nullable(),
            TypeData::Array(array) => array.is_nullable(),
            TypeData::TypeVariable(variable) => variable.can_be_null(),
            TypeData::Null => true,
        }
    }

    /// Same type with the nullability bit set
    pub fn to_nullable(&self) -> TypeDescriptor {
        self.with_nullability(true)
    }

    /// Same type with the nullability bit cleared
    pub fn to_non_nullable(&self) -> TypeDescriptor {
        self.with_nullability(false)
    }

    fn with_nullability(&self, nullable: bool) -> TypeDescriptor {
        let data = match self.data() {
            TypeData::Primitive(_) | TypeData::Null => return self.clone(),
            TypeData::Declared(declared) => {
                if declared.is_nullable() == nullable {
                    return self.clone();
                }
                TypeData::Declared(declared.clone().with_nullable(nullable))
            }
            TypeData::Array(array) => {
                if array.nullable == nullable {
                    return self.clone();
                }
                TypeData::Array(ArrayTypeDescriptor {
                    component: array.component.clone(),
                    nullable,
                })
            }
            TypeData::TypeVariable(variable) => {
                let nullability = if nullable {
                    Nullability::Nullable
                } else {
                    Nullability::NonNullable
                };
                if variable.nullability == nullability {
                    return self.clone();
                }
                TypeData::TypeVariable(variable.clone().with_nullability(nullability))
            }
        };
        TypeDescriptor::new(data)
    }

    /// Whether this is a primitive type
    pub fn is_primitive(&self) -> bool {
        matches!(self.data(), TypeData::Primitive(_))
    }

    /// Whether this is the primitive `void`
    pub fn is_primitive_void(&self) -> bool {
        matches!(self.data(), TypeData::Primitive(PrimitiveType::Void))
    }

    /// Whether this is the boxed `java.lang.Void` pseudo-type
    pub fn is_java_lang_void(&self) -> bool {
        self.is_declared(crate::well_known::JAVA_LANG_VOID)
    }

    /// Primitive wrapped by this type, if it is one of the wrapper classes
    pub fn unboxed_primitive(&self) -> Option<PrimitiveType> {
        const BOXABLE: [PrimitiveType; 8] = [
            PrimitiveType::Boolean,
            PrimitiveType::Byte,
            PrimitiveType::Short,
            PrimitiveType::Char,
            PrimitiveType::Int,
            PrimitiveType::Long,
            PrimitiveType::Float,
            PrimitiveType::Double,
        ];
        let declared = self.as_declared()?;
        BOXABLE
            .into_iter()
            .find(|p| p.boxed_name() == Some(declared.qualified_name()))
    }

    /// Whether this is a reference to the declared type `qualified_name`
    pub fn is_declared(&self, qualified_name: &str) -> bool {
        matches!(self.data(), TypeData::Declared(d) if d.qualified_name() == qualified_name)
    }

    /// Whether this is a type variable, wildcard or capture
    pub fn is_type_variable(&self) -> bool {
        matches!(self.data(), TypeData::TypeVariable(_))
    }

    /// Whether this is the type of the `null` literal
    pub fn is_null_type(&self) -> bool {
        matches!(self.data(), TypeData::Null)
    }

    /// Whether this is a wildcard or capture annotated as non-nullable.
    ///
    /// Such variables report `can_be_null() == false` but some consumers of the
    /// generated code still see them as nullable.
    pub fn is_wildcard_or_capture_annotated_non_nullable(&self) -> bool {
        match self.data() {
            TypeData::TypeVariable(variable) => {
                variable.is_wildcard_or_capture() && variable.is_annotated_non_nullable()
            }
            _ => false,
        }
    }

    /// The declared type, if this is a class or interface reference
    pub fn as_declared(&self) -> Option<&DeclaredTypeDescriptor> {
        match self.data() {
            TypeData::Declared(declared) => Some(declared),
            _ => None,
        }
    }

    /// Erased source name: type variables erase to their bound and type
    /// arguments are dropped
    pub fn erased_name(&self) -> String {
        match self.data() {
            TypeData::Primitive(primitive) => primitive.type_name().to_string(),
            TypeData::Declared(declared) => declared.qualified_name().to_string(),
            TypeData::Array(array) => format!("{}[]", array.component.erased_name()),
            TypeData::TypeVariable(variable) => variable.upper_bound.erased_name(),
            TypeData::Null => crate::well_known::JAVA_LANG_OBJECT.to_string(),
        }
    }

    /// Erased name in identifier-safe form, used in mangled member names
    pub fn mangled_erasure(&self) -> String {
        self.erased_name().replace("[]", "_$array").replace('.', "_")
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data() {
            TypeData::Primitive(primitive) => write!(f, "{}", primitive),
            TypeData::Declared(declared) => {
                write!(f, "{}", declared.qualified_name())?;
                if !declared.type_arguments().is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in declared.type_arguments().iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                if declared.is_nullable() {
                    write!(f, "?")?;
                }
                Ok(())
            }
            TypeData::Array(array) => {
                write!(f, "{}[]", array.component)?;
                if array.nullable {
                    write!(f, "?")?;
                }
                Ok(())
            }
            TypeData::TypeVariable(variable) => {
                match variable.kind {
                    TypeVariableKind::Declared => write!(f, "{}", variable.name)?,
                    TypeVariableKind::Wildcard => write!(f, "? extends {}", variable.upper_bound)?,
                    TypeVariableKind::Capture => write!(f, "capture of {}", variable.name)?,
                }
                match variable.nullability {
                    Nullability::Nullable => write!(f, "?"),
                    Nullability::NonNullable => write!(f, "!"),
                    Nullability::Parametric => Ok(()),
                }
            }
            TypeData::Null => write!(f, "null"),
        }
    }
}

impl From<DeclaredTypeDescriptor> for TypeDescriptor {
    fn from(declared: DeclaredTypeDescriptor) -> Self {
        TypeDescriptor::new(TypeData::Declared(declared))
    }
}

impl From<PrimitiveType> for TypeDescriptor {
    fn from(primitive: PrimitiveType) -> Self {
        TypeDescriptor::primitive(primitive)
    }
}

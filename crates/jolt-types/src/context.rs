//! Type context for interning type descriptors
//!
//! Interning makes equal descriptors share one allocation. It is purely a
//! storage optimization: descriptor equality is structural and never depends
//! on whether two values went through the same context.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::descriptor::{DeclaredTypeDescriptor, PrimitiveType, TypeData, TypeDescriptor};
use crate::well_known::{well_known, WellKnownTypes};

/// Shared, thread-safe interner for [`TypeDescriptor`]s
#[derive(Debug, Default)]
pub struct TypeContext {
    interned: RwLock<FxHashSet<Arc<TypeData>>>,
}

impl TypeContext {
    /// Create a context with the primitive and well-known types pre-interned
    pub fn new() -> Self {
        let ctx = TypeContext {
            interned: RwLock::new(FxHashSet::default()),
        };

        for primitive in [
            PrimitiveType::Boolean,
            PrimitiveType::Int,
            PrimitiveType::Long,
            PrimitiveType::Double,
            PrimitiveType::Void,
        ] {
            ctx.intern(TypeDescriptor::primitive(primitive));
        }
        let known = well_known();
        ctx.intern(known.java_lang_object.clone());
        ctx.intern(known.java_lang_string.clone());
        ctx.intern(known.java_lang_void.clone());
        ctx
    }

    /// Intern a descriptor, returning the canonical shared copy
    pub fn intern(&self, ty: TypeDescriptor) -> TypeDescriptor {
        if let Some(existing) = self.interned.read().get(ty.arc()) {
            return TypeDescriptor::from_arc(Arc::clone(existing));
        }

        let mut interned = self.interned.write();
        // Another writer may have won the race between the two locks.
        if let Some(existing) = interned.get(ty.arc()) {
            return TypeDescriptor::from_arc(Arc::clone(existing));
        }
        interned.insert(Arc::clone(ty.arc()));
        ty
    }

    /// Interned nullable reference to the class `qualified_name`
    pub fn class(&self, qualified_name: &str) -> TypeDescriptor {
        self.intern(DeclaredTypeDescriptor::class(qualified_name).to_type_descriptor())
    }

    /// Interned primitive type
    pub fn primitive(&self, primitive: PrimitiveType) -> TypeDescriptor {
        self.intern(TypeDescriptor::primitive(primitive))
    }

    /// Interned nullable variant of `ty`
    pub fn nullable(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        self.intern(ty.to_nullable())
    }

    /// Interned non-nullable variant of `ty`
    pub fn non_nullable(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        self.intern(ty.to_non_nullable())
    }

    /// Well-known types used by the backend
    pub fn well_known(&self) -> &'static WellKnownTypes {
        well_known()
    }

    /// Number of distinct descriptors interned so far
    pub fn len(&self) -> usize {
        self.interned.read().len()
    }

    /// Whether nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.interned.read().is_empty()
    }
}

//! Struct and vtable layout of a single class
//!
//! Field order is the supertype's fields followed by the class's own, so a
//! subclass struct is always a prefix-extension of its parent. Dispatch
//! slots work the same way: inherited slots keep their position, overrides
//! replace the implementation in place, and new methods are appended.

use std::sync::Arc;

use indexmap::IndexMap;
use jolt_types::well_known::{is_wasm_array_subtype, ARRAY_ELEMENTS_FIELD};
use jolt_types::{FieldDescriptor, MethodDescriptor};
use serde::{Deserialize, Serialize};

use crate::class_info::ClassInfo;
use crate::error::{LayoutError, LayoutResult};

/// Resolved layout of one class or interface
#[derive(Debug)]
pub struct TypeLayout {
    java_type: Arc<ClassInfo>,
    supertype_layout: Option<Arc<TypeLayout>>,
    instance_fields: Vec<FieldDescriptor>,
    methods_by_mangled_name: IndexMap<String, MethodDescriptor>,
}

impl TypeLayout {
    /// Compute the layout of `java_type` on top of its superclass layout.
    ///
    /// Direct subclasses of the array container redeclare the `elements` field with
    /// a specialized type: the inherited copy is dropped and the redeclared
    /// one takes its place at the end of the inherited fields.
    pub fn create(
        java_type: Arc<ClassInfo>,
        supertype_layout: Option<Arc<TypeLayout>>,
    ) -> LayoutResult<Self> {
        let instance_fields = collect_fields(&java_type, supertype_layout.as_deref())?;

        let mut methods_by_mangled_name = supertype_layout
            .as_ref()
            .map(|s| s.methods_by_mangled_name.clone())
            .unwrap_or_default();
        for method in java_type.polymorphic_methods() {
            methods_by_mangled_name.insert(method.mangled_name(), method.clone());
        }
        if !java_type.is_interface() {
            let get_class = MethodDescriptor::get_class_impl(java_type.descriptor().clone());
            methods_by_mangled_name.insert(get_class.mangled_name(), get_class);
        }

        Ok(Self {
            java_type,
            supertype_layout,
            instance_fields,
            methods_by_mangled_name,
        })
    }

    pub fn java_type(&self) -> &ClassInfo {
        &self.java_type
    }

    pub fn qualified_name(&self) -> &str {
        self.java_type.qualified_name()
    }

    pub fn supertype_layout(&self) -> Option<&Arc<TypeLayout>> {
        self.supertype_layout.as_ref()
    }

    /// Layouts of all superclasses, nearest first
    pub fn supertype_chain(&self) -> impl Iterator<Item = &TypeLayout> {
        std::iter::successors(self.supertype_layout.as_deref(), |layout| {
            layout.supertype_layout.as_deref()
        })
    }

    /// Every instance field in struct order
    pub fn all_instance_fields(&self) -> &[FieldDescriptor] {
        &self.instance_fields
    }

    /// Current implementation of every dispatch slot, in slot order
    pub fn all_polymorphic_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods_by_mangled_name.values()
    }

    pub fn polymorphic_methods_by_mangled_name(&self) -> &IndexMap<String, MethodDescriptor> {
        &self.methods_by_mangled_name
    }

    /// Implementation this class dispatches to for `method`
    pub fn implementation_method(&self, method: &MethodDescriptor) -> Option<&MethodDescriptor> {
        self.methods_by_mangled_name.get(&method.mangled_name())
    }

    /// Slot index of `method` in the dispatch table
    pub fn slot_of(&self, method: &MethodDescriptor) -> Option<usize> {
        self.methods_by_mangled_name.get_index_of(&method.mangled_name())
    }

    /// Serializable summary, used for dumps and golden files
    pub fn describe(&self) -> LayoutDescription {
        LayoutDescription {
            name: self.qualified_name().to_string(),
            supertype: self
                .supertype_layout
                .as_ref()
                .map(|s| s.qualified_name().to_string()),
            interfaces: self
                .java_type
                .interfaces()
                .iter()
                .map(|i| i.qualified_name().to_string())
                .collect(),
            fields: self
                .instance_fields
                .iter()
                .map(|f| FieldSlot {
                    name: f.name().to_string(),
                    declared_in: f.enclosing_type().qualified_name().to_string(),
                    type_name: f.type_descriptor().to_string(),
                })
                .collect(),
            vtable: self
                .methods_by_mangled_name
                .iter()
                .map(|(mangled, m)| VtableSlot {
                    mangled_name: mangled.clone(),
                    implemented_in: m.enclosing_type().qualified_name().to_string(),
                    method: m.name().to_string(),
                })
                .collect(),
        }
    }
}

fn collect_fields(
    java_type: &ClassInfo,
    supertype_layout: Option<&TypeLayout>,
) -> LayoutResult<Vec<FieldDescriptor>> {
    let mut fields = supertype_layout
        .map(|s| s.instance_fields.clone())
        .unwrap_or_default();
    let declared = java_type.instance_fields();

    let is_array_subtype = is_wasm_array_subtype(
        java_type.descriptor(),
        supertype_layout.map(TypeLayout::qualified_name),
    );

    if is_array_subtype {
        let violation = |message: &str| LayoutError::ArrayElementsField {
            type_name: java_type.qualified_name().to_string(),
            message: message.to_string(),
        };
        if declared.first().map(|f| f.name()) != Some(ARRAY_ELEMENTS_FIELD) {
            return Err(violation("first declared field must be 'elements'"));
        }
        if fields.last().map(|f| f.name()) != Some(ARRAY_ELEMENTS_FIELD) {
            return Err(violation("last inherited field must be 'elements'"));
        }
        fields.pop();
    }

    fields.extend(declared.iter().cloned());
    Ok(fields)
}

/// Flattened view of a [`TypeLayout`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescription {
    pub name: String,
    pub supertype: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldSlot>,
    pub vtable: Vec<VtableSlot>,
}

impl LayoutDescription {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSlot {
    pub name: String,
    pub declared_in: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VtableSlot {
    pub mangled_name: String,
    pub implemented_in: String,
    pub method: String,
}

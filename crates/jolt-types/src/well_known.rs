//! Well-known types the backend treats specially

use once_cell::sync::Lazy;

use crate::descriptor::{DeclaredTypeDescriptor, TypeDescriptor};

/// Root of the class hierarchy
pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";
/// String class
pub const JAVA_LANG_STRING: &str = "java.lang.String";
/// Boxed `void` pseudo-type
pub const JAVA_LANG_VOID: &str = "java.lang.Void";
/// Runtime class objects
pub const JAVA_LANG_CLASS: &str = "java.lang.Class";
/// Array container whose subtypes narrow the `elements` field
pub const WASM_ARRAY: &str = "javaemul.internal.WasmArray";
/// Field holding the backing storage of array containers
pub const ARRAY_ELEMENTS_FIELD: &str = "elements";
/// Synthetic method every class overrides to return its class object
pub const GET_CLASS_IMPL: &str = "$getClassImpl";

/// Nullable descriptors for the well-known types
#[derive(Debug)]
pub struct WellKnownTypes {
    /// `java.lang.Object?`
    pub java_lang_object: TypeDescriptor,
    /// `java.lang.String?`
    pub java_lang_string: TypeDescriptor,
    /// `java.lang.Void?`
    pub java_lang_void: TypeDescriptor,
    /// `java.lang.Class?`
    pub java_lang_class: TypeDescriptor,
    /// `javaemul.internal.WasmArray?`
    pub wasm_array: TypeDescriptor,
}

static WELL_KNOWN: Lazy<WellKnownTypes> = Lazy::new(|| WellKnownTypes {
    java_lang_object: TypeDescriptor::class(JAVA_LANG_OBJECT),
    java_lang_string: TypeDescriptor::class(JAVA_LANG_STRING),
    java_lang_void: TypeDescriptor::class(JAVA_LANG_VOID),
    java_lang_class: TypeDescriptor::class(JAVA_LANG_CLASS),
    wasm_array: TypeDescriptor::class(WASM_ARRAY),
});

/// Process-wide well-known types
pub fn well_known() -> &'static WellKnownTypes {
    &WELL_KNOWN
}

/// Whether `ty` directly extends the array container, given the name of its
/// superclass. Only direct subtypes redeclare `elements`; deeper subclasses
/// inherit the narrowed field like any other.
pub fn is_wasm_array_subtype(ty: &DeclaredTypeDescriptor, superclass: Option<&str>) -> bool {
    ty.qualified_name() != WASM_ARRAY && superclass == Some(WASM_ARRAY)
}

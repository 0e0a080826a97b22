//! Layout resolution over whole compilation units

use std::sync::Arc;
use std::thread;

use jolt_ast::{CompilationUnit, Field, Method, TypeDeclaration};
use jolt_layout::{ClassInfo, LayoutError, LayoutResolver};
use jolt_types::well_known::{JAVA_LANG_OBJECT, WASM_ARRAY};
use jolt_types::{
    DeclaredTypeDescriptor, FieldDescriptor, MethodDescriptor, PrimitiveType, TypeDescriptor,
    Visibility,
};

fn object() -> DeclaredTypeDescriptor {
    DeclaredTypeDescriptor::class(JAVA_LANG_OBJECT)
}

fn string() -> TypeDescriptor {
    TypeDescriptor::class("java.lang.String")
}

fn int() -> TypeDescriptor {
    TypeDescriptor::primitive(PrimitiveType::Int)
}

fn to_string_of(owner: &DeclaredTypeDescriptor) -> MethodDescriptor {
    MethodDescriptor::new(owner.clone(), "toString", Vec::new(), string())
}

fn method(descriptor: MethodDescriptor) -> Method {
    Method::new(descriptor, Vec::new(), None)
}

/// ```java
/// class Object { String toString(); }
/// class Animal { String name; String toString(); void speak(); }
/// class Dog extends Animal { int age; void speak(); void fetch(String); }
/// ```
fn zoo() -> CompilationUnit {
    let animal = DeclaredTypeDescriptor::class("zoo.Animal");
    let dog = DeclaredTypeDescriptor::class("zoo.Dog");
    let void = TypeDescriptor::primitive(PrimitiveType::Void);

    let object_decl = TypeDeclaration::new(object()).with_method(method(to_string_of(&object())));

    let animal_decl = TypeDeclaration::new(animal.clone())
        .with_superclass(object())
        .with_field(Field::new(FieldDescriptor::new(animal.clone(), "name", string())))
        .with_method(method(MethodDescriptor::constructor(animal.clone(), Vec::new())))
        .with_method(method(to_string_of(&animal)))
        .with_method(method(MethodDescriptor::new(
            animal.clone(),
            "speak",
            Vec::new(),
            void.clone(),
        )));

    let dog_decl = TypeDeclaration::new(dog.clone())
        .with_superclass(animal.clone())
        .with_field(Field::new(FieldDescriptor::new(dog.clone(), "age", int())))
        .with_method(method(MethodDescriptor::new(
            dog.clone(),
            "speak",
            Vec::new(),
            void.clone(),
        )))
        .with_method(method(
            MethodDescriptor::new(dog.clone(), "wag", Vec::new(), void.clone())
                .with_visibility(Visibility::Private),
        ))
        .with_method(method(MethodDescriptor::new(
            dog.clone(),
            "fetch",
            vec![string()],
            void,
        )));

    CompilationUnit::new("Zoo.java", vec![object_decl, animal_decl, dog_decl])
}

fn slot_names(resolver: &LayoutResolver, name: &str) -> Vec<String> {
    resolver
        .layout_of(name)
        .unwrap()
        .polymorphic_methods_by_mangled_name()
        .keys()
        .cloned()
        .collect()
}

#[test]
fn test_subclass_extends_parent_layout() {
    let resolver = LayoutResolver::from_units([&zoo()]);
    let dog = resolver.layout_of("zoo.Dog").unwrap();

    let fields: Vec<_> = dog.all_instance_fields().iter().map(|f| f.name()).collect();
    assert_eq!(fields, vec!["name", "age"]);

    assert_eq!(
        slot_names(&resolver, "java.lang.Object"),
        vec!["m_toString", "m_$getClassImpl"]
    );
    assert_eq!(
        slot_names(&resolver, "zoo.Animal"),
        vec!["m_toString", "m_$getClassImpl", "m_speak"]
    );
    assert_eq!(
        slot_names(&resolver, "zoo.Dog"),
        vec![
            "m_toString",
            "m_$getClassImpl",
            "m_speak",
            "m_fetch__java_lang_String"
        ]
    );
}

#[test]
fn test_override_replaces_implementation_in_place() {
    let resolver = LayoutResolver::from_units([&zoo()]);
    let animal = resolver.layout_of("zoo.Animal").unwrap();
    let dog = resolver.layout_of("zoo.Dog").unwrap();

    let speak = MethodDescriptor::new(
        DeclaredTypeDescriptor::class("zoo.Animal"),
        "speak",
        Vec::new(),
        TypeDescriptor::primitive(PrimitiveType::Void),
    );
    assert_eq!(animal.slot_of(&speak), dog.slot_of(&speak));
    assert_eq!(
        dog.implementation_method(&speak)
            .map(|m| m.enclosing_type().qualified_name()),
        Some("zoo.Dog")
    );

    // toString is inherited unchanged from Animal
    let to_string = to_string_of(&object());
    assert_eq!(
        dog.implementation_method(&to_string)
            .map(|m| m.enclosing_type().qualified_name()),
        Some("zoo.Animal")
    );

    // Every class supplies its own class accessor
    let get_class = dog
        .all_polymorphic_methods()
        .find(|m| m.name() == "$getClassImpl")
        .unwrap();
    assert_eq!(get_class.enclosing_type().qualified_name(), "zoo.Dog");
    assert!(get_class.is_synthetic());
}

#[test]
fn test_own_override_wins_over_inherited_one() {
    let dog = DeclaredTypeDescriptor::class("zoo.Dog");
    let mut unit = zoo();
    unit.types[2].methods.push(method(to_string_of(&dog)));

    let resolver = LayoutResolver::from_units([&unit]);
    let animal = resolver.layout_of("zoo.Animal").unwrap();
    let dog = resolver.layout_of("zoo.Dog").unwrap();

    let to_string = to_string_of(&object());
    assert_eq!(
        dog.implementation_method(&to_string)
            .map(|m| m.enclosing_type().qualified_name()),
        Some("zoo.Dog")
    );
    assert_eq!(
        animal
            .implementation_method(&to_string)
            .map(|m| m.enclosing_type().qualified_name()),
        Some("zoo.Animal")
    );
    assert_eq!(dog.slot_of(&to_string), Some(0));
    assert_eq!(
        slot_names(&resolver, "zoo.Dog"),
        vec![
            "m_toString",
            "m_$getClassImpl",
            "m_speak",
            "m_fetch__java_lang_String"
        ]
    );
}

#[test]
fn test_describe_reports_slots_and_fields() {
    let resolver = LayoutResolver::from_units([&zoo()]);
    let description = resolver.layout_of("zoo.Dog").unwrap().describe();

    assert_eq!(description.supertype.as_deref(), Some("zoo.Animal"));
    assert_eq!(description.fields[0].declared_in, "zoo.Animal");
    assert_eq!(description.fields[1].type_name, "int");
    let speak = description
        .vtable
        .iter()
        .find(|slot| slot.mangled_name == "m_speak")
        .unwrap();
    assert_eq!(speak.implemented_in, "zoo.Dog");
}

#[test]
fn test_array_subtype_replaces_elements_field() {
    let wasm_array = DeclaredTypeDescriptor::class(WASM_ARRAY);
    let of_int = DeclaredTypeDescriptor::class("javaemul.internal.WasmArray$OfInt");

    let mut resolver = LayoutResolver::new();
    resolver.register(ClassInfo::new(object()));
    resolver.register(
        ClassInfo::new(wasm_array.clone())
            .with_superclass(object())
            .with_field(FieldDescriptor::new(wasm_array.clone(), "length", int()))
            .with_field(FieldDescriptor::new(
                wasm_array.clone(),
                "elements",
                TypeDescriptor::class(JAVA_LANG_OBJECT),
            )),
    );
    resolver.register(
        ClassInfo::new(of_int.clone())
            .with_superclass(wasm_array)
            .with_field(FieldDescriptor::new(
                of_int.clone(),
                "elements",
                TypeDescriptor::array(int(), false),
            )),
    );

    let layout = resolver
        .layout_of("javaemul.internal.WasmArray$OfInt")
        .unwrap();
    let fields: Vec<_> = layout
        .all_instance_fields()
        .iter()
        .map(|f| (f.name(), f.enclosing_type().qualified_name()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("length", WASM_ARRAY),
            ("elements", "javaemul.internal.WasmArray$OfInt")
        ]
    );
}

#[test]
fn test_array_grandchild_inherits_narrowed_elements() {
    let wasm_array = DeclaredTypeDescriptor::class(WASM_ARRAY);
    let of_int = DeclaredTypeDescriptor::class("javaemul.internal.WasmArray$OfInt");
    let packed = DeclaredTypeDescriptor::class("t.PackedInts");

    let mut resolver = LayoutResolver::new();
    resolver.register(ClassInfo::new(object()));
    resolver.register(
        ClassInfo::new(wasm_array.clone())
            .with_superclass(object())
            .with_field(FieldDescriptor::new(
                wasm_array.clone(),
                "elements",
                TypeDescriptor::class(JAVA_LANG_OBJECT),
            )),
    );
    resolver.register(
        ClassInfo::new(of_int.clone())
            .with_superclass(wasm_array)
            .with_field(FieldDescriptor::new(
                of_int.clone(),
                "elements",
                TypeDescriptor::array(int(), false),
            )),
    );
    resolver.register(
        ClassInfo::new(packed.clone())
            .with_superclass(of_int)
            .with_field(FieldDescriptor::new(packed, "extra", int())),
    );

    let layout = resolver.layout_of("t.PackedInts").unwrap();
    let fields: Vec<_> = layout
        .all_instance_fields()
        .iter()
        .map(|f| (f.name(), f.enclosing_type().qualified_name()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("elements", "javaemul.internal.WasmArray$OfInt"),
            ("extra", "t.PackedInts")
        ]
    );
}

#[test]
fn test_array_subtype_without_elements_is_rejected() {
    let wasm_array = DeclaredTypeDescriptor::class(WASM_ARRAY);
    let broken = DeclaredTypeDescriptor::class("javaemul.internal.WasmArray$Broken");

    let mut resolver = LayoutResolver::new();
    resolver.register(ClassInfo::new(object()));
    resolver.register(
        ClassInfo::new(wasm_array.clone())
            .with_superclass(object())
            .with_field(FieldDescriptor::new(
                wasm_array.clone(),
                "elements",
                TypeDescriptor::class(JAVA_LANG_OBJECT),
            )),
    );
    resolver.register(
        ClassInfo::new(broken.clone())
            .with_superclass(wasm_array)
            .with_field(FieldDescriptor::new(broken, "size", int())),
    );

    let err = resolver
        .layout_of("javaemul.internal.WasmArray$Broken")
        .unwrap_err();
    assert!(matches!(err, LayoutError::ArrayElementsField { .. }));
    // The failed class is not cached; its parent still is
    assert!(resolver.layout_of(WASM_ARRAY).is_ok());
    assert!(resolver
        .layout_of("javaemul.internal.WasmArray$Broken")
        .is_err());
}

#[test]
fn test_concurrent_first_queries_compute_once() {
    let resolver = Arc::new(LayoutResolver::from_units([&zoo()]));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            thread::spawn(move || resolver.layout_of("zoo.Dog").unwrap())
        })
        .collect();
    let layouts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for layout in &layouts[1..] {
        assert!(Arc::ptr_eq(&layouts[0], layout));
    }
    // Object, Animal and Dog, each exactly once
    assert_eq!(resolver.computed_count(), 3);
}

#[test]
fn test_all_layouts_in_registration_order() {
    let resolver = LayoutResolver::from_units([&zoo()]);
    let names: Vec<_> = resolver
        .all_layouts()
        .unwrap()
        .iter()
        .map(|l| l.qualified_name().to_string())
        .collect();
    assert_eq!(names, vec!["java.lang.Object", "zoo.Animal", "zoo.Dog"]);
}

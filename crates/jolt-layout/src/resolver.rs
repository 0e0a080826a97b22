//! Memoized layout resolution
//!
//! Classes are registered up front; layouts are computed lazily on first
//! query and shared afterwards. Any number of threads may query the same
//! resolver. Each class gets its own `OnceCell`, so concurrent first
//! queries for one class compute it exactly once while unrelated classes
//! proceed independently. A class's superclass is resolved before its own
//! cell is entered, which keeps initialization free of nested waits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use jolt_ast::CompilationUnit;
use once_cell::sync::OnceCell;

use crate::class_info::ClassInfo;
use crate::error::{LayoutError, LayoutResult};
use crate::layout::TypeLayout;

type LayoutCell = Arc<OnceCell<Arc<TypeLayout>>>;

/// Resolves and caches [`TypeLayout`]s by qualified name
pub struct LayoutResolver {
    /// Registered classes, in registration order
    classes: IndexMap<String, Arc<ClassInfo>>,
    layouts: DashMap<String, LayoutCell>,
    computed: AtomicUsize,
}

impl LayoutResolver {
    pub fn new() -> Self {
        Self {
            classes: IndexMap::new(),
            layouts: DashMap::new(),
            computed: AtomicUsize::new(0),
        }
    }

    /// Register every type declared in `units`
    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a CompilationUnit>) -> Self {
        let mut resolver = Self::new();
        for unit in units {
            for decl in &unit.types {
                resolver.register(ClassInfo::from_declaration(decl));
            }
        }
        resolver
    }

    /// Register a class, replacing any earlier registration under the same
    /// name. Cached layouts are dropped, since any of them may depend on it.
    pub fn register(&mut self, class: ClassInfo) -> Option<Arc<ClassInfo>> {
        let name = class.qualified_name().to_string();
        let previous = self.classes.insert(name, Arc::new(class));
        if previous.is_some() {
            self.layouts.clear();
        }
        previous
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn class_info(&self, name: &str) -> Option<&Arc<ClassInfo>> {
        self.classes.get(name)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of layouts computed so far
    pub fn computed_count(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }

    /// Layout of the class named `name`, computing it on first use
    pub fn layout_of(&self, name: &str) -> LayoutResult<Arc<TypeLayout>> {
        let mut resolving = Vec::new();
        self.resolve(name, &mut resolving)
    }

    /// Layouts of every registered class, in registration order
    pub fn all_layouts(&self) -> LayoutResult<Vec<Arc<TypeLayout>>> {
        self.classes.keys().map(|name| self.layout_of(name)).collect()
    }

    fn cached(&self, name: &str) -> Option<Arc<TypeLayout>> {
        self.layouts
            .get(name)
            .and_then(|cell| cell.value().get().map(Arc::clone))
    }

    fn resolve(&self, name: &str, resolving: &mut Vec<String>) -> LayoutResult<Arc<TypeLayout>> {
        if let Some(layout) = self.cached(name) {
            log::trace!("layout cache hit: {}", name);
            return Ok(layout);
        }

        if resolving.iter().any(|n| n == name) {
            let mut chain = resolving.clone();
            chain.push(name.to_string());
            return Err(LayoutError::CyclicInheritance { chain });
        }

        let class = self
            .classes
            .get(name)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownType {
                name: name.to_string(),
            })?;

        resolving.push(name.to_string());
        let supertype = match class.superclass() {
            Some(superclass) => Some(self.resolve(superclass.qualified_name(), resolving)?),
            None => None,
        };
        resolving.pop();

        let cell: LayoutCell = self
            .layouts
            .entry(name.to_string())
            .or_default()
            .value()
            .clone();
        let layout = cell.get_or_try_init(|| {
            log::trace!("layout cache miss: {}", name);
            self.computed.fetch_add(1, Ordering::Relaxed);
            TypeLayout::create(class, supertype).map(Arc::new)
        })?;
        Ok(Arc::clone(layout))
    }
}

impl Default for LayoutResolver {
    fn default() -> Self {
        Self::new()
    }
}

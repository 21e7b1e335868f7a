//! The declarative model extracted by the front-end collector.

mod binding;
mod class;
mod injector;
mod interceptor;
mod module;
mod registrar;

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Options;
use crate::diagnostics::DiagnosticSink;

pub use binding::{BindingDescriptor, BindingKind, BindingTarget};
pub use class::{ClassDescriptor, MethodDescriptor};
pub use injector::{InjectionRequest, InjectorEntry, RequestTarget};
pub use interceptor::{Captures, ClassMatcher, InterceptorDescriptor, MethodMatcher};
pub use module::ModuleDescriptor;
pub use registrar::Registrar;

/// A source position, carried through to diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.file.is_empty() && self.line == 0
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_unknown() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// Raw declarations as a front-end hands them over, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
    #[serde(default)]
    pub entries: Vec<InjectorEntry>,
}

/// The validated, read-only declaration table.
///
/// Resolution contexts share it and clone only the per-class state they
/// mutate, so the store itself never changes after [`Registrar::finish`].
#[derive(Debug, Clone, Default)]
pub struct DeclarationStore {
    classes: Vec<Arc<ClassDescriptor>>,
    class_index: HashMap<String, usize>,
    modules: Vec<ModuleDescriptor>,
    module_index: HashMap<String, usize>,
    entries: Vec<InjectorEntry>,
}

impl DeclarationStore {
    /// Validates `declarations` through a [`Registrar`].
    pub fn from_declarations(
        declarations: Declarations,
        options: &Options,
        sink: &dyn DiagnosticSink,
    ) -> Self {
        let mut registrar = Registrar::new(options, sink);
        declarations
            .classes
            .into_iter()
            .for_each(|class| registrar.declare_class(class));
        declarations
            .modules
            .into_iter()
            .for_each(|module| registrar.declare_module(module));
        declarations
            .entries
            .into_iter()
            .for_each(|entry| registrar.declare_entry(entry));
        registrar.finish()
    }

    pub(crate) fn new(
        classes: Vec<ClassDescriptor>,
        modules: Vec<ModuleDescriptor>,
        entries: Vec<InjectorEntry>,
    ) -> Self {
        let class_index = classes
            .iter()
            .enumerate()
            .map(|(i, class)| (class.name.clone(), i))
            .collect();
        let module_index = modules
            .iter()
            .enumerate()
            .map(|(i, module)| (module.name.clone(), i))
            .collect();
        Self {
            classes: classes.into_iter().map(Arc::new).collect(),
            class_index,
            modules,
            module_index,
            entries,
        }
    }

    /// Classes in declaration order.
    pub fn classes(&self) -> &[Arc<ClassDescriptor>] {
        &self.classes
    }

    pub fn class(&self, name: &str) -> Option<&Arc<ClassDescriptor>> {
        self.class_index.get(name).map(|&i| &self.classes[i])
    }

    /// The position of the class in [`DeclarationStore::classes`].
    pub fn class_position(&self, name: &str) -> Option<usize> {
        self.class_index.get(name).copied()
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.module_index.get(name).map(|&i| &self.modules[i])
    }

    pub fn entries(&self) -> &[InjectorEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&InjectorEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

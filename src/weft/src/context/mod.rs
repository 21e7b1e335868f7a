//! The isolated working state of one injector entry point.

mod builder;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Options;
use crate::model::{
    BindingDescriptor, ClassDescriptor, DeclarationStore, InjectorEntry, InterceptorDescriptor,
};
use crate::plan::{EnhancedClass, EntryPlan, EntryStatement, ModuleVariable};
use crate::scope::Scope;

pub use builder::ContextBuilder;

/// A binding of the flattened table, with the variable of its owning module.
#[derive(Debug, Clone)]
pub struct ContextBinding<'s> {
    pub binding: &'s BindingDescriptor,
    pub module_variable: String,
}

/// An interceptor of a participating module, with the variable of its owning
/// module.
#[derive(Debug, Clone)]
pub struct ContextInterceptor<'s> {
    pub interceptor: &'s InterceptorDescriptor,
    pub module_variable: String,
}

/// The per-context state of a declared class.
#[derive(Debug, Clone)]
pub struct ClassState {
    pub descriptor: Arc<ClassDescriptor>,
    pub scope: Scope,
    /// Matched interceptors per method, parallel to the descriptor's methods,
    /// in insertion order and free of duplicates.
    pub matched: Vec<Vec<usize>>,
    pub intercepted: bool,
    pub woven: bool,
    /// The class `new` targets: the class itself, or its enhanced subclass
    /// once woven.
    pub constructed_name: String,
    pub singleton: Option<String>,
    /// Set while the singleton variable is assigned only inside a deferred
    /// function, so it may still be unset when read.
    pub lazy: bool,
}

impl ClassState {
    fn new(descriptor: Arc<ClassDescriptor>) -> Self {
        Self {
            matched: vec![Vec::new(); descriptor.methods.len()],
            constructed_name: descriptor.name.clone(),
            descriptor,
            scope: Scope::default(),
            intercepted: false,
            woven: false,
            singleton: None,
            lazy: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Returns the interceptors matched on the named method.
    pub fn matched_on(&self, method: &str) -> &[usize] {
        self.descriptor
            .methods
            .iter()
            .position(|m| m.name == method)
            .map_or(&[][..], |i| self.matched[i].as_slice())
    }
}

/// Owns everything resolution mutates for one entry point.
///
/// Declarations are borrowed from the shared store; only class state, the
/// variable counters and the produced plans are private to the context.
pub struct ResolutionContext<'s> {
    store: &'s DeclarationStore,
    options: &'s Options,
    entry: &'s InjectorEntry,
    modules: Vec<ModuleVariable>,
    bindings: Vec<ContextBinding<'s>>,
    binding_index: HashMap<&'s str, usize>,
    interceptors: Vec<ContextInterceptor<'s>>,
    classes: Vec<ClassState>,
    singleton_ids: usize,
    instance_ids: usize,
    declarations: Vec<String>,
    enhanced: Vec<EnhancedClass>,
    statements: Vec<EntryStatement>,
}

impl<'s> ResolutionContext<'s> {
    pub fn store(&self) -> &'s DeclarationStore {
        self.store
    }

    pub fn options(&self) -> &'s Options {
        self.options
    }

    pub fn entry(&self) -> &'s InjectorEntry {
        self.entry
    }

    pub fn modules(&self) -> &[ModuleVariable] {
        &self.modules
    }

    pub fn bindings(&self) -> &[ContextBinding<'s>] {
        &self.bindings
    }

    pub fn binding_position(&self, key: &str) -> Option<usize> {
        self.binding_index.get(key).copied()
    }

    pub fn binding(&self, key: &str) -> Option<&ContextBinding<'s>> {
        self.binding_position(key).map(|i| &self.bindings[i])
    }

    pub fn interceptors(&self) -> &[ContextInterceptor<'s>] {
        &self.interceptors
    }

    pub fn classes(&self) -> &[ClassState] {
        &self.classes
    }

    pub fn class_position(&self, name: &str) -> Option<usize> {
        self.store.class_position(name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassState> {
        self.class_position(name).map(|i| &self.classes[i])
    }

    pub(crate) fn class_at(&self, index: usize) -> &ClassState {
        &self.classes[index]
    }

    pub(crate) fn class_at_mut(&mut self, index: usize) -> &mut ClassState {
        &mut self.classes[index]
    }

    /// Allocates the next singleton variable and hoists its declaration.
    pub(crate) fn allocate_singleton(&mut self) -> String {
        let variable = format!("{}{}", self.options.singleton_prefix, self.singleton_ids);
        self.singleton_ids += 1;
        self.declarations.push(variable.clone());
        variable
    }

    /// Allocates the next setter-injection temporary and hoists its
    /// declaration.
    pub(crate) fn allocate_instance(&mut self) -> String {
        let variable = format!("{}{}", self.options.instance_prefix, self.instance_ids);
        self.instance_ids += 1;
        self.declarations.push(variable.clone());
        variable
    }

    pub fn enhanced(&self) -> &[EnhancedClass] {
        &self.enhanced
    }

    pub(crate) fn push_enhanced(&mut self, class: EnhancedClass) {
        self.enhanced.push(class);
    }

    pub fn statements(&self) -> &[EntryStatement] {
        &self.statements
    }

    pub(crate) fn push_statement(&mut self, statement: EntryStatement) {
        self.statements.push(statement);
    }

    /// Consumes the context into the plan of its entry point.
    pub fn into_plan(self) -> EntryPlan {
        EntryPlan {
            entry: self.entry.name.clone(),
            modules: self.modules,
            declarations: self.declarations,
            enhanced: self.enhanced,
            statements: self.statements,
        }
    }
}

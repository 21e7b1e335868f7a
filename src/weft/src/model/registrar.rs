use std::collections::{HashMap, HashSet};

use crate::config::Options;
use crate::diagnostics::{self, DiagnosticKind, DiagnosticSink};
use crate::model::{
    BindingDescriptor, BindingKind, ClassDescriptor, DeclarationStore, InjectorEntry,
    InterceptorDescriptor, MethodDescriptor, MethodMatcher, ModuleDescriptor,
};

/// Validates raw declarations into a [`DeclarationStore`].
///
/// Offending declarations are reported and dropped; their siblings are kept.
pub struct Registrar<'a> {
    options: &'a Options,
    sink: &'a dyn DiagnosticSink,
    classes: Vec<ClassDescriptor>,
    class_index: HashMap<String, usize>,
    modules: Vec<RegisteredModule>,
    module_index: HashMap<String, usize>,
    entries: Vec<InjectorEntry>,
}

struct RegisteredModule {
    module: ModuleDescriptor,
    /// Keys excluded after a conflicting re-declaration.
    ambiguous: HashSet<String>,
}

impl<'a> Registrar<'a> {
    pub fn new(options: &'a Options, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            options,
            sink,
            classes: Vec::new(),
            class_index: HashMap::new(),
            modules: Vec::new(),
            module_index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn declare_class(&mut self, mut class: ClassDescriptor) {
        let methods = std::mem::take(&mut class.methods);
        let name = class.name.clone();

        match self.class_index.get(&name) {
            None => {
                self.class_index.insert(name.clone(), self.classes.len());
                self.classes.push(class);
            }
            Some(&i) => {
                let existing = &mut self.classes[i];
                if existing.params != class.params {
                    existing.duplicated = true;
                    diagnostics::emit(
                        self.sink,
                        DiagnosticKind::AmbiguousConstructor {
                            class: name.clone(),
                        },
                        &class.location,
                    );
                }
                if existing.base.is_none() {
                    existing.base = class.base;
                }
                for setter in class.setters {
                    if !existing.setters.contains(&setter) {
                        existing.setters.push(setter);
                    }
                }
            }
        }

        methods
            .into_iter()
            .for_each(|method| self.declare_method(&name, method));
    }

    /// Adds a method to an already declared class.
    pub fn declare_method(&mut self, class: &str, method: MethodDescriptor) {
        let Some(&i) = self.class_index.get(class) else {
            diagnostics::emit(
                self.sink,
                DiagnosticKind::UndeclaredClass {
                    class: class.to_string(),
                    method: method.name.clone(),
                },
                &method.location,
            );
            return;
        };

        let class = &mut self.classes[i];
        match class.methods.iter_mut().find(|existing| existing.name == method.name) {
            Some(existing) if existing.params != method.params => {
                tracing::debug!(
                    class = %class.name,
                    method = %method.name,
                    "method redeclared with different parameters"
                );
                existing.ambiguous = true;
            }
            Some(_) => {}
            None => class.methods.push(method),
        }
    }

    /// Registers a module. A second declaration under the same name extends
    /// the first one.
    pub fn declare_module(&mut self, module: ModuleDescriptor) {
        let ModuleDescriptor {
            name,
            bindings,
            interceptors,
            configure,
            location,
        } = module;

        let i = match self.module_index.get(&name) {
            Some(&i) => i,
            None => {
                self.module_index.insert(name.clone(), self.modules.len());
                self.modules.push(RegisteredModule {
                    module: ModuleDescriptor {
                        configure,
                        location,
                        ..ModuleDescriptor::new(name.clone())
                    },
                    ambiguous: HashSet::new(),
                });
                self.modules.len() - 1
            }
        };

        for binding in bindings {
            self.declare_binding(i, binding);
        }
        for interceptor in interceptors {
            self.declare_interceptor(i, interceptor);
        }
    }

    fn declare_binding(&mut self, module: usize, mut binding: BindingDescriptor) {
        let registered = &mut self.modules[module];
        binding.module = registered.module.name.clone();

        if binding.key.is_empty()
            || binding
                .bound_class()
                .is_some_and(|class| class.is_empty())
        {
            diagnostics::emit(
                self.sink,
                DiagnosticKind::InvalidBindingTarget { key: binding.key },
                &binding.location,
            );
            return;
        }
        if binding.scope.is_some() && binding.kind() != BindingKind::ToType {
            diagnostics::emit(
                self.sink,
                DiagnosticKind::ScopeOnNonTypeBinding {
                    kind: binding.kind(),
                    key: binding.key,
                },
                &binding.location,
            );
            return;
        }
        if registered.ambiguous.contains(&binding.key) {
            return;
        }

        let bindings = &mut registered.module.bindings;
        match bindings.iter().position(|existing| existing.key == binding.key) {
            Some(pos) if bindings[pos].is_compatible_with(&binding) => {}
            Some(pos) => {
                bindings.remove(pos);
                registered.ambiguous.insert(binding.key.clone());
                diagnostics::emit(
                    self.sink,
                    DiagnosticKind::AmbiguousBinding {
                        module: binding.module,
                        key: binding.key,
                    },
                    &binding.location,
                );
            }
            None => bindings.push(binding),
        }
    }

    fn declare_interceptor(&mut self, module: usize, mut interceptor: InterceptorDescriptor) {
        let registered = &mut self.modules[module];
        interceptor.module = registered.module.name.clone();

        if interceptor
            .class_matcher
            .argument()
            .is_some_and(str::is_empty)
        {
            diagnostics::emit(
                self.sink,
                DiagnosticKind::InvalidMatcherArgument {
                    matcher: interceptor.class_matcher.to_string(),
                },
                &interceptor.location,
            );
            return;
        }
        if matches!(&interceptor.method_matcher, MethodMatcher::Like(glob) if glob.is_empty()) {
            diagnostics::emit(
                self.sink,
                DiagnosticKind::InvalidMatcherArgument {
                    matcher: interceptor.method_matcher.to_string(),
                },
                &interceptor.location,
            );
            return;
        }
        if interceptor.body.trim().is_empty() {
            diagnostics::emit(
                self.sink,
                DiagnosticKind::MissingInterceptorBody {
                    module: interceptor.module,
                },
                &interceptor.location,
            );
            return;
        }

        let interceptors = &mut registered.module.interceptors;
        interceptor.name = format!("{}{}", self.options.interceptor_prefix, interceptors.len());
        interceptors.push(interceptor);
    }

    pub fn declare_entry(&mut self, entry: InjectorEntry) {
        if entry.modules.is_empty() {
            diagnostics::emit(
                self.sink,
                DiagnosticKind::EmptyModuleList {
                    entry: entry.name.clone(),
                },
                &entry.location,
            );
        }
        self.entries.push(entry);
    }

    /// Runs the checks that need every declaration, then freezes the table.
    pub fn finish(mut self) -> DeclarationStore {
        for class in &mut self.classes {
            let (setters, missing): (Vec<_>, Vec<_>) = std::mem::take(&mut class.setters)
                .into_iter()
                .partition(|setter| class.method(setter).is_some());
            for setter in missing {
                diagnostics::emit(
                    self.sink,
                    DiagnosticKind::SetterNotFound {
                        class: class.name.clone(),
                        setter,
                    },
                    &class.location,
                );
            }
            class.setters = setters;
        }

        for entry in &mut self.entries {
            let module_index = &self.module_index;
            let sink = self.sink;
            entry.modules.retain(|module| {
                let known = module_index.contains_key(module);
                if !known {
                    diagnostics::emit(
                        sink,
                        DiagnosticKind::UnknownModule {
                            entry: entry.name.clone(),
                            module: module.clone(),
                        },
                        &entry.location,
                    );
                }
                known
            });
        }

        let modules = self
            .modules
            .into_iter()
            .map(|registered| registered.module)
            .collect();
        DeclarationStore::new(self.classes, modules, self.entries)
    }
}

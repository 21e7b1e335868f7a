use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::Options;
use crate::context::{ClassState, ContextBinding, ContextInterceptor, ResolutionContext};
use crate::model::{DeclarationStore, InjectorEntry};
use crate::plan::ModuleVariable;

/// Flattens the modules of an entry point into a fresh [`ResolutionContext`].
pub struct ContextBuilder<'s> {
    store: &'s DeclarationStore,
    options: &'s Options,
}

impl<'s> ContextBuilder<'s> {
    pub fn new(store: &'s DeclarationStore, options: &'s Options) -> Self {
        Self { store, options }
    }

    pub fn build(&self, entry: &'s InjectorEntry) -> ResolutionContext<'s> {
        let mut modules = Vec::new();
        let mut bindings = Vec::new();
        let mut binding_index = HashMap::new();
        let mut interceptors = Vec::new();
        let mut seen = HashSet::new();

        for name in &entry.modules {
            let Some(module) = self.store.module(name) else {
                continue;
            };
            if !seen.insert(name.as_str()) {
                continue;
            }
            let variable = module.variable_name();

            for binding in &module.bindings {
                if binding_index.contains_key(binding.key.as_str()) {
                    tracing::debug!(
                        entry = %entry.name,
                        key = %binding.key,
                        module = %module.name,
                        "binding shadowed by an earlier module"
                    );
                    continue;
                }
                binding_index.insert(binding.key.as_str(), bindings.len());
                bindings.push(ContextBinding {
                    binding,
                    module_variable: variable.clone(),
                });
            }
            interceptors.extend(module.interceptors.iter().map(|interceptor| {
                ContextInterceptor {
                    interceptor,
                    module_variable: variable.clone(),
                }
            }));
            modules.push(ModuleVariable {
                variable,
                module: module.name.clone(),
                configure: module.configure.clone(),
            });
        }

        let mut classes: Vec<_> = self
            .store
            .classes()
            .iter()
            .map(|descriptor| ClassState::new(Arc::clone(descriptor)))
            .collect();
        for ContextBinding { binding, .. } in &bindings {
            let Some(class) = binding
                .bound_class()
                .and_then(|class| self.store.class_position(class))
            else {
                continue;
            };
            classes[class].scope = binding.effective_scope();
        }

        tracing::debug!(
            entry = %entry.name,
            modules = modules.len(),
            bindings = bindings.len(),
            interceptors = interceptors.len(),
            "resolution context built"
        );

        ResolutionContext {
            store: self.store,
            options: self.options,
            entry,
            modules,
            bindings,
            binding_index,
            interceptors,
            classes,
            singleton_ids: 0,
            instance_ids: 0,
            declarations: Vec::new(),
            enhanced: Vec::new(),
            statements: Vec::new(),
        }
    }
}

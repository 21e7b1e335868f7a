use serde::{Deserialize, Serialize};

use crate::model::{BindingDescriptor, InterceptorDescriptor, Location};
use crate::util;

/// A module: a named set of bindings and interceptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    /// Bindings in declaration order. Keys are unique once registered.
    #[serde(default)]
    pub bindings: Vec<BindingDescriptor>,
    #[serde(default)]
    pub interceptors: Vec<InterceptorDescriptor>,
    /// The configuration entry point the backend calls on the module.
    #[serde(default = "default_configure")]
    pub configure: String,
    #[serde(default)]
    pub location: Location,
}

fn default_configure() -> String {
    "configure".to_string()
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
            interceptors: Vec::new(),
            configure: default_configure(),
            location: Location::default(),
        }
    }

    pub fn bind(mut self, binding: BindingDescriptor) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn intercept(mut self, interceptor: InterceptorDescriptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn binding(&self, key: &str) -> Option<&BindingDescriptor> {
        self.bindings.iter().find(|binding| binding.key == key)
    }

    /// The variable the backend stores the configured module in.
    pub fn variable_name(&self) -> String {
        util::variable_name(&self.name)
    }
}

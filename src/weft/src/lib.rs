#![allow(clippy::new_without_default)]

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod matcher;
pub mod model;
pub mod pass;
pub mod plan;
pub mod resolver;
pub mod scope;
pub mod weaver;
mod util;

pub mod prelude {
    pub use crate::config::{ConfigError, NamespaceMatching, Options};
    pub use crate::diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticKind, DiagnosticSink};
    pub use crate::model::{
        BindingDescriptor, ClassDescriptor, ClassMatcher, DeclarationStore, Declarations,
        InjectionRequest, InjectorEntry, InterceptorDescriptor, MethodDescriptor, MethodMatcher,
        ModuleDescriptor,
    };
    pub use crate::pass::{PassError, PassOutput, WeavePass};
    pub use crate::plan::{EntryPlan, EntryStatement, Expr};
    pub use crate::scope::Scope;
}

//! Classification and reporting of everything that goes wrong in a pass.
//!
//! Nothing in the resolution core aborts: each call site reports a
//! [`Diagnostic`] to a [`DiagnosticSink`] and substitutes a placeholder or
//! skips the offending declaration.

mod collector;

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::model::{BindingKind, Location};

pub use collector::DiagnosticCollector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}

/// The stage a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticClass {
    /// Malformed declarations, dropped at registration.
    Declaration,
    /// Conflicting declarations, excluded from resolution and weaving.
    Ambiguity,
    /// Failed lookups, replaced by the null sentinel.
    Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[non_exhaustive]
pub enum DiagnosticKind {
    #[snafu(display("the class {class} is redeclared with a different constructor"))]
    #[non_exhaustive]
    AmbiguousConstructor { class: String },
    #[snafu(display("the method {class}.{method} is redeclared with different parameters"))]
    #[non_exhaustive]
    AmbiguousMethod { class: String, method: String },
    #[snafu(display("the binding {key} is declared twice in {module} with different attributes"))]
    #[non_exhaustive]
    AmbiguousBinding { module: String, key: String },
    #[snafu(display("the binding {key} is bound by {kind} which does not take a scope"))]
    #[non_exhaustive]
    ScopeOnNonTypeBinding { key: String, kind: BindingKind },
    #[snafu(display("the binding {key:?} has no valid target"))]
    #[non_exhaustive]
    InvalidBindingTarget { key: String },
    #[snafu(display("the matcher {matcher} requires a non-empty argument"))]
    #[non_exhaustive]
    InvalidMatcherArgument { matcher: String },
    #[snafu(display("an interceptor in {module} has no body"))]
    #[non_exhaustive]
    MissingInterceptorBody { module: String },
    #[snafu(display("the method {method} of {class} is declared before its class"))]
    #[non_exhaustive]
    UndeclaredClass { class: String, method: String },
    #[snafu(display("the setter {setter} is not a method of {class}"))]
    #[non_exhaustive]
    SetterNotFound { class: String, setter: String },
    #[snafu(display("the injector {entry} uses no module"))]
    #[non_exhaustive]
    EmptyModuleList { entry: String },
    #[snafu(display("the injector {entry} uses the undeclared module {module}"))]
    #[non_exhaustive]
    UnknownModule { entry: String, module: String },
    #[snafu(display("the binding {key} is not found"))]
    #[non_exhaustive]
    BindingNotFound { key: String },
    #[snafu(display("the parameter is specified as a provider but the binding {key} is not a provider"))]
    #[non_exhaustive]
    BindingNotProvider { key: String },
    #[snafu(display("the class {class} is not defined"))]
    #[non_exhaustive]
    ClassNotFound { class: String },
    #[snafu(display("the binding graph resolves back into itself: {path}"))]
    #[non_exhaustive]
    CyclicBinding { path: String },
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::AmbiguousConstructor { .. } => "WEFT_AMBIGUOUS_CONSTRUCTOR",
            Self::AmbiguousMethod { .. } => "WEFT_AMBIGUOUS_METHOD",
            Self::AmbiguousBinding { .. } => "WEFT_AMBIGUOUS_BINDING",
            Self::ScopeOnNonTypeBinding { .. } => "WEFT_SCOPE_ON_NON_TYPE_BINDING",
            Self::InvalidBindingTarget { .. } => "WEFT_INVALID_BINDING_TARGET",
            Self::InvalidMatcherArgument { .. } => "WEFT_INVALID_MATCHER_ARGUMENT",
            Self::MissingInterceptorBody { .. } => "WEFT_MISSING_INTERCEPTOR_BODY",
            Self::UndeclaredClass { .. } => "WEFT_UNDECLARED_CLASS",
            Self::SetterNotFound { .. } => "WEFT_SETTER_NOT_FOUND",
            Self::EmptyModuleList { .. } => "WEFT_EMPTY_MODULE_LIST",
            Self::UnknownModule { .. } => "WEFT_UNKNOWN_MODULE",
            Self::BindingNotFound { .. } => "WEFT_BINDING_NOT_FOUND",
            Self::BindingNotProvider { .. } => "WEFT_BINDING_NOT_PROVIDER",
            Self::ClassNotFound { .. } => "WEFT_CLASS_NOT_FOUND",
            Self::CyclicBinding { .. } => "WEFT_CYCLIC_BINDING",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::SetterNotFound { .. }
            | Self::EmptyModuleList { .. }
            | Self::BindingNotProvider { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn class(&self) -> DiagnosticClass {
        match self {
            Self::AmbiguousConstructor { .. }
            | Self::AmbiguousMethod { .. }
            | Self::AmbiguousBinding { .. } => DiagnosticClass::Ambiguity,
            Self::BindingNotFound { .. }
            | Self::BindingNotProvider { .. }
            | Self::ClassNotFound { .. }
            | Self::CyclicBinding { .. } => DiagnosticClass::Resolution,
            _ => DiagnosticClass::Declaration,
        }
    }

    /// The positional arguments of the record, in message order.
    pub fn args(&self) -> Vec<&str> {
        match self {
            Self::AmbiguousConstructor { class } | Self::ClassNotFound { class } => {
                vec![class.as_str()]
            }
            Self::AmbiguousMethod { class, method } => vec![class.as_str(), method.as_str()],
            Self::AmbiguousBinding { module, key } => vec![key.as_str(), module.as_str()],
            Self::ScopeOnNonTypeBinding { key, kind } => vec![key.as_str(), kind.to_str()],
            Self::InvalidBindingTarget { key }
            | Self::BindingNotFound { key }
            | Self::BindingNotProvider { key } => vec![key.as_str()],
            Self::InvalidMatcherArgument { matcher } => vec![matcher.as_str()],
            Self::MissingInterceptorBody { module } => vec![module.as_str()],
            Self::UndeclaredClass { class, method } => vec![method.as_str(), class.as_str()],
            Self::SetterNotFound { class, setter } => vec![setter.as_str(), class.as_str()],
            Self::EmptyModuleList { entry } => vec![entry.as_str()],
            Self::UnknownModule { entry, module } => vec![entry.as_str(), module.as_str()],
            Self::CyclicBinding { path } => vec![path.as_str()],
        }
    }
}

/// One `(severity, code, location, args...)` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: Location) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            location,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn args(&self) -> Vec<&str> {
        self.kind.args()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location,
            self.severity,
            self.code(),
            self.kind
        )
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Mirrors the diagnostic as a `tracing` event, then hands it to `sink`.
pub(crate) fn emit(sink: &dyn DiagnosticSink, kind: DiagnosticKind, location: &Location) {
    let diagnostic = Diagnostic::new(kind, location.clone());
    match diagnostic.severity {
        Severity::Error => tracing::error!(
            code = diagnostic.code(),
            location = %diagnostic.location,
            "{}",
            diagnostic.kind
        ),
        Severity::Warning => tracing::warn!(
            code = diagnostic.code(),
            location = %diagnostic.location,
            "{}",
            diagnostic.kind
        ),
    }
    sink.report(diagnostic);
}

/// Renders a list of diagnostics one per numbered line.
pub struct AggregatedDisplayer<'a> {
    diagnostics: &'a [Diagnostic],
}

impl<'a> AggregatedDisplayer<'a> {
    pub fn new(diagnostics: &'a [Diagnostic]) -> Self {
        Self { diagnostics }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, diagnostic)?;
        }
        Ok(())
    }
}

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::model::Location;
use crate::plan::Expr;
use crate::scope::Scope;

/// How a binding produces its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    ToType,
    ToInstance,
    ToProvider,
}

impl BindingKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::ToType => "to",
            Self::ToInstance => "toInstance",
            Self::ToProvider => "toProvider",
        }
    }
}

impl Display for BindingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}

/// What a binding key is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingTarget {
    /// A class, constructed with its own dependencies resolved.
    Type { class: String },
    /// An expression used verbatim.
    Instance { expr: Expr },
    /// A provider function defined in the owning module. Its parameters are
    /// resolved as binding keys when the provider is called.
    Provider {
        #[serde(default)]
        params: Vec<String>,
    },
}

/// A key bound inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    pub key: String,
    pub target: BindingTarget,
    /// Only meaningful on [`BindingKind::ToType`] bindings.
    #[serde(default)]
    pub scope: Option<Scope>,
    /// The owning module, filled in on registration.
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub location: Location,
}

impl BindingDescriptor {
    fn new(key: impl Into<String>, target: BindingTarget) -> Self {
        Self {
            key: key.into(),
            target,
            scope: None,
            module: String::new(),
            location: Location::default(),
        }
    }

    pub fn to_type(key: impl Into<String>, class: impl Into<String>) -> Self {
        Self::new(
            key,
            BindingTarget::Type {
                class: class.into(),
            },
        )
    }

    pub fn to_instance(key: impl Into<String>, expr: Expr) -> Self {
        Self::new(key, BindingTarget::Instance { expr })
    }

    pub fn to_provider<I, S>(key: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            key,
            BindingTarget::Provider {
                params: params.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn kind(&self) -> BindingKind {
        match self.target {
            BindingTarget::Type { .. } => BindingKind::ToType,
            BindingTarget::Instance { .. } => BindingKind::ToInstance,
            BindingTarget::Provider { .. } => BindingKind::ToProvider,
        }
    }

    /// The scope the bound class takes; [`Scope::Prototype`] when unset.
    pub fn effective_scope(&self) -> Scope {
        self.scope.unwrap_or_default()
    }

    pub fn bound_class(&self) -> Option<&str> {
        match &self.target {
            BindingTarget::Type { class } => Some(class),
            _ => None,
        }
    }

    /// Returns true if `other` re-declares this binding without conflict.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.key == other.key
            && self.kind() == other.kind()
            && self.effective_scope() == other.effective_scope()
    }
}

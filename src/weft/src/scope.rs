use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// A policy that specifies how long an injected object lives.
///
/// Variants are ordered by how long the object outlives a single request:
///
/// - `a >= b` if an object of scope `a` is shared at least as widely as one of
///   scope `b`
///
/// [`Scope::Prototype`] is the default for every class unless a binding
/// declares otherwise.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// A new object is constructed for every request.
    #[default]
    Prototype = 1,
    /// The object is constructed on first use and cached afterwards.
    Singleton = 2,
    /// The object is constructed up front, before any request is served.
    EagerSingleton = 3,
}

impl Scope {
    /// Returns true if objects of this scope are materialized up front.
    pub fn is_eager(self) -> bool {
        self == Self::EagerSingleton
    }

    /// Returns the name of the scope in a string literal.
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Prototype => "Prototype",
            Self::Singleton => "Singleton",
            Self::EagerSingleton => "EagerSingleton",
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}

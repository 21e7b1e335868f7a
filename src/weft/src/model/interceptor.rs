use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::model::Location;

/// Selects the classes an interceptor applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "argument", rename_all = "snake_case")]
pub enum ClassMatcher {
    /// Classes whose namespace is exactly the given one.
    InNamespace(String),
    /// Classes whose full name starts with the given namespace.
    SubNamespace(String),
    /// Classes with the given type somewhere in their declared base chain.
    SubclassOf(String),
    /// The class with exactly the given name.
    InstanceOf(String),
    Any,
}

impl ClassMatcher {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::InNamespace(_) => "inNamespace",
            Self::SubNamespace(_) => "inSubnamespace",
            Self::SubclassOf(_) => "subclassOf",
            Self::InstanceOf(_) => "instanceOf",
            Self::Any => "any",
        }
    }

    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::InNamespace(arg)
            | Self::SubNamespace(arg)
            | Self::SubclassOf(arg)
            | Self::InstanceOf(arg) => Some(arg),
            Self::Any => None,
        }
    }
}

impl Display for ClassMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.argument() {
            Some(arg) => write!(f, "{}({arg:?})", self.to_str()),
            None => write!(f, "{}()", self.to_str()),
        }
    }
}

/// Selects the methods of a matched class an interceptor applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "argument", rename_all = "snake_case")]
pub enum MethodMatcher {
    /// A start-anchored glob where `*` stands for any run of characters.
    Like(String),
    Any,
}

impl MethodMatcher {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Like(_) => "like",
            Self::Any => "any",
        }
    }

    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::Like(arg) => Some(arg),
            Self::Any => None,
        }
    }
}

impl Display for MethodMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.argument() {
            Some(arg) => write!(f, "{}({arg:?})", self.to_str()),
            None => write!(f, "{}()", self.to_str()),
        }
    }
}

/// The parts of the invocation an interceptor body reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Captures {
    #[serde(default)]
    pub receiver: bool,
    #[serde(default)]
    pub class_name: bool,
    #[serde(default)]
    pub method_name: bool,
}

impl Captures {
    pub const GET_THIS: &'static str = "getThis";
    pub const GET_CLASS_NAME: &'static str = "getClassName";
    pub const GET_METHOD_NAME: &'static str = "getMethodName";
    pub const GET_QUALIFIED_NAME: &'static str = "getQualifiedName";

    pub fn all() -> Self {
        Self {
            receiver: true,
            class_name: true,
            method_name: true,
        }
    }

    /// Computes the flags from the invocation accessors a body calls.
    ///
    /// Accessors that do not expose the receiver or a name, such as
    /// `getArguments` and `proceed`, leave every flag untouched.
    pub fn from_accessors<I, S>(accessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        accessors
            .into_iter()
            .fold(Self::default(), |mut captures, accessor| {
                match accessor.as_ref() {
                    Self::GET_THIS => captures.receiver = true,
                    Self::GET_CLASS_NAME => captures.class_name = true,
                    Self::GET_METHOD_NAME => captures.method_name = true,
                    Self::GET_QUALIFIED_NAME => {
                        captures.class_name = true;
                        captures.method_name = true;
                    }
                    _ => {}
                }
                captures
            })
    }
}

/// A method interceptor bound inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorDescriptor {
    pub class_matcher: ClassMatcher,
    pub method_matcher: MethodMatcher,
    /// The interceptor function definition, passed through to the backend.
    pub body: String,
    #[serde(default)]
    pub captures: Captures,
    /// The module member holding the interceptor, filled in on registration.
    #[serde(default)]
    pub name: String,
    /// The owning module, filled in on registration.
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub location: Location,
}

impl InterceptorDescriptor {
    pub fn new(
        class_matcher: ClassMatcher,
        method_matcher: MethodMatcher,
        body: impl Into<String>,
    ) -> Self {
        Self {
            class_matcher,
            method_matcher,
            body: body.into(),
            captures: Captures::default(),
            name: String::new(),
            module: String::new(),
            location: Location::default(),
        }
    }

    pub fn capturing(mut self, captures: Captures) -> Self {
        self.captures = captures;
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

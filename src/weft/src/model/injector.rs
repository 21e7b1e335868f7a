use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::model::Location;

/// An injector entry point: the modules it configures and the requests made
/// against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectorEntry {
    pub name: String,
    /// Participating modules, in the order the caller listed them.
    pub modules: Vec<String>,
    #[serde(default)]
    pub requests: Vec<InjectionRequest>,
    #[serde(default)]
    pub location: Location,
}

impl InjectorEntry {
    pub fn new<I, S>(name: impl Into<String>, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            modules: modules.into_iter().map(Into::into).collect(),
            requests: Vec::new(),
            location: Location::default(),
        }
    }

    pub fn request(mut self, request: InjectionRequest) -> Self {
        self.requests.push(request);
        self
    }
}

/// What an injection request asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "name", rename_all = "snake_case")]
pub enum RequestTarget {
    /// `getInstance(Class)`
    Class(String),
    /// `getInstanceByName("key")`
    Key(String),
}

impl Display for RequestTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Class(class) => write!(f, "getInstance({class})"),
            Self::Key(key) => write!(f, "getInstanceByName({key:?})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InjectionRequest {
    pub target: RequestTarget,
    #[serde(default)]
    pub location: Location,
}

impl InjectionRequest {
    pub fn by_class(class: impl Into<String>) -> Self {
        Self {
            target: RequestTarget::Class(class.into()),
            location: Location::default(),
        }
    }

    pub fn by_key(key: impl Into<String>) -> Self {
        Self {
            target: RequestTarget::Key(key.into()),
            location: Location::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

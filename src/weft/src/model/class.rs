use serde::{Deserialize, Serialize};

use crate::model::Location;

/// A class declaration as extracted by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    /// Constructor parameter names, each resolved as a binding key.
    #[serde(default)]
    pub params: Vec<String>,
    /// The declared base type, if any (single inheritance).
    #[serde(default)]
    pub base: Option<String>,
    /// Methods in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    /// Setter-injection method names in declaration order.
    #[serde(default)]
    pub setters: Vec<String>,
    /// Set when a conflicting re-declaration of the class was seen.
    #[serde(default)]
    pub duplicated: bool,
    #[serde(default)]
    pub location: Location,
}

impl ClassDescriptor {
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            base: None,
            methods: Vec::new(),
            setters: Vec::new(),
            duplicated: false,
            location: Location::default(),
        }
    }

    /// A class with a parameterless constructor.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Vec::<String>::new())
    }

    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_setter(mut self, setter: impl Into<String>) -> Self {
        self.setters.push(setter.into());
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Returns every dotted segment of the name but the last one.
    pub fn namespace(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or("", |(namespace, _)| namespace)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name == name)
    }
}

/// A method declared on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    /// Set when the method was re-declared with a different parameter list.
    #[serde(default)]
    pub ambiguous: bool,
    #[serde(default)]
    pub location: Location,
}

impl MethodDescriptor {
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            ambiguous: false,
            location: Location::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_descriptor_namespace_succeeds() {
        assert_eq!(ClassDescriptor::named("a.b.Foo").namespace(), "a.b");
        assert_eq!(ClassDescriptor::named("Foo").namespace(), "");
    }

    #[test]
    fn class_descriptor_method_lookup_succeeds() {
        let class = ClassDescriptor::new("Foo", ["bar"])
            .with_method(MethodDescriptor::new("doIt", ["x", "y"]))
            .with_setter("setBaz");

        assert_eq!(class.method("doIt").unwrap().params, vec!["x", "y"]);
        assert!(class.method("missing").is_none());
        assert_eq!(class.setters, vec!["setBaz"]);
    }

    #[test]
    fn class_descriptor_deserialize_succeeds() {
        let class: ClassDescriptor = serde_json::from_str(
            r#"{ "name": "a.Foo", "params": ["bar"], "base": "a.Base",
                 "methods": [{ "name": "run" }] }"#,
        )
        .unwrap();

        assert_eq!(class.base.as_deref(), Some("a.Base"));
        assert!(class.setters.is_empty());
        assert!(!class.methods[0].ambiguous);
    }
}

use regex::Regex;

use crate::config::NamespaceMatching;

/// A compiled `like` glob: start-anchored, `*` standing for any run of
/// characters, everything else literal.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    pub fn compile(glob: &str) -> Result<Self, regex::Error> {
        let body = glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Ok(Self {
            regex: Regex::new(&format!("^{body}"))?,
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// A compiled namespace argument of `inNamespace` / `inSubnamespace`.
#[derive(Debug, Clone)]
pub enum NamespacePattern {
    Literal(String),
    /// The argument as a regular expression, dots unescaped.
    Legacy(Regex),
}

impl NamespacePattern {
    /// Compiles an `inNamespace` argument, matched against the whole
    /// namespace.
    pub fn exact(namespace: &str, mode: NamespaceMatching) -> Self {
        Self::compile(namespace, "$", mode)
    }

    /// Compiles an `inSubnamespace` argument, matched as a prefix.
    pub fn prefix(namespace: &str, mode: NamespaceMatching) -> Self {
        Self::compile(namespace, "", mode)
    }

    fn compile(namespace: &str, anchor: &str, mode: NamespaceMatching) -> Self {
        match mode {
            NamespaceMatching::Literal => Self::Literal(namespace.to_string()),
            NamespaceMatching::Legacy => match Regex::new(&format!("^{namespace}{anchor}")) {
                Ok(regex) => Self::Legacy(regex),
                Err(err) => {
                    tracing::warn!(
                        namespace,
                        error = %err,
                        "namespace is not a valid pattern, matching it literally"
                    );
                    Self::Literal(namespace.to_string())
                }
            },
        }
    }

    pub fn is_exact_match(&self, namespace: &str) -> bool {
        match self {
            Self::Literal(expected) => namespace == expected,
            Self::Legacy(regex) => regex.is_match(namespace),
        }
    }

    pub fn is_prefix_match(&self, name: &str) -> bool {
        match self {
            Self::Literal(prefix) => name.starts_with(prefix.as_str()),
            Self::Legacy(regex) => regex.is_match(name),
        }
    }
}

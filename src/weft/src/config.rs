//! Naming conventions and policy knobs of a weaving pass.
//!
//! Resolution order (highest priority last):
//! 1. Built-in defaults
//! 2. `weft.toml` in the working directory, if present
//! 3. Environment variables: `WEFT_*`
//!
//! ```toml
//! provider_suffix = "Provider"
//! singleton_prefix = "singletonInstance"
//! detect_cycles = true
//! namespace_matching = "literal"
//! ```

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

pub const CONFIG_FILE: &str = "weft.toml";
pub const ENV_PREFIX: &str = "WEFT_";

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConfigError {
    #[snafu(display("could not load the weaving options: {source}"))]
    #[non_exhaustive]
    Load { source: Box<figment::Error> },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load {
            source: Box::new(err),
        }
    }
}

/// How namespace class matchers compare their argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceMatching {
    /// Dots are literal: `a.b` never matches `axb`.
    #[default]
    Literal,
    /// The argument is used as a regular expression with its dots left
    /// unescaped, so `a.b` also matches `axb`.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// A constructor parameter ending with this suffix asks for the provider
    /// of the stripped key instead of its value.
    pub provider_suffix: String,
    pub singleton_prefix: String,
    /// Prefix of the temporaries holding instances under setter injection.
    pub instance_prefix: String,
    pub enhanced_prefix: String,
    /// Prefix of the module members interceptors are stored under.
    pub interceptor_prefix: String,
    pub interceptor_args: String,
    pub interceptor_this: String,
    pub detect_cycles: bool,
    pub namespace_matching: NamespaceMatching,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            provider_suffix: "Provider".to_string(),
            singleton_prefix: "singletonInstance".to_string(),
            instance_prefix: "instance$".to_string(),
            enhanced_prefix: "Enhanced$".to_string(),
            interceptor_prefix: "interceptor$".to_string(),
            interceptor_args: "interceptor$args".to_string(),
            interceptor_this: "interceptor$this".to_string(),
            detect_cycles: true,
            namespace_matching: NamespaceMatching::Literal,
        }
    }
}

impl Options {
    /// The layered configuration sources, without extracting them.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// Loads an explicit file over the defaults; the environment still wins.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let options = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        Ok(options)
    }

    /// Strips the provider suffix from a parameter name, if it carries one.
    pub fn strip_provider_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_suffix(self.provider_suffix.as_str())
            .filter(|stripped| !stripped.is_empty())
    }
}

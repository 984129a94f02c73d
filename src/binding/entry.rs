//! Binding declarations - the `Type` / `Type:name` grammar
//!
//! ```text
//! declaration := Type [ ":" ProviderName ]
//! Type        := "Acl" | "Backend" | "ConfigStore" | "env" | "KVStore" | "Logger" | "SecretStore"
//! ```
//!
//! Examples:
//! - `Backend` -> backend registered under the symbolic name itself
//! - `Backend:origin-1` -> backend registered as `origin-1`
//! - `env:FASTLY_POP` -> environment variable `FASTLY_POP`
//!
//! Unknown types parse to `None`: at runtime the binding is simply absent.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Binding map - symbolic name to raw declaration string
///
/// Declarations are kept raw so that a malformed entry only disables its own
/// binding instead of failing the whole map.
pub type BindingMap = FxHashMap<String, String>;

/// The closed set of resource categories a binding can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "Acl")]
    Acl,
    #[serde(rename = "Backend")]
    Backend,
    #[serde(rename = "ConfigStore")]
    ConfigStore,
    #[serde(rename = "env")]
    Env,
    #[serde(rename = "KVStore")]
    KvStore,
    #[serde(rename = "Logger")]
    Logger,
    #[serde(rename = "SecretStore")]
    SecretStore,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Acl,
        ResourceType::Backend,
        ResourceType::ConfigStore,
        ResourceType::Env,
        ResourceType::KvStore,
        ResourceType::Logger,
        ResourceType::SecretStore,
    ];

    /// Token used in declaration strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Acl => "Acl",
            ResourceType::Backend => "Backend",
            ResourceType::ConfigStore => "ConfigStore",
            ResourceType::Env => "env",
            ResourceType::KvStore => "KVStore",
            ResourceType::Logger => "Logger",
            ResourceType::SecretStore => "SecretStore",
        }
    }

    /// Context slot name, as shown in reports
    pub fn context_key(&self) -> &'static str {
        match self {
            ResourceType::Acl => "ACLS",
            ResourceType::Backend => "BACKENDS",
            ResourceType::ConfigStore => "CONFIG_STORES",
            ResourceType::Env => "ENV",
            ResourceType::KvStore => "KV_STORES",
            ResourceType::Logger => "LOGGERS",
            ResourceType::SecretStore => "SECRET_STORES",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens are case-sensitive: `env` is lowercase, everything else is not.
impl FromStr for ResourceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// A parsed binding declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub resource_type: ResourceType,
    /// Explicit provider-side name after `:`, if any
    pub resource_name: Option<&'a str>,
}

impl<'a> Declaration<'a> {
    /// Provider-side name, defaulting to the symbolic name the binding is declared under
    pub fn resource_name_or<'b>(&self, alias: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.resource_name.unwrap_or(alias)
    }
}

/// Parse a declaration string
///
/// Splits on the first `:`. The left segment must be a known type token,
/// otherwise returns `None`. Everything after the first `:` is the provider
/// name (it may itself contain `:`). An empty suffix (`Backend:`) is an
/// explicit empty name, not the symbolic-name default.
pub fn parse_declaration(s: &str) -> Option<Declaration<'_>> {
    let (type_token, resource_name) = match s.split_once(':') {
        Some((t, name)) => (t, Some(name)),
        None => (s, None),
    };

    let resource_type = type_token.parse().ok()?;
    Some(Declaration {
        resource_type,
        resource_name,
    })
}

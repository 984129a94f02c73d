//! Bindery Manifest
//!
//! A manifest declares the bindings of an application together with the
//! local resources they resolve against. TOML by default, YAML when the file
//! ends in `.yaml` / `.yml`.
//!
//! ```toml
//! [bindings]
//! api = "Backend"               # backend named "api"
//! origin = "Backend:origin-1"   # backend named "origin-1"
//! pop = "env:FASTLY_POP"
//!
//! [backends.api]
//! url = "https://api.example.com"
//!
//! [config_stores.settings]
//! greeting = "hello"
//!
//! [env]
//! FASTLY_POP = "LHR"
//! ```
//!
//! ## Manifest path priority (highest to lowest)
//!
//! 1. `--manifest` CLI argument
//! 2. `BINDERY_MANIFEST` environment variable
//! 3. `./bindery.toml`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::binding::BindingMap;
use crate::error::{BinderyError, Result};
use crate::provider::AclAction;

/// Environment variable naming the manifest file
pub const MANIFEST_ENV: &str = "BINDERY_MANIFEST";

/// Manifest file used when nothing else is specified
pub const DEFAULT_MANIFEST: &str = "bindery.toml";

/// String key/value table (config, KV and secret store contents)
pub type StoreContents = BTreeMap<String, String>;

/// Main manifest structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Symbolic name → `Type` / `Type:name`
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,

    #[serde(default)]
    pub backends: BTreeMap<String, BackendDef>,

    #[serde(default)]
    pub acls: BTreeMap<String, AclDef>,

    #[serde(default)]
    pub config_stores: BTreeMap<String, StoreContents>,

    #[serde(default)]
    pub kv_stores: BTreeMap<String, StoreContents>,

    #[serde(default)]
    pub secret_stores: BTreeMap<String, StoreContents>,

    #[serde(default)]
    pub loggers: BTreeMap<String, LoggerDef>,

    /// Environment overrides; unset names fall back to the process env
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Backend definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendDef {
    pub url: String,

    /// Host header to send instead of the URL host
    #[serde(default)]
    pub override_host: Option<String>,
}

/// ACL definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AclDef {
    #[serde(default)]
    pub entries: Vec<AclEntryDef>,
}

/// One ACL entry: `prefix = "10.0.0.0/8"`, `action = "BLOCK"`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AclEntryDef {
    pub prefix: String,
    pub action: AclAction,
}

/// Logging endpoint definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggerDef {
    /// Free-form format label attached to every record
    #[serde(default)]
    pub format: Option<String>,
}

impl Manifest {
    /// Pick the manifest path: explicit argument, then env, then default
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path;
        }
        match std::env::var(MANIFEST_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_MANIFEST),
        }
    }

    /// Load a manifest file
    ///
    /// The format is chosen from the extension (`.yaml`/`.yml` → YAML,
    /// anything else → TOML).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BinderyError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| BinderyError::ConfigError {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BinderyError::ConfigError {
            reason: format!("Failed to parse TOML manifest: {}", e),
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| BinderyError::ConfigError {
            reason: format!("Failed to parse YAML manifest: {}", e),
        })
    }

    /// Binding declarations as a lookup map
    pub fn binding_map(&self) -> BindingMap {
        self.bindings
            .iter()
            .map(|(alias, decl)| (alias.clone(), decl.clone()))
            .collect()
    }
}

//! Local platform - resources declared in a bindery manifest
//!
//! Lets an application (or the CLI) resolve its bindings without a live edge
//! platform. Every handle is `Arc`-backed so the caches can clone it freely.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{env, Platform};
use crate::binding::ResourceType;
use crate::config::{AclDef, BackendDef, LoggerDef, Manifest, StoreContents};
use crate::error::BinderyError;

// ═══════════════════════════════════════════════════════════════
// ACL
// ═══════════════════════════════════════════════════════════════

/// Action attached to an ACL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AclAction {
    Allow,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Prefix {
    addr: IpAddr,
    len: u8,
}

impl Prefix {
    /// `10.0.0.0/8`, `2001:db8::/32`, or a bare address (full-length prefix)
    fn parse(s: &str) -> Option<Self> {
        let (addr, len) = match s.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (s, None),
        };
        let addr: IpAddr = addr.trim().parse().ok()?;
        let max = Self::bits(addr);
        let len = match len {
            Some(len) => len.trim().parse::<u8>().ok().filter(|l| *l <= max)?,
            None => max,
        };
        Some(Self { addr, len })
    }

    fn bits(addr: IpAddr) -> u8 {
        match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }

    fn contains(&self, ip: IpAddr) -> bool {
        let (net, ip, bits) = match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => (u32::from(net) as u128, u32::from(ip) as u128, 32),
            (IpAddr::V6(net), IpAddr::V6(ip)) => (u128::from(net), u128::from(ip), 128),
            _ => return false,
        };
        if self.len == 0 {
            return true;
        }
        let shift = bits - self.len;
        (net >> shift) == (ip >> shift)
    }
}

#[derive(Debug)]
struct AclInner {
    name: String,
    entries: Vec<(Prefix, AclAction)>,
}

/// Handle to a manifest ACL
#[derive(Debug, Clone)]
pub struct LocalAcl(Arc<AclInner>);

impl LocalAcl {
    fn open(name: &str, def: &AclDef) -> Result<Self, BinderyError> {
        let entries = def
            .entries
            .iter()
            .map(|entry| {
                Prefix::parse(&entry.prefix)
                    .map(|prefix| (prefix, entry.action))
                    .ok_or_else(|| BinderyError::NotProvisioned {
                        category: ResourceType::Acl,
                        name: name.to_string(),
                        reason: format!("invalid prefix '{}'", entry.prefix),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(Arc::new(AclInner {
            name: name.to_string(),
            entries,
        })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Action of the longest prefix containing `ip`, if any
    pub fn lookup(&self, ip: IpAddr) -> Option<AclAction> {
        self.0
            .entries
            .iter()
            .filter(|(prefix, _)| prefix.contains(ip))
            .max_by_key(|(prefix, _)| prefix.len)
            .map(|(_, action)| *action)
    }
}

// ═══════════════════════════════════════════════════════════════
// Backend
// ═══════════════════════════════════════════════════════════════

#[derive(Debug)]
struct BackendInner {
    name: String,
    url: Url,
    override_host: Option<String>,
}

/// Handle to a manifest backend
#[derive(Debug, Clone)]
pub struct LocalBackend(Arc<BackendInner>);

impl LocalBackend {
    fn open(name: &str, def: &BackendDef) -> Result<Self, BinderyError> {
        let url = Url::parse(&def.url).map_err(|e| BinderyError::NotProvisioned {
            category: ResourceType::Backend,
            name: name.to_string(),
            reason: format!("invalid url '{}': {}", def.url, e),
        })?;

        Ok(Self(Arc::new(BackendInner {
            name: name.to_string(),
            url,
            override_host: def.override_host.clone(),
        })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn url(&self) -> &Url {
        &self.0.url
    }

    /// Host header for requests: override host, else the URL host
    pub fn host(&self) -> Option<&str> {
        self.0
            .override_host
            .as_deref()
            .or_else(|| self.0.url.host_str())
    }
}

// ═══════════════════════════════════════════════════════════════
// Config / KV / Secret stores
// ═══════════════════════════════════════════════════════════════

/// Handle to a manifest config store
#[derive(Debug, Clone)]
pub struct LocalConfigStore {
    name: Arc<str>,
    entries: Arc<StoreContents>,
}

impl LocalConfigStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Handle to a manifest KV store
#[derive(Debug, Clone)]
pub struct LocalKvStore {
    name: Arc<str>,
    entries: Arc<StoreContents>,
}

impl LocalKvStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Secret value; `Debug` and `Display` never print the plaintext
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Arc<str>);

impl Secret {
    pub fn plaintext(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Handle to a manifest secret store
#[derive(Clone)]
pub struct LocalSecretStore {
    name: Arc<str>,
    entries: Arc<StoreContents>,
}

impl LocalSecretStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<Secret> {
        self.entries.get(key).map(|v| Secret(Arc::from(v.as_str())))
    }
}

impl fmt::Debug for LocalSecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSecretStore")
            .field("name", &self.name)
            .field("secrets", &self.entries.len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════
// Logger
// ═══════════════════════════════════════════════════════════════

/// Handle to a manifest logging endpoint; records go through `tracing`
#[derive(Debug, Clone)]
pub struct LocalLogger {
    name: Arc<str>,
    format: Option<Arc<str>>,
}

impl LocalLogger {
    fn open(name: &str, def: &LoggerDef) -> Self {
        Self {
            name: Arc::from(name),
            format: def.format.as_deref().map(Arc::from),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, message: &str) {
        tracing::info!(
            target: "bindery::log",
            endpoint = %self.name,
            format = self.format.as_deref().unwrap_or("text"),
            "{}",
            message
        );
    }
}

// ═══════════════════════════════════════════════════════════════
// Platform
// ═══════════════════════════════════════════════════════════════

/// Platform backed by a [`Manifest`]
#[derive(Debug, Clone, Default)]
pub struct LocalPlatform {
    backends: BTreeMap<String, BackendDef>,
    acls: BTreeMap<String, AclDef>,
    config_stores: BTreeMap<String, Arc<StoreContents>>,
    kv_stores: BTreeMap<String, Arc<StoreContents>>,
    secret_stores: BTreeMap<String, Arc<StoreContents>>,
    loggers: BTreeMap<String, LoggerDef>,
    env: BTreeMap<String, String>,
}

fn shared(stores: &BTreeMap<String, StoreContents>) -> BTreeMap<String, Arc<StoreContents>> {
    stores
        .iter()
        .map(|(name, contents)| (name.clone(), Arc::new(contents.clone())))
        .collect()
}

fn store_handle(
    stores: &BTreeMap<String, Arc<StoreContents>>,
    category: ResourceType,
    name: &str,
) -> Result<(Arc<str>, Arc<StoreContents>), BinderyError> {
    stores
        .get(name)
        .map(|entries| (Arc::from(name), Arc::clone(entries)))
        .ok_or_else(|| BinderyError::not_found(category, name))
}

impl LocalPlatform {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            backends: manifest.backends.clone(),
            acls: manifest.acls.clone(),
            config_stores: shared(&manifest.config_stores),
            kv_stores: shared(&manifest.kv_stores),
            secret_stores: shared(&manifest.secret_stores),
            loggers: manifest.loggers.clone(),
            env: manifest.env.clone(),
        }
    }
}

impl Platform for LocalPlatform {
    type Acl = LocalAcl;
    type Backend = LocalBackend;
    type ConfigStore = LocalConfigStore;
    type KvStore = LocalKvStore;
    type Logger = LocalLogger;
    type SecretStore = LocalSecretStore;

    fn open_acl(&self, name: &str) -> Result<LocalAcl, BinderyError> {
        let def = self
            .acls
            .get(name)
            .ok_or_else(|| BinderyError::not_found(ResourceType::Acl, name))?;
        LocalAcl::open(name, def)
    }

    fn open_backend(&self, name: &str) -> Result<LocalBackend, BinderyError> {
        let def = self
            .backends
            .get(name)
            .ok_or_else(|| BinderyError::not_found(ResourceType::Backend, name))?;
        LocalBackend::open(name, def)
    }

    fn open_config_store(&self, name: &str) -> Result<LocalConfigStore, BinderyError> {
        let (name, entries) = store_handle(&self.config_stores, ResourceType::ConfigStore, name)?;
        Ok(LocalConfigStore { name, entries })
    }

    fn open_kv_store(&self, name: &str) -> Result<LocalKvStore, BinderyError> {
        let (name, entries) = store_handle(&self.kv_stores, ResourceType::KvStore, name)?;
        Ok(LocalKvStore { name, entries })
    }

    fn open_logger(&self, name: &str) -> Result<LocalLogger, BinderyError> {
        self.loggers
            .get(name)
            .map(|def| LocalLogger::open(name, def))
            .ok_or_else(|| BinderyError::not_found(ResourceType::Logger, name))
    }

    fn open_secret_store(&self, name: &str) -> Result<LocalSecretStore, BinderyError> {
        let (name, entries) = store_handle(&self.secret_stores, ResourceType::SecretStore, name)?;
        Ok(LocalSecretStore { name, entries })
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env
            .get(name)
            .cloned()
            .or_else(|| env::process_var(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> LocalPlatform {
        let manifest = Manifest::from_toml_str(
            r#"
[backends.origin]
url = "https://origin.example.com:8443/base"

[backends.routed]
url = "https://10.0.0.1"
override_host = "www.example.com"

[backends.broken]
url = "not a url"

[acls.blocklist]
entries = [
    { prefix = "10.0.0.0/8", action = "BLOCK" },
    { prefix = "10.1.0.0/16", action = "ALLOW" },
    { prefix = "2001:db8::/32", action = "BLOCK" },
]

[acls.bad]
entries = [{ prefix = "10.0.0.0/40", action = "BLOCK" }]

[config_stores.settings]
greeting = "hello"

[kv_stores.cache]
a = "1"
b = "2"

[secret_stores.vault]
token = "s3cr3t"

[loggers.audit]
format = "json"

[env]
BINDERY_LOCAL_ONLY = "manifest"
"#,
        )
        .unwrap();
        LocalPlatform::from_manifest(&manifest)
    }

    #[test]
    fn test_backend_open() {
        let backend = platform().open_backend("origin").unwrap();
        assert_eq!(backend.name(), "origin");
        assert_eq!(backend.url().port(), Some(8443));
        assert_eq!(backend.host(), Some("origin.example.com"));
    }

    #[test]
    fn test_backend_override_host() {
        let backend = platform().open_backend("routed").unwrap();
        assert_eq!(backend.host(), Some("www.example.com"));
    }

    #[test]
    fn test_backend_invalid_url_not_provisioned() {
        let err = platform().open_backend("broken").unwrap_err();
        assert!(err.to_string().contains("BND-021"));
    }

    #[test]
    fn test_backend_missing_not_found() {
        let err = platform().open_backend("nope").unwrap_err();
        assert!(matches!(err, BinderyError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_acl_longest_prefix_wins() {
        let acl = platform().open_acl("blocklist").unwrap();
        assert_eq!(acl.lookup("10.2.3.4".parse().unwrap()), Some(AclAction::Block));
        assert_eq!(acl.lookup("10.1.3.4".parse().unwrap()), Some(AclAction::Allow));
        assert_eq!(acl.lookup("192.168.0.1".parse().unwrap()), None);
        assert_eq!(acl.lookup("2001:db8::1".parse().unwrap()), Some(AclAction::Block));
        assert_eq!(acl.lookup("2001:db9::1".parse().unwrap()), None);
    }

    #[test]
    fn test_acl_invalid_prefix_not_provisioned() {
        let err = platform().open_acl("bad").unwrap_err();
        assert!(err.to_string().contains("invalid prefix"));
    }

    #[test]
    fn test_prefix_parse() {
        assert_eq!(Prefix::parse("1.2.3.4").unwrap().len, 32);
        assert_eq!(Prefix::parse("::1").unwrap().len, 128);
        assert!(Prefix::parse("0.0.0.0/0").unwrap().contains("8.8.8.8".parse().unwrap()));
        assert!(Prefix::parse("::/0").unwrap().contains("::1".parse().unwrap()));
        assert!(Prefix::parse("1.2.3.4/33").is_none());
        assert!(Prefix::parse("host/8").is_none());
    }

    #[test]
    fn test_stores() {
        let platform = platform();

        let settings = platform.open_config_store("settings").unwrap();
        assert_eq!(settings.get("greeting"), Some("hello"));
        assert_eq!(settings.get("missing"), None);

        let cache = platform.open_kv_store("cache").unwrap();
        assert_eq!(cache.lookup("b"), Some("2"));
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        assert!(platform.open_config_store("cache").is_err());
    }

    #[test]
    fn test_secret_is_masked() {
        let vault = platform().open_secret_store("vault").unwrap();
        let token = vault.get("token").unwrap();

        assert_eq!(token.plaintext(), "s3cr3t");
        assert_eq!(token.to_string(), "***");
        assert!(!format!("{:?}", token).contains("s3cr3t"));
        assert!(!format!("{:?}", vault).contains("s3cr3t"));
    }

    #[test]
    fn test_logger_open() {
        let logger = platform().open_logger("audit").unwrap();
        assert_eq!(logger.name(), "audit");
        logger.log("hello from test");
        assert!(platform().open_logger("other").is_err());
    }

    #[test]
    fn test_env_prefers_manifest() {
        let platform = platform();
        assert_eq!(platform.env_var("BINDERY_LOCAL_ONLY").as_deref(), Some("manifest"));
        assert_eq!(platform.env_var("BINDERY_SURELY_UNSET_VARIABLE_42"), None);
    }
}

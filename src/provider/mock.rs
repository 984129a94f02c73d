//! Mock platform for testing
//!
//! Serves handles for a configured set of names and records every open
//! request, so tests can assert how often (and for what) the caches hit the
//! platform.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use super::Platform;
use crate::binding::ResourceType;
use crate::error::BinderyError;

/// Handle returned by the mock for every category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockHandle {
    pub category: ResourceType,
    pub name: String,
}

/// Mock platform with configurable resources
#[derive(Debug, Default)]
pub struct MockPlatform {
    /// Resources that open successfully
    present: HashSet<(ResourceType, String)>,
    /// Resources whose opener panics
    panicking: HashSet<(ResourceType, String)>,
    /// Environment variables
    env: HashMap<String, String>,
    /// Every open request, in order
    opens: Mutex<Vec<(ResourceType, String)>>,
}

impl MockPlatform {
    /// Create a platform with no resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under any category
    pub fn with(mut self, category: ResourceType, name: impl Into<String>) -> Self {
        self.present.insert((category, name.into()));
        self
    }

    pub fn with_acl(self, name: impl Into<String>) -> Self {
        self.with(ResourceType::Acl, name)
    }

    pub fn with_backend(self, name: impl Into<String>) -> Self {
        self.with(ResourceType::Backend, name)
    }

    pub fn with_config_store(self, name: impl Into<String>) -> Self {
        self.with(ResourceType::ConfigStore, name)
    }

    pub fn with_kv_store(self, name: impl Into<String>) -> Self {
        self.with(ResourceType::KvStore, name)
    }

    pub fn with_logger(self, name: impl Into<String>) -> Self {
        self.with(ResourceType::Logger, name)
    }

    pub fn with_secret_store(self, name: impl Into<String>) -> Self {
        self.with(ResourceType::SecretStore, name)
    }

    /// Set an environment variable
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Make the opener for this resource panic
    pub fn panicking(mut self, category: ResourceType, name: impl Into<String>) -> Self {
        self.panicking.insert((category, name.into()));
        self
    }

    /// How many times `name` was opened under `category`
    pub fn open_count(&self, category: ResourceType, name: &str) -> usize {
        self.opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(c, n)| *c == category && n == name)
            .count()
    }

    /// How many opens happened under `category`, any name
    pub fn category_opens(&self, category: ResourceType) -> usize {
        self.opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(c, _)| *c == category)
            .count()
    }

    /// Total number of open requests
    pub fn total_opens(&self) -> usize {
        self.opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn open(&self, category: ResourceType, name: &str) -> Result<MockHandle, BinderyError> {
        // Record before a possible panic so the lock is never poisoned
        self.opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((category, name.to_string()));

        let key = (category, name.to_string());
        if self.panicking.contains(&key) {
            panic!("mock {} '{}' panicked", category, name);
        }
        if self.present.contains(&key) {
            Ok(MockHandle {
                category,
                name: name.to_string(),
            })
        } else {
            Err(BinderyError::not_found(category, name))
        }
    }
}

impl Platform for MockPlatform {
    type Acl = MockHandle;
    type Backend = MockHandle;
    type ConfigStore = MockHandle;
    type KvStore = MockHandle;
    type Logger = MockHandle;
    type SecretStore = MockHandle;

    fn open_acl(&self, name: &str) -> Result<MockHandle, BinderyError> {
        self.open(ResourceType::Acl, name)
    }

    fn open_backend(&self, name: &str) -> Result<MockHandle, BinderyError> {
        self.open(ResourceType::Backend, name)
    }

    fn open_config_store(&self, name: &str) -> Result<MockHandle, BinderyError> {
        self.open(ResourceType::ConfigStore, name)
    }

    fn open_kv_store(&self, name: &str) -> Result<MockHandle, BinderyError> {
        self.open(ResourceType::KvStore, name)
    }

    fn open_logger(&self, name: &str) -> Result<MockHandle, BinderyError> {
        self.open(ResourceType::Logger, name)
    }

    fn open_secret_store(&self, name: &str) -> Result<MockHandle, BinderyError> {
        self.open(ResourceType::SecretStore, name)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((ResourceType::Env, name.to_string()));
        self.env.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_opens_configured_resources() {
        let platform = MockPlatform::new().with_backend("origin");

        let handle = platform.open_backend("origin").unwrap();
        assert_eq!(handle.name, "origin");
        assert_eq!(handle.category, ResourceType::Backend);
    }

    #[test]
    fn test_mock_missing_is_not_found() {
        let platform = MockPlatform::new().with_backend("origin");

        // Same name, other category
        let err = platform.open_acl("origin").unwrap_err();
        assert!(err.to_string().contains("BND-020"));
    }

    #[test]
    fn test_mock_records_opens() {
        let platform = MockPlatform::new().with_env("A", "1");

        let _ = platform.open_logger("audit");
        let _ = platform.open_logger("audit");
        let _ = platform.env_var("A");

        assert_eq!(platform.open_count(ResourceType::Logger, "audit"), 2);
        assert_eq!(platform.category_opens(ResourceType::Env), 1);
        assert_eq!(platform.total_opens(), 3);
    }
}

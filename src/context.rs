//! Aggregate context - one lazy cache per resource category
//!
//! ```text
//! Context<P>
//! ├── ACLS           LazyCache<P::Acl>
//! ├── BACKENDS       LazyCache<P::Backend>
//! ├── CONFIG_STORES  LazyCache<P::ConfigStore>
//! ├── ENV            LazyCache<String>
//! ├── KV_STORES      LazyCache<P::KvStore>
//! ├── LOGGERS        LazyCache<P::Logger>
//! └── SECRET_STORES  LazyCache<P::SecretStore>
//! ```
//!
//! A context is immutable once built; only cache entries fill in. Share it
//! with `Arc` and build it once per process through [`SharedContext`].

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::binding::ResourceType;
use crate::provider::Platform;
use crate::store::{registry, LazyCache};

/// A resolved handle of any category
pub enum Resource<P: Platform> {
    Acl(P::Acl),
    Backend(P::Backend),
    ConfigStore(P::ConfigStore),
    Env(String),
    KvStore(P::KvStore),
    Logger(P::Logger),
    SecretStore(P::SecretStore),
}

impl<P: Platform> Resource<P> {
    pub fn category(&self) -> ResourceType {
        match self {
            Resource::Acl(_) => ResourceType::Acl,
            Resource::Backend(_) => ResourceType::Backend,
            Resource::ConfigStore(_) => ResourceType::ConfigStore,
            Resource::Env(_) => ResourceType::Env,
            Resource::KvStore(_) => ResourceType::KvStore,
            Resource::Logger(_) => ResourceType::Logger,
            Resource::SecretStore(_) => ResourceType::SecretStore,
        }
    }

    pub fn as_acl(&self) -> Option<&P::Acl> {
        match self {
            Resource::Acl(acl) => Some(acl),
            _ => None,
        }
    }

    pub fn as_backend(&self) -> Option<&P::Backend> {
        match self {
            Resource::Backend(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn as_config_store(&self) -> Option<&P::ConfigStore> {
        match self {
            Resource::ConfigStore(store) => Some(store),
            _ => None,
        }
    }

    pub fn as_env(&self) -> Option<&str> {
        match self {
            Resource::Env(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_kv_store(&self) -> Option<&P::KvStore> {
        match self {
            Resource::KvStore(store) => Some(store),
            _ => None,
        }
    }

    pub fn as_logger(&self) -> Option<&P::Logger> {
        match self {
            Resource::Logger(logger) => Some(logger),
            _ => None,
        }
    }

    pub fn as_secret_store(&self) -> Option<&P::SecretStore> {
        match self {
            Resource::SecretStore(store) => Some(store),
            _ => None,
        }
    }

    pub fn into_acl(self) -> Option<P::Acl> {
        match self {
            Resource::Acl(acl) => Some(acl),
            _ => None,
        }
    }

    pub fn into_backend(self) -> Option<P::Backend> {
        match self {
            Resource::Backend(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn into_config_store(self) -> Option<P::ConfigStore> {
        match self {
            Resource::ConfigStore(store) => Some(store),
            _ => None,
        }
    }

    pub fn into_env(self) -> Option<String> {
        match self {
            Resource::Env(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_kv_store(self) -> Option<P::KvStore> {
        match self {
            Resource::KvStore(store) => Some(store),
            _ => None,
        }
    }

    pub fn into_logger(self) -> Option<P::Logger> {
        match self {
            Resource::Logger(logger) => Some(logger),
            _ => None,
        }
    }

    pub fn into_secret_store(self) -> Option<P::SecretStore> {
        match self {
            Resource::SecretStore(store) => Some(store),
            _ => None,
        }
    }
}

impl<P: Platform> Clone for Resource<P> {
    fn clone(&self) -> Self {
        match self {
            Resource::Acl(h) => Resource::Acl(h.clone()),
            Resource::Backend(h) => Resource::Backend(h.clone()),
            Resource::ConfigStore(h) => Resource::ConfigStore(h.clone()),
            Resource::Env(v) => Resource::Env(v.clone()),
            Resource::KvStore(h) => Resource::KvStore(h.clone()),
            Resource::Logger(h) => Resource::Logger(h.clone()),
            Resource::SecretStore(h) => Resource::SecretStore(h.clone()),
        }
    }
}

impl<P: Platform> fmt::Debug for Resource<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Acl(h) => f.debug_tuple("Acl").field(h).finish(),
            Resource::Backend(h) => f.debug_tuple("Backend").field(h).finish(),
            Resource::ConfigStore(h) => f.debug_tuple("ConfigStore").field(h).finish(),
            Resource::Env(v) => f.debug_tuple("Env").field(v).finish(),
            Resource::KvStore(h) => f.debug_tuple("KvStore").field(h).finish(),
            Resource::Logger(h) => f.debug_tuple("Logger").field(h).finish(),
            Resource::SecretStore(h) => f.debug_tuple("SecretStore").field(h).finish(),
        }
    }
}

impl<P> PartialEq for Resource<P>
where
    P: Platform,
    P::Acl: PartialEq,
    P::Backend: PartialEq,
    P::ConfigStore: PartialEq,
    P::KvStore: PartialEq,
    P::Logger: PartialEq,
    P::SecretStore: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Resource::Acl(a), Resource::Acl(b)) => a == b,
            (Resource::Backend(a), Resource::Backend(b)) => a == b,
            (Resource::ConfigStore(a), Resource::ConfigStore(b)) => a == b,
            (Resource::Env(a), Resource::Env(b)) => a == b,
            (Resource::KvStore(a), Resource::KvStore(b)) => a == b,
            (Resource::Logger(a), Resource::Logger(b)) => a == b,
            (Resource::SecretStore(a), Resource::SecretStore(b)) => a == b,
            _ => false,
        }
    }
}

/// Immutable record of the seven category caches
pub struct Context<P: Platform> {
    acls: LazyCache<P::Acl>,
    backends: LazyCache<P::Backend>,
    config_stores: LazyCache<P::ConfigStore>,
    env: LazyCache<String>,
    kv_stores: LazyCache<P::KvStore>,
    loggers: LazyCache<P::Logger>,
    secret_stores: LazyCache<P::SecretStore>,
}

impl<P: Platform> Context<P> {
    /// Build one registry per category; nothing is opened yet
    pub fn new(platform: Arc<P>) -> Self {
        debug!("building resource context");
        Self {
            acls: registry::acls(Arc::clone(&platform)),
            backends: registry::backends(Arc::clone(&platform)),
            config_stores: registry::config_stores(Arc::clone(&platform)),
            env: registry::env(Arc::clone(&platform)),
            kv_stores: registry::kv_stores(Arc::clone(&platform)),
            loggers: registry::loggers(Arc::clone(&platform)),
            secret_stores: registry::secret_stores(platform),
        }
    }

    pub fn acls(&self) -> &LazyCache<P::Acl> {
        &self.acls
    }

    pub fn backends(&self) -> &LazyCache<P::Backend> {
        &self.backends
    }

    pub fn config_stores(&self) -> &LazyCache<P::ConfigStore> {
        &self.config_stores
    }

    pub fn env(&self) -> &LazyCache<String> {
        &self.env
    }

    pub fn kv_stores(&self) -> &LazyCache<P::KvStore> {
        &self.kv_stores
    }

    pub fn loggers(&self) -> &LazyCache<P::Logger> {
        &self.loggers
    }

    pub fn secret_stores(&self) -> &LazyCache<P::SecretStore> {
        &self.secret_stores
    }

    /// Resolve `name` in the cache of `category`
    pub fn get(&self, category: ResourceType, name: &str) -> Option<Resource<P>> {
        match category {
            ResourceType::Acl => self.acls.get(name).map(Resource::Acl),
            ResourceType::Backend => self.backends.get(name).map(Resource::Backend),
            ResourceType::ConfigStore => self.config_stores.get(name).map(Resource::ConfigStore),
            ResourceType::Env => self.env.get(name).map(Resource::Env),
            ResourceType::KvStore => self.kv_stores.get(name).map(Resource::KvStore),
            ResourceType::Logger => self.loggers.get(name).map(Resource::Logger),
            ResourceType::SecretStore => self.secret_stores.get(name).map(Resource::SecretStore),
        }
    }

    pub fn has(&self, category: ResourceType, name: &str) -> bool {
        self.get(category, name).is_some()
    }

    /// Whether `name` was already resolved in `category` (does not resolve)
    pub fn is_resolved(&self, category: ResourceType, name: &str) -> bool {
        match category {
            ResourceType::Acl => self.acls.is_resolved(name),
            ResourceType::Backend => self.backends.is_resolved(name),
            ResourceType::ConfigStore => self.config_stores.is_resolved(name),
            ResourceType::Env => self.env.is_resolved(name),
            ResourceType::KvStore => self.kv_stores.is_resolved(name),
            ResourceType::Logger => self.loggers.is_resolved(name),
            ResourceType::SecretStore => self.secret_stores.is_resolved(name),
        }
    }

    /// Number of names accessed in `category`
    pub fn cached(&self, category: ResourceType) -> usize {
        match category {
            ResourceType::Acl => self.acls.len(),
            ResourceType::Backend => self.backends.len(),
            ResourceType::ConfigStore => self.config_stores.len(),
            ResourceType::Env => self.env.len(),
            ResourceType::KvStore => self.kv_stores.len(),
            ResourceType::Logger => self.loggers.len(),
            ResourceType::SecretStore => self.secret_stores.len(),
        }
    }
}

impl<P: Platform> fmt::Debug for Context<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Context");
        for category in ResourceType::ALL {
            s.field(category.context_key(), &self.cached(category));
        }
        s.finish()
    }
}

/// Once-initialized context shared by everything in the process
///
/// The embedding application owns the cell (a `static` works) and passes the
/// resulting `Arc<Context<P>>` to its consumers. Repeated `get_or_init`
/// calls return the same context; the platform closure runs only once.
pub struct SharedContext<P: Platform> {
    cell: OnceCell<Arc<Context<P>>>,
}

impl<P: Platform> SharedContext<P> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_init<F>(&self, platform: F) -> Arc<Context<P>>
    where
        F: FnOnce() -> Arc<P>,
    {
        Arc::clone(self.cell.get_or_init(|| Arc::new(Context::new(platform()))))
    }

    /// The context, if it has been built
    pub fn get(&self) -> Option<Arc<Context<P>>> {
        self.cell.get().map(Arc::clone)
    }
}

impl<P: Platform> Default for SharedContext<P> {
    fn default() -> Self {
        Self::new()
    }
}

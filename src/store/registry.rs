//! Category registries - one lazy cache per resource category
//!
//! A registry pairs a platform opener with failure-to-absence translation.
//! Every handle category goes through the same generic [`registry`]; the env
//! category reads variables directly since a lookup cannot fail.

use std::sync::Arc;

use tracing::debug;

use crate::binding::ResourceType;
use crate::error::BinderyError;
use crate::provider::Platform;

use super::lazy::LazyCache;

/// Build a lazy cache whose opener translates `Err` into absence
pub fn registry<P, H>(
    category: ResourceType,
    platform: Arc<P>,
    open: fn(&P, &str) -> Result<H, BinderyError>,
) -> LazyCache<H>
where
    P: Send + Sync + 'static,
    H: Clone + 'static,
{
    LazyCache::new(category, move |name| match open(&platform, name) {
        Ok(handle) => Some(handle),
        Err(e) => {
            debug!(category = %category, name, error = %e, "open failed, resource is absent");
            None
        }
    })
}

pub fn acls<P: Platform>(platform: Arc<P>) -> LazyCache<P::Acl> {
    registry(ResourceType::Acl, platform, P::open_acl)
}

pub fn backends<P: Platform>(platform: Arc<P>) -> LazyCache<P::Backend> {
    registry(ResourceType::Backend, platform, P::open_backend)
}

pub fn config_stores<P: Platform>(platform: Arc<P>) -> LazyCache<P::ConfigStore> {
    registry(ResourceType::ConfigStore, platform, P::open_config_store)
}

pub fn kv_stores<P: Platform>(platform: Arc<P>) -> LazyCache<P::KvStore> {
    registry(ResourceType::KvStore, platform, P::open_kv_store)
}

pub fn loggers<P: Platform>(platform: Arc<P>) -> LazyCache<P::Logger> {
    registry(ResourceType::Logger, platform, P::open_logger)
}

pub fn secret_stores<P: Platform>(platform: Arc<P>) -> LazyCache<P::SecretStore> {
    registry(ResourceType::SecretStore, platform, P::open_secret_store)
}

/// Environment variables: value if set, absent otherwise
pub fn env<P: Platform>(platform: Arc<P>) -> LazyCache<String> {
    LazyCache::new(ResourceType::Env, move |name| platform.env_var(name))
}

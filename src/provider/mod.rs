//! # Platform Abstraction Layer
//!
//! The single capability bindery needs from the outside world: open a
//! resource handle by name, and say distinctly when that is not possible.
//!
//! - [`Platform`] - one opener per resource category
//! - [`LocalPlatform`] - manifest-backed platform used by the CLI
//! - [`MockPlatform`] - test platform that records every open
//!
//! Openers receive nothing but the provider-side name. Handles must be cheap
//! to clone; the caches hand out clones on every access.
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::provider::MockPlatform;
//! use bindery::store::registry;
//!
//! let platform = Arc::new(MockPlatform::new().with_backend("origin"));
//! let backends = registry::backends(platform);
//! assert!(backends.has("origin"));
//! assert!(!backends.has("elsewhere"));
//! ```

use std::fmt::Debug;

use crate::error::BinderyError;

pub mod env;
mod local;
mod mock;

pub use local::{
    AclAction, LocalAcl, LocalBackend, LocalConfigStore, LocalKvStore, LocalLogger,
    LocalPlatform, LocalSecretStore, Secret,
};
pub use mock::{MockHandle, MockPlatform};

/// Bound shared by every handle type
pub trait Handle: Clone + Debug + Send + Sync + 'static {}

impl<T: Clone + Debug + Send + Sync + 'static> Handle for T {}

/// Resource provider for every binding category
///
/// Each `open_*` returns `Err` (usually [`BinderyError::ResourceNotFound`])
/// when the resource does not exist or is not provisioned. The caches turn
/// any `Err` into a permanently cached absence.
pub trait Platform: Send + Sync + 'static {
    type Acl: Handle;
    type Backend: Handle;
    type ConfigStore: Handle;
    type KvStore: Handle;
    type Logger: Handle;
    type SecretStore: Handle;

    fn open_acl(&self, name: &str) -> Result<Self::Acl, BinderyError>;

    fn open_backend(&self, name: &str) -> Result<Self::Backend, BinderyError>;

    fn open_config_store(&self, name: &str) -> Result<Self::ConfigStore, BinderyError>;

    fn open_kv_store(&self, name: &str) -> Result<Self::KvStore, BinderyError>;

    fn open_logger(&self, name: &str) -> Result<Self::Logger, BinderyError>;

    fn open_secret_store(&self, name: &str) -> Result<Self::SecretStore, BinderyError>;

    /// Read an environment variable; `None` when unset
    fn env_var(&self, name: &str) -> Option<String>;
}

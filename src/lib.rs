//! Bindery - lazily-resolved resource bindings
//!
//! An application declares, per symbolic name, which kind of platform
//! resource it wants (`"Backend"`, `"KVStore:sessions"`, `"env:FASTLY_POP"`,
//! ...). Bindery resolves each declaration on first access, caches the
//! result (including absence) for the life of the context, and exposes the
//! bindings through a read-only view.
//!
//! ## Module Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  binding/   Declaration grammar, views, startup validation   │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  context    Context<P>: one lazy cache per resource type     │
//! │  store/     LazyCache, per-category registries               │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  provider/  Platform trait, LocalPlatform, MockPlatform      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::{build_view, BindingMap, Context};
//! use bindery::provider::MockPlatform;
//!
//! let platform = Arc::new(MockPlatform::new().with_backend("origin-1"));
//! let context = Context::new(platform);
//!
//! let mut bindings = BindingMap::default();
//! bindings.insert("origin".into(), "Backend:origin-1".into());
//! bindings.insert("typo".into(), "Backnd".into());
//!
//! let env = build_view(&context, &bindings);
//! assert!(env.has("origin"));
//! assert!(!env.has("typo"));
//! assert_eq!(env.keys(), vec!["origin", "typo"]);
//! ```

pub mod binding;
pub mod config;
pub mod context;
pub mod error;
pub mod provider;
pub mod store;

// Error types
pub use error::{BinderyError, FixSuggestion};

// Config types
pub use config::Manifest;

// Binding types
pub use binding::{
    build_view, build_view_on, parse_declaration, validate_bindings, BindingMap, BindingView,
    Declaration, MergedView, Property, PropertySource, ResourceType,
};

// Context types
pub use context::{Context, Resource, SharedContext};

// Store types
pub use store::LazyCache;

// Provider types
pub use provider::{LocalPlatform, MockPlatform, Platform};

//! Store Module - lazily filled resource caches
//!
//! Thread-safe, write-once storage for resolved resource handles.
//! Uses DashMap for concurrent access and a per-name `OnceCell` so each
//! provider name is opened at most once.
//!
//! Key types:
//! - `LazyCache`: memoized name → optional handle map for one category
//! - `registry`: builds the cache for each category from a `Platform`

mod lazy;
pub mod registry;

// Re-export public types
pub use lazy::{LazyCache, Opener};

//! LazyCache - per-category memoized resource lookups
//!
//! Each provider name moves through three states exactly once:
//!
//! ```text
//! unresolved ──first get/has──▶ resolving ──▶ present(handle)
//!                                         └─▶ absent
//! ```
//!
//! Entries are permanent: no eviction, no TTL, no retry after absence.
//! Concurrent first accesses to the same name block on a per-name `OnceCell`,
//! so the opener runs at most once per name. Reads of a resolved entry only
//! touch the DashMap shard briefly and never wait on another opener.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace, warn};

use crate::binding::ResourceType;

/// Opener invoked on the first access to a name
pub type Opener<T> = Box<dyn Fn(&str) -> Option<T> + Send + Sync>;

type Slot<T> = Arc<OnceCell<Option<T>>>;

/// Thread-safe lazy map from provider name to optional handle
///
/// The opener must not call back into the same cache for the same name:
/// that access would wait on the entry it is currently initializing.
pub struct LazyCache<T> {
    category: ResourceType,
    opener: Opener<T>,
    /// name → slot (slot is empty while the opener runs)
    entries: DashMap<Arc<str>, Slot<T>>,
}

impl<T: Clone> LazyCache<T> {
    /// Create an empty cache around an opener
    pub fn new<F>(category: ResourceType, opener: F) -> Self
    where
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            category,
            opener: Box::new(opener),
            entries: DashMap::new(),
        }
    }

    /// Get the handle for `name`, opening it on first access
    ///
    /// Returns `None` when the opener reported absence or panicked; that
    /// outcome is cached like any other.
    pub fn get(&self, name: &str) -> Option<T> {
        let slot = self.slot(name);
        if let Some(cached) = slot.get() {
            trace!(category = %self.category, name, present = cached.is_some(), "cache hit");
            return cached.clone();
        }
        slot.get_or_init(|| self.open(name)).clone()
    }

    /// Check whether `name` resolves to a handle (resolves it if needed)
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Check whether `name` has already been resolved, without resolving it
    pub fn is_resolved(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of names that have been accessed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Category this cache serves
    pub fn category(&self) -> ResourceType {
        self.category
    }

    fn slot(&self, name: &str) -> Slot<T> {
        if let Some(slot) = self.entries.get(name) {
            return Arc::clone(slot.value());
        }
        // entry() serializes concurrent inserts of the same name
        Arc::clone(self.entries.entry(Arc::from(name)).or_default().value())
    }

    fn open(&self, name: &str) -> Option<T> {
        debug!(category = %self.category, name, "opening resource");
        match panic::catch_unwind(AssertUnwindSafe(|| (self.opener)(name))) {
            Ok(handle) => {
                if handle.is_none() {
                    debug!(category = %self.category, name, "resource absent, caching absence");
                }
                handle
            }
            Err(_) => {
                warn!(category = %self.category, name, "resource opener panicked, caching absence");
                None
            }
        }
    }
}

impl<T> fmt::Debug for LazyCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCache")
            .field("category", &self.category)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_cache(present: &'static [&'static str]) -> (LazyCache<String>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = LazyCache::new(ResourceType::Backend, move |name| {
            counter.fetch_add(1, Ordering::SeqCst);
            present.contains(&name).then(|| format!("handle:{}", name))
        });
        (cache, calls)
    }

    #[test]
    fn get_opens_once() {
        let (cache, calls) = counting_cache(&["origin"]);

        assert_eq!(cache.get("origin"), Some("handle:origin".to_string()));
        assert_eq!(cache.get("origin"), Some("handle:origin".to_string()));
        assert!(cache.has("origin"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn has_resolves_like_get() {
        let (cache, calls) = counting_cache(&["origin"]);

        assert!(!cache.is_resolved("origin"));
        assert!(cache.has("origin"));
        assert!(cache.is_resolved("origin"));
        assert_eq!(cache.get("origin"), Some("handle:origin".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn absence_is_cached() {
        let (cache, calls) = counting_cache(&[]);

        assert_eq!(cache.get("missing"), None);
        assert!(!cache.has("missing"));
        assert_eq!(cache.get("missing"), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_resolved("missing"));
    }

    #[test]
    fn distinct_names_open_separately() {
        let (cache, calls) = counting_cache(&["a", "b"]);

        cache.get("a");
        cache.get("b");
        cache.get("c");
        cache.get("a");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn panicking_opener_is_absent_and_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache: LazyCache<String> = LazyCache::new(ResourceType::Logger, move |name| {
            counter.fetch_add(1, Ordering::SeqCst);
            if name == "boom" {
                panic!("provider exploded");
            }
            Some(name.to_string())
        });

        assert_eq!(cache.get("boom"), None);
        assert!(!cache.has("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The same opener still works for other names
        assert_eq!(cache.get("ok"), Some("ok".to_string()));
    }

    #[test]
    fn is_resolved_does_not_open() {
        let (cache, calls) = counting_cache(&["origin"]);

        assert!(!cache.is_resolved("origin"));
        assert!(cache.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn debug_hides_opener() {
        let (cache, _) = counting_cache(&[]);
        let out = format!("{:?}", cache);
        assert!(out.contains("LazyCache"));
        assert!(out.contains("Backend"));
    }
}

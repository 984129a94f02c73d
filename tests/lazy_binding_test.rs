//! Lazy Binding Tests
//!
//! End-to-end behavior of the context, caches and views against a mock
//! platform that records every open.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use bindery::binding::{build_view, build_view_on, BindingMap, Property, ResourceType};
use bindery::context::{Context, SharedContext};
use bindery::provider::{MockHandle, MockPlatform};
use bindery::store::LazyCache;
use serde_json::json;

fn bindings(entries: &[(&str, &str)]) -> BindingMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn backend(name: &str) -> MockHandle {
    MockHandle {
        category: ResourceType::Backend,
        name: name.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Memoization
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_opener_runs_once_per_name() {
    let platform = Arc::new(MockPlatform::new().with_backend("origin"));
    let ctx = Context::new(Arc::clone(&platform));
    let defs = bindings(&[("origin", "Backend")]);
    let view = build_view(&ctx, &defs);

    for _ in 0..10 {
        assert!(view.has("origin"));
        assert_eq!(view.backend("origin"), Some(backend("origin")));
    }
    assert_eq!(platform.open_count(ResourceType::Backend, "origin"), 1);
}

#[test]
fn test_absence_is_permanent() {
    let platform = Arc::new(MockPlatform::new().with_backend("present"));
    let ctx = Context::new(Arc::clone(&platform));
    let defs = bindings(&[("a", "Backend:missing"), ("b", "Backend:present")]);
    let view = build_view(&ctx, &defs);

    assert!(!view.has("a"));
    assert!(view.get("a").is_none());
    // A later success under another name does not revive the absent entry
    assert!(view.has("b"));
    assert!(!view.has("a"));

    assert_eq!(platform.open_count(ResourceType::Backend, "missing"), 1);
    assert_eq!(platform.open_count(ResourceType::Backend, "present"), 1);
}

#[test]
fn test_panicking_provider_is_absent() {
    let platform = Arc::new(
        MockPlatform::new()
            .panicking(ResourceType::SecretStore, "vault")
            .with_secret_store("other"),
    );
    let ctx = Context::new(Arc::clone(&platform));
    let defs = bindings(&[("vault", "SecretStore"), ("other", "SecretStore")]);
    let view = build_view(&ctx, &defs);

    assert!(view.secret_store("vault").is_none());
    assert!(!view.has("vault"));
    assert!(view.has("other"));
    assert_eq!(platform.open_count(ResourceType::SecretStore, "vault"), 1);
}

#[test]
fn test_concurrent_first_access_opens_once() {
    const THREADS: usize = 16;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache: LazyCache<String> = LazyCache::new(ResourceType::KvStore, move |name| {
        counter.fetch_add(1, Ordering::SeqCst);
        // Widen the race window
        thread::sleep(std::time::Duration::from_millis(20));
        Some(name.to_uppercase())
    });

    let barrier = Barrier::new(THREADS);
    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                barrier.wait();
                assert_eq!(cache.get("sessions").as_deref(), Some("SESSIONS"));
            });
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_views_share_one_context() {
    let platform = Arc::new(MockPlatform::new().with_kv_store("sessions"));
    let ctx = Arc::new(Context::new(Arc::clone(&platform)));
    let defs = Arc::new(bindings(&[("cache", "KVStore:sessions")]));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            let defs = Arc::clone(&defs);
            thread::spawn(move || build_view(&ctx, &defs).has("cache"))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(platform.open_count(ResourceType::KvStore, "sessions"), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Naming
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_default_naming_uses_symbolic_name() {
    let platform = Arc::new(MockPlatform::new().with_backend("api"));
    let ctx = Context::new(Arc::clone(&platform));
    let defs = bindings(&[("api", "Backend")]);

    assert_eq!(build_view(&ctx, &defs).backend("api"), Some(backend("api")));
    assert_eq!(platform.open_count(ResourceType::Backend, "api"), 1);
}

#[test]
fn test_explicit_name_overrides_symbolic_name() {
    let platform = Arc::new(MockPlatform::new().with_backend("api").with_backend("origin-1"));
    let ctx = Context::new(Arc::clone(&platform));
    let defs = bindings(&[("api", "Backend:origin-1")]);

    assert_eq!(build_view(&ctx, &defs).backend("api"), Some(backend("origin-1")));
    assert_eq!(platform.open_count(ResourceType::Backend, "api"), 0);
}

#[test]
fn test_env_binding() {
    let platform = Arc::new(MockPlatform::new().with_env("FASTLY_POP", "LHR"));
    let ctx = Context::new(platform);
    let defs = bindings(&[
        ("pop", "env:FASTLY_POP"),
        ("FASTLY_POP", "env"),
        ("region", "env:FASTLY_REGION"),
    ]);
    let view = build_view(&ctx, &defs);

    assert_eq!(view.env("pop").as_deref(), Some("LHR"));
    assert_eq!(view.env("FASTLY_POP").as_deref(), Some("LHR"));
    assert!(!view.has("region"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Existence vs enumeration
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_declared_but_missing_is_enumerated_not_present() {
    let ctx = Context::new(Arc::new(MockPlatform::new()));
    let defs = bindings(&[("a", "Backend:missing")]);
    let view = build_view(&ctx, &defs);

    assert!(!view.has("a"));
    assert_eq!(view.keys(), vec!["a"]);
}

#[test]
fn test_invalid_declarations_are_absent_not_errors() {
    let platform = Arc::new(MockPlatform::new().with_backend("x"));
    let ctx = Context::new(Arc::clone(&platform));
    let defs = bindings(&[("x", "Bogus:x"), ("y", ""), ("z", "backend")]);
    let view = build_view(&ctx, &defs);

    for alias in ["x", "y", "z"] {
        assert!(view.get(alias).is_none());
        assert!(!view.has(alias));
    }
    assert_eq!(platform.total_opens(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Fallback precedence
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_fallback_precedence_resolved_binding_wins() {
    let ctx = Context::new(Arc::new(MockPlatform::new().with_backend("origin")));
    let defs = bindings(&[("x", "Backend:origin")]);
    let base = json!({"x": 1});
    let merged = build_view_on(&base, &ctx, &defs);

    match merged.get("x") {
        Some(Property::Binding(resource)) => {
            assert_eq!(resource.as_backend(), Some(&backend("origin")));
        }
        other => panic!("Expected binding, got {:?}", other),
    }
}

#[test]
fn test_fallback_precedence_absent_binding_falls_through() {
    let ctx = Context::new(Arc::new(MockPlatform::new()));
    let defs = bindings(&[("x", "Backend:origin")]);
    let base = json!({"x": 1});
    let merged = build_view_on(&base, &ctx, &defs);

    assert_eq!(merged.get("x"), Some(Property::Base(json!(1))));
    assert!(merged.has("x"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Category isolation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_category_isolation() {
    let platform = Arc::new(MockPlatform::new().with_acl("shared").with_backend("shared"));
    let ctx = Context::new(Arc::clone(&platform));
    let defs = bindings(&[("guard", "Acl:shared"), ("origin", "Backend:shared")]);
    let view = build_view(&ctx, &defs);

    assert!(view.has("guard"));
    assert_eq!(platform.category_opens(ResourceType::Backend), 0);
    assert_eq!(ctx.cached(ResourceType::Backend), 0);

    assert!(view.has("origin"));
    assert_eq!(platform.open_count(ResourceType::Acl, "shared"), 1);
    assert_eq!(platform.open_count(ResourceType::Backend, "shared"), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Shared context
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_shared_context_is_idempotent() {
    let shared: SharedContext<MockPlatform> = SharedContext::new();
    let builds = AtomicUsize::new(0);

    let first = shared.get_or_init(|| {
        builds.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockPlatform::new().with_logger("audit"))
    });
    let second = shared.get_or_init(|| {
        builds.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockPlatform::new())
    });

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    // Second platform was never used: the logger from the first is visible
    assert!(second.loggers().has("audit"));
}

//! Binding views - symbolic names projected onto context resources
//!
//! Every lookup runs the same pipeline and never fails:
//!
//! ```text
//! alias ──▶ declaration ──parse──▶ (type, name | alias) ──▶ context cache ──▶ handle?
//!             (missing)    (bad)                              (absent)
//!                └────────────┴──────────── None ◀──────────────┘
//! ```
//!
//! [`BindingView`] exposes only the bindings. [`MergedView`] layers them over
//! a base object: a binding wins when it resolves, otherwise the base's own
//! property is returned.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::BuildHasher;

use serde_json::Value;
use tracing::trace;

use crate::context::{Context, Resource};
use crate::provider::Platform;

use super::entry::{parse_declaration, BindingMap};

/// Resolve one symbolic name through the context
pub fn resolve<P: Platform>(
    context: &Context<P>,
    bindings: &BindingMap,
    alias: &str,
) -> Option<Resource<P>> {
    let raw = bindings.get(alias)?;
    let Some(declaration) = parse_declaration(raw) else {
        trace!(alias, declaration = %raw, "unrecognized declaration, binding is absent");
        return None;
    };
    context.get(declaration.resource_type, declaration.resource_name_or(alias))
}

/// Build a standalone view over `bindings`
pub fn build_view<'a, P: Platform>(
    context: &'a Context<P>,
    bindings: &'a BindingMap,
) -> BindingView<'a, P> {
    BindingView { context, bindings }
}

/// Build a view that falls back to `base` for anything not bound
pub fn build_view_on<'a, P: Platform, B: PropertySource>(
    base: &'a B,
    context: &'a Context<P>,
    bindings: &'a BindingMap,
) -> MergedView<'a, P, B> {
    build_view(context, bindings).on(base)
}

/// Read-only view from symbolic names to resources
///
/// Nothing is materialized: each access re-runs the pipeline, which is O(1)
/// once the underlying cache entry exists.
pub struct BindingView<'a, P: Platform> {
    context: &'a Context<P>,
    bindings: &'a BindingMap,
}

// Manual impls: derives would require `P: Clone`
impl<P: Platform> Clone for BindingView<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Platform> Copy for BindingView<'_, P> {}

impl<'a, P: Platform> BindingView<'a, P> {
    pub fn get(&self, alias: &str) -> Option<Resource<P>> {
        resolve(self.context, self.bindings, alias)
    }

    /// True only when the binding resolves; a declared but missing resource is absent
    pub fn has(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    /// Declared symbolic names, sorted, whether or not they resolve
    pub fn keys(&self) -> Vec<&'a str> {
        let mut keys: Vec<&'a str> = self.bindings.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Raw declaration string for `alias`
    pub fn declaration(&self, alias: &str) -> Option<&'a str> {
        self.bindings.get(alias).map(String::as_str)
    }

    pub fn is_declared(&self, alias: &str) -> bool {
        self.bindings.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn context(&self) -> &'a Context<P> {
        self.context
    }

    /// Layer this view over a base object
    pub fn on<B: PropertySource>(self, base: &'a B) -> MergedView<'a, P, B> {
        MergedView { view: self, base }
    }

    pub fn acl(&self, alias: &str) -> Option<P::Acl> {
        self.get(alias)?.into_acl()
    }

    pub fn backend(&self, alias: &str) -> Option<P::Backend> {
        self.get(alias)?.into_backend()
    }

    pub fn config_store(&self, alias: &str) -> Option<P::ConfigStore> {
        self.get(alias)?.into_config_store()
    }

    pub fn env(&self, alias: &str) -> Option<String> {
        self.get(alias)?.into_env()
    }

    pub fn kv_store(&self, alias: &str) -> Option<P::KvStore> {
        self.get(alias)?.into_kv_store()
    }

    pub fn logger(&self, alias: &str) -> Option<P::Logger> {
        self.get(alias)?.into_logger()
    }

    pub fn secret_store(&self, alias: &str) -> Option<P::SecretStore> {
        self.get(alias)?.into_secret_store()
    }
}

/// Object whose own properties a [`MergedView`] falls back to
pub trait PropertySource {
    type Value;

    fn property(&self, key: &str) -> Option<Self::Value>;

    fn has_property(&self, key: &str) -> bool {
        self.property(key).is_some()
    }

    fn property_names(&self) -> Vec<String>;
}

impl PropertySource for serde_json::Map<String, Value> {
    type Value = Value;

    fn property(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }

    fn has_property(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Only objects have properties; any other JSON value has none
impl PropertySource for Value {
    type Value = Value;

    fn property(&self, key: &str) -> Option<Value> {
        self.as_object()?.property(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.as_object()
            .map(|map| map.property_names())
            .unwrap_or_default()
    }
}

impl<V: Clone, S: BuildHasher> PropertySource for HashMap<String, V, S> {
    type Value = V;

    fn property(&self, key: &str) -> Option<V> {
        self.get(key).cloned()
    }

    fn has_property(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

impl<V: Clone> PropertySource for BTreeMap<String, V> {
    type Value = V;

    fn property(&self, key: &str) -> Option<V> {
        self.get(key).cloned()
    }

    fn has_property(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Value read through a [`MergedView`]
#[derive(Debug, Clone, PartialEq)]
pub enum Property<R, V> {
    /// A binding that resolved
    Binding(R),
    /// The base object's own property
    Base(V),
}

impl<R, V> Property<R, V> {
    pub fn binding(&self) -> Option<&R> {
        match self {
            Property::Binding(r) => Some(r),
            Property::Base(_) => None,
        }
    }

    pub fn base(&self) -> Option<&V> {
        match self {
            Property::Binding(_) => None,
            Property::Base(v) => Some(v),
        }
    }

    pub fn is_binding(&self) -> bool {
        matches!(self, Property::Binding(_))
    }
}

/// Bindings layered over a base object
pub struct MergedView<'a, P: Platform, B> {
    view: BindingView<'a, P>,
    base: &'a B,
}

impl<'a, P: Platform, B: PropertySource> MergedView<'a, P, B> {
    /// Resolved binding if any, else the base's own property
    pub fn get(&self, key: &str) -> Option<Property<Resource<P>, B::Value>> {
        self.view
            .get(key)
            .map(Property::Binding)
            .or_else(|| self.base.property(key).map(Property::Base))
    }

    pub fn has(&self, key: &str) -> bool {
        self.view.has(key) || self.base.has_property(key)
    }

    /// Declared binding names and base property names, sorted and deduplicated
    pub fn keys(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = self.base.property_names().into_iter().collect();
        keys.extend(self.view.keys().into_iter().map(str::to_string));
        keys.into_iter().collect()
    }

    pub fn bindings(&self) -> BindingView<'a, P> {
        self.view
    }

    pub fn base(&self) -> &'a B {
        self.base
    }
}

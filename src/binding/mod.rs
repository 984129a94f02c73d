//! Binding Module - symbolic names to platform resources
//!
//! - `entry`: the `Type` / `Type:name` declaration grammar
//! - `resolve`: binding views (standalone and merged over a base object)
//! - `validate`: optional startup validation of binding maps
//!
//! Declaration syntax:
//! ```toml
//! [bindings]
//! api = "Backend"                 # backend registered as "api"
//! origin = "Backend:origin-1"     # backend registered as "origin-1"
//! pop = "env:FASTLY_POP"          # environment variable
//! typo = "Backnd"                 # unknown type: always absent
//! ```
//!
//! Data flow:
//! ```text
//! BindingMap (alias → declaration)
//!        ↓ parse_declaration
//! (ResourceType, provider name)
//!        ↓ Context::get
//! LazyCache (opener runs once per name)
//!        ↓
//! BindingView::get → Option<Resource>
//! ```

mod entry;
mod resolve;
mod validate;

// Re-export public types
pub use entry::{parse_declaration, BindingMap, Declaration, ResourceType};
pub use resolve::{
    build_view, build_view_on, resolve, BindingView, MergedView, Property, PropertySource,
};
pub use validate::{validate_bindings, validate_declaration};

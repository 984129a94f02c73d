//! Bindery error types with error codes
//!
//! Error code ranges:
//! - BND-000-009: Manifest/config errors
//! - BND-010-019: Declaration grammar errors (startup validation only)
//! - BND-020-029: Provider errors (collapsed to absence inside the caches)
//! - BND-030-039: CLI errors
//!
//! Resolution through a binding view never returns these: every failure is
//! absorbed by the lazy caches and surfaces as `None`.

use thiserror::Error;

use crate::binding::ResourceType;

pub type Result<T> = std::result::Result<T, BinderyError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum BinderyError {
    // ═══════════════════════════════════════════
    // MANIFEST ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[BND-001] Manifest not found: {path}")]
    ManifestNotFound { path: String },

    #[error("[BND-002] Failed to load manifest: {reason}")]
    ConfigError { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ═══════════════════════════════════════════
    // DECLARATION ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[BND-010] Binding '{alias}' has an empty declaration")]
    EmptyDeclaration { alias: String },

    #[error("[BND-011] Binding '{alias}' uses unknown resource type '{resource_type}'")]
    UnknownResourceType {
        alias: String,
        resource_type: String,
    },

    #[error("[BND-012] {} invalid binding declaration(s): {}", .errors.len(), format_errors(.errors))]
    InvalidBindings { errors: Vec<BinderyError> },

    // ═══════════════════════════════════════════
    // PROVIDER ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[BND-020] {category} '{name}' not found")]
    ResourceNotFound { category: ResourceType, name: String },

    #[error("[BND-021] {category} '{name}' is not provisioned: {reason}")]
    NotProvisioned {
        category: ResourceType,
        name: String,
        reason: String,
    },

    // ═══════════════════════════════════════════
    // CLI ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[BND-030] Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

impl BinderyError {
    /// Shorthand for the not-found signal every provider opener uses
    pub fn not_found(category: ResourceType, name: impl Into<String>) -> Self {
        BinderyError::ResourceNotFound {
            category,
            name: name.into(),
        }
    }
}

fn format_errors(errors: &[BinderyError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl FixSuggestion for BinderyError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BinderyError::ManifestNotFound { .. } => {
                Some("Pass --manifest <path> or set BINDERY_MANIFEST")
            }
            BinderyError::ConfigError { .. } => {
                Some("Check manifest syntax: [bindings] maps names to \"Type\" or \"Type:name\"")
            }
            BinderyError::Io(_) => Some("Check file path and permissions"),
            BinderyError::EmptyDeclaration { .. } => {
                Some("Declare a resource type, e.g. api = \"Backend\"")
            }
            BinderyError::UnknownResourceType { .. } | BinderyError::InvalidBindings { .. } => {
                Some("Valid types: Acl, Backend, ConfigStore, env, KVStore, Logger, SecretStore")
            }
            BinderyError::ResourceNotFound { .. } => {
                Some("Declare the resource in the manifest or fix the name after ':'")
            }
            BinderyError::NotProvisioned { .. } => {
                Some("Check the resource definition in the manifest")
            }
            BinderyError::Report(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_codes() {
        let err = BinderyError::not_found(ResourceType::Backend, "origin");
        assert_eq!(err.to_string(), "[BND-020] Backend 'origin' not found");

        let err = BinderyError::UnknownResourceType {
            alias: "api".into(),
            resource_type: "Bogus".into(),
        };
        assert!(err.to_string().contains("BND-011"));
        assert!(err.to_string().contains("Bogus"));
    }

    #[test]
    fn invalid_bindings_lists_every_error() {
        let err = BinderyError::InvalidBindings {
            errors: vec![
                BinderyError::EmptyDeclaration { alias: "a".into() },
                BinderyError::UnknownResourceType {
                    alias: "b".into(),
                    resource_type: "Queue".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("[BND-012] 2 invalid"));
        assert!(msg.contains("BND-010"));
        assert!(msg.contains("Queue"));
    }

    #[test]
    fn every_declaration_error_has_a_suggestion() {
        let err = BinderyError::UnknownResourceType {
            alias: "x".into(),
            resource_type: "kv".into(),
        };
        assert!(err.fix_suggestion().unwrap().contains("KVStore"));
        assert!(BinderyError::EmptyDeclaration { alias: "x".into() }
            .fix_suggestion()
            .is_some());
    }
}

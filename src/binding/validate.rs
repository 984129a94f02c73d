//! Startup validation for binding maps
//!
//! Resolution itself is permissive: an unknown type just makes the binding
//! absent. This pass lets an application reject such declarations up front
//! instead of discovering them as silently missing resources.

use crate::error::BinderyError;

use super::entry::{parse_declaration, BindingMap, Declaration};

/// Validate a single declaration, naming the binding in the error
pub fn validate_declaration<'a>(
    alias: &str,
    declaration: &'a str,
) -> Result<Declaration<'a>, BinderyError> {
    if declaration.trim().is_empty() {
        return Err(BinderyError::EmptyDeclaration {
            alias: alias.to_string(),
        });
    }

    parse_declaration(declaration).ok_or_else(|| {
        let resource_type = declaration
            .split_once(':')
            .map_or(declaration, |(t, _)| t);
        BinderyError::UnknownResourceType {
            alias: alias.to_string(),
            resource_type: resource_type.to_string(),
        }
    })
}

/// Validate every declaration in a binding map
///
/// Collects all failures (sorted by alias) instead of stopping at the first.
pub fn validate_bindings(bindings: &BindingMap) -> Result<(), BinderyError> {
    let mut aliases: Vec<&String> = bindings.keys().collect();
    aliases.sort_unstable();

    let errors: Vec<BinderyError> = aliases
        .into_iter()
        .filter_map(|alias| validate_declaration(alias, &bindings[alias]).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BinderyError::InvalidBindings { errors })
    }
}

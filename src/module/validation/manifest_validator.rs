//! Manifest validation framework
//!
//! Validates module descriptors before they reach the manifest store.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::module::registry::manifest::ModuleDescriptor;
use crate::module::traits::ModuleError;

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Descriptor is valid
    Valid,
    /// Descriptor is invalid with specific errors
    Invalid(Vec<String>),
}

impl ValidationResult {
    /// Turn an invalid result into [`ModuleError::InvalidManifest`]
    pub fn into_result(self, scope: &str) -> Result<(), ModuleError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(errors) => Err(ModuleError::InvalidManifest(format!(
                "{}: {}",
                scope,
                errors.join("; ")
            ))),
        }
    }
}

/// Manifest validator
pub struct ManifestValidator {
    /// Maximum scope length
    max_scope_len: usize,
}

impl ManifestValidator {
    /// Create a new manifest validator
    pub fn new() -> Self {
        Self { max_scope_len: 64 }
    }

    /// Validate a module descriptor
    pub fn validate(&self, descriptor: &ModuleDescriptor) -> ValidationResult {
        let mut errors = Vec::new();

        if !self.is_valid_scope(&descriptor.scope) {
            errors.push(format!(
                "Invalid scope: {:?} (must be 1 to {} characters without whitespace or control characters)",
                descriptor.scope, self.max_scope_len
            ));
        }

        if descriptor.remote_entry_url.trim().is_empty() {
            errors.push("Remote entry URL cannot be empty".to_string());
        }

        if !descriptor.is_aligned() {
            errors.push(format!(
                "components ({}) and routes ({}) must have the same length",
                descriptor.exposed_components.len(),
                descriptor.route_paths.len()
            ));
        }

        if let Err(route_errors) = self.validate_routes(&descriptor.route_paths) {
            errors.extend(route_errors);
        }

        if descriptor.exposed_components.iter().any(|c| c.trim().is_empty()) {
            errors.push("Component names cannot be empty".to_string());
        }

        if errors.is_empty() {
            debug!("Manifest validation passed for scope: {}", descriptor.scope);
            ValidationResult::Valid
        } else {
            warn!(
                "Manifest validation failed for scope {}: {:?}",
                descriptor.scope, errors
            );
            ValidationResult::Invalid(errors)
        }
    }

    /// Scopes are registry keys: any non-empty string of bounded length
    /// without whitespace or control characters
    #[inline]
    fn is_valid_scope(&self, scope: &str) -> bool {
        !scope.is_empty()
            && scope.chars().count() <= self.max_scope_len
            && !scope.chars().any(|c| c.is_whitespace() || c.is_control())
    }

    fn validate_routes(&self, routes: &[String]) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for route in routes {
            if !route.starts_with('/') {
                errors.push(format!("Route must start with '/': {}", route));
            }
            if !seen.insert(route.as_str()) {
                errors.push(format!("Duplicate route: {}", route));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}

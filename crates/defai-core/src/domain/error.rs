// ============================================================================
// domain/error.rs - ELEMENT DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

use super::value_objects::{Capability, Category, Tier};

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (carried inside `CoreError`)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid element name: '{name}'")]
    InvalidElementName { name: String },

    #[error("Unknown category: '{0}'")]
    UnknownCategory(String),

    #[error("Unknown tier: '{0}'")]
    UnknownTier(String),

    #[error("Unknown permission: '{0}'")]
    UnknownCapability(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid manifest: {}", issues.join("; "))]
    InvalidManifest { issues: Vec<String> },

    #[error("Invalid package.json: {reason}")]
    InvalidDescriptor { reason: String },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template '{template_id}' has no content")]
    EmptyTemplate { template_id: String },

    #[error("Duplicate path in template: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("Template not found: '{0}'")]
    TemplateNotFound(String),

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidElementName { .. } => vec![
                "Use 3-50 characters: lowercase letters, digits and hyphens".into(),
                "Start with a letter and end with a letter or digit".into(),
                "Avoid consecutive hyphens, e.g. 'price-ticker' not 'price--ticker'".into(),
            ],
            Self::UnknownCategory(_) => vec![format!(
                "Valid categories: {}",
                Category::ALL.map(Category::as_str).join(", ")
            )],
            Self::UnknownTier(_) => vec![format!(
                "Valid tiers: {}",
                Tier::ALL.map(Tier::as_str).join(", ")
            )],
            Self::UnknownCapability(_) => vec![format!(
                "Valid permissions: {}",
                Capability::ALL.map(Capability::as_str).join(", ")
            )],
            Self::InvalidPrice(_) => vec!["Price must be a non-negative number".into()],
            Self::InvalidManifest { .. } => vec![
                "Fix the listed manifest.json fields".into(),
                "Run: defai-element validate --strict".into(),
            ],
            Self::InvalidDescriptor { .. } => vec![
                "Check that package.json is valid JSON".into(),
                "Ensure it has a \"defaiElement\" block".into(),
            ],
            Self::TemplateNotFound(_) => vec![
                "Run: defai-element templates".into(),
                "Pick one of the listed template ids with --template".into(),
            ],
            Self::EmptyTemplate { template_id } => vec![
                format!("Template '{}' is corrupted", template_id),
                "Use a different template".into(),
            ],
            _ => vec!["See https://docs.defai.com/elements for details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound(_) => ErrorCategory::NotFound,
            Self::EmptyTemplate { .. } | Self::DuplicatePath { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_manifest_joins_issues() {
        let err = DomainError::InvalidManifest {
            issues: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Invalid manifest: a; b");
    }

    #[test]
    fn unknown_category_lists_valid_values() {
        let suggestions = DomainError::UnknownCategory("Finance".into()).suggestions();
        assert!(suggestions[0].contains("AI Tools"));
        assert!(suggestions[0].contains("Developer Tools"));
    }

    #[test]
    fn template_not_found_is_not_found() {
        assert_eq!(
            DomainError::TemplateNotFound("svelte".into()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            DomainError::InvalidElementName { name: "A".into() }.category(),
            ErrorCategory::Validation
        );
    }
}

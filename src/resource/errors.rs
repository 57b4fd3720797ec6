//! # Resource Compiler Error Types
//!
//! Error handling for resource declaration, target resolution and model
//! generation.
//!
//! ## Error Categories
//!
//! - **Declaration Errors**: duplicate properties, invalid identifiers, broken
//!   inheritance chains
//! - **Resolution Errors**: relationship targets that are not registered,
//!   inconsistent inverse declarations, one-to-one pairs without a single
//!   primary side
//! - **Generation Errors**: foreign keys pointing at tables without a primary key
//! - **Configuration Errors**: file I/O and parsing issues while loading
//!   resource declarations
//!
//! All of these are programmer-declaration errors. None of them are retried.
//!
//! ## Usage Patterns
//!
//! ```ignore
//! // Provides what and where
//! ResourceError::unresolved_target_with_context(
//!     "Author",
//!     "relationship 'author' on resource 'Post'"
//! )
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResourceError {
    #[error("Property '{property}' already exists in resource '{resource}'.")]
    DuplicateProperty { resource: String, property: String },
    #[error("Couldn't resolve target: '{target}'")]
    UnresolvedTarget { target: String },
    #[error("No primary key found in table '{table}'\n  Context: {context}")]
    MissingPrimaryKey { table: String, context: String },
    #[error("Target '{target}' is abstract and has no table to reference")]
    AbstractTarget { target: String },
    #[error("Cannot walk the inheritance chain of resource '{resource}': {reason}")]
    HierarchyWalk { resource: String, reason: String },
    #[error("Invalid primary side for relationship '{resource}.{relationship}': {reason}")]
    InvalidPrimarySide {
        resource: String,
        relationship: String,
        reason: String,
    },
    #[error("Invalid inverse '{inverse}' for relationship '{resource}.{relationship}': {reason}")]
    InvalidInverse {
        resource: String,
        relationship: String,
        inverse: String,
        reason: String,
    },
    #[error("Invalid {kind} name '{name}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { kind: String, name: String },
    #[error("Unknown build phase '{phase}'")]
    UnknownBuildPhase { phase: String },
    #[error("Unknown table name generator '{name}'")]
    UnknownTableNameGenerator { name: String },
    #[error("The ember extension was not registered to the application. Call init_app first.")]
    NotInitialized,
    #[error("Failed to read resource declarations: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse resource declarations: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid resource declarations: {message}")]
    InvalidConfig { message: String },
}

pub type Result<T> = std::result::Result<T, ResourceError>;

/// Helper methods for creating errors with context information
impl ResourceError {
    /// Create an UnresolvedTarget error with context information
    ///
    /// # Example
    /// ```ignore
    /// ResourceError::unresolved_target_with_context(
    ///     "Author",
    ///     "relationship 'author' on resource 'Post'"
    /// )
    /// ```
    pub fn unresolved_target_with_context(
        target: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let target = target.into();
        let ctx = context.into();
        ResourceError::UnresolvedTarget {
            target: format!("{}\n  Context: {}", target, ctx),
        }
    }

    /// Create a MissingPrimaryKey error with context information
    pub fn missing_primary_key_with_context(
        table: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        ResourceError::MissingPrimaryKey {
            table: table.into(),
            context: context.into(),
        }
    }

    /// Whether this error is one of the resolution failures raised while
    /// binding relationship targets.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            ResourceError::UnresolvedTarget { .. }
                | ResourceError::InvalidInverse { .. }
                | ResourceError::InvalidPrimarySide { .. }
        )
    }
}

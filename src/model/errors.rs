//! Error types for the resource data model.
//!
//! Conversions between raw payload values and typed properties fail with
//! [`ConversionError`]. Malformed `<set>(<guid>)` strings fail with
//! [`IdentifierFormatError`], and descriptors lacking the metadata an
//! operation needs fail with [`MissingMetadataError`].
//!
//! # Example
//!
//! ```rust
//! use domain_api::model::{EntityIdentifier, IdentifierFormatError};
//!
//! let result: Result<EntityIdentifier, _> = "Orders".parse();
//! assert!(matches!(result, Err(IdentifierFormatError::MissingParenthesis { .. })));
//! ```

use thiserror::Error;

/// A raw value could not be coerced into the requested type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The raw value has a shape that cannot become the requested type.
    #[error("Cannot convert a {found} value into {expected}.")]
    UnexpectedType {
        /// The requested Rust type.
        expected: &'static str,
        /// The kind of raw value that was stored.
        found: &'static str,
    },

    /// The raw value has the right shape but its content does not parse.
    #[error("Invalid {expected} value '{value}': {reason}")]
    InvalidValue {
        /// The requested Rust type.
        expected: &'static str,
        /// The offending raw text.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A null or missing value was read into a non-nullable reference type.
    #[error("Property holds no value but {expected} is not nullable. Read it as an Option instead.")]
    NullValue {
        /// The requested Rust type.
        expected: &'static str,
    },

    /// An entity reference string was not a valid identifier.
    #[error(transparent)]
    Identifier(#[from] IdentifierFormatError),
}

impl ConversionError {
    pub(crate) fn invalid(
        expected: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidValue {
            expected,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// A string is not a well-formed `<entity-set>(<guid>)` identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierFormatError {
    /// Missing or repeated opening parenthesis, or no trailing `)`.
    #[error("Invalid identifier '{value}'. Expected format: '<EntitySet>(<guid>)'.")]
    MissingParenthesis {
        /// The rejected input.
        value: String,
    },

    /// Nothing precedes the opening parenthesis.
    #[error("Invalid identifier '{value}'. The entity set name cannot be empty.")]
    EmptyEntitySet {
        /// The rejected input.
        value: String,
    },

    /// The key between the parentheses is not a Guid.
    #[error("Invalid identifier '{value}'. The key is not a valid Guid.")]
    InvalidGuid {
        /// The rejected input.
        value: String,
    },
}

/// A resource type lacks declared metadata required by an operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MissingMetadataError {
    /// The type is not an entity type and therefore has no entity set.
    #[error("Resource type '{type_name}' declares no entity set. Only entity types can be queried or addressed.")]
    NoEntitySet {
        /// The declared type name.
        type_name: &'static str,
    },

    /// The entity carries no `@odata.id`, so it cannot be addressed.
    #[error("The {type_name} entity has no @odata.id. Insert or load it before addressing it.")]
    NoIdentity {
        /// The declared type name.
        type_name: &'static str,
    },

    /// The entity set is not present in the registry.
    #[error("Entity set '{entity_set}' is not registered. Register its descriptor before creating resources for it.")]
    UnknownEntitySet {
        /// The requested entity set name.
        entity_set: String,
    },
}

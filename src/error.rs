//! Crate-level error types.
//!
//! Configuration constructors return `Result<T, ConfigError>` so invalid
//! settings fail before any command is built. Operations that span several
//! layers, such as loading entities or saving changes, return
//! [`DomainApiError`], which wraps the error of the layer that failed.
//!
//! # Example
//!
//! ```rust
//! use domain_api::{ConfigError, TypeNamespace};
//!
//! let result = TypeNamespace::new("Erp");
//! assert!(matches!(result, Err(ConfigError::InvalidTypeNamespace { .. })));
//! ```

use thiserror::Error;

use crate::model::{ConversionError, IdentifierFormatError, MissingMetadataError};
use crate::query::{CommandMismatchError, CompileError, ExecutorError, ParseError, QueryError};

/// Errors that can occur while configuring the API context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Service root URI is invalid.
    #[error("Invalid service root URI '{uri}'. Please provide an absolute URL with scheme and host (e.g., 'https://erp.example.com/api/domain/odata/').")]
    InvalidServiceRoot {
        /// The invalid URI that was provided.
        uri: String,
    },

    /// Type namespace is invalid.
    #[error("Invalid type namespace '{namespace}'. Expected a non-empty prefix ending with '.' (e.g., 'Erp.').")]
    InvalidTypeNamespace {
        /// The invalid namespace that was provided.
        namespace: String,
    },

    /// Default language is not a two-letter code.
    #[error("Invalid language '{language}'. Expected a two-letter language code (e.g., 'EN').")]
    InvalidLanguage {
        /// The invalid language that was provided.
        language: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

/// Any failure of a domain API operation.
#[derive(Debug, Error)]
pub enum DomainApiError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A payload value could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// An identifier string is malformed.
    #[error(transparent)]
    Identifier(#[from] IdentifierFormatError),

    /// A resource type lacks required metadata.
    #[error(transparent)]
    Metadata(#[from] MissingMetadataError),

    /// A command could not be built.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The executor failed.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl From<ParseError> for DomainApiError {
    fn from(error: ParseError) -> Self {
        Self::Query(error.into())
    }
}

impl From<CompileError> for DomainApiError {
    fn from(error: CompileError) -> Self {
        Self::Query(error.into())
    }
}

impl From<CommandMismatchError> for DomainApiError {
    fn from(error: CommandMismatchError) -> Self {
        Self::Query(error.into())
    }
}

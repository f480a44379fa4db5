//! Configuration types for the domain API context.
//!
//! # Overview
//!
//! - [`DomainApiConfig`]: settings shared by every command of one context
//! - [`DomainApiConfigBuilder`]: a builder for constructing [`DomainApiConfig`]
//! - [`ServiceRootUri`]: the validated absolute URI of the service root
//! - [`TypeNamespace`]: the validated `@odata.type` prefix
//! - [`Language`]: a validated two-letter language code
//!
//! # Example
//!
//! ```rust
//! use domain_api::{DomainApiConfig, ServiceRootUri};
//!
//! let config = DomainApiConfig::builder()
//!     .service_root(ServiceRootUri::new("https://erp.example.com/api/domain/odata/").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.type_namespace().as_ref(), "Erp.");
//! assert_eq!(config.default_language().as_ref(), "EN");
//! ```

mod newtypes;

pub use newtypes::{Language, ServiceRootUri, TypeNamespace};

use crate::error::ConfigError;

/// Configuration of a [`DomainApi`](crate::DomainApi) context.
///
/// # Thread Safety
///
/// `DomainApiConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainApiConfig {
    service_root: ServiceRootUri,
    type_namespace: TypeNamespace,
    default_language: Language,
}

impl DomainApiConfig {
    /// Creates a new builder for constructing a `DomainApiConfig`.
    #[must_use]
    pub fn builder() -> DomainApiConfigBuilder {
        DomainApiConfigBuilder::new()
    }

    /// Returns the service root.
    #[must_use]
    pub const fn service_root(&self) -> &ServiceRootUri {
        &self.service_root
    }

    /// Returns the prefix of `@odata.type` discriminators.
    #[must_use]
    pub const fn type_namespace(&self) -> &TypeNamespace {
        &self.type_namespace
    }

    /// Returns the language used when a multilanguage text has no
    /// explicitly requested translation.
    #[must_use]
    pub const fn default_language(&self) -> &Language {
        &self.default_language
    }
}

// Verify DomainApiConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DomainApiConfig>();
};

/// Builder for constructing [`DomainApiConfig`] instances.
///
/// `service_root` is required.
///
/// # Defaults
///
/// - `type_namespace`: `Erp.`
/// - `default_language`: `EN`
///
/// # Example
///
/// ```rust
/// use domain_api::{DomainApiConfig, Language, ServiceRootUri, TypeNamespace};
///
/// let config = DomainApiConfig::builder()
///     .service_root(ServiceRootUri::new("https://erp.example.com/odata").unwrap())
///     .type_namespace(TypeNamespace::new("Custom.").unwrap())
///     .default_language(Language::new("bg").unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.default_language().as_ref(), "BG");
/// ```
#[derive(Debug, Default)]
pub struct DomainApiConfigBuilder {
    service_root: Option<ServiceRootUri>,
    type_namespace: Option<TypeNamespace>,
    default_language: Option<Language>,
}

impl DomainApiConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service root (required).
    #[must_use]
    pub fn service_root(mut self, root: ServiceRootUri) -> Self {
        self.service_root = Some(root);
        self
    }

    /// Sets the `@odata.type` prefix.
    #[must_use]
    pub fn type_namespace(mut self, namespace: TypeNamespace) -> Self {
        self.type_namespace = Some(namespace);
        self
    }

    /// Sets the default language.
    #[must_use]
    pub fn default_language(mut self, language: Language) -> Self {
        self.default_language = Some(language);
        self
    }

    /// Builds the [`DomainApiConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `service_root` is not
    /// set.
    pub fn build(self) -> Result<DomainApiConfig, ConfigError> {
        let service_root = self.service_root.ok_or(ConfigError::MissingRequiredField {
            field: "service_root",
        })?;

        Ok(DomainApiConfig {
            service_root,
            type_namespace: self.type_namespace.unwrap_or_default(),
            default_language: self.default_language.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> ServiceRootUri {
        ServiceRootUri::new("https://erp.example.com/odata").unwrap()
    }

    #[test]
    fn test_builder_requires_service_root() {
        let result = DomainApiConfigBuilder::new().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "service_root" })
        ));
    }

    #[test]
    fn test_builder_provides_defaults() {
        let config = DomainApiConfig::builder().service_root(root()).build().unwrap();
        assert_eq!(config.service_root(), &root());
        assert_eq!(config.type_namespace(), &TypeNamespace::default());
        assert_eq!(config.default_language(), &Language::default());
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = DomainApiConfig::builder().service_root(root()).build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned, config);
        assert!(format!("{config:?}").contains("DomainApiConfig"));
    }
}

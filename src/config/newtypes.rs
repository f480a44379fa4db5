//! Validated newtype wrappers for configuration values.
//!
//! Each wrapper validates its contents on construction, so a built
//! [`DomainApiConfig`](super::DomainApiConfig) never holds malformed values.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated absolute URI of the domain API service root.
///
/// The stored form always ends with `/`, so relative command URIs can be
/// appended directly.
///
/// # Example
///
/// ```rust
/// use domain_api::ServiceRootUri;
///
/// let root = ServiceRootUri::new("https://erp.example.com/api/domain/odata").unwrap();
/// assert_eq!(root.scheme(), "https");
/// assert_eq!(root.host_name(), "erp.example.com");
/// assert_eq!(root.join("Crm_Customers"), "https://erp.example.com/api/domain/odata/Crm_Customers");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceRootUri {
    uri: String,
    scheme_end: usize,
    host_end: usize,
}

impl ServiceRootUri {
    /// Creates a new validated service root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServiceRoot`] if the URI has no scheme or
    /// host, or carries a query or fragment.
    pub fn new(uri: impl Into<String>) -> Result<Self, ConfigError> {
        let uri = uri.into().trim().to_string();
        let invalid = || ConfigError::InvalidServiceRoot { uri: uri.clone() };

        let scheme_end = uri.find("://").ok_or_else(invalid)?;
        let scheme = &uri[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if uri.contains(['?', '#']) {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        let remainder = uri.get(host_start..).ok_or_else(invalid)?;
        let host_end = remainder.find([':', '/']).map_or(uri.len(), |i| host_start + i);
        if host_end == host_start {
            return Err(invalid());
        }

        let mut uri = uri;
        if !uri.ends_with('/') {
            uri.push('/');
        }
        Ok(Self {
            uri,
            scheme_end,
            host_end,
        })
    }

    /// Returns the URI scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.uri[..self.scheme_end]
    }

    /// Returns the host name.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.uri[self.scheme_end + 3..self.host_end]
    }

    /// Appends a relative command URI.
    #[must_use]
    pub fn join(&self, relative: &str) -> String {
        format!("{}{}", self.uri, relative.trim_start_matches('/'))
    }
}

impl AsRef<str> for ServiceRootUri {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for ServiceRootUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl Serialize for ServiceRootUri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.uri)
    }
}

impl<'de> Deserialize<'de> for ServiceRootUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated prefix for `@odata.type` discriminators, such as `Erp.`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeNamespace(String);

impl TypeNamespace {
    /// Creates a new validated namespace.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTypeNamespace`] if the namespace is empty,
    /// does not end with `.` or contains whitespace.
    pub fn new(namespace: impl Into<String>) -> Result<Self, ConfigError> {
        let namespace = namespace.into();
        let valid = namespace.len() > 1
            && namespace.ends_with('.')
            && !namespace.starts_with('.')
            && !namespace.chars().any(char::is_whitespace);
        if !valid {
            return Err(ConfigError::InvalidTypeNamespace { namespace });
        }
        Ok(Self(namespace))
    }
}

impl Default for TypeNamespace {
    fn default() -> Self {
        Self(crate::model::DEFAULT_TYPE_NAMESPACE.to_string())
    }
}

impl AsRef<str> for TypeNamespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A two-letter language code, stored upper-case.
///
/// # Example
///
/// ```rust
/// use domain_api::Language;
///
/// assert_eq!(Language::new("bg").unwrap().as_ref(), "BG");
/// assert!(Language::new("eng").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    /// Creates a new validated language code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLanguage`] unless the code is two ASCII
    /// letters.
    pub fn new(language: impl Into<String>) -> Result<Self, ConfigError> {
        let language = language.into();
        if language.len() != 2 || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidLanguage { language });
        }
        Ok(Self(language.to_ascii_uppercase()))
    }
}

impl Default for Language {
    fn default() -> Self {
        Self("EN".to_string())
    }
}

impl AsRef<str> for Language {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

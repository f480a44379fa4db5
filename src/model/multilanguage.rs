//! Texts kept in several languages.

use super::descriptor::ResourceDescriptor;
use super::errors::ConversionError;
use super::raw::{RawMap, RawValue};
use super::resource::Resource;
use super::typed::ApiResource;

/// Descriptor of [`MultilanguageString`]. Keys are language codes, so no
/// properties are declared.
pub static MULTILANGUAGE_STRING: ResourceDescriptor =
    ResourceDescriptor::complex("MultilanguageString", &[]);

crate::domain_resource! {
    /// A complex value mapping two-letter language codes to texts.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_api::model::MultilanguageString;
    ///
    /// let text = MultilanguageString::from_pairs([("en", "Chair"), ("de", "Stuhl")]).unwrap();
    /// assert_eq!(text.get("DE").unwrap().as_deref(), Some("Stuhl"));
    /// assert_eq!(text.any_string("FR").unwrap().as_deref(), Some("Chair"));
    /// assert!(text.contains("tuh"));
    /// ```
    pub complex MultilanguageString => MULTILANGUAGE_STRING;
}

/// Upper-cases a language code after checking it has exactly two characters.
///
/// # Errors
///
/// Returns [`ConversionError::InvalidValue`] for keys of any other length.
pub fn validate_language_key(key: &str) -> Result<String, ConversionError> {
    if key.chars().count() != 2 {
        return Err(ConversionError::invalid(
            "language key",
            key,
            "language keys must be exactly 2 characters",
        ));
    }
    Ok(key.to_uppercase())
}

impl MultilanguageString {
    /// Builds a value from `(language, text)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if a language key is invalid.
    pub fn from_pairs<I, L, T>(pairs: I) -> Result<Self, ConversionError>
    where
        I: IntoIterator<Item = (L, T)>,
        L: AsRef<str>,
        T: Into<String>,
    {
        let mut map = RawMap::new();
        for (language, text) in pairs {
            map.insert(validate_language_key(language.as_ref())?, text.into());
        }
        Ok(Self::from_resource(Resource::create(&MULTILANGUAGE_STRING, map)))
    }

    /// The text for a language.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] for an invalid key or a non-text value.
    pub fn get(&self, language: &str) -> Result<Option<String>, ConversionError> {
        self.0.get(&validate_language_key(language)?)
    }

    /// Sets or clears the text for a language, marking it modified.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] for an invalid key.
    pub fn set(&self, language: &str, text: Option<&str>) -> Result<(), ConversionError> {
        self.0
            .set(&validate_language_key(language)?, text.map(str::to_string))
    }

    /// The text for `preferred`, or else the first language that has one.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] for an invalid key.
    pub fn any_string(&self, preferred: &str) -> Result<Option<String>, ConversionError> {
        if let Some(text) = self.get(preferred)? {
            return Ok(Some(text));
        }
        Ok(self.texts().into_iter().map(|(_, text)| text).next())
    }

    /// Returns `true` if any language's text contains `value`.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.texts().iter().any(|(_, text)| text.contains(value))
    }

    /// All `(language, text)` pairs with a text, in payload order.
    #[must_use]
    pub fn texts(&self) -> Vec<(String, String)> {
        self.0
            .values()
            .iter()
            .filter(|(key, _)| !key.starts_with('@'))
            .filter_map(|(key, value)| match value {
                RawValue::String(text) => Some((key.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }
}

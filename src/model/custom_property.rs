//! User-defined property values.
//!
//! Custom properties are not part of the generated descriptor tables. The
//! service exposes each one under `CustomProperty_<code>` as a complex value.

use uuid::Uuid;

use super::descriptor::{PropertyDescriptor, PropertyType, ResourceDescriptor};
use super::errors::ConversionError;
use super::multilanguage::{MultilanguageString, MULTILANGUAGE_STRING};
use super::resource::Resource;
use super::typed::ApiResource;

/// Prefix of the payload key holding a custom property.
pub const CUSTOM_PROPERTY_PREFIX: &str = "CustomProperty_";

/// Descriptor of [`CustomPropertyValue`].
pub static CUSTOM_PROPERTY_VALUE: ResourceDescriptor = ResourceDescriptor::complex(
    "General.CustomPropertyValue",
    &[
        PropertyDescriptor::new("Value", PropertyType::String),
        PropertyDescriptor::new("Description", PropertyType::Complex(&MULTILANGUAGE_STRING)),
        PropertyDescriptor::new("ValueId", PropertyType::Guid),
    ],
);

crate::domain_resource! {
    /// The value of a custom property.
    ///
    /// Compares equal to a string when its `Value` text matches.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_api::model::CustomPropertyValue;
    ///
    /// let priority = CustomPropertyValue::of("High").unwrap();
    /// assert!(priority == "High");
    /// assert!(priority != "Low");
    /// ```
    pub complex CustomPropertyValue => CUSTOM_PROPERTY_VALUE;
}

impl CustomPropertyValue {
    /// A new value holding `value` as its text.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the value cannot be stored.
    pub fn of(value: &str) -> Result<Self, ConversionError> {
        let result = Self::new();
        result.set_value(Some(value.to_string()))?;
        Ok(result)
    }

    /// The value text.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the stored value is not text.
    pub fn value(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Value")
    }

    /// Sets the value text.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the current value cannot be read.
    pub fn set_value(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("Value", value)
    }

    /// Description of the value, when it comes from a predefined list.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the stored value is not a mapping.
    pub fn description(&self) -> Result<Option<MultilanguageString>, ConversionError> {
        self.resource().get("Description")
    }

    /// Id of the predefined value, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the stored value is not a Guid.
    pub fn value_id(&self) -> Result<Option<Uuid>, ConversionError> {
        self.resource().get("ValueId")
    }

    fn text(&self) -> Option<String> {
        self.value().ok().flatten()
    }
}

impl PartialEq<str> for CustomPropertyValue {
    fn eq(&self, other: &str) -> bool {
        self.text().as_deref() == Some(other)
    }
}

impl PartialEq<&str> for CustomPropertyValue {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<Option<&str>> for CustomPropertyValue {
    fn eq(&self, other: &Option<&str>) -> bool {
        self.text().as_deref() == *other
    }
}

impl Resource {
    /// Reads the custom property `code`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the stored value is not a mapping.
    pub fn custom_property(&self, code: &str) -> Result<Option<CustomPropertyValue>, ConversionError> {
        self.get(&format!("{CUSTOM_PROPERTY_PREFIX}{code}"))
    }

    /// Writes the custom property `code`, tracking it like a declared property.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the current value cannot be read.
    pub fn set_custom_property(
        &self,
        code: &str,
        value: Option<CustomPropertyValue>,
    ) -> Result<(), ConversionError> {
        self.set(&format!("{CUSTOM_PROPERTY_PREFIX}{code}"), value)
    }
}

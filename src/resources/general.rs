//! Shared value types of the general module.

use chrono::{DateTime, Utc};

use crate::model::{
    ApiResource, ConversionError, EnumValue, PropertyDescriptor, PropertyType, ResourceDescriptor,
};

crate::domain_enum! {
    /// Lifecycle state of a document.
    pub enum DocumentState = "General.DocumentState" { New, Planned, FirmPlanned, Released, Completed, Closed }
}

/// Descriptor of [`Address`].
pub static ADDRESS: ResourceDescriptor = ResourceDescriptor::complex(
    "General.Address",
    &[
        PropertyDescriptor::new("Street", PropertyType::String),
        PropertyDescriptor::new("City", PropertyType::String),
        PropertyDescriptor::new("PostalCode", PropertyType::String),
        PropertyDescriptor::new("Country", PropertyType::String),
    ],
);

/// Descriptor of [`Amount`].
pub static AMOUNT: ResourceDescriptor = ResourceDescriptor::complex(
    "General.Amount",
    &[
        PropertyDescriptor::new("Value", PropertyType::Decimal),
        PropertyDescriptor::new("Currency", PropertyType::String),
    ],
);

/// Descriptor of the abstract document base type.
pub static DOCUMENT: ResourceDescriptor = ResourceDescriptor::entity(
    "General.Document",
    "General_Documents",
    &[
        PropertyDescriptor::new("DocumentNo", PropertyType::String),
        PropertyDescriptor::new("DocumentDate", PropertyType::DateTime),
        PropertyDescriptor::new(
            "State",
            PropertyType::Enum(<DocumentState as EnumValue>::DESCRIPTOR),
        ),
    ],
);

crate::domain_resource! {
    /// A postal address.
    pub complex Address => ADDRESS;
}

crate::domain_resource! {
    /// A monetary amount in a currency.
    pub complex Amount => AMOUNT;
}

impl Address {
    /// The `Street` property.
    pub fn street(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Street")
    }

    /// Sets `Street`.
    pub fn set_street(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("Street", value)
    }

    /// The `City` property.
    pub fn city(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("City")
    }

    /// Sets `City`.
    pub fn set_city(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("City", value)
    }

    /// The `PostalCode` property.
    pub fn postal_code(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("PostalCode")
    }

    /// Sets `PostalCode`.
    pub fn set_postal_code(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("PostalCode", value)
    }

    /// The `Country` property.
    pub fn country(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Country")
    }

    /// Sets `Country`.
    pub fn set_country(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("Country", value)
    }
}

impl Amount {
    /// Builds an amount in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] only if the new payload rejects the values.
    pub fn of(value: f64, currency: &str) -> Result<Self, ConversionError> {
        let amount = Self::new();
        amount.set_value(value)?;
        amount.set_currency(Some(currency.to_string()))?;
        Ok(amount)
    }

    /// The numeric value. A missing value reads as zero.
    pub fn value(&self) -> Result<f64, ConversionError> {
        self.resource().get("Value")
    }

    /// Sets `Value`.
    pub fn set_value(&self, value: f64) -> Result<(), ConversionError> {
        self.resource().set("Value", value)
    }

    /// The `Currency` property.
    pub fn currency(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Currency")
    }

    /// Sets `Currency`.
    pub fn set_currency(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("Currency", value)
    }
}

/// Accessors shared by document types deriving from [`DOCUMENT`].
pub trait Document: ApiResource {
    /// The `DocumentNo` property.
    fn document_no(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("DocumentNo")
    }

    /// Sets `DocumentNo`.
    fn set_document_no(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("DocumentNo", value)
    }

    /// The `DocumentDate` property.
    fn document_date(&self) -> Result<Option<DateTime<Utc>>, ConversionError> {
        self.resource().get("DocumentDate")
    }

    /// Sets `DocumentDate`.
    fn set_document_date(&self, value: Option<DateTime<Utc>>) -> Result<(), ConversionError> {
        self.resource().set("DocumentDate", value)
    }

    /// The `State` property.
    fn state(&self) -> Result<DocumentState, ConversionError> {
        self.resource().get("State")
    }

    /// Sets `State`.
    fn set_state(&self, value: DocumentState) -> Result<(), ConversionError> {
        self.resource().set("State", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawValue;

    #[test]
    fn test_amount_of_sets_both_members() {
        let amount = Amount::of(12.5, "EUR").unwrap();
        assert!((amount.value().unwrap() - 12.5).abs() < f64::EPSILON);
        assert_eq!(amount.currency().unwrap().as_deref(), Some("EUR"));
    }

    #[test]
    fn test_missing_amount_value_reads_as_zero() {
        let amount = Amount::new();
        assert!(amount.value().unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_address_members_round_trip() {
        let address = Address::new();
        address.set_city(Some("Plovdiv".to_string())).unwrap();
        address.set_country(None).unwrap();
        assert_eq!(address.city().unwrap().as_deref(), Some("Plovdiv"));
        assert_eq!(address.country().unwrap(), None);
        assert_eq!(address.resource().raw("City"), Some(RawValue::from("Plovdiv")));
    }

    #[test]
    fn test_document_state_members_resolve_by_name() {
        assert_eq!(DocumentState::from_name("FirmPlanned"), Some(DocumentState::FirmPlanned));
        assert!(<DocumentState as EnumValue>::DESCRIPTOR.contains("Closed"));
    }
}

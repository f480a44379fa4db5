//! Inventory stores and lots.

use chrono::{DateTime, Utc};

use crate::model::{
    ApiResource, ConversionError, MultilanguageString, PropertyDescriptor, PropertyType,
    ResourceDescriptor, MULTILANGUAGE_STRING,
};

use super::products::{Product, PRODUCT};

/// Descriptor of [`Store`].
pub static STORE: ResourceDescriptor = ResourceDescriptor::entity(
    "Logistics.Inventory.Store",
    "Logistics_Inventory_Stores",
    &[
        PropertyDescriptor::new("Code", PropertyType::String),
        PropertyDescriptor::new("Name", PropertyType::Complex(&MULTILANGUAGE_STRING)),
        PropertyDescriptor::new("Active", PropertyType::Boolean),
    ],
);

/// Descriptor of [`Lot`].
pub static LOT: ResourceDescriptor = ResourceDescriptor::entity(
    "Logistics.Inventory.Lot",
    "Logistics_Inventory_Lots",
    &[
        PropertyDescriptor::new("Number", PropertyType::String),
        PropertyDescriptor::new("Product", PropertyType::Entity(&PRODUCT)),
        PropertyDescriptor::new("ExpiryDate", PropertyType::DateTime),
    ],
);

crate::domain_resource! {
    /// A warehouse location holding inventory.
    pub entity Store => STORE;
}

crate::domain_resource! {
    /// A batch of a product tracked together.
    pub entity Lot => LOT;
}

impl Store {
    /// The `Code` property.
    pub fn code(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Code")
    }

    /// The `Name` property.
    pub fn name(&self) -> Result<Option<MultilanguageString>, ConversionError> {
        self.resource().get("Name")
    }

    /// The `Active` property.
    pub fn active(&self) -> Result<bool, ConversionError> {
        self.resource().get("Active")
    }
}

impl Lot {
    /// The `Number` property.
    pub fn number(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Number")
    }

    /// The `Product` property.
    pub fn product(&self) -> Result<Option<Product>, ConversionError> {
        self.resource().get("Product")
    }

    /// The `ExpiryDate` property.
    pub fn expiry_date(&self) -> Result<Option<DateTime<Utc>>, ConversionError> {
        self.resource().get("ExpiryDate")
    }

    /// Sets `ExpiryDate`.
    pub fn set_expiry_date(&self, value: Option<DateTime<Utc>>) -> Result<(), ConversionError> {
        self.resource().set("ExpiryDate", value)
    }
}

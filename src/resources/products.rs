//! Products and their classification.

use std::sync::Arc;

use crate::model::{
    ApiResource, ConversionError, MultilanguageString, PropertyDescriptor, PropertyType,
    ResourceCollection, ResourceDescriptor, MULTILANGUAGE_STRING,
};

use super::general::{Amount, AMOUNT};

/// Descriptor of [`RangeProperty`].
pub static RANGE_PROPERTY: ResourceDescriptor = ResourceDescriptor::entity(
    "General.Products.RangeProperty",
    "General_Products_RangeProperties",
    &[
        PropertyDescriptor::new("Code", PropertyType::String),
        PropertyDescriptor::new("Name", PropertyType::Complex(&MULTILANGUAGE_STRING)),
        PropertyDescriptor::new("Value", PropertyType::String),
    ],
);

/// Descriptor of [`ProductGroup`].
pub static PRODUCT_GROUP: ResourceDescriptor = ResourceDescriptor::entity(
    "General.Products.ProductGroup",
    "General_Products_ProductGroups",
    &[
        PropertyDescriptor::new("Code", PropertyType::String),
        PropertyDescriptor::new("Name", PropertyType::Complex(&MULTILANGUAGE_STRING)),
        PropertyDescriptor::new(
            "RangeProperties",
            PropertyType::Collection(&PropertyType::Entity(&RANGE_PROPERTY)),
        ),
    ],
);

/// Descriptor of [`ProductType`].
pub static PRODUCT_TYPE: ResourceDescriptor = ResourceDescriptor::entity(
    "General.Products.ProductType",
    "General_Products_ProductTypes",
    &[
        PropertyDescriptor::new("Code", PropertyType::String),
        PropertyDescriptor::new("Name", PropertyType::Complex(&MULTILANGUAGE_STRING)),
    ],
);

/// Descriptor of [`Product`].
pub static PRODUCT: ResourceDescriptor = ResourceDescriptor::entity(
    "General.Products.Product",
    "General_Products_Products",
    &[
        PropertyDescriptor::new("PartNumber", PropertyType::String),
        PropertyDescriptor::new("Name", PropertyType::Complex(&MULTILANGUAGE_STRING)),
        PropertyDescriptor::new("ProductGroup", PropertyType::Entity(&PRODUCT_GROUP)),
        PropertyDescriptor::new("ProductType", PropertyType::Entity(&PRODUCT_TYPE)),
        PropertyDescriptor::new("StandardPrice", PropertyType::Complex(&AMOUNT)),
        PropertyDescriptor::new("Picture", PropertyType::Binary),
    ],
);

crate::domain_resource! {
    /// A value of a product range dimension, such as a size or a color.
    pub entity RangeProperty => RANGE_PROPERTY;
}

crate::domain_resource! {
    /// A grouping of products.
    pub entity ProductGroup => PRODUCT_GROUP;
}

crate::domain_resource! {
    pub entity ProductType => PRODUCT_TYPE;
}

crate::domain_resource! {
    /// An item that can be bought, sold or produced.
    pub entity Product => PRODUCT;
}

impl RangeProperty {
    /// The `Code` property.
    pub fn code(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Code")
    }

    /// The `Value` property.
    pub fn value(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Value")
    }
}

impl ProductGroup {
    /// The `Code` property.
    pub fn code(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Code")
    }

    /// The `Name` property.
    pub fn name(&self) -> Result<Option<MultilanguageString>, ConversionError> {
        self.resource().get("Name")
    }

    /// The range properties, when the collection was expanded.
    pub fn range_properties(&self) -> Result<Option<Arc<ResourceCollection<RangeProperty>>>, ConversionError> {
        self.resource().get_collection("RangeProperties")
    }

    /// Replaces the `RangeProperties` list, or removes it for `None`.
    pub fn set_range_properties(&self, items: Option<Vec<RangeProperty>>) {
        self.resource().set_collection("RangeProperties", items);
    }
}

impl ProductType {
    /// The `Code` property.
    pub fn code(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Code")
    }

    /// The `Name` property.
    pub fn name(&self) -> Result<Option<MultilanguageString>, ConversionError> {
        self.resource().get("Name")
    }
}

impl Product {
    /// The `PartNumber` property.
    pub fn part_number(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("PartNumber")
    }

    /// Sets `PartNumber`.
    pub fn set_part_number(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("PartNumber", value)
    }

    /// The `Name` property.
    pub fn name(&self) -> Result<Option<MultilanguageString>, ConversionError> {
        self.resource().get("Name")
    }

    /// Sets `Name`.
    pub fn set_name(&self, value: Option<MultilanguageString>) -> Result<(), ConversionError> {
        self.resource().set("Name", value)
    }

    /// The `ProductGroup` property.
    pub fn product_group(&self) -> Result<Option<ProductGroup>, ConversionError> {
        self.resource().get("ProductGroup")
    }

    /// Sets `ProductGroup`.
    pub fn set_product_group(&self, value: Option<ProductGroup>) -> Result<(), ConversionError> {
        self.resource().set("ProductGroup", value)
    }

    /// The `ProductType` property.
    pub fn product_type(&self) -> Result<Option<ProductType>, ConversionError> {
        self.resource().get("ProductType")
    }

    /// Sets `ProductType`.
    pub fn set_product_type(&self, value: Option<ProductType>) -> Result<(), ConversionError> {
        self.resource().set("ProductType", value)
    }

    /// The `StandardPrice` property.
    pub fn standard_price(&self) -> Result<Option<Amount>, ConversionError> {
        self.resource().get("StandardPrice")
    }

    /// Sets `StandardPrice`.
    pub fn set_standard_price(&self, value: Option<Amount>) -> Result<(), ConversionError> {
        self.resource().set("StandardPrice", value)
    }

    /// The `Picture` property.
    pub fn picture(&self) -> Result<Option<crate::model::Binary>, ConversionError> {
        self.resource().get("Picture")
    }

    /// Sets `Picture`.
    pub fn set_picture(&self, value: Option<crate::model::Binary>) -> Result<(), ConversionError> {
        self.resource().set("Picture", value)
    }
}

//! Sales orders and their lines.

use std::sync::Arc;

use crate::model::{
    ApiResource, ConversionError, EntityIdentifier, PropertyDescriptor, PropertyType,
    ResourceCollection, ResourceDescriptor,
};

use super::crm::{Customer, CUSTOMER};
use super::general::{Address, Amount, Document, ADDRESS, AMOUNT, DOCUMENT};
use super::logistics::{Lot, Store, LOT, STORE};
use super::products::{Product, PRODUCT};

/// Descriptor of [`SalesOrder`]. Inherits the document properties.
pub static SALES_ORDER: ResourceDescriptor = ResourceDescriptor::entity(
    "Crm.Sales.SalesOrder",
    "Crm_Sales_SalesOrders",
    &[
        PropertyDescriptor::new("Customer", PropertyType::Entity(&CUSTOMER)),
        PropertyDescriptor::new("ShipToAddress", PropertyType::Complex(&ADDRESS)),
        PropertyDescriptor::new("Amount", PropertyType::Complex(&AMOUNT)),
        PropertyDescriptor::new("Notes", PropertyType::String),
        PropertyDescriptor::new(
            "Lines",
            PropertyType::Collection(&PropertyType::Entity(&SALES_ORDER_LINE)),
        ),
    ],
)
.with_base(&DOCUMENT);

/// Descriptor of [`SalesOrderLine`].
pub static SALES_ORDER_LINE: ResourceDescriptor = ResourceDescriptor::entity(
    "Crm.Sales.SalesOrderLine",
    "Crm_Sales_SalesOrderLines",
    &[
        PropertyDescriptor::owner("SalesOrder", &SALES_ORDER),
        PropertyDescriptor::new("LineNo", PropertyType::Int32),
        PropertyDescriptor::new("Product", PropertyType::Entity(&PRODUCT)),
        PropertyDescriptor::new("Quantity", PropertyType::Decimal),
        PropertyDescriptor::new("UnitPrice", PropertyType::Complex(&AMOUNT)),
        PropertyDescriptor::new("Lot", PropertyType::Entity(&LOT)),
        PropertyDescriptor::new("LineStore", PropertyType::Entity(&STORE)),
        PropertyDescriptor::new("Notes", PropertyType::String),
    ],
);

crate::domain_resource! {
    /// A customer's order for products.
    pub entity SalesOrder => SALES_ORDER;
}

crate::domain_resource! {
    /// One product line of a [`SalesOrder`].
    pub entity SalesOrderLine => SALES_ORDER_LINE;
}

impl Document for SalesOrder {}

impl SalesOrder {
    /// The `Customer` property.
    pub fn customer(&self) -> Result<Option<Customer>, ConversionError> {
        self.resource().get("Customer")
    }

    /// Sets `Customer`.
    pub fn set_customer(&self, value: Option<Customer>) -> Result<(), ConversionError> {
        self.resource().set("Customer", value)
    }

    /// The customer's identifier, without requiring the customer to be
    /// expanded.
    pub fn customer_id(&self) -> Result<Option<EntityIdentifier>, ConversionError> {
        self.resource().reference_id("Customer")
    }

    /// Points `Customer` at another entity by identifier.
    pub fn set_customer_id(&self, value: Option<&EntityIdentifier>) {
        self.resource().set_reference_id("Customer", value);
    }

    /// The `ShipToAddress` property.
    pub fn ship_to_address(&self) -> Result<Option<Address>, ConversionError> {
        self.resource().get("ShipToAddress")
    }

    /// Sets `ShipToAddress`.
    pub fn set_ship_to_address(&self, value: Option<Address>) -> Result<(), ConversionError> {
        self.resource().set("ShipToAddress", value)
    }

    /// The `Amount` property.
    pub fn amount(&self) -> Result<Option<Amount>, ConversionError> {
        self.resource().get("Amount")
    }

    /// Sets `Amount`.
    pub fn set_amount(&self, value: Option<Amount>) -> Result<(), ConversionError> {
        self.resource().set("Amount", value)
    }

    /// The `Notes` property.
    pub fn notes(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Notes")
    }

    /// Sets `Notes`.
    pub fn set_notes(&self, value: Option<String>) -> Result<(), ConversionError> {
        self.resource().set("Notes", value)
    }

    /// The order lines, when the collection was expanded.
    pub fn lines(&self) -> Result<Option<Arc<ResourceCollection<SalesOrderLine>>>, ConversionError> {
        self.resource().get_collection("Lines")
    }

    /// Replaces the `Lines` list, or removes it for `None`.
    pub fn set_lines(&self, lines: Option<Vec<SalesOrderLine>>) {
        self.resource().set_collection("Lines", lines);
    }
}

impl SalesOrderLine {
    /// The `SalesOrder` property.
    pub fn sales_order(&self) -> Result<Option<SalesOrder>, ConversionError> {
        self.resource().get("SalesOrder")
    }

    /// The `LineNo` property.
    pub fn line_no(&self) -> Result<i32, ConversionError> {
        self.resource().get("LineNo")
    }

    /// Sets `LineNo`.
    pub fn set_line_no(&self, value: i32) -> Result<(), ConversionError> {
        self.resource().set("LineNo", value)
    }

    /// The `Product` property.
    pub fn product(&self) -> Result<Option<Product>, ConversionError> {
        self.resource().get("Product")
    }

    /// Sets `Product`.
    pub fn set_product(&self, value: Option<Product>) -> Result<(), ConversionError> {
        self.resource().set("Product", value)
    }

    /// The `Quantity` property.
    pub fn quantity(&self) -> Result<f64, ConversionError> {
        self.resource().get("Quantity")
    }

    /// Sets `Quantity`.
    pub fn set_quantity(&self, value: f64) -> Result<(), ConversionError> {
        self.resource().set("Quantity", value)
    }

    /// The `UnitPrice` property.
    pub fn unit_price(&self) -> Result<Option<Amount>, ConversionError> {
        self.resource().get("UnitPrice")
    }

    /// Sets `UnitPrice`.
    pub fn set_unit_price(&self, value: Option<Amount>) -> Result<(), ConversionError> {
        self.resource().set("UnitPrice", value)
    }

    /// The `Lot` property.
    pub fn lot(&self) -> Result<Option<Lot>, ConversionError> {
        self.resource().get("Lot")
    }

    /// The `LineStore` property.
    pub fn line_store(&self) -> Result<Option<Store>, ConversionError> {
        self.resource().get("LineStore")
    }

    /// The `Notes` property.
    pub fn notes(&self) -> Result<Option<String>, ConversionError> {
        self.resource().get("Notes")
    }
}

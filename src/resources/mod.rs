//! A sample domain model.
//!
//! These types mirror a slice of an ERP domain: customers, products,
//! inventory and sales orders. They show how generated resource types are
//! declared and serve as the model for the crate's examples and tests.
//!
//! # Example
//!
//! ```rust
//! use domain_api::model::{ApiResource, RawMap, RawValue};
//! use domain_api::resources::{self, SalesOrder, CUSTOMER};
//!
//! let registry = resources::registry();
//! assert!(std::ptr::eq(
//!     registry.descriptor_for_entity_set("Crm_Customers").unwrap(),
//!     &CUSTOMER
//! ));
//!
//! let mut raw = RawMap::new();
//! raw.insert("DocumentNo", "SO-1001");
//! let order = SalesOrder::from_resource(registry.create("Crm_Sales_SalesOrders", raw).unwrap());
//! assert_eq!(order.resource().raw("DocumentNo"), Some(RawValue::from("SO-1001")));
//! ```

#![allow(clippy::missing_errors_doc)]

mod crm;
mod general;
mod logistics;
mod products;
mod sales;

pub use crm::{Customer, CUSTOMER};
pub use general::{Address, Amount, Document, DocumentState, ADDRESS, AMOUNT, DOCUMENT};
pub use logistics::{Lot, Store, LOT, STORE};
pub use products::{
    Product, ProductGroup, ProductType, RangeProperty, PRODUCT, PRODUCT_GROUP, PRODUCT_TYPE,
    RANGE_PROPERTY,
};
pub use sales::{SalesOrder, SalesOrderLine, SALES_ORDER, SALES_ORDER_LINE};

use crate::model::{
    ResourceRegistry, CUSTOM_PROPERTY_VALUE, DEFAULT_TYPE_NAMESPACE, MULTILANGUAGE_STRING,
};

/// A registry of every type in this module under the default namespace.
#[must_use]
pub fn registry() -> ResourceRegistry {
    ResourceRegistry::new(DEFAULT_TYPE_NAMESPACE).with_all([
        &ADDRESS,
        &AMOUNT,
        &MULTILANGUAGE_STRING,
        &CUSTOM_PROPERTY_VALUE,
        &DOCUMENT,
        &CUSTOMER,
        &RANGE_PROPERTY,
        &PRODUCT_GROUP,
        &PRODUCT_TYPE,
        &PRODUCT,
        &STORE,
        &LOT,
        &SALES_ORDER,
        &SALES_ORDER_LINE,
    ])
}

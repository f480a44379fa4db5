//! Schemaless-backed resource data model.
//!
//! This module provides the in-memory side of the data-access layer:
//!
//! - **[`RawValue`] / [`RawMap`] / [`RawObject`]**: ordered payload mappings
//!   with shared nested storage nodes and idempotent deep-merge
//! - **[`ResourceDescriptor`]**: static per-type tables of property names,
//!   declared types and navigation kinds
//! - **[`Resource`]**: typed get/set over a raw mapping, change tracking,
//!   ownership cascade and minimal write payloads
//! - **[`ApiResource`] / [`EntityResource`] / [`ComplexResource`]**: traits
//!   implemented by generated types via [`domain_resource!`](crate::domain_resource)
//! - **[`EntityIdentifier`]**: the `<set>(<guid>)` identity of an entity
//! - **[`ResourceRegistry`]**: explicit entity set and type lookup tables
//! - **[`MultilanguageString`]**, **[`CustomPropertyValue`]** and
//!   **[`ConversionRatio`]**: built-in value types
//!
//! # Example
//!
//! ```rust
//! use domain_api::model::{RawMap, RawValue, Resource};
//! use domain_api::resources::{Customer, CUSTOMER};
//! use domain_api::model::ApiResource;
//!
//! let mut raw = RawMap::new();
//! raw.insert("Name", "Contoso");
//! let customer = Customer::from_resource(Resource::create(&CUSTOMER, raw));
//!
//! assert_eq!(customer.name().unwrap().as_deref(), Some("Contoso"));
//! assert!(customer.resource().raw_changes().is_none());
//!
//! customer.set_name(Some("Fabrikam".to_string())).unwrap();
//! let changes = customer.resource().raw_changes().unwrap();
//! assert_eq!(changes.get("Name"), Some(&RawValue::from("Fabrikam")));
//! ```

mod conversion_ratio;
mod custom_property;
mod descriptor;
mod errors;
mod identifier;
mod multilanguage;
mod raw;
mod registry;
mod resource;
mod time_span;
mod typed;
mod value;

pub use conversion_ratio::ConversionRatio;
pub use custom_property::{CustomPropertyValue, CUSTOM_PROPERTY_PREFIX, CUSTOM_PROPERTY_VALUE};
pub use descriptor::{
    EnumDescriptor, NavigationKind, PropertyDescriptor, PropertyType, ResourceDescriptor,
    ResourceKind, OPEN_OBJECT,
};
pub use errors::{ConversionError, IdentifierFormatError, MissingMetadataError};
pub use identifier::EntityIdentifier;
pub use multilanguage::{validate_language_key, MultilanguageString, MULTILANGUAGE_STRING};
pub use raw::{RawMap, RawObject, RawValue, ID, ODATA_ID, ODATA_TYPE, VALUE};
pub use registry::ResourceRegistry;
pub use resource::{Resource, ResourceCollection, DEFAULT_TYPE_NAMESPACE};
pub use time_span::TimeSpan;
pub use typed::{ApiResource, ComplexResource, EntityResource, EnumValue};
pub use value::{enum_default, enum_from_raw, resource_from_raw, Binary, PropertyValue, Value};

//! # Domain API
//!
//! A typed data-access layer over OData-style domain services: a resource
//! model with typed property access and change tracking, plus a command
//! builder that compiles typed expressions into `$filter`, `$select` and
//! `$expand` clauses.
//!
//! ## Overview
//!
//! This crate provides:
//! - Resources backed by schemaless payloads via [`model::Resource`], with
//!   typed wrappers generated by [`domain_resource!`] and [`domain_enum!`]
//! - Fine-grained change tracking that produces minimal write payloads
//! - A parser and serializer for nested expand/select clauses
//!   ([`query::ExpandNode`])
//! - A filter compiler over typed expression trees ([`query::compile_filter`])
//! - Typed commands ([`query::EntityCommand`]) executed through a
//!   transport-agnostic [`query::CommandExecutor`]
//! - A service context ([`DomainApi`]) for inserts, updates, deletes,
//!   reloads and bound operations
//!
//! The crate performs no network I/O itself.
//!
//! ## Quick Start
//!
//! ```rust
//! use domain_api::query::EntityCommand;
//! use domain_api::resources::Customer;
//!
//! let command = EntityCommand::<Customer>::new()
//!     .unwrap()
//!     .filter(|c| c.prop("Name").starts_with("Con"))
//!     .unwrap()
//!     .top(10);
//!
//! assert_eq!(
//!     command.uri_string(),
//!     "Crm_Customers?$filter=startswith(Name,'Con')&$top=10"
//! );
//! ```
//!
//! ## Change Tracking
//!
//! ```rust
//! use domain_api::model::ApiResource;
//! use domain_api::resources::{Address, SalesOrder};
//!
//! let order = SalesOrder::new();
//! order.set_ship_to_address(Some(Address::new())).unwrap();
//! order.resource().clear_changes();
//!
//! let address = order.ship_to_address().unwrap().unwrap();
//! address.set_city(Some("Sofia".to_string())).unwrap();
//!
//! // The change cascades to the owning order.
//! assert!(order.resource().is_property_modified("ShipToAddress"));
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use domain_api::{DomainApiConfig, ServiceRootUri};
//!
//! let config = DomainApiConfig::builder()
//!     .service_root(ServiceRootUri::new("https://erp.example.com/api/domain/odata/").unwrap())
//!     .build()
//!     .unwrap();
//! ```

pub mod api;
pub mod config;
mod error;
pub mod model;
pub mod query;
pub mod resources;

pub use api::DomainApi;
pub use config::{DomainApiConfig, DomainApiConfigBuilder, Language, ServiceRootUri, TypeNamespace};
pub use error::{ConfigError, DomainApiError};

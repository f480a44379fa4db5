//! Typed projections for `$select`.
//!
//! A projection is a plain Rust type built from a loaded entity. Its
//! [`Shape`] tells the command which properties to request: scalar fields
//! go to `$select`, references and nested projections to `$expand`.
//!
//! # Example
//!
//! ```rust
//! use domain_api::model::ConversionError;
//! use domain_api::query::{Projection, Shape};
//! use domain_api::resources::{Document, SalesOrder, SALES_ORDER};
//!
//! struct OrderHeader {
//!     number: Option<String>,
//! }
//!
//! impl Projection<SalesOrder> for OrderHeader {
//!     fn shape() -> Shape {
//!         Shape::new()
//!             .field("DocumentNo")
//!             .identifier("CustomerId")
//!             .nested("Lines", Shape::new().field("Quantity").reference("Product"))
//!     }
//!
//!     fn project(order: &SalesOrder) -> Result<Self, ConversionError> {
//!         Ok(Self { number: order.document_no()? })
//!     }
//! }
//!
//! let root = OrderHeader::shape().to_node(&SALES_ORDER).unwrap();
//! assert_eq!(root.select_clause(), "DocumentNo,Customer,Lines");
//! assert_eq!(root.expand_clause(), "Lines($expand=Product;$select=Quantity,Product)");
//! ```

use super::errors::CompileError;
use super::expand::ExpandNode;
use crate::model::{ConversionError, ResourceDescriptor};

/// A result type built from a loaded `T`.
pub trait Projection<T>: Sized {
    /// The properties the projection reads.
    fn shape() -> Shape;

    /// Builds the projection from a loaded entity.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if a read property has an unexpected form.
    fn project(source: &T) -> Result<Self, ConversionError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Field {
    Scalar(String),
    Identifier(String),
    Reference(String),
    Nested(String, Shape),
}

/// The properties read by a projection, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shape {
    fields: Vec<Field>,
}

impl Shape {
    /// Creates an empty shape.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Reads a scalar or complex property.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(Field::Scalar(name.into()));
        self
    }

    /// Reads only the identifier of a reference. A name ending in `Id`
    /// selects the reference property without the suffix, so `CustomerId`
    /// selects `Customer`.
    #[must_use]
    pub fn identifier(mut self, name: impl Into<String>) -> Self {
        self.fields.push(Field::Identifier(name.into()));
        self
    }

    /// Reads a whole referenced entity, or a collection of them.
    #[must_use]
    pub fn reference(mut self, name: impl Into<String>) -> Self {
        self.fields.push(Field::Reference(name.into()));
        self
    }

    /// Reads the properties of `shape` from a referenced entity, or from
    /// each item of a collection.
    #[must_use]
    pub fn nested(mut self, name: impl Into<String>, shape: Self) -> Self {
        self.fields.push(Field::Nested(name.into(), shape));
        self
    }

    /// Returns `true` if the shape reads nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds the expand tree for a projection over `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownProperty`] for names `scope` does not
    /// declare, and [`CompileError::Unsupported`] for references through
    /// properties that are not navigations.
    pub fn to_node(&self, scope: &'static ResourceDescriptor) -> Result<ExpandNode, CompileError> {
        let mut root = ExpandNode::root();
        self.apply(&mut root, scope)?;
        Ok(root)
    }

    fn apply(&self, node: &mut ExpandNode, scope: &'static ResourceDescriptor) -> Result<(), CompileError> {
        for field in &self.fields {
            match field {
                Field::Scalar(name) => {
                    declared(scope, name)?;
                    node.add_select(name.as_str());
                }
                Field::Identifier(name) => {
                    let property = name.strip_suffix("Id").filter(|p| !p.is_empty()).unwrap_or(name);
                    declared(scope, property)?;
                    node.add_select(property);
                }
                Field::Reference(name) => {
                    navigation(scope, name)?;
                    node.add_select(name.as_str());
                    node.get_or_add(name);
                }
                Field::Nested(name, shape) => {
                    let target = navigation(scope, name)?;
                    node.add_select(name.as_str());
                    shape.apply(node.get_or_add(name), target)?;
                }
            }
        }
        Ok(())
    }
}

fn declared(scope: &'static ResourceDescriptor, name: &str) -> Result<(), CompileError> {
    scope
        .property_type(name)
        .map(|_| ())
        .ok_or_else(|| CompileError::UnknownProperty {
            type_name: scope.type_name,
            property: name.to_string(),
        })
}

fn navigation(
    scope: &'static ResourceDescriptor,
    name: &str,
) -> Result<&'static ResourceDescriptor, CompileError> {
    declared(scope, name)?;
    scope
        .property_type(name)
        .filter(|ty| ty.is_navigation())
        .and_then(|ty| ty.resource().or_else(|| ty.element_resource()))
        .ok_or_else(|| {
            CompileError::unsupported(format!("expanding '{name}', which is not a reference"))
        })
}

//! Static metadata tables describing resource types.
//!
//! Generated resource definitions declare one [`ResourceDescriptor`] per type
//! as a `static`, listing its properties with their declared types. Typed and
//! untyped property access, filter path resolution and expand validation all
//! dispatch on these tables.
//!
//! # Example
//!
//! ```rust
//! use domain_api::model::{PropertyDescriptor, PropertyType, ResourceDescriptor};
//!
//! static AMOUNT: ResourceDescriptor = ResourceDescriptor::complex(
//!     "General.Amount",
//!     &[PropertyDescriptor::new("Value", PropertyType::Decimal)],
//! );
//!
//! static ORDER: ResourceDescriptor = ResourceDescriptor::entity(
//!     "Crm.Sales.Order",
//!     "Crm_Sales_Orders",
//!     &[
//!         PropertyDescriptor::new("DocumentNo", PropertyType::String),
//!         PropertyDescriptor::new("Total", PropertyType::Complex(&AMOUNT)),
//!     ],
//! );
//!
//! assert_eq!(ORDER.entity_set().unwrap(), "Crm_Sales_Orders");
//! assert_eq!(ORDER.odata_type("Erp."), "Erp.Crm_Sales_Order");
//! assert!(matches!(ORDER.property_type("Id"), Some(PropertyType::Guid)));
//! ```

use std::fmt;

use super::errors::MissingMetadataError;
use super::raw::ID;

/// Declared type of a property.
#[derive(Clone, Copy)]
pub enum PropertyType {
    /// `bool`.
    Boolean,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Floating point number.
    Double,
    /// Decimal number, carried as `f64`.
    Decimal,
    /// Text.
    String,
    /// Guid, stored lowercase-hyphenated.
    Guid,
    /// Date-time, normalized to UTC.
    DateTime,
    /// Date-time with its original offset.
    DateTimeOffset,
    /// Duration.
    TimeSpan,
    /// Bytes, stored as base64.
    Binary,
    /// Enumeration, stored by member name.
    Enum(&'static EnumDescriptor),
    /// Reference to another entity.
    Entity(&'static ResourceDescriptor),
    /// Embedded non-identity sub-object.
    Complex(&'static ResourceDescriptor),
    /// Ordered list of values of the inner type.
    Collection(&'static PropertyType),
    /// Untyped value, returned raw.
    Object,
}

impl PropertyType {
    /// Returns the resource descriptor for entity and complex types.
    #[must_use]
    pub const fn resource(&self) -> Option<&'static ResourceDescriptor> {
        match self {
            Self::Entity(d) | Self::Complex(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the element resource descriptor for collections of resources.
    #[must_use]
    pub const fn element_resource(&self) -> Option<&'static ResourceDescriptor> {
        match self {
            Self::Collection(inner) => inner.resource(),
            _ => None,
        }
    }

    /// Returns `true` for entity references and collections of them.
    #[must_use]
    pub const fn is_navigation(&self) -> bool {
        match self {
            Self::Entity(_) => true,
            Self::Collection(inner) => matches!(inner, Self::Entity(_)),
            _ => false,
        }
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::String => "String",
            Self::Guid => "Guid",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::TimeSpan => "TimeSpan",
            Self::Binary => "Binary",
            Self::Enum(e) => e.name,
            Self::Entity(d) | Self::Complex(d) => d.type_name,
            Self::Collection(_) => "Collection",
            Self::Object => "Object",
        }
    }
}

impl fmt::Debug for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(inner) => write!(f, "Collection({inner:?})"),
            other => f.write_str(other.name()),
        }
    }
}

/// How a property relates its owner to another resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NavigationKind {
    /// A plain value or embedded sub-object.
    #[default]
    None,
    /// A reference to an independent entity.
    Reference,
    /// A reference to the entity that owns this one.
    Owner,
    /// Owned child entities.
    Collection,
}

/// One declared property.
#[derive(Clone, Copy, Debug)]
pub struct PropertyDescriptor {
    /// Wire name of the property.
    pub name: &'static str,
    /// Declared type.
    pub ty: PropertyType,
    /// Navigation semantics.
    pub navigation: NavigationKind,
}

impl PropertyDescriptor {
    /// Declares a property, deriving the navigation kind from its type.
    #[must_use]
    pub const fn new(name: &'static str, ty: PropertyType) -> Self {
        let navigation = match ty {
            PropertyType::Entity(_) => NavigationKind::Reference,
            PropertyType::Collection(PropertyType::Entity(_)) => NavigationKind::Collection,
            _ => NavigationKind::None,
        };
        Self { name, ty, navigation }
    }

    /// Declares a reference to the owning entity.
    #[must_use]
    pub const fn owner(name: &'static str, target: &'static ResourceDescriptor) -> Self {
        Self {
            name,
            ty: PropertyType::Entity(target),
            navigation: NavigationKind::Owner,
        }
    }
}

/// Whether a type carries identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    /// Identity-bearing type addressed through an entity set.
    Entity {
        /// Name of the entity set.
        entity_set: &'static str,
    },
    /// Embedded type without identity.
    Complex,
}

/// Enumeration members, in declaration order.
#[derive(Debug)]
pub struct EnumDescriptor {
    /// Declared type name.
    pub name: &'static str,
    /// Member names.
    pub members: &'static [&'static str],
}

impl EnumDescriptor {
    /// Returns `true` if `member` is declared.
    #[must_use]
    pub fn contains(&self, member: &str) -> bool {
        self.members.contains(&member)
    }
}

/// Metadata table of one resource type.
pub struct ResourceDescriptor {
    /// Dotted type name, e.g. `Crm.Sales.SalesOrder`.
    pub type_name: &'static str,
    /// Entity or complex.
    pub kind: ResourceKind,
    /// Base type whose properties are inherited.
    pub base: Option<&'static ResourceDescriptor>,
    /// Properties declared on this type.
    pub properties: &'static [PropertyDescriptor],
}

impl ResourceDescriptor {
    /// Declares an entity type.
    #[must_use]
    pub const fn entity(
        type_name: &'static str,
        entity_set: &'static str,
        properties: &'static [PropertyDescriptor],
    ) -> Self {
        Self {
            type_name,
            kind: ResourceKind::Entity { entity_set },
            base: None,
            properties,
        }
    }

    /// Declares a complex type.
    #[must_use]
    pub const fn complex(type_name: &'static str, properties: &'static [PropertyDescriptor]) -> Self {
        Self {
            type_name,
            kind: ResourceKind::Complex,
            base: None,
            properties,
        }
    }

    /// Sets the base type.
    #[must_use]
    pub const fn with_base(mut self, base: &'static Self) -> Self {
        self.base = Some(base);
        self
    }

    /// Returns `true` for entity types.
    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self.kind, ResourceKind::Entity { .. })
    }

    /// Returns the entity set name.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError::NoEntitySet`] for complex types.
    pub const fn entity_set(&self) -> Result<&'static str, MissingMetadataError> {
        match self.kind {
            ResourceKind::Entity { entity_set } => Ok(entity_set),
            ResourceKind::Complex => Err(MissingMetadataError::NoEntitySet {
                type_name: self.type_name,
            }),
        }
    }

    /// Type discriminator stamped into new payloads:
    /// `namespace` followed by the type name with `.` replaced by `_`.
    #[must_use]
    pub fn odata_type(&self, namespace: &str) -> String {
        format!("{namespace}{}", self.type_name.replace('.', "_"))
    }

    /// Finds a property, searching base types.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&'static PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .or_else(|| self.base.and_then(|b| b.property(name)))
    }

    /// Declared type of a property. Entities implicitly declare `Id` as Guid.
    #[must_use]
    pub fn property_type(&self, name: &str) -> Option<PropertyType> {
        self.property(name).map(|p| p.ty).or_else(|| {
            (self.is_entity() && name == ID).then_some(PropertyType::Guid)
        })
    }

    /// Returns `true` if this type is `other` or derives from it.
    #[must_use]
    pub fn is_a(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.base.is_some_and(|b| b.is_a(other))
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field(
                "properties",
                &self.properties.iter().map(|p| p.name).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Descriptor of untyped mappings, used for parameters and unknown payloads.
pub static OPEN_OBJECT: ResourceDescriptor = ResourceDescriptor::complex("OpenObject", &[]);

#[cfg(test)]
mod tests {
    use super::*;

    static STATE: EnumDescriptor = EnumDescriptor {
        name: "DocumentState",
        members: &["New", "Released"],
    };

    static PARTY: ResourceDescriptor = ResourceDescriptor::entity(
        "General.Party",
        "General_Parties",
        &[PropertyDescriptor::new("Name", PropertyType::String)],
    );

    static CUSTOMER: ResourceDescriptor = ResourceDescriptor::entity(
        "Crm.Customer",
        "Crm_Customers",
        &[
            PropertyDescriptor::new("State", PropertyType::Enum(&STATE)),
            PropertyDescriptor::new("Children", PropertyType::Collection(&PropertyType::Entity(&PARTY))),
            PropertyDescriptor::owner("Parent", &PARTY),
        ],
    )
    .with_base(&PARTY);

    #[test]
    fn test_property_lookup_searches_base_types() {
        assert!(matches!(CUSTOMER.property_type("Name"), Some(PropertyType::String)));
        assert!(matches!(CUSTOMER.property_type("State"), Some(PropertyType::Enum(_))));
        assert!(CUSTOMER.property_type("Missing").is_none());
        assert!(CUSTOMER.is_a(&PARTY));
        assert!(!PARTY.is_a(&CUSTOMER));
    }

    #[test]
    fn test_navigation_kind_is_derived() {
        assert_eq!(
            CUSTOMER.property("Children").unwrap().navigation,
            NavigationKind::Collection
        );
        assert_eq!(CUSTOMER.property("Parent").unwrap().navigation, NavigationKind::Owner);
        assert_eq!(CUSTOMER.property("State").unwrap().navigation, NavigationKind::None);
    }

    #[test]
    fn test_complex_type_has_no_entity_set() {
        let result = OPEN_OBJECT.entity_set();
        assert!(matches!(
            result,
            Err(MissingMetadataError::NoEntitySet { type_name: "OpenObject" })
        ));
        assert!(OPEN_OBJECT.property_type(ID).is_none());
    }

    #[test]
    fn test_enum_membership() {
        assert!(STATE.contains("Released"));
        assert!(!STATE.contains("released"));
    }
}

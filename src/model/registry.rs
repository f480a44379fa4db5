//! Registry of resource descriptors.
//!
//! The registry maps entity set names, dotted type names and `@odata.type`
//! discriminators to the static descriptors of generated resource types. It
//! is built once at start-up and handed to the resource factory and the
//! command builder explicitly.
//!
//! # Example
//!
//! ```rust
//! use domain_api::model::{ResourceDescriptor, ResourceRegistry};
//!
//! static UNIT: ResourceDescriptor = ResourceDescriptor::entity(
//!     "General.MeasurementUnit",
//!     "General_MeasurementUnits",
//!     &[],
//! );
//!
//! let registry = ResourceRegistry::new("Erp.").with(&UNIT);
//!
//! assert!(registry.descriptor_for_entity_set("General_MeasurementUnits").is_some());
//! assert!(registry.descriptor_for_odata_type("Erp.General_MeasurementUnit").is_some());
//! ```

use std::collections::HashMap;

use super::descriptor::ResourceDescriptor;
use super::errors::MissingMetadataError;
use super::identifier::EntityIdentifier;
use super::raw::{RawMap, RawValue, ODATA_TYPE};
use super::resource::{Resource, DEFAULT_TYPE_NAMESPACE};

/// Lookup tables from names to resource descriptors.
///
/// # Thread Safety
///
/// `ResourceRegistry` is `Send + Sync`. It is immutable once shared.
#[derive(Clone)]
pub struct ResourceRegistry {
    namespace: String,
    by_entity_set: HashMap<&'static str, &'static ResourceDescriptor>,
    by_type_name: HashMap<&'static str, &'static ResourceDescriptor>,
    by_odata_type: HashMap<String, &'static ResourceDescriptor>,
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.by_type_name.keys().collect();
        types.sort();
        f.debug_struct("ResourceRegistry")
            .field("namespace", &self.namespace)
            .field("types", &types)
            .finish()
    }
}

// Verify ResourceRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceRegistry>();
};

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_NAMESPACE)
    }
}

impl ResourceRegistry {
    /// Creates an empty registry whose discriminators use `namespace`.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            by_entity_set: HashMap::new(),
            by_type_name: HashMap::new(),
            by_odata_type: HashMap::new(),
        }
    }

    /// The type discriminator namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registers a descriptor. Re-registering a name replaces the old entry.
    pub fn register(&mut self, descriptor: &'static ResourceDescriptor) -> &mut Self {
        if let Ok(entity_set) = descriptor.entity_set() {
            self.by_entity_set.insert(entity_set, descriptor);
        }
        self.by_type_name.insert(descriptor.type_name, descriptor);
        self.by_odata_type
            .insert(descriptor.odata_type(&self.namespace), descriptor);
        self
    }

    /// Registers a descriptor, builder style.
    #[must_use]
    pub fn with(mut self, descriptor: &'static ResourceDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Registers several descriptors, builder style.
    #[must_use]
    pub fn with_all<I>(mut self, descriptors: I) -> Self
    where
        I: IntoIterator<Item = &'static ResourceDescriptor>,
    {
        for descriptor in descriptors {
            self.register(descriptor);
        }
        self
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type_name.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type_name.is_empty()
    }

    /// Looks up the entity type of an entity set.
    #[must_use]
    pub fn descriptor_for_entity_set(&self, entity_set: &str) -> Option<&'static ResourceDescriptor> {
        self.by_entity_set.get(entity_set).copied()
    }

    /// Looks up a type by its dotted name.
    #[must_use]
    pub fn descriptor_for_type(&self, type_name: &str) -> Option<&'static ResourceDescriptor> {
        self.by_type_name.get(type_name).copied()
    }

    /// Looks up a type by its `@odata.type` discriminator. A leading `#` is
    /// ignored.
    #[must_use]
    pub fn descriptor_for_odata_type(&self, odata_type: &str) -> Option<&'static ResourceDescriptor> {
        let odata_type = odata_type.strip_prefix('#').unwrap_or(odata_type);
        self.by_odata_type.get(odata_type).copied()
    }

    /// Registered entity set names, sorted.
    #[must_use]
    pub fn entity_sets(&self) -> Vec<&'static str> {
        let mut sets: Vec<_> = self.by_entity_set.keys().copied().collect();
        sets.sort_unstable();
        sets
    }

    /// Creates an empty resource stamped with this registry's namespace.
    #[must_use]
    pub fn new_resource(&self, descriptor: &'static ResourceDescriptor) -> Resource {
        Resource::with_namespace(descriptor, &self.namespace)
    }

    /// Wraps a payload received for an entity set.
    ///
    /// When the payload's `@odata.type` names a registered subtype of the
    /// set's type, the subtype's descriptor is used.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError::UnknownEntitySet`] for unregistered sets.
    pub fn create(&self, entity_set: &str, raw: RawMap) -> Result<Resource, MissingMetadataError> {
        let declared = self.descriptor_for_entity_set(entity_set).ok_or_else(|| {
            MissingMetadataError::UnknownEntitySet {
                entity_set: entity_set.to_string(),
            }
        })?;
        let descriptor = self.resolve(declared, &raw);
        Ok(Resource::create(descriptor, raw))
    }

    /// Picks the most specific registered descriptor for a payload, falling
    /// back to `declared`.
    #[must_use]
    pub fn resolve(
        &self,
        declared: &'static ResourceDescriptor,
        raw: &RawMap,
    ) -> &'static ResourceDescriptor {
        let Some(RawValue::String(odata_type)) = raw.get(ODATA_TYPE) else {
            return declared;
        };
        match self.descriptor_for_odata_type(odata_type) {
            Some(found) if found.is_a(declared) => found,
            Some(_) => declared,
            None => {
                tracing::warn!(
                    odata_type = %odata_type,
                    declared = declared.type_name,
                    "unregistered type discriminator, using declared type"
                );
                declared
            }
        }
    }

    /// Creates a reference resource for an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError::UnknownEntitySet`] for unregistered sets.
    pub fn reference(&self, identifier: &EntityIdentifier) -> Result<Resource, MissingMetadataError> {
        let descriptor = self
            .descriptor_for_entity_set(identifier.entity_set())
            .ok_or_else(|| MissingMetadataError::UnknownEntitySet {
                entity_set: identifier.entity_set().to_string(),
            })?;
        Resource::id_resource(descriptor, identifier.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::{PropertyDescriptor, PropertyType};
    use uuid::Uuid;

    static DOCUMENT: ResourceDescriptor = ResourceDescriptor::entity(
        "General.Document",
        "General_Documents",
        &[PropertyDescriptor::new("DocumentNo", PropertyType::String)],
    );

    static INVOICE: ResourceDescriptor =
        ResourceDescriptor::entity("Finance.Invoice", "Finance_Invoices", &[]).with_base(&DOCUMENT);

    static MONEY: ResourceDescriptor = ResourceDescriptor::complex("General.Money", &[]);

    fn registry() -> ResourceRegistry {
        ResourceRegistry::default().with_all([&DOCUMENT, &INVOICE, &MONEY])
    }

    #[test]
    fn test_lookups() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.entity_sets(), vec!["Finance_Invoices", "General_Documents"]);
        assert!(registry.descriptor_for_type("General.Money").is_some());
        assert!(registry.descriptor_for_entity_set("General_Money").is_none());
        assert!(registry.descriptor_for_odata_type("#Erp.Finance_Invoice").is_some());
    }

    #[test]
    fn test_create_resolves_subtype_from_discriminator() {
        let registry = registry();
        let mut raw = RawMap::new();
        raw.insert(ODATA_TYPE, "Erp.Finance_Invoice");
        let resource = registry.create("General_Documents", raw).unwrap();
        assert_eq!(resource.descriptor().type_name, "Finance.Invoice");
        assert!(matches!(
            resource.descriptor().property_type("DocumentNo"),
            Some(PropertyType::String)
        ));
    }

    #[test]
    fn test_create_ignores_unrelated_discriminator() {
        let registry = registry();
        let mut raw = RawMap::new();
        raw.insert(ODATA_TYPE, "Erp.General_Money");
        let resource = registry.create("General_Documents", raw).unwrap();
        assert_eq!(resource.descriptor().type_name, "General.Document");
    }

    #[test]
    fn test_unknown_entity_set_fails() {
        let result = registry().create("Nope", RawMap::new());
        assert!(matches!(
            result,
            Err(MissingMetadataError::UnknownEntitySet { .. })
        ));
    }

    #[test]
    fn test_reference_and_new_resource() {
        let registry = ResourceRegistry::new("Acme.").with(&DOCUMENT);
        let id = Uuid::parse_str("0e7d6c5b-4a39-4281-9f0e-d1c2b3a49586").unwrap();
        let reference = registry
            .reference(&EntityIdentifier::new("General_Documents", id))
            .unwrap();
        assert_eq!(reference.id(), Some(id));
        assert_eq!(
            registry.new_resource(&DOCUMENT).odata_type().as_deref(),
            Some("Acme.General_Document")
        );
    }
}

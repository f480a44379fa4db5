//! The schemaless-backed resource handle.
//!
//! A [`Resource`] wraps a shared raw storage node together with the static
//! descriptor of its type. Typed properties are computed on demand from the
//! raw mapping, which stays the single source of truth. Writes are tracked by
//! property name so [`Resource::raw_changes`] can produce a minimal payload
//! for partial updates.
//!
//! # Ownership
//!
//! Complex sub-objects read from a parent keep a weak link to it, together
//! with the parent's own link. Marking a property of a complex resource
//! modified also marks the owner's property, cascading up the ownership
//! chain. A dropped intermediate handle is skipped in favor of the next
//! live owner above it.
//!
//! # Thread Safety
//!
//! Resources are `Send + Sync` and may be read from several threads. The
//! collection cache is safe for concurrent readers. Concurrent writes to the
//! same resource are the caller's responsibility: a `set` reads the old
//! value and writes the new one without holding a lock in between.
//!
//! # Example
//!
//! ```rust
//! use domain_api::model::{PropertyDescriptor, PropertyType, Resource, ResourceDescriptor};
//!
//! static NOTE: ResourceDescriptor = ResourceDescriptor::entity(
//!     "General.Note",
//!     "General_Notes",
//!     &[PropertyDescriptor::new("Text", PropertyType::String)],
//! );
//!
//! let note = Resource::new(&NOTE);
//! assert!(note.raw_changes().is_none());
//!
//! note.set("Text", Some("hello".to_string())).unwrap();
//! let changes = note.raw_changes().unwrap();
//! assert_eq!(changes.keys().collect::<Vec<_>>(), vec!["Text"]);
//! ```

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use super::descriptor::{PropertyType, ResourceDescriptor};
use super::errors::{ConversionError, MissingMetadataError};
use super::identifier::EntityIdentifier;
use super::raw::{RawMap, RawObject, RawValue, ID, ODATA_ID, ODATA_TYPE};
use super::typed::ApiResource;
use super::value::{PropertyValue, Value};

/// Namespace prefixed to type discriminators unless configured otherwise.
pub const DEFAULT_TYPE_NAMESPACE: &str = "Erp.";

type CachedCollection = Arc<dyn Any + Send + Sync>;

/// Link from a complex resource to the property that holds it.
///
/// `parent` is the owner's own link at adoption time, so the cascade can
/// skip intermediate handles that have since been dropped.
struct OwnerLink {
    owner: Weak<ResourceInner>,
    property: String,
    parent: Option<Arc<OwnerLink>>,
}

struct ResourceInner {
    descriptor: &'static ResourceDescriptor,
    data: RawObject,
    changed: Mutex<HashSet<String>>,
    collections: DashMap<String, CachedCollection>,
    owner: Mutex<Option<Arc<OwnerLink>>>,
}

/// Handle to a resource instance.
///
/// Cloning the handle shares the instance, including its change set.
#[derive(Clone)]
pub struct Resource {
    inner: Arc<ResourceInner>,
}

impl Resource {
    /// Creates an empty resource stamped with the default type namespace.
    #[must_use]
    pub fn new(descriptor: &'static ResourceDescriptor) -> Self {
        Self::with_namespace(descriptor, DEFAULT_TYPE_NAMESPACE)
    }

    /// Creates an empty resource whose `@odata.type` uses `namespace`.
    #[must_use]
    pub fn with_namespace(descriptor: &'static ResourceDescriptor, namespace: &str) -> Self {
        let mut map = RawMap::new();
        map.insert(ODATA_TYPE, descriptor.odata_type(namespace));
        Self::create(descriptor, map)
    }

    /// Wraps an existing payload in a new storage node.
    #[must_use]
    pub fn create(descriptor: &'static ResourceDescriptor, raw: RawMap) -> Self {
        Self::from_node(descriptor, RawObject::new(raw))
    }

    /// Wraps an existing storage node, sharing it.
    #[must_use]
    pub fn from_node(descriptor: &'static ResourceDescriptor, data: RawObject) -> Self {
        Self {
            inner: Arc::new(ResourceInner {
                descriptor,
                data,
                changed: Mutex::new(HashSet::new()),
                collections: DashMap::new(),
                owner: Mutex::new(None),
            }),
        }
    }

    /// Builds a resource from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the value does not serialize to a mapping.
    pub fn convert<S: Serialize>(
        descriptor: &'static ResourceDescriptor,
        value: &S,
    ) -> Result<Self, ConversionError> {
        let json = serde_json::to_value(value)
            .map_err(|e| ConversionError::invalid(descriptor.type_name, "<serialized value>", e))?;
        match RawValue::from(json) {
            RawValue::Object(node) => Ok(Self::from_node(descriptor, node)),
            other => Err(ConversionError::UnexpectedType {
                expected: descriptor.type_name,
                found: other.kind_name(),
            }),
        }
    }

    /// Creates a reference resource holding only `Id` and `@odata.id`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError`] for complex types.
    pub fn id_resource(
        descriptor: &'static ResourceDescriptor,
        id: Uuid,
    ) -> Result<Self, MissingMetadataError> {
        let identifier = EntityIdentifier::new(descriptor.entity_set()?, id);
        let mut map = RawMap::new();
        map.insert(ID, id.hyphenated().to_string());
        map.insert(ODATA_ID, identifier.to_string());
        Ok(Self::create(descriptor, map))
    }

    /// Static metadata of this resource's type.
    #[must_use]
    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.inner.descriptor
    }

    /// The shared storage node.
    #[must_use]
    pub fn data(&self) -> &RawObject {
        &self.inner.data
    }

    /// This resource as a raw value sharing its storage node.
    #[must_use]
    pub fn to_raw(&self) -> RawValue {
        RawValue::Object(self.inner.data.clone())
    }

    /// A copy of the raw value stored under `name`.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<RawValue> {
        self.inner.data.read().get(name).cloned()
    }

    /// A shallow snapshot of all stored properties.
    #[must_use]
    pub fn values(&self) -> RawMap {
        self.inner.data.read().clone()
    }

    /// Returns `true` if the payload contains `name`.
    #[must_use]
    pub fn contains_property(&self, name: &str) -> bool {
        self.inner.data.read().contains_key(name)
    }

    /// Reads a property as `T`.
    ///
    /// Complex results are linked to this resource as their owner.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the stored value cannot become `T`.
    pub fn get<T: PropertyValue>(&self, name: &str) -> Result<T, ConversionError> {
        let value = match self.raw(name) {
            None | Some(RawValue::Null) => T::null_value()?,
            Some(raw) => T::from_raw(&raw)?,
        };
        if let Some(resource) = value.as_resource() {
            self.adopt(resource, name);
        }
        Ok(value)
    }

    /// Reads a property using its declared type, or the raw value for
    /// undeclared properties.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the stored value does not fit the
    /// declared type.
    pub fn get_value(&self, name: &str) -> Result<Value, ConversionError> {
        let ty = self
            .inner
            .descriptor
            .property_type(name)
            .unwrap_or(PropertyType::Object);
        let value = Value::from_raw(&self.raw(name).unwrap_or_default(), ty)?;
        match &value {
            Value::Resource(resource) => self.adopt(resource, name),
            Value::Collection(items) => items
                .iter()
                .filter_map(Value::as_resource)
                .for_each(|r| self.adopt(r, name)),
            _ => {}
        }
        Ok(value)
    }

    /// Writes a property.
    ///
    /// Equal values are ignored. Otherwise the property is marked modified;
    /// when both the old and the new value are resources that may be merged,
    /// the new payload is deep-merged into the old storage node, keeping the
    /// old resource's identity. Otherwise the raw form replaces the slot.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the current value cannot be read as `T`.
    pub fn set<T: PropertyValue + PartialEq>(&self, name: &str, value: T) -> Result<(), ConversionError> {
        let old: T = self.get(name)?;
        if old == value {
            return Ok(());
        }
        self.assign(name, old.as_resource(), value.as_resource(), || value.to_raw());
        Ok(())
    }

    /// Writes a dynamically typed value. Follows the rules of [`Resource::set`];
    /// two raw mappings are merged as well.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the current value cannot be read.
    pub fn set_value(&self, name: &str, value: Value) -> Result<(), ConversionError> {
        let old = self.get_value(name)?;
        if old == value {
            return Ok(());
        }
        if let (Value::Raw(RawValue::Object(old)), Value::Raw(RawValue::Object(new))) = (&old, &value) {
            self.set_modified(name);
            if !old.ptr_eq(new) {
                let incoming = new.read().clone();
                old.write().deep_merge(&incoming);
            }
            return Ok(());
        }
        self.assign(name, old.as_resource(), value.as_resource(), || value.to_raw());
        Ok(())
    }

    fn assign(
        &self,
        name: &str,
        old: Option<&Self>,
        new: Option<&Self>,
        raw: impl FnOnce() -> RawValue,
    ) {
        self.set_modified(name);
        self.inner.collections.remove(name);
        match (old, new) {
            (Some(old), Some(new)) if old.can_merge(new) => {
                let incoming = new.inner.data.read().clone();
                old.inner.data.write().deep_merge(&incoming);
            }
            _ => {
                self.inner.data.write().insert(name, raw());
            }
        }
    }

    /// Complex resources always merge; entities merge only into a slot that
    /// has no identity yet. Differing kinds never merge.
    fn can_merge(&self, incoming: &Self) -> bool {
        if self.inner.data.ptr_eq(&incoming.inner.data) {
            return false;
        }
        match (self.descriptor().is_entity(), incoming.descriptor().is_entity()) {
            (false, false) => true,
            (true, true) => self.identifier().is_none(),
            _ => false,
        }
    }

    fn adopt(&self, child: &Self, property: &str) {
        if !child.descriptor().is_entity() {
            let parent = self.inner.owner.lock().clone();
            *child.inner.owner.lock() = Some(Arc::new(OwnerLink {
                owner: Arc::downgrade(&self.inner),
                property: property.to_string(),
                parent,
            }));
        }
    }

    /// The owning resource and property name, for complex resources read
    /// from a parent that is still alive.
    #[must_use]
    pub fn owner(&self) -> Option<(Self, String)> {
        let link = self.inner.owner.lock();
        let link = link.as_ref()?;
        let owner = link.owner.upgrade()?;
        Some((Self { inner: owner }, link.property.clone()))
    }

    /// Marks `name` modified and cascades to the owner.
    pub fn set_modified(&self, name: &str) {
        self.inner.changed.lock().insert(name.to_string());
        self.on_modified(name);
    }

    fn on_modified(&self, name: &str) {
        let mut link = self.inner.owner.lock().clone();
        while let Some(current) = link {
            if let Some(inner) = current.owner.upgrade() {
                Self { inner }.set_modified(&current.property);
                return;
            }
            if current.parent.is_none() {
                tracing::debug!(
                    property = %name,
                    owner_property = %current.property,
                    "owner dropped, change not propagated"
                );
            }
            link = current.parent.clone();
        }
    }

    /// Returns `true` if any property is marked modified.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        !self.inner.changed.lock().is_empty()
    }

    /// Returns `true` if `name` is marked modified.
    #[must_use]
    pub fn is_property_modified(&self, name: &str) -> bool {
        self.inner.changed.lock().contains(name)
    }

    /// Names of modified properties, sorted.
    #[must_use]
    pub fn changed_properties(&self) -> Vec<String> {
        let mut names: Vec<_> = self.inner.changed.lock().iter().cloned().collect();
        names.sort();
        names
    }

    /// The write payload: modified properties present in the payload, with
    /// nested identified mappings reduced to `{"@odata.id": ...}`.
    ///
    /// Returns `None` when nothing is modified.
    #[must_use]
    pub fn raw_changes(&self) -> Option<RawMap> {
        let changed = self.inner.changed.lock();
        if changed.is_empty() {
            return None;
        }
        let data = self.inner.data.read();
        Some(
            data.iter()
                .filter(|(name, _)| changed.contains(name.as_str()))
                .map(|(name, value)| (name.clone(), value.to_reference_form()))
                .collect(),
        )
    }

    /// Clears every modification mark.
    pub fn clear_changes(&self) {
        self.inner.changed.lock().clear();
    }

    /// Clears the modification marks of the named properties only.
    pub fn clear_changes_of<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = self.inner.changed.lock();
        for name in names {
            changed.remove(name.as_ref());
        }
    }

    /// Deep-merges `values` into the payload without marking anything
    /// modified. Returns `true` if the payload changed.
    pub fn update(&self, values: &RawMap) -> bool {
        let modified = self.inner.data.write().deep_merge(values);
        if modified {
            self.inner.collections.clear();
        }
        modified
    }

    /// Reads a list of sub-resources.
    ///
    /// The materialized collection is cached per property, so repeated reads
    /// return the same `Arc` until the property is written.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the slot is not a list of mappings.
    pub fn get_collection<T: ApiResource>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<ResourceCollection<T>>>, ConversionError> {
        if let Some(cached) = self.cached_collection::<T>(name) {
            return Ok(Some(cached));
        }

        let items = match self.raw(name) {
            None | Some(RawValue::Null) => return Ok(None),
            Some(RawValue::Array(items)) => items,
            Some(other) => {
                return Err(ConversionError::UnexpectedType {
                    expected: std::any::type_name::<Vec<T>>(),
                    found: other.kind_name(),
                })
            }
        };

        let items = items
            .iter()
            .map(|item| match item {
                RawValue::Object(node) => {
                    let resource = Self::from_node(T::descriptor(), node.clone());
                    self.adopt(&resource, name);
                    Ok(T::from_resource(resource))
                }
                other => Err(ConversionError::UnexpectedType {
                    expected: T::descriptor().type_name,
                    found: other.kind_name(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fresh = Arc::new(ResourceCollection { items });
        let stored = Arc::clone(
            self.inner
                .collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::clone(&fresh) as CachedCollection)
                .value(),
        );
        match stored.downcast::<ResourceCollection<T>>() {
            Ok(collection) => Ok(Some(collection)),
            Err(_) => {
                self.inner
                    .collections
                    .insert(name.to_string(), Arc::clone(&fresh) as CachedCollection);
                Ok(Some(fresh))
            }
        }
    }

    fn cached_collection<T: ApiResource>(&self, name: &str) -> Option<Arc<ResourceCollection<T>>> {
        let cached = Arc::clone(self.inner.collections.get(name)?.value());
        cached.downcast::<ResourceCollection<T>>().ok()
    }

    /// Replaces a list of sub-resources, or removes it with `None`.
    ///
    /// The items share their storage with the new list, and the property is
    /// marked modified.
    pub fn set_collection<T: ApiResource>(&self, name: &str, items: Option<Vec<T>>) {
        match items {
            None => {
                self.inner.collections.remove(name);
                self.inner.data.write().remove(name);
            }
            Some(items) => {
                let raw = items.iter().map(|item| item.resource().to_raw()).collect();
                self.inner.data.write().insert(name, RawValue::Array(raw));
                for item in &items {
                    self.adopt(item.resource(), name);
                }
                self.inner
                    .collections
                    .insert(name.to_string(), Arc::new(ResourceCollection { items }) as CachedCollection);
            }
        }
        self.set_modified(name);
    }

    /// The `Id` of an entity, falling back to the key in `@odata.id`.
    #[must_use]
    pub fn id(&self) -> Option<Uuid> {
        let stored = self
            .raw(ID)
            .and_then(|raw| raw.as_str().and_then(|s| Uuid::parse_str(s).ok()));
        stored.or_else(|| self.odata_id_value().map(|id| id.id()))
    }

    /// The identifier of an entity, from `@odata.id` or from its entity set
    /// and `Id`.
    #[must_use]
    pub fn identifier(&self) -> Option<EntityIdentifier> {
        self.odata_id_value().or_else(|| {
            let entity_set = self.descriptor().entity_set().ok()?;
            let id = self
                .raw(ID)
                .and_then(|raw| raw.as_str().and_then(|s| Uuid::parse_str(s).ok()))?;
            Some(EntityIdentifier::new(entity_set, id))
        })
    }

    fn odata_id_value(&self) -> Option<EntityIdentifier> {
        let raw = self.raw(ODATA_ID)?;
        let text = raw.as_str()?;
        match EntityIdentifier::parse(text) {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::warn!(odata_id = %text, %error, "ignoring malformed @odata.id");
                None
            }
        }
    }

    /// The stored `@odata.type` discriminator.
    #[must_use]
    pub fn odata_type(&self) -> Option<String> {
        self.raw(ODATA_TYPE).and_then(|raw| raw.as_str().map(str::to_string))
    }

    /// Returns `true` if the payload holds more than identity keys.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.inner
            .data
            .read()
            .keys()
            .any(|k| k != ID && k != ODATA_ID)
    }

    /// Reads the identifier of a referenced entity without materializing it.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the slot is neither a mapping nor an
    /// identifier string, or holds a malformed identifier.
    pub fn reference_id(&self, property: &str) -> Result<Option<EntityIdentifier>, ConversionError> {
        match self.raw(property) {
            None | Some(RawValue::Null) => Ok(None),
            Some(RawValue::String(s)) => Ok(Some(EntityIdentifier::parse(&s)?)),
            Some(RawValue::Object(node)) => match node.read().get(ODATA_ID) {
                Some(RawValue::String(s)) => Ok(Some(EntityIdentifier::parse(s)?)),
                _ => Ok(None),
            },
            Some(other) => Err(ConversionError::UnexpectedType {
                expected: "EntityIdentifier",
                found: other.kind_name(),
            }),
        }
    }

    /// Points a reference property at another entity, or clears it.
    pub fn set_reference_id(&self, property: &str, identifier: Option<&EntityIdentifier>) {
        if self.reference_id(property).ok().flatten().as_ref() == identifier {
            return;
        }
        let raw = identifier.map_or(RawValue::Null, |id| {
            let mut map = RawMap::new();
            map.insert(ODATA_ID, id.to_string());
            RawValue::from(map)
        });
        self.set_modified(property);
        self.inner.collections.remove(property);
        self.inner.data.write().insert(property, raw);
    }

    /// Serializes the payload as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only occurs for non-string keys.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&*self.inner.data.read())
    }

    /// Returns `true` if both handles refer to the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Resource {
    /// Entities compare by identity when both have one. Everything else
    /// compares by storage node.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) || self.inner.data.ptr_eq(&other.inner.data) {
            return true;
        }
        if self.descriptor().is_entity() && other.descriptor().is_entity() {
            if let (Some(a), Some(b)) = (self.identifier(), other.identifier()) {
                return a == b;
            }
        }
        false
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("type", &self.inner.descriptor.type_name)
            .field("data", &self.inner.data)
            .field("changed", &self.changed_properties())
            .finish()
    }
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.data.serialize(serializer)
    }
}

// Verify Resource is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Resource>();
};

/// A materialized list of typed sub-resources.
#[derive(Debug)]
pub struct ResourceCollection<T> {
    items: Vec<T>,
}

impl<T> ResourceCollection<T> {
    /// The items, in payload order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> Deref for ResourceCollection<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a ResourceCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

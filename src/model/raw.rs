//! Raw payload values.
//!
//! Resources keep their state as an ordered mapping of property names to
//! [`RawValue`]s, the same shape the JSON codec produces. Nested mappings are
//! shared storage nodes ([`RawObject`]): a nested resource materialized from a
//! parent views the same node, so writes through either are visible to both.
//!
//! # Example
//!
//! ```rust
//! use domain_api::model::{RawMap, RawValue};
//!
//! let mut target = RawMap::new();
//! target.insert("Name", "Widget");
//!
//! let mut source = RawMap::new();
//! source.insert("Name", "Gadget");
//! source.insert("Quantity", 3_i64);
//!
//! assert!(target.deep_merge(&source));
//! assert!(!target.deep_merge(&source));
//! assert_eq!(target.get("Quantity"), Some(&RawValue::from(3_i64)));
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::{SerializeMap, SerializeSeq};
use serde_json::Number;

/// Key carrying the identity string `<set>(<guid>)`.
pub const ODATA_ID: &str = "@odata.id";

/// Key carrying the type discriminator.
pub const ODATA_TYPE: &str = "@odata.type";

/// Key carrying the Guid identity of an entity.
pub const ID: &str = "Id";

/// Key wrapping the items of a collection response.
pub const VALUE: &str = "value";

/// A single value in a resource payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// JSON `null`, also used for cleared properties.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number, integer or floating point.
    Number(Number),
    /// JSON string.
    String(String),
    /// Shared nested mapping.
    Object(RawObject),
    /// Ordered list.
    Array(Vec<RawValue>),
}

impl RawValue {
    /// Returns a short name of the value's shape, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }

    /// Returns `true` for [`RawValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested mapping, if this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&RawObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the list items, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Copies the value, giving every nested mapping its own storage node.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        match self {
            Self::Object(o) => Self::Object(RawObject::new(o.read().deep_clone())),
            Self::Array(items) => Self::Array(items.iter().map(Self::deep_clone).collect()),
            other => other.clone(),
        }
    }

    /// Reduces nested mappings that carry [`ODATA_ID`] to that key alone and
    /// recurses into everything else. The result owns fresh storage.
    #[must_use]
    pub fn to_reference_form(&self) -> Self {
        match self {
            Self::Object(o) => {
                let map = o.read();
                match map.get(ODATA_ID) {
                    Some(id) if !id.is_null() => {
                        let mut reduced = RawMap::new();
                        reduced.insert(ODATA_ID, id.clone());
                        Self::Object(RawObject::new(reduced))
                    }
                    _ => Self::Object(RawObject::new(
                        map.iter()
                            .map(|(k, v)| (k.clone(), v.to_reference_form()))
                            .collect(),
                    )),
                }
            }
            Self::Array(items) => Self::Array(items.iter().map(Self::to_reference_form).collect()),
            other => other.clone(),
        }
    }

    /// Converts into a `serde_json` value, copying nested storage.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Object(o) => serde_json::Value::Object(o.read().to_json()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => Self::Object(RawObject::new(RawMap::from(map))),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for RawValue {
    /// Non-finite numbers have no JSON form and become [`RawValue::Null`].
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<RawMap> for RawValue {
    fn from(value: RawMap) -> Self {
        Self::Object(RawObject::new(value))
    }
}

impl From<Vec<Self>> for RawValue {
    fn from(value: Vec<Self>) -> Self {
        Self::Array(value)
    }
}

impl Serialize for RawValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Object(o) => o.read().serialize(serializer),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

/// Ordered property mapping.
///
/// Keys keep their insertion order; inserting an existing key replaces the
/// value in place. Payload objects are small, so lookups scan linearly.
#[derive(Clone, Default)]
pub struct RawMap {
    entries: Vec<(String, RawValue)>,
}

impl RawMap {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the mapping holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Looks up a property for modification.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut RawValue> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the property exists, even when it holds null.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts or replaces a property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Removes a property, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates property names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Copies the mapping, giving every nested mapping its own storage node.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.deep_clone())).collect()
    }

    /// Recursively merges `source` into this mapping.
    ///
    /// When both sides hold a mapping under the same key, the merge descends
    /// into it and keeps the target's storage node. Otherwise the source value
    /// replaces a differing target value or is added when missing. Returns
    /// `true` if anything changed.
    pub fn deep_merge(&mut self, source: &Self) -> bool {
        let mut modified = false;
        for (key, incoming) in source.iter() {
            match self.get_mut(key) {
                Some(RawValue::Object(existing)) if matches!(incoming, RawValue::Object(_)) => {
                    if let RawValue::Object(incoming) = incoming {
                        if !existing.ptr_eq(incoming) {
                            let incoming = incoming.read().clone();
                            modified |= existing.write().deep_merge(&incoming);
                        }
                    }
                }
                Some(existing) => {
                    if existing != incoming {
                        *existing = incoming.deep_clone();
                        modified = true;
                    }
                }
                None => {
                    self.entries.push((key.clone(), incoming.deep_clone()));
                    modified = true;
                }
            }
        }
        modified
    }

    /// Converts into a `serde_json` object, copying nested storage.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
    }
}

impl PartialEq for RawMap {
    /// Order-insensitive structural equality.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl fmt::Debug for RawMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawMap {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for RawMap {
    type Item = (String, RawValue);
    type IntoIter = std::vec::IntoIter<(String, RawValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawMap {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, RawValue::from(v))).collect()
    }
}

impl Serialize for RawMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Map::deserialize(deserializer).map(Self::from)
    }
}

/// Shared, lockable storage node for a nested mapping.
///
/// Cloning a `RawObject` shares the node. Use [`RawValue::deep_clone`] or
/// [`RawMap::deep_clone`] for an independent copy.
#[derive(Clone, Default)]
pub struct RawObject(Arc<RwLock<RawMap>>);

impl RawObject {
    /// Wraps a mapping in a new storage node.
    #[must_use]
    pub fn new(map: RawMap) -> Self {
        Self(Arc::new(RwLock::new(map)))
    }

    /// Locks the node for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, RawMap> {
        self.0.read()
    }

    /// Locks the node for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, RawMap> {
        self.0.write()
    }

    /// Returns `true` if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for RawObject {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let left = self.read().clone();
        let right = other.read();
        left == *right
    }
}

impl fmt::Debug for RawObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}

impl Serialize for RawObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.read().serialize(serializer)
    }
}

// Verify RawObject is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RawObject>();
};

//! Conversions between raw payload values and typed properties.
//!
//! [`PropertyValue`] is implemented by every type a generated accessor can
//! return. [`Value`] is the dynamically typed counterpart used by untyped
//! access, filter literals and operation parameters.

use std::any::type_name;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::descriptor::{PropertyType, ResourceDescriptor, OPEN_OBJECT};
use super::errors::ConversionError;
use super::identifier::EntityIdentifier;
use super::raw::{RawMap, RawValue, ODATA_ID};
use super::resource::Resource;
use super::time_span::TimeSpan;
use super::typed::EnumValue;

/// A type that can be read from and written to a raw property slot.
pub trait PropertyValue: Sized {
    /// Converts a non-null raw value.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when the raw value cannot represent `Self`.
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError>;

    /// Converts into the stored raw form.
    fn to_raw(&self) -> RawValue;

    /// Value produced for a missing or null slot. Value types return their
    /// zero value; reference types fail and should be read as `Option`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::NullValue`] for non-nullable reference types.
    fn null_value() -> Result<Self, ConversionError> {
        Err(ConversionError::NullValue {
            expected: type_name::<Self>(),
        })
    }

    /// The underlying resource, for resource-typed values.
    fn as_resource(&self) -> Option<&Resource> {
        None
    }
}

fn unexpected<T>(raw: &RawValue) -> ConversionError {
    ConversionError::UnexpectedType {
        expected: type_name::<T>(),
        found: raw.kind_name(),
    }
}

impl PropertyValue for bool {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::Bool(b) => Ok(*b),
            RawValue::String(s) => s
                .to_ascii_lowercase()
                .parse()
                .map_err(|e| ConversionError::invalid("bool", s.as_str(), e)),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::Bool(*self)
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(false)
    }
}

impl PropertyValue for i64 {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                        .map(|f| f as Self)
                })
                .ok_or_else(|| ConversionError::invalid("i64", n.to_string(), "not an integer")),
            RawValue::String(s) => s
                .parse()
                .map_err(|e| ConversionError::invalid("i64", s.as_str(), e)),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::from(*self)
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(0)
    }
}

impl PropertyValue for i32 {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        let wide = i64::from_raw(raw)?;
        Self::try_from(wide).map_err(|e| ConversionError::invalid("i32", wide.to_string(), e))
    }

    fn to_raw(&self) -> RawValue {
        RawValue::from(i64::from(*self))
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(0)
    }
}

impl PropertyValue for f64 {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::Number(n) => n
                .as_f64()
                .ok_or_else(|| ConversionError::invalid("f64", n.to_string(), "not representable")),
            RawValue::String(s) => s
                .parse()
                .map_err(|e| ConversionError::invalid("f64", s.as_str(), e)),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::from(*self)
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(0.0)
    }
}

impl PropertyValue for String {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::String(s) => Ok(s.clone()),
            RawValue::Number(n) => Ok(n.to_string()),
            RawValue::Bool(b) => Ok(b.to_string()),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::String(self.clone())
    }
}

impl PropertyValue for Uuid {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::String(s) => {
                Self::parse_str(s).map_err(|e| ConversionError::invalid("Guid", s.as_str(), e))
            }
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::String(self.hyphenated().to_string())
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(Self::nil())
    }
}

/// Parses ISO 8601 text, treating values without an offset as UTC.
fn parse_date_time(text: &str) -> Result<DateTime<FixedOffset>, ConversionError> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Ok(value);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| ConversionError::invalid("DateTime", text, e))
}

impl PropertyValue for DateTime<FixedOffset> {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::String(s) => parse_date_time(s),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(DateTime::<Utc>::default().fixed_offset())
    }
}

impl PropertyValue for DateTime<Utc> {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        DateTime::<FixedOffset>::from_raw(raw).map(|d| d.with_timezone(&Utc))
    }

    fn to_raw(&self) -> RawValue {
        RawValue::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(Self::default())
    }
}

impl PropertyValue for TimeSpan {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::String(s) => Self::parse(s),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::String(self.to_string())
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(Self::ZERO)
    }
}

/// Binary content, stored base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Binary(pub Vec<u8>);

impl PropertyValue for Binary {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::String(s) => STANDARD
                .decode(s)
                .map(Self)
                .map_err(|e| ConversionError::invalid("Binary", s.as_str(), e)),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::String(STANDARD.encode(&self.0))
    }
}

impl PropertyValue for EntityIdentifier {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::String(s) => Ok(Self::parse(s)?),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::String(self.to_string())
    }
}

impl PropertyValue for RawValue {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        Ok(raw.clone())
    }

    fn to_raw(&self) -> RawValue {
        self.clone()
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(Self::Null)
    }
}

impl PropertyValue for Resource {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        resource_from_raw(&OPEN_OBJECT, raw)
    }

    fn to_raw(&self) -> RawValue {
        Self::to_raw(self)
    }

    fn as_resource(&self) -> Option<&Resource> {
        Some(self)
    }
}

impl<T: PropertyValue> PropertyValue for Option<T> {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        if raw.is_null() {
            return Ok(None);
        }
        T::from_raw(raw).map(Some)
    }

    fn to_raw(&self) -> RawValue {
        self.as_ref().map_or(RawValue::Null, PropertyValue::to_raw)
    }

    fn null_value() -> Result<Self, ConversionError> {
        Ok(None)
    }

    fn as_resource(&self) -> Option<&Resource> {
        self.as_ref().and_then(PropertyValue::as_resource)
    }
}

impl<T: PropertyValue> PropertyValue for Vec<T> {
    fn from_raw(raw: &RawValue) -> Result<Self, ConversionError> {
        match raw {
            RawValue::Array(items) => items
                .iter()
                .map(|item| if item.is_null() { T::null_value() } else { T::from_raw(item) })
                .collect(),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn to_raw(&self) -> RawValue {
        RawValue::Array(self.iter().map(PropertyValue::to_raw).collect())
    }
}

/// Wraps a raw value as a resource of the given type.
///
/// Mappings share their storage node with the raw value. For entity types a
/// string is accepted as an identifier reference and becomes a resource
/// holding only `@odata.id`.
///
/// # Errors
///
/// Returns [`ConversionError`] for other shapes or a malformed identifier.
pub fn resource_from_raw(
    descriptor: &'static ResourceDescriptor,
    raw: &RawValue,
) -> Result<Resource, ConversionError> {
    match raw {
        RawValue::Object(node) => Ok(Resource::from_node(descriptor, node.clone())),
        RawValue::String(s) if descriptor.is_entity() => {
            let identifier = EntityIdentifier::parse(s)?;
            let mut map = RawMap::new();
            map.insert(ODATA_ID, identifier.to_string());
            Ok(Resource::create(descriptor, map))
        }
        other => Err(ConversionError::UnexpectedType {
            expected: descriptor.type_name,
            found: other.kind_name(),
        }),
    }
}

/// Reads an enumeration member by name.
///
/// # Errors
///
/// Returns [`ConversionError`] for non-strings and unknown members.
pub fn enum_from_raw<E: EnumValue>(raw: &RawValue) -> Result<E, ConversionError> {
    match raw {
        RawValue::String(s) => E::from_name(s).ok_or_else(|| {
            ConversionError::invalid(E::DESCRIPTOR.name, s.as_str(), "unknown member")
        }),
        other => Err(unexpected::<E>(other)),
    }
}

/// Zero value of an enumeration: its first member.
///
/// # Errors
///
/// Returns [`ConversionError::NullValue`] for enumerations without members.
pub fn enum_default<E: EnumValue>() -> Result<E, ConversionError> {
    E::MEMBERS.first().copied().ok_or(ConversionError::NullValue {
        expected: E::DESCRIPTOR.name,
    })
}

/// A dynamically typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent or null.
    Null,
    /// Boolean.
    Boolean(bool),
    /// Integer.
    Integer(i64),
    /// Floating point or decimal number.
    Number(f64),
    /// Text.
    String(String),
    /// Guid.
    Guid(Uuid),
    /// Date-time with offset.
    DateTime(DateTime<FixedOffset>),
    /// Duration.
    TimeSpan(TimeSpan),
    /// Bytes.
    Binary(Vec<u8>),
    /// Enumeration member name.
    Enum(String),
    /// Entity identifier.
    Identifier(EntityIdentifier),
    /// Nested entity or complex resource.
    Resource(Resource),
    /// List of values.
    Collection(Vec<Value>),
    /// Untyped raw value.
    Raw(RawValue),
}

impl Value {
    /// Converts a raw value according to a declared property type.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when the raw shape does not fit `ty`.
    pub fn from_raw(raw: &RawValue, ty: PropertyType) -> Result<Self, ConversionError> {
        if raw.is_null() {
            return Ok(Self::zero(ty));
        }
        Ok(match ty {
            PropertyType::Boolean => Self::Boolean(bool::from_raw(raw)?),
            PropertyType::Int32 | PropertyType::Int64 => Self::Integer(i64::from_raw(raw)?),
            PropertyType::Double | PropertyType::Decimal => Self::Number(f64::from_raw(raw)?),
            PropertyType::String => Self::String(String::from_raw(raw)?),
            PropertyType::Guid => Self::Guid(Uuid::from_raw(raw)?),
            PropertyType::DateTime => {
                Self::DateTime(DateTime::<Utc>::from_raw(raw)?.fixed_offset())
            }
            PropertyType::DateTimeOffset => Self::DateTime(DateTime::<FixedOffset>::from_raw(raw)?),
            PropertyType::TimeSpan => Self::TimeSpan(TimeSpan::from_raw(raw)?),
            PropertyType::Binary => Self::Binary(Binary::from_raw(raw)?.0),
            PropertyType::Enum(descriptor) => {
                let name = String::from_raw(raw)?;
                if !descriptor.contains(&name) {
                    return Err(ConversionError::invalid(descriptor.name, name, "unknown member"));
                }
                Self::Enum(name)
            }
            PropertyType::Entity(descriptor) | PropertyType::Complex(descriptor) => {
                Self::Resource(resource_from_raw(descriptor, raw)?)
            }
            PropertyType::Collection(inner) => match raw {
                RawValue::Array(items) => Self::Collection(
                    items
                        .iter()
                        .map(|item| Self::from_raw(item, *inner))
                        .collect::<Result<_, _>>()?,
                ),
                other => return Err(unexpected::<Vec<Self>>(other)),
            },
            PropertyType::Object => Self::Raw(raw.clone()),
        })
    }

    /// Zero value for a declared type: value types get their default,
    /// everything else is [`Value::Null`].
    #[must_use]
    pub fn zero(ty: PropertyType) -> Self {
        match ty {
            PropertyType::Boolean => Self::Boolean(false),
            PropertyType::Int32 | PropertyType::Int64 => Self::Integer(0),
            PropertyType::Double | PropertyType::Decimal => Self::Number(0.0),
            PropertyType::Guid => Self::Guid(Uuid::nil()),
            PropertyType::DateTime | PropertyType::DateTimeOffset => {
                Self::DateTime(DateTime::<Utc>::default().fixed_offset())
            }
            PropertyType::TimeSpan => Self::TimeSpan(TimeSpan::ZERO),
            PropertyType::Enum(descriptor) => descriptor
                .members
                .first()
                .map_or(Self::Null, |m| Self::Enum((*m).to_string())),
            _ => Self::Null,
        }
    }

    /// Converts into the stored raw form.
    #[must_use]
    pub fn to_raw(&self) -> RawValue {
        match self {
            Self::Null => RawValue::Null,
            Self::Boolean(b) => RawValue::Bool(*b),
            Self::Integer(i) => RawValue::from(*i),
            Self::Number(n) => RawValue::from(*n),
            Self::String(s) | Self::Enum(s) => RawValue::String(s.clone()),
            Self::Guid(g) => g.to_raw(),
            Self::DateTime(d) => d.to_raw(),
            Self::TimeSpan(t) => t.to_raw(),
            Self::Binary(b) => RawValue::String(STANDARD.encode(b)),
            Self::Identifier(id) => id.to_raw(),
            Self::Resource(r) => r.to_raw(),
            Self::Collection(items) => RawValue::Array(items.iter().map(Self::to_raw).collect()),
            Self::Raw(raw) => raw.clone(),
        }
    }

    /// Returns `true` for [`Value::Null`] and raw null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Raw(RawValue::Null))
    }

    /// The resource, for [`Value::Resource`].
    #[must_use]
    pub const fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(r) => Some(r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<TimeSpan> for Value {
    fn from(value: TimeSpan) -> Self {
        Self::TimeSpan(value)
    }
}

impl From<Binary> for Value {
    fn from(value: Binary) -> Self {
        Self::Binary(value.0)
    }
}

impl From<EntityIdentifier> for Value {
    fn from(value: EntityIdentifier) -> Self {
        Self::Identifier(value)
    }
}

impl From<Resource> for Value {
    fn from(value: Resource) -> Self {
        Self::Resource(value)
    }
}

impl From<RawValue> for Value {
    fn from(value: RawValue) -> Self {
        Self::Raw(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::Collection(value.into_iter().map(Into::into).collect())
    }
}

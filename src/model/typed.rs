//! Traits implemented by generated resource and enumeration types.
//!
//! Generated code declares each type with [`domain_resource!`] or
//! [`domain_enum!`](crate::domain_enum) and then adds typed accessors that
//! forward to [`Resource::get`] and [`Resource::set`].
//!
//! # Example
//!
//! ```rust
//! use domain_api::domain_resource;
//! use domain_api::model::{
//!     ApiResource, ConversionError, EntityResource, PropertyDescriptor, PropertyType,
//!     ResourceDescriptor,
//! };
//!
//! pub static TASK: ResourceDescriptor = ResourceDescriptor::entity(
//!     "Projects.Task",
//!     "Projects_Tasks",
//!     &[PropertyDescriptor::new("Title", PropertyType::String)],
//! );
//!
//! domain_resource! {
//!     /// A project task.
//!     pub entity Task => TASK;
//! }
//!
//! impl Task {
//!     pub fn title(&self) -> Result<Option<String>, ConversionError> {
//!         self.resource().get("Title")
//!     }
//!
//!     pub fn set_title(&self, value: Option<String>) -> Result<(), ConversionError> {
//!         self.resource().set("Title", value)
//!     }
//! }
//!
//! let task = Task::new();
//! task.set_title(Some("Write docs".to_string())).unwrap();
//! assert_eq!(task.title().unwrap().as_deref(), Some("Write docs"));
//! assert_eq!(Task::entity_set_name().unwrap(), "Projects_Tasks");
//! ```

use serde::Serialize;
use uuid::Uuid;

use super::descriptor::{EnumDescriptor, ResourceDescriptor};
use super::errors::{ConversionError, MissingMetadataError};
use super::identifier::EntityIdentifier;
use super::raw::RawMap;
use super::resource::Resource;

/// A typed view over a [`Resource`].
pub trait ApiResource: Clone + Send + Sync + 'static {
    /// Metadata of the type.
    fn descriptor() -> &'static ResourceDescriptor;

    /// Wraps an untyped handle.
    fn from_resource(resource: Resource) -> Self;

    /// The untyped handle.
    fn resource(&self) -> &Resource;

    /// A new, empty instance stamped with its type discriminator.
    #[must_use]
    fn new() -> Self {
        Self::from_resource(Resource::new(Self::descriptor()))
    }

    /// Wraps an existing payload.
    #[must_use]
    fn create(raw: RawMap) -> Self {
        Self::from_resource(Resource::create(Self::descriptor(), raw))
    }

    /// Builds an instance from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the value is not a mapping.
    fn convert<S: Serialize>(value: &S) -> Result<Self, ConversionError> {
        Resource::convert(Self::descriptor(), value).map(Self::from_resource)
    }
}

/// An identity-bearing resource.
pub trait EntityResource: ApiResource {
    /// The entity set of the type.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError`] if the descriptor declares none.
    fn entity_set_name() -> Result<&'static str, MissingMetadataError> {
        Self::descriptor().entity_set()
    }

    /// A reference instance holding only the identity.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError`] if the descriptor declares no entity set.
    fn id_obj(id: Uuid) -> Result<Self, MissingMetadataError> {
        Resource::id_resource(Self::descriptor(), id).map(Self::from_resource)
    }

    /// The Guid identity.
    fn id(&self) -> Option<Uuid> {
        self.resource().id()
    }

    /// The `<set>(<guid>)` identity.
    fn identifier(&self) -> Option<EntityIdentifier> {
        self.resource().identifier()
    }

    /// Returns `true` if the payload holds more than identity keys.
    fn is_expanded(&self) -> bool {
        self.resource().is_expanded()
    }
}

/// An embedded resource without identity.
pub trait ComplexResource: ApiResource {
    /// The owning resource and property, while the owner is alive.
    fn owner(&self) -> Option<(Resource, String)> {
        self.resource().owner()
    }
}

/// A generated enumeration stored by member name.
pub trait EnumValue: Sized + Copy + 'static {
    /// Metadata of the enumeration.
    const DESCRIPTOR: &'static EnumDescriptor;

    /// All members, in declaration order.
    const MEMBERS: &'static [Self];

    /// Wire name of the member.
    fn name(self) -> &'static str;

    /// Looks a member up by wire name.
    #[must_use]
    fn from_name(name: &str) -> Option<Self> {
        Self::MEMBERS.iter().copied().find(|m| m.name() == name)
    }
}

/// Declares a typed resource wrapper.
///
/// `entity` types implement [`EntityResource`]; `complex` types implement
/// [`ComplexResource`]. Both implement [`ApiResource`],
/// [`PropertyValue`](crate::model::PropertyValue), `PartialEq` and
/// conversion into [`Value`](crate::model::Value).
#[macro_export]
macro_rules! domain_resource {
    (@common $(#[$meta:meta])* $vis:vis $name:ident => $descriptor:path) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        $vis struct $name($crate::model::Resource);

        impl $crate::model::ApiResource for $name {
            fn descriptor() -> &'static $crate::model::ResourceDescriptor {
                &$descriptor
            }

            fn from_resource(resource: $crate::model::Resource) -> Self {
                Self(resource)
            }

            fn resource(&self) -> &$crate::model::Resource {
                &self.0
            }
        }

        impl $crate::model::PropertyValue for $name {
            fn from_raw(
                raw: &$crate::model::RawValue,
            ) -> ::std::result::Result<Self, $crate::model::ConversionError> {
                $crate::model::resource_from_raw(&$descriptor, raw).map(Self)
            }

            fn to_raw(&self) -> $crate::model::RawValue {
                self.0.to_raw()
            }

            fn as_resource(&self) -> ::std::option::Option<&$crate::model::Resource> {
                Some(&self.0)
            }
        }

        impl ::std::convert::From<$name> for $crate::model::Value {
            fn from(value: $name) -> Self {
                Self::Resource(value.0)
            }
        }
    };
    ($(#[$meta:meta])* $vis:vis entity $name:ident => $descriptor:path;) => {
        $crate::domain_resource!(@common $(#[$meta])* $vis $name => $descriptor);
        impl $crate::model::EntityResource for $name {}
    };
    ($(#[$meta:meta])* $vis:vis complex $name:ident => $descriptor:path;) => {
        $crate::domain_resource!(@common $(#[$meta])* $vis $name => $descriptor);
        impl $crate::model::ComplexResource for $name {}
    };
}

/// Declares a generated enumeration stored by member name.
///
/// ```rust
/// use domain_api::domain_enum;
/// use domain_api::model::EnumValue;
///
/// domain_enum! {
///     /// Lifecycle of a document.
///     pub enum DocumentState = "General.DocumentState" { New, Released, Completed }
/// }
///
/// assert_eq!(DocumentState::from_name("Released"), Some(DocumentState::Released));
/// assert_eq!(DocumentState::Completed.name(), "Completed");
/// ```
#[macro_export]
macro_rules! domain_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident = $type_name:literal { $($member:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                #[allow(missing_docs)]
                $member,
            )+
        }

        impl $crate::model::EnumValue for $name {
            const DESCRIPTOR: &'static $crate::model::EnumDescriptor = &$crate::model::EnumDescriptor {
                name: $type_name,
                members: &[$(stringify!($member)),+],
            };

            const MEMBERS: &'static [Self] = &[$(Self::$member),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$member => stringify!($member),)+
                }
            }
        }

        impl $crate::model::PropertyValue for $name {
            fn from_raw(
                raw: &$crate::model::RawValue,
            ) -> ::std::result::Result<Self, $crate::model::ConversionError> {
                $crate::model::enum_from_raw(raw)
            }

            fn to_raw(&self) -> $crate::model::RawValue {
                $crate::model::RawValue::String(
                    $crate::model::EnumValue::name(*self).to_string(),
                )
            }

            fn null_value() -> ::std::result::Result<Self, $crate::model::ConversionError> {
                $crate::model::enum_default()
            }
        }

        impl ::std::convert::From<$name> for $crate::model::Value {
            fn from(value: $name) -> Self {
                Self::Enum($crate::model::EnumValue::name(value).to_string())
            }
        }
    };
}

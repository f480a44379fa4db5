//! Entity identifiers of the form `<entity-set>(<guid>)`.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::errors::IdentifierFormatError;

/// Addresses one entity on the remote service.
///
/// The canonical text form is `<entity-set>(<guid>)` with the Guid rendered
/// lowercase and hyphenated. Parsing is strict: exactly one `(`, a trailing
/// `)`, a non-empty set name and a valid Guid.
///
/// # Example
///
/// ```rust
/// use domain_api::model::EntityIdentifier;
///
/// let id: EntityIdentifier = "Crm_Customers(0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a)".parse().unwrap();
/// assert_eq!(id.entity_set(), "Crm_Customers");
/// assert_eq!(id.to_string(), "Crm_Customers(0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a)");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityIdentifier {
    entity_set: String,
    id: Uuid,
}

impl EntityIdentifier {
    /// Creates an identifier from its parts.
    #[must_use]
    pub fn new(entity_set: impl Into<String>, id: Uuid) -> Self {
        Self {
            entity_set: entity_set.into(),
            id,
        }
    }

    /// Parses the canonical text form.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierFormatError`] describing which part is malformed.
    pub fn parse(value: &str) -> Result<Self, IdentifierFormatError> {
        let malformed = || IdentifierFormatError::MissingParenthesis {
            value: value.to_string(),
        };

        let open = value.find('(').ok_or_else(malformed)?;
        if value.rfind('(') != Some(open) || value.find(')') != Some(value.len() - 1) {
            return Err(malformed());
        }

        let entity_set = &value[..open];
        if entity_set.is_empty() {
            return Err(IdentifierFormatError::EmptyEntitySet {
                value: value.to_string(),
            });
        }

        let key = &value[open + 1..value.len() - 1];
        let id = Uuid::parse_str(key).map_err(|_| IdentifierFormatError::InvalidGuid {
            value: value.to_string(),
        })?;

        Ok(Self::new(entity_set, id))
    }

    /// The entity set name.
    #[must_use]
    pub fn entity_set(&self) -> &str {
        &self.entity_set
    }

    /// The Guid key.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns `true` when either part is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_set.is_empty() || self.id.is_nil()
    }
}

impl fmt::Display for EntityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.entity_set, self.id.hyphenated())
    }
}

impl FromStr for EntityIdentifier {
    type Err = IdentifierFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EntityIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

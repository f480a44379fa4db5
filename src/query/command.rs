//! Untyped command descriptors handed to a [`CommandExecutor`](super::CommandExecutor).
//!
//! A [`QueryCommand`] names a resource set, an optional key and bound
//! operation, the command kind and the URL options. It performs no I/O;
//! an executor maps [`QueryCommand::kind`] to an HTTP method and sends
//! [`QueryCommand::uri_string`] with the optional payload.
//!
//! # Example
//!
//! ```rust
//! use domain_api::query::{CommandKind, HttpMethod, QueryCommand};
//!
//! let mut command = QueryCommand::new("Crm_Customers");
//! command.set_filter_clause(Some("Name eq 'Contoso'"));
//! command.set_top(Some(10));
//!
//! assert_eq!(command.kind(), CommandKind::Query);
//! assert_eq!(command.kind().http_method(), HttpMethod::Get);
//! assert_eq!(command.uri_string(), "Crm_Customers?$filter=Name eq 'Contoso'&$top=10");
//! assert_eq!(
//!     command.encoded_uri_string(),
//!     "Crm_Customers?$filter=Name%20eq%20%27Contoso%27&$top=10"
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use super::errors::CommandMismatchError;
use crate::model::{EntityIdentifier, MissingMetadataError, RawMap, Resource, Value, ODATA_TYPE};

/// The `$filter` option.
pub const FILTER: &str = "$filter";
/// The `$select` option.
pub const SELECT: &str = "$select";
/// The `$expand` option.
pub const EXPAND: &str = "$expand";
/// The `$top` option.
pub const TOP: &str = "$top";
/// The `$skip` option.
pub const SKIP: &str = "$skip";

/// HTTP methods an executor uses for command kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// Reads: queries, single entities, functions and counts.
    Get,
    /// Inserts and actions.
    Post,
    /// Partial updates.
    Patch,
    /// Deletes.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// What a command asks the service to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CommandKind {
    /// Returns many entities.
    #[default]
    Query,
    /// Returns the entity addressed by the key.
    SingleEntity,
    /// Patches the entity addressed by the key; returns nothing.
    Update,
    /// Creates an entity and returns it.
    Insert,
    /// Deletes the entity addressed by the key.
    Delete,
    /// Invokes a bound action.
    Action,
    /// Invokes a bound function.
    Function,
    /// Returns only the number of matching entities.
    Count,
}

impl CommandKind {
    /// The HTTP method for this kind.
    #[must_use]
    pub const fn http_method(self) -> HttpMethod {
        match self {
            Self::Query | Self::SingleEntity | Self::Function | Self::Count => HttpMethod::Get,
            Self::Insert | Self::Action => HttpMethod::Post,
            Self::Update => HttpMethod::Patch,
            Self::Delete => HttpMethod::Delete,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A named argument of a bound action or function.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    name: String,
    value: Value,
}

impl Param {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// A command against one resource set.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct QueryCommand {
    resource_name: String,
    key: Option<Uuid>,
    operation: Option<String>,
    kind: CommandKind,
    options: BTreeMap<String, String>,
    payload: Option<String>,
}

impl QueryCommand {
    /// Creates a query over `resource_name`.
    #[must_use]
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            ..Self::default()
        }
    }

    /// An insert of the modified properties of `resource`, or `None` when
    /// nothing is modified.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError`] if the resource type has no entity set.
    pub fn insert(resource: &Resource) -> Result<Option<Self>, MissingMetadataError> {
        let entity_set = resource.descriptor().entity_set()?;
        Ok(resource.raw_changes().map(|changes| {
            let mut command = Self::new(entity_set);
            command.kind = CommandKind::Insert;
            command.payload = Some(payload(changes));
            command
        }))
    }

    /// A partial update of `resource`, or `None` when nothing is modified.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError::NoIdentity`] if the entity has no
    /// identifier yet.
    pub fn update(resource: &Resource) -> Result<Option<Self>, MissingMetadataError> {
        let identifier = resource
            .identifier()
            .ok_or(MissingMetadataError::NoIdentity {
                type_name: resource.descriptor().type_name,
            })?;
        Ok(resource.raw_changes().map(|changes| {
            let mut command = Self::addressing(&identifier, CommandKind::Update);
            command.payload = Some(payload(changes));
            command
        }))
    }

    /// A delete of the addressed entity.
    #[must_use]
    pub fn delete(identifier: &EntityIdentifier) -> Self {
        Self::addressing(identifier, CommandKind::Delete)
    }

    /// An invocation of a bound action.
    #[must_use]
    pub fn action(identifier: &EntityIdentifier, name: &str, params: &[Param]) -> Self {
        Self::operation_command(identifier, name, CommandKind::Action, params)
    }

    /// An invocation of a bound function.
    #[must_use]
    pub fn function(identifier: &EntityIdentifier, name: &str, params: &[Param]) -> Self {
        Self::operation_command(identifier, name, CommandKind::Function, params)
    }

    fn addressing(identifier: &EntityIdentifier, kind: CommandKind) -> Self {
        let mut command = Self::new(identifier.entity_set());
        command.key = Some(identifier.id());
        command.kind = kind;
        command
    }

    fn operation_command(
        identifier: &EntityIdentifier,
        name: &str,
        kind: CommandKind,
        params: &[Param],
    ) -> Self {
        let mut command = Self::addressing(identifier, kind);
        command.operation = Some(name.to_string());
        let mut arguments: RawMap = params
            .iter()
            .map(|p| (p.name.clone(), p.value.to_raw().to_reference_form()))
            .collect();
        arguments.remove(ODATA_TYPE);
        command.payload = Some(payload(arguments));
        command
    }

    /// The resource set name.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// The entity key.
    #[must_use]
    pub const fn key(&self) -> Option<Uuid> {
        self.key
    }

    /// Sets or clears the entity key.
    pub fn set_key(&mut self, key: Option<Uuid>) {
        self.key = key;
    }

    /// The bound operation name.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Sets or clears the bound operation name.
    pub fn set_operation(&mut self, operation: Option<impl Into<String>>) {
        self.operation = operation.map(Into::into);
    }

    /// The command kind.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Sets the command kind.
    pub fn set_kind(&mut self, kind: CommandKind) {
        self.kind = kind;
    }

    /// The request payload.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Sets or clears the request payload.
    pub fn set_payload(&mut self, payload: Option<impl Into<String>>) {
        self.payload = payload.map(Into::into);
    }

    /// All URL options, ordered by name.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// A URL option.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Sets a URL option, or removes it with `None`.
    pub fn set_option(&mut self, name: &str, value: Option<impl Into<String>>) {
        match value {
            Some(value) => {
                self.options.insert(name.to_string(), value.into());
            }
            None => {
                self.options.remove(name);
            }
        }
    }

    /// The `$filter` clause.
    #[must_use]
    pub fn filter_clause(&self) -> Option<&str> {
        self.option(FILTER)
    }

    /// Sets or clears the `$filter` clause.
    pub fn set_filter_clause(&mut self, value: Option<impl Into<String>>) {
        self.set_option(FILTER, value);
    }

    /// The `$select` clause.
    #[must_use]
    pub fn select_clause(&self) -> Option<&str> {
        self.option(SELECT)
    }

    /// Sets or clears the `$select` clause.
    pub fn set_select_clause(&mut self, value: Option<impl Into<String>>) {
        self.set_option(SELECT, value);
    }

    /// The `$expand` clause.
    #[must_use]
    pub fn expand_clause(&self) -> Option<&str> {
        self.option(EXPAND)
    }

    /// Sets or clears the `$expand` clause.
    pub fn set_expand_clause(&mut self, value: Option<impl Into<String>>) {
        self.set_option(EXPAND, value);
    }

    /// The `$top` clause. Unparsable values read as `None`.
    #[must_use]
    pub fn top(&self) -> Option<u32> {
        self.option(TOP).and_then(|v| v.parse().ok())
    }

    /// Sets or clears the `$top` clause.
    pub fn set_top(&mut self, value: Option<u32>) {
        self.set_option(TOP, value.map(|v| v.to_string()));
    }

    /// The `$skip` clause. Unparsable values read as `None`.
    #[must_use]
    pub fn skip(&self) -> Option<u32> {
        self.option(SKIP).and_then(|v| v.parse().ok())
    }

    /// Sets or clears the `$skip` clause.
    pub fn set_skip(&mut self, value: Option<u32>) {
        self.set_option(SKIP, value.map(|v| v.to_string()));
    }

    /// Copies options, kind, key and payload from `other`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandMismatchError`] if `other` targets a different
    /// resource set; `self` is left unchanged.
    pub fn copy_from(&mut self, other: &Self) -> Result<(), CommandMismatchError> {
        if self.resource_name != other.resource_name {
            return Err(CommandMismatchError {
                expected: self.resource_name.clone(),
                found: other.resource_name.clone(),
            });
        }
        self.options.clone_from(&other.options);
        self.kind = other.kind;
        self.key = other.key;
        self.payload.clone_from(&other.payload);
        Ok(())
    }

    /// The relative URI with unencoded option values.
    #[must_use]
    pub fn uri_string(&self) -> String {
        self.build_uri(|value| value.to_string())
    }

    /// The relative URI with URL-encoded option values.
    #[must_use]
    pub fn encoded_uri_string(&self) -> String {
        self.build_uri(|value| urlencoding::encode(value).into_owned())
    }

    fn build_uri(&self, encode: impl Fn(&str) -> String) -> String {
        let mut uri = self.resource_name.clone();
        if let Some(key) = self.key {
            uri.push_str(&format!("({key})"));
        }
        if let Some(operation) = &self.operation {
            uri.push('/');
            uri.push_str(operation);
        }
        if self.kind == CommandKind::Count {
            uri.push_str("/$count");
        }
        if !self.options.is_empty() {
            let query = self
                .options
                .iter()
                .map(|(name, value)| format!("{name}={}", encode(value)))
                .collect::<Vec<_>>()
                .join("&");
            uri.push('?');
            uri.push_str(&query);
        }
        uri
    }
}

impl fmt::Display for QueryCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.uri_string())?;
        if let Some(payload) = &self.payload {
            write!(f, "\r\n\r\n{payload}")?;
        }
        Ok(())
    }
}

fn payload(map: RawMap) -> String {
    serde_json::Value::Object(map.to_json()).to_string()
}

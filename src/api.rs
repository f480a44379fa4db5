//! The domain API context.
//!
//! [`DomainApi`] ties a [`CommandExecutor`] to a configuration and a
//! [`ResourceRegistry`]. It creates typed commands and resources and runs
//! the write operations: insert, update, delete, reload and bound
//! action/function invocation.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_api::{DomainApi, DomainApiConfig, ServiceRootUri};
//! use domain_api::resources::{self, Customer};
//!
//! let config = DomainApiConfig::builder()
//!     .service_root(ServiceRootUri::new("https://erp.example.com/api/domain/odata/")?)
//!     .build()?;
//! let api = DomainApi::new(http_executor, config, resources::registry());
//!
//! let customer: Customer = api.new_resource();
//! customer.set_name(Some("Contoso".to_string()))?;
//! api.insert(&customer).await?;
//!
//! let active = api
//!     .command::<Customer>()?
//!     .filter(|c| c.prop("Active").eq(true))?
//!     .load(&api)
//!     .await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::DomainApiConfig;
use crate::error::DomainApiError;
use crate::model::{
    ApiResource, EntityIdentifier, EntityResource, MissingMetadataError, RawMap, RawValue, Resource,
    ResourceRegistry, ID, VALUE,
};
use crate::query::{CommandExecutor, EntityCommand, ExecutorError, Expr, Param, QueryCommand};

/// A typed data-access context over one service.
///
/// # Thread Safety
///
/// `DomainApi<E>` is `Send + Sync` when `E` is.
#[derive(Debug)]
pub struct DomainApi<E> {
    executor: E,
    config: DomainApiConfig,
    registry: Arc<ResourceRegistry>,
}

// Verify DomainApi is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DomainApi<()>>();
};

impl<E> DomainApi<E> {
    /// Creates a context.
    ///
    /// The registry's namespace should match the configured type namespace;
    /// a mismatch is logged.
    #[must_use]
    pub fn new(executor: E, config: DomainApiConfig, registry: ResourceRegistry) -> Self {
        if registry.namespace() != config.type_namespace().as_ref() {
            tracing::warn!(
                registry = registry.namespace(),
                configured = %config.type_namespace(),
                "registry type namespace differs from configuration"
            );
        }
        Self {
            executor,
            config,
            registry: Arc::new(registry),
        }
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DomainApiConfig {
        &self.config
    }

    /// Returns the resource registry.
    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Creates a query over the entity set of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError`] if `T` declares no entity set.
    pub fn command<T: EntityResource>(&self) -> Result<EntityCommand<T>, MissingMetadataError> {
        Ok(EntityCommand::new()?.with_registry(Arc::clone(&self.registry)))
    }

    /// Creates an empty resource stamped with the configured namespace.
    #[must_use]
    pub fn new_resource<T: ApiResource>(&self) -> T {
        T::from_resource(self.registry.new_resource(T::descriptor()))
    }

    /// Wraps a payload received for an entity set.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError::UnknownEntitySet`] for unregistered sets.
    pub fn create_for_entity_set(&self, entity_set: &str, raw: RawMap) -> Result<Resource, MissingMetadataError> {
        self.registry.create(entity_set, raw)
    }

    /// Creates a reference resource for an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError::UnknownEntitySet`] for unregistered sets.
    pub fn reference(&self, identifier: &EntityIdentifier) -> Result<Resource, MissingMetadataError> {
        self.registry.reference(identifier)
    }

    /// The absolute, encoded URI of a command.
    #[must_use]
    pub fn absolute_uri(&self, command: &QueryCommand) -> String {
        self.config.service_root().join(&command.encoded_uri_string())
    }
}

impl<E: CommandExecutor> DomainApi<E> {
    /// Inserts a new entity and merges the server's response into it.
    ///
    /// Nothing is sent when the entity has no modified properties.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if the type has no entity set or the
    /// executor fails.
    pub async fn insert<T: EntityResource>(&self, entity: &T) -> Result<(), DomainApiError> {
        let resource = entity.resource();
        let Some(command) = QueryCommand::insert(resource)? else {
            tracing::debug!(resource = resource.descriptor().type_name, "insert skipped, no changes");
            return Ok(());
        };
        if let Some(values) = self.execute(&command).await? {
            resource.update(&values);
        }
        resource.clear_changes();
        Ok(())
    }

    /// Sends the modified properties of an entity.
    ///
    /// Nothing is sent when the entity has no modified properties. A
    /// returned representation is merged into the entity.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if the entity has no identifier or the
    /// executor fails.
    pub async fn update<T: EntityResource>(&self, entity: &T) -> Result<(), DomainApiError> {
        let resource = entity.resource();
        let Some(command) = QueryCommand::update(resource)? else {
            tracing::debug!(resource = resource.descriptor().type_name, "update skipped, no changes");
            return Ok(());
        };
        if let Some(values) = self.execute(&command).await? {
            resource.update(&values);
        }
        resource.clear_changes();
        Ok(())
    }

    /// Deletes the entity addressed by `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if the executor fails.
    pub async fn delete(&self, identifier: &EntityIdentifier) -> Result<(), DomainApiError> {
        self.execute_text(&QueryCommand::delete(identifier)).await?;
        Ok(())
    }

    /// Reloads an entity from the service, expanding `paths`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if the entity has no identifier, a path is
    /// invalid or the executor fails.
    pub async fn reload<T: EntityResource>(
        &self,
        entity: &T,
        paths: impl IntoIterator<Item = Expr>,
    ) -> Result<(), DomainApiError> {
        let identifier = identity(entity)?;
        let command = self.command::<T>()?.id(identifier.id()).expand_all(paths)?;
        if let Some(values) = self.execute(&command).await? {
            entity.resource().update(&values);
        }
        Ok(())
    }

    /// Reloads several entities with one query filtered by their ids.
    ///
    /// Entities without an id are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if a path is invalid or the executor fails.
    pub async fn reload_many<T: EntityResource>(
        &self,
        entities: &[T],
        paths: impl IntoIterator<Item = Expr>,
    ) -> Result<(), DomainApiError> {
        let by_id: HashMap<Uuid, &T> = entities
            .iter()
            .filter_map(|e| e.id().map(|id| (id, e)))
            .collect();
        if by_id.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = entities.iter().filter_map(EntityResource::id).collect();
        let loaded = self
            .command::<T>()?
            .filter(|e| e.prop(ID).is_in(ids))?
            .expand_all(paths)?
            .load(self)
            .await?;
        for fresh in loaded.iter() {
            if let Some(old) = fresh.id().and_then(|id| by_id.get(&id)) {
                old.resource().update(&fresh.resource().values());
            }
        }
        Ok(())
    }

    /// Invokes a bound action on an entity.
    ///
    /// Returns the response's `value` for scalar and collection results, the
    /// whole response object otherwise, or `None` for empty responses.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if the entity has no identifier or the
    /// executor fails.
    pub async fn invoke_action<T: EntityResource>(
        &self,
        entity: &T,
        name: &str,
        params: &[Param],
    ) -> Result<Option<RawValue>, DomainApiError> {
        let command = QueryCommand::action(&identity(entity)?, name, params);
        Ok(self.execute(&command).await?.map(operation_result))
    }

    /// Invokes a bound function on an entity.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if the entity has no identifier or the
    /// executor fails.
    pub async fn invoke_function<T: EntityResource>(
        &self,
        entity: &T,
        name: &str,
        params: &[Param],
    ) -> Result<Option<RawValue>, DomainApiError> {
        let command = QueryCommand::function(&identity(entity)?, name, params);
        Ok(self.execute(&command).await?.map(operation_result))
    }
}

impl<E: CommandExecutor> CommandExecutor for DomainApi<E> {
    async fn execute(&self, command: &QueryCommand) -> Result<Option<RawMap>, ExecutorError> {
        tracing::debug!(
            method = %command.kind().http_method(),
            uri = %self.absolute_uri(command),
            has_payload = command.payload().is_some(),
            "executing command"
        );
        self.executor.execute(command).await
    }

    async fn execute_text(&self, command: &QueryCommand) -> Result<String, ExecutorError> {
        tracing::debug!(
            method = %command.kind().http_method(),
            uri = %self.absolute_uri(command),
            "executing text command"
        );
        self.executor.execute_text(command).await
    }
}

fn identity<T: EntityResource>(entity: &T) -> Result<EntityIdentifier, MissingMetadataError> {
    entity.identifier().ok_or(MissingMetadataError::NoIdentity {
        type_name: T::descriptor().type_name,
    })
}

/// Unwraps `{"value": ...}` responses; annotations are ignored.
fn operation_result(response: RawMap) -> RawValue {
    let wrapped = response.contains_key(VALUE)
        && response.keys().all(|k| k == VALUE || k.starts_with('@'));
    match response.get(VALUE) {
        Some(value) if wrapped => value.clone(),
        _ => RawValue::from(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceRootUri;
    use crate::model::{PropertyDescriptor, PropertyType, ResourceDescriptor};

    static NOTE: ResourceDescriptor = ResourceDescriptor::entity(
        "General.Note",
        "General_Notes",
        &[PropertyDescriptor::new("Text", PropertyType::String)],
    );

    crate::domain_resource! {
        entity Note => NOTE;
    }

    fn api() -> DomainApi<()> {
        let config = DomainApiConfig::builder()
            .service_root(ServiceRootUri::new("https://erp.example.com/odata").unwrap())
            .build()
            .unwrap();
        DomainApi::new((), config, ResourceRegistry::default().with(&NOTE))
    }

    #[test]
    fn test_absolute_uri_joins_service_root() {
        let mut command = QueryCommand::new("General_Notes");
        command.set_filter_clause(Some("Text eq 'a b'"));
        assert_eq!(
            api().absolute_uri(&command),
            "https://erp.example.com/odata/General_Notes?$filter=Text%20eq%20%27a%20b%27"
        );
    }

    #[test]
    fn test_new_resource_uses_registry_namespace() {
        let note: Note = api().new_resource();
        assert_eq!(note.resource().odata_type().as_deref(), Some("Erp.General_Note"));
    }

    #[test]
    fn test_reference_and_create_use_registry() {
        let api = api();
        let identifier = EntityIdentifier::new("General_Notes", Uuid::nil());
        let reference = api.reference(&identifier).unwrap();
        assert_eq!(reference.identifier(), Some(identifier));
        assert!(matches!(
            api.create_for_entity_set("General_Tasks", RawMap::new()),
            Err(MissingMetadataError::UnknownEntitySet { .. })
        ));
    }

    #[test]
    fn test_operation_result_unwraps_value() {
        let wrapped: RawMap = serde_json::from_str(r#"{"@odata.context":"x","value":42}"#).unwrap();
        assert_eq!(operation_result(wrapped), RawValue::from(42_i64));

        let entity: RawMap = serde_json::from_str(r#"{"Text":"a","value":1}"#).unwrap();
        assert!(matches!(operation_result(entity), RawValue::Object(_)));
    }
}

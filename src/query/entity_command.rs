//! Typed command builder over an entity resource type.
//!
//! [`EntityCommand`] wraps a [`QueryCommand`] for the entity set of `T`.
//! Filters and expand paths are written as expression closures and
//! compiled against `T`'s descriptor, so misspelled property names fail
//! while the command is built, not at the server.
//!
//! # Example
//!
//! ```rust
//! use domain_api::query::{CommandKind, EntityCommand};
//! use domain_api::resources::SalesOrder;
//!
//! let command = EntityCommand::<SalesOrder>::new()
//!     .unwrap()
//!     .filter(|o| o.prop("Customer").prop("Name").eq("Contoso"))
//!     .unwrap()
//!     .expand(|o| o.prop("Lines").expand_items(|l| l.prop("Product")))
//!     .unwrap()
//!     .top(20);
//!
//! assert_eq!(command.kind(), CommandKind::Query);
//! assert_eq!(
//!     command.uri_string(),
//!     "Crm_Sales_SalesOrders?$expand=Lines($expand=Product)&$filter=Customer/Name eq 'Contoso'&$top=20"
//! );
//! ```

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use uuid::Uuid;

use super::command::{CommandKind, QueryCommand};
use super::errors::{CompileError, QueryError};
use super::executor::{CommandExecutor, ExecutorError};
use super::expand::ExpandNode;
use super::expr::{Expr, PathToken};
use super::filter::compile_filter;
use super::projection::Projection;
use super::result::{EntityCommandResult, Selector};
use crate::error::DomainApiError;
use crate::model::{
    ConversionError, EntityResource, MissingMetadataError, RawMap, RawObject, RawValue, Resource,
    ResourceDescriptor, ResourceRegistry, ODATA_ID, VALUE,
};

/// A command over the entity set of `T`, producing `R` per loaded entity.
///
/// Builder methods consume and return the command. The wrapped
/// [`QueryCommand`] is reachable through `Deref`.
pub struct EntityCommand<T, R = T> {
    command: QueryCommand,
    selector: Selector<T, R>,
    registry: Option<Arc<ResourceRegistry>>,
    entity: PhantomData<fn() -> T>,
}

impl<T: EntityResource> EntityCommand<T> {
    /// Creates a query over the entity set of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMetadataError`] if `T` declares no entity set.
    pub fn new() -> Result<Self, MissingMetadataError> {
        Ok(Self {
            command: QueryCommand::new(T::entity_set_name()?),
            selector: Arc::new(|entity: &T| -> Result<T, ConversionError> { Ok(entity.clone()) }),
            registry: None,
            entity: PhantomData,
        })
    }
}

impl<T: EntityResource, R: 'static> EntityCommand<T, R> {
    /// Resolves loaded payloads to registered subtypes through `registry`.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ResourceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The untyped command.
    #[must_use]
    pub const fn command(&self) -> &QueryCommand {
        &self.command
    }

    /// Mutable access to the untyped command, for options the builder does
    /// not cover. A `$filter` set here is grouped before later `filter`
    /// calls append to it.
    pub fn command_mut(&mut self) -> &mut QueryCommand {
        &mut self.command
    }

    /// Consumes the builder and returns the untyped command.
    #[must_use]
    pub fn into_command(self) -> QueryCommand {
        self.command
    }

    /// Addresses a single entity by key.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.command.set_key(Some(id));
        self.command.set_kind(CommandKind::SingleEntity);
        self
    }

    /// Adds a predicate to `$filter`. Repeated calls are joined with `and`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if the predicate cannot be compiled.
    pub fn filter(mut self, predicate: impl FnOnce(Expr) -> Expr) -> Result<Self, CompileError> {
        let text = compile_filter(&predicate(Expr::param()), T::descriptor())?;
        let clause = match self.command.filter_clause().filter(|c| !c.is_empty()) {
            Some(existing) => format!("{} and {}", group_disjunction(existing), group_disjunction(&text)),
            None => group_disjunction(&text).into_owned(),
        };
        self.command.set_filter_clause(Some(clause));
        self.command.set_kind(CommandKind::Query);
        Ok(self)
    }

    /// Replaces `$select` and `$expand` with the shape of projection `P`
    /// and returns a command producing `P` per loaded entity.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the shape names properties `T` does not
    /// declare.
    pub fn select<P>(self) -> Result<EntityCommand<T, P>, QueryError>
    where
        P: Projection<T> + 'static,
    {
        let root = P::shape().to_node(T::descriptor())?;
        let mut command = QueryCommand::new(self.command.resource_name());
        command.copy_from(&self.command)?;
        if !root.select().is_empty() {
            command.set_select_clause(Some(root.select_clause()));
        }
        if !root.children().is_empty() {
            command.set_expand_clause(Some(root.expand_clause()));
        }
        tracing::trace!(
            resource = command.resource_name(),
            select = ?command.select_clause(),
            expand = ?command.expand_clause(),
            "applied projection"
        );
        Ok(EntityCommand {
            command,
            selector: Arc::new(P::project),
            registry: self.registry,
            entity: PhantomData,
        })
    }

    /// Adds one navigation path to `$expand`.
    ///
    /// The closure receives the entity and returns a property chain. Nesting
    /// below collections and references is written with
    /// [`Expr::expand_items`] and [`Expr::expand`].
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the current clauses do not parse or the
    /// path does not name navigation properties.
    pub fn expand(self, path: impl FnOnce(Expr) -> Expr) -> Result<Self, QueryError> {
        self.expand_all([path(Expr::param())])
    }

    /// Adds several navigation paths to `$expand`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the current clauses do not parse or a path
    /// does not name navigation properties.
    pub fn expand_all(mut self, paths: impl IntoIterator<Item = Expr>) -> Result<Self, QueryError> {
        let mut root = ExpandNode::parse(self.command.expand_clause(), self.command.select_clause())?;
        for path in paths {
            let mut tokens = Vec::new();
            path.path_tokens(&mut tokens).map_err(CompileError::unsupported)?;
            walk(&mut root, T::descriptor(), &tokens)?;
        }
        if !root.select().is_empty() {
            self.command.set_select_clause(Some(root.select_clause()));
        }
        if !root.children().is_empty() {
            self.command.set_expand_clause(Some(root.expand_clause()));
        }
        tracing::trace!(
            resource = self.command.resource_name(),
            expand = ?self.command.expand_clause(),
            "expanded paths"
        );
        Ok(self)
    }

    /// Limits the number of returned entities.
    #[must_use]
    pub fn top(mut self, top: u32) -> Self {
        self.command.set_top(Some(top));
        self.command.set_kind(CommandKind::Query);
        self
    }

    /// Skips the first `skip` matching entities.
    #[must_use]
    pub fn skip(mut self, skip: u32) -> Self {
        self.command.set_skip(Some(skip));
        self.command.set_kind(CommandKind::Query);
        self
    }

    /// Executes the command and wraps the returned entities.
    ///
    /// A response carrying `@odata.id` is a single entity; otherwise the
    /// entities are read from its `value` list. An empty response gives an
    /// empty result.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if execution fails or the response is not
    /// an entity or a collection of entities.
    pub async fn load<E: CommandExecutor>(
        &self,
        executor: &E,
    ) -> Result<EntityCommandResult<T, R>, DomainApiError> {
        self.load_with(&self.command, executor).await
    }

    /// Executes the command limited to one entity and returns it, if any
    /// entity matched.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if execution fails.
    pub async fn first<E: CommandExecutor>(&self, executor: &E) -> Result<Option<T>, DomainApiError> {
        let mut command = self.command.clone();
        command.set_top(Some(1));
        command.set_kind(CommandKind::Query);
        let result = self.load_with(&command, executor).await?;
        Ok(result.into_resources().into_iter().next())
    }

    /// Counts the entities matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`DomainApiError`] if execution fails or the response is not
    /// an integer.
    pub async fn count<E: CommandExecutor>(&self, executor: &E) -> Result<u64, DomainApiError> {
        let mut command = self.command.clone();
        command.set_kind(CommandKind::Count);
        let text = executor.execute_text(&command).await?;
        let count = text.trim().parse::<u64>().map_err(|e| {
            ExecutorError::with_source(format!("Invalid $count response '{}'.", text.trim()), e)
        })?;
        Ok(count)
    }

    async fn load_with<E: CommandExecutor>(
        &self,
        command: &QueryCommand,
        executor: &E,
    ) -> Result<EntityCommandResult<T, R>, DomainApiError> {
        tracing::debug!(command = %command, "loading entities");
        let Some(response) = executor.execute(command).await? else {
            return Ok(EntityCommandResult::new(Vec::new(), Arc::clone(&self.selector)));
        };
        let resources = if response.contains_key(ODATA_ID) {
            let descriptor = self.resolve(&response);
            vec![T::from_resource(Resource::create(descriptor, response))]
        } else {
            match response.get(VALUE) {
                Some(RawValue::Array(items)) => items
                    .iter()
                    .map(|item| self.wrap(item))
                    .collect::<Result<Vec<_>, _>>()?,
                other => {
                    return Err(ConversionError::UnexpectedType {
                        expected: "collection response",
                        found: other.map_or("nothing", RawValue::kind_name),
                    }
                    .into())
                }
            }
        };
        Ok(EntityCommandResult::new(resources, Arc::clone(&self.selector)))
    }

    fn wrap(&self, item: &RawValue) -> Result<T, ConversionError> {
        match item {
            RawValue::Object(node) => {
                let descriptor = self.resolve(&node.read());
                Ok(T::from_resource(Resource::from_node(descriptor, RawObject::clone(node))))
            }
            other => Err(ConversionError::UnexpectedType {
                expected: T::descriptor().type_name,
                found: other.kind_name(),
            }),
        }
    }

    fn resolve(&self, raw: &RawMap) -> &'static ResourceDescriptor {
        self.registry
            .as_ref()
            .map_or(T::descriptor(), |registry| registry.resolve(T::descriptor(), raw))
    }
}

/// Walks one flattened path from `root`, creating expand nodes. `Open`
/// remembers the depth, `Close` returns to it.
fn walk(
    root: &mut ExpandNode,
    scope: &'static ResourceDescriptor,
    tokens: &[PathToken],
) -> Result<(), CompileError> {
    let mut stack: Vec<(Vec<&str>, &'static ResourceDescriptor)> = vec![(Vec::new(), scope)];
    let mut marks = Vec::new();
    for token in tokens {
        match token {
            PathToken::Segment(name) => {
                let (path, owner) = stack.last().cloned().unwrap_or_else(|| (Vec::new(), scope));
                let ty = owner.property_type(name).ok_or_else(|| CompileError::UnknownProperty {
                    type_name: owner.type_name,
                    property: name.clone(),
                })?;
                let target = ty
                    .resource()
                    .or_else(|| ty.element_resource())
                    .filter(|_| ty.is_navigation())
                    .ok_or_else(|| {
                        CompileError::unsupported(format!("expanding '{name}', which is not a reference"))
                    })?;
                let mut next = path;
                next.push(name.as_str());
                root.get_or_add_path(&next);
                stack.push((next, target));
            }
            PathToken::Open => marks.push(stack.len()),
            PathToken::Close => {
                if let Some(depth) = marks.pop() {
                    stack.truncate(depth);
                }
            }
        }
    }
    Ok(())
}

impl<T, R> Deref for EntityCommand<T, R> {
    type Target = QueryCommand;

    fn deref(&self) -> &Self::Target {
        &self.command
    }
}

/// Wraps `clause` in parentheses when it has an `or` outside any group or
/// string literal, so it can be joined with `and`.
fn group_disjunction(clause: &str) -> Cow<'_, str> {
    let mut depth = 0_usize;
    let mut quoted = false;
    for (index, c) in clause.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ' ' if !quoted && depth == 0 && clause[index..].starts_with(" or ") => {
                return Cow::Owned(format!("({clause})"));
            }
            _ => {}
        }
    }
    Cow::Borrowed(clause)
}

impl<T, R> Clone for EntityCommand<T, R> {
    fn clone(&self) -> Self {
        Self {
            command: self.command.clone(),
            selector: Arc::clone(&self.selector),
            registry: self.registry.clone(),
            entity: PhantomData,
        }
    }
}

impl<T, R> fmt::Debug for EntityCommand<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCommand")
            .field("command", &self.command)
            .field("registry", &self.registry.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, R> fmt::Display for EntityCommand<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.command, f)
    }
}

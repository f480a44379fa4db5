//! Results of loading an [`EntityCommand`](super::EntityCommand).

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use crate::model::ConversionError;

pub(crate) type Selector<T, R> = Arc<dyn Fn(&T) -> Result<R, ConversionError> + Send + Sync>;

/// Loaded entities plus their projections.
///
/// The struct implements `Deref<Target = [T]>`, so the loaded entities can
/// be iterated and indexed directly. Projections are computed on the first
/// call to [`results`](Self::results) and kept.
///
/// # Example
///
/// ```rust
/// use domain_api::query::EntityCommandResult;
/// use domain_api::resources::Customer;
///
/// let result = EntityCommandResult::<Customer>::empty();
/// assert!(result.is_empty());
/// assert!(result.results().unwrap().is_empty());
/// ```
pub struct EntityCommandResult<T, R = T> {
    resources: Vec<T>,
    selector: Selector<T, R>,
    results: OnceLock<Result<Vec<R>, ConversionError>>,
}

impl<T, R> EntityCommandResult<T, R> {
    pub(crate) fn new(resources: Vec<T>, selector: Selector<T, R>) -> Self {
        Self {
            resources,
            selector,
            results: OnceLock::new(),
        }
    }

    /// The loaded entities. Only selected properties are present.
    #[must_use]
    pub fn resources(&self) -> &[T] {
        &self.resources
    }

    /// Consumes the result and returns the loaded entities.
    #[must_use]
    pub fn into_resources(self) -> Vec<T> {
        self.resources
    }

    /// The projected results, one per loaded entity.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConversionError`] raised by the projection.
    pub fn results(&self) -> Result<&[R], ConversionError> {
        self.results
            .get_or_init(|| self.resources.iter().map(|r| (self.selector)(r)).collect())
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Consumes the result and returns the projections.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConversionError`] raised by the projection.
    pub fn into_results(self) -> Result<Vec<R>, ConversionError> {
        let Self {
            resources,
            selector,
            results,
        } = self;
        match results.into_inner() {
            Some(results) => results,
            None => resources.iter().map(|r| selector(r)).collect(),
        }
    }
}

impl<T: Clone + 'static> EntityCommandResult<T> {
    /// A result with no entities.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(
            Vec::new(),
            Arc::new(|r: &T| -> Result<T, ConversionError> { Ok(r.clone()) }),
        )
    }
}

impl<T, R> Deref for EntityCommandResult<T, R> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.resources
    }
}

impl<T: fmt::Debug, R> fmt::Debug for EntityCommandResult<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCommandResult")
            .field("resources", &self.resources)
            .field("projected", &self.results.get().is_some())
            .finish_non_exhaustive()
    }
}

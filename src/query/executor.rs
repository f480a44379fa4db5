//! The seam between command building and transport.
//!
//! The crate performs no I/O. Applications implement [`CommandExecutor`]
//! over their HTTP stack (or an in-memory fake in tests) and hand it to
//! [`EntityCommand::load`](super::EntityCommand::load) or
//! [`DomainApi`](crate::DomainApi).

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use super::command::QueryCommand;
use crate::model::RawMap;

/// Sends commands to the remote service.
///
/// Implementations map [`QueryCommand::kind`] to an HTTP method with
/// [`CommandKind::http_method`](super::CommandKind::http_method), address
/// [`QueryCommand::encoded_uri_string`] relative to the service root and
/// send [`QueryCommand::payload`] as the JSON body.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor {
    /// Executes a command whose response is a JSON object.
    ///
    /// Returns `None` for empty responses (`204 No Content`).
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] if the request fails or the body is not a
    /// JSON object.
    async fn execute(&self, command: &QueryCommand) -> Result<Option<RawMap>, ExecutorError>;

    /// Executes a command whose response is plain text, such as `$count`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] if the request fails.
    async fn execute_text(&self, command: &QueryCommand) -> Result<String, ExecutorError>;
}

impl<E: CommandExecutor> CommandExecutor for &E {
    async fn execute(&self, command: &QueryCommand) -> Result<Option<RawMap>, ExecutorError> {
        (**self).execute(command).await
    }

    async fn execute_text(&self, command: &QueryCommand) -> Result<String, ExecutorError> {
        (**self).execute_text(command).await
    }
}

impl<E: CommandExecutor> CommandExecutor for Arc<E> {
    async fn execute(&self, command: &QueryCommand) -> Result<Option<RawMap>, ExecutorError> {
        (**self).execute(command).await
    }

    async fn execute_text(&self, command: &QueryCommand) -> Result<String, ExecutorError> {
        (**self).execute_text(command).await
    }
}

/// A command could not be executed.
///
/// # Example
///
/// ```rust
/// use domain_api::query::ExecutorError;
///
/// let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline elapsed");
/// let error = ExecutorError::with_source("GET Crm_Customers failed", io);
/// assert_eq!(error.to_string(), "GET Crm_Customers failed");
/// assert!(std::error::Error::source(&error).is_some());
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExecutorError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ExecutorError {
    /// Creates an error without an underlying cause.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping the transport's own error.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

//! Error types for clause parsing, filter compiling and command building.
//!
//! Every [`ParseError`] variant carries the character position at which the
//! expand/select parser gave up, so callers can point at the offending text.
//!
//! # Example
//!
//! ```rust
//! use domain_api::query::{ExpandNode, ParseError};
//!
//! let error = ExpandNode::parse(Some("Lines($top=5)"), None).unwrap_err();
//! assert!(matches!(error, ParseError::UnknownClause { position: 10, .. }));
//! ```

use std::fmt;

use thiserror::Error;

use crate::model::{ConversionError, MissingMetadataError};

/// State of one open scope of the expand/select parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseState {
    /// Reading child nodes of an `$expand=` list.
    Expand,
    /// Reading field names of a `$select=` list.
    Select,
    /// Just opened or after `;`, awaiting `$expand=` or `$select=`.
    Clause,
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Expand => "Expand",
            Self::Select => "Select",
            Self::Clause => "Clause",
        })
    }
}

/// An expand or select clause is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A character is not allowed in the current parser state.
    #[error("Invalid parser state {state} at char {position}.")]
    InvalidState {
        /// State of the innermost open scope.
        state: ParseState,
        /// Zero-based character position.
        position: usize,
    },

    /// A nested clause keyword other than `$expand` or `$select`.
    #[error("Invalid clause '{keyword}' at char {position}. Expected '$expand' or '$select'.")]
    UnknownClause {
        /// The rejected keyword.
        keyword: String,
        /// Zero-based character position of the `=`.
        position: usize,
    },

    /// A `)` without a matching `(`.
    #[error("Unbalanced ')' at char {position}.")]
    UnbalancedParenthesis {
        /// Zero-based character position.
        position: usize,
    },

    /// Input ended while a `(` was still open.
    #[error("Unclosed '(' at end of clause (char {position}).")]
    UnclosedParenthesis {
        /// Clause length, the position where `)` was expected.
        position: usize,
    },
}

impl ParseError {
    /// Character position of the failure.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::InvalidState { position, .. }
            | Self::UnknownClause { position, .. }
            | Self::UnbalancedParenthesis { position }
            | Self::UnclosedParenthesis { position } => *position,
        }
    }
}

/// A filter or expand expression cannot be compiled.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    /// The expression construct has no filter rendering.
    #[error("Unsupported expression: {construct}.")]
    Unsupported {
        /// Description of the construct.
        construct: String,
    },

    /// A property path names a property the type does not declare.
    #[error("Type '{type_name}' has no property '{property}'.")]
    UnknownProperty {
        /// The type searched.
        type_name: &'static str,
        /// The missing property.
        property: String,
    },

    /// A constant value cannot be written as a filter literal.
    #[error("A {kind} value cannot be used as a filter literal.")]
    UnsupportedLiteral {
        /// Kind of the value.
        kind: &'static str,
    },

    /// Constant folding read a property that failed to convert.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl CompileError {
    pub(crate) fn unsupported(construct: impl Into<String>) -> Self {
        Self::Unsupported {
            construct: construct.into(),
        }
    }
}

/// Command state was copied between commands of different resource sets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Can't copy command. Resource name should be {expected} but it is {found}.")]
pub struct CommandMismatchError {
    /// Resource name of the target command.
    pub expected: String,
    /// Resource name of the source command.
    pub found: String,
}

/// Any failure while building a command.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    /// Existing expand/select clauses are malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An expression cannot be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// State was copied between different resource sets.
    #[error(transparent)]
    Mismatch(#[from] CommandMismatchError),

    /// The resource type is not addressable.
    #[error(transparent)]
    Metadata(#[from] MissingMetadataError),
}

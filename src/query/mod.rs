//! Command building: filters, expand trees and executable commands.
//!
//! This module turns typed expressions into the textual clauses of the
//! query protocol and collects them in commands an executor can send.
//!
//! # Overview
//!
//! - [`ExpandNode`]: tree of nested `$expand`/`$select` clauses with a
//!   parser and serializer
//! - [`Expr`] and [`compile_filter`]: predicate trees and their `$filter` text
//! - [`QueryCommand`]: untyped command descriptor with URI rendering
//! - [`EntityCommand`]: typed builder over an entity resource type
//! - [`Projection`] and [`Shape`]: typed `$select` results
//! - [`CommandExecutor`]: the transport seam
//!
//! # Example
//!
//! ```rust
//! use domain_api::query::ExpandNode;
//!
//! let clause = "Lines($expand=Product($expand=ProductGroup),Lot,LineStore)";
//! let root = ExpandNode::parse(Some(clause), None).unwrap();
//! assert_eq!(root.expand_clause(), clause);
//! ```

mod command;
mod entity_command;
mod errors;
mod executor;
mod expand;
mod expr;
mod filter;
mod projection;
mod result;

pub use command::{CommandKind, HttpMethod, Param, QueryCommand, EXPAND, FILTER, SELECT, SKIP, TOP};
pub use entity_command::EntityCommand;
pub use errors::{CommandMismatchError, CompileError, ParseError, ParseState, QueryError};
pub use executor::{CommandExecutor, ExecutorError};
pub use expand::{ExpandNode, ROOT_NAME};
pub use expr::{BinaryOp, ExpandKind, Expr, UnaryOp};
pub use filter::compile_filter;
pub use projection::{Projection, Shape};
pub use result::EntityCommandResult;

//! Tree model of nested `$expand`/`$select` clauses.
//!
//! An [`ExpandNode`] names a navigation property, lists the fields selected
//! at that level and holds the nested navigation nodes. Trees are built
//! programmatically with [`ExpandNode::get_or_add`] or parsed from wire
//! text with [`ExpandNode::parse`], and render back with `Display`.
//!
//! # Grammar
//!
//! ```text
//! clause    := node ("," node)*
//! node      := name ["(" subclause ")"]
//! subclause := part (";" part)*
//! part      := "$expand=" clause | "$select=" name ("," name)*
//! ```
//!
//! # Example
//!
//! ```rust
//! use domain_api::query::ExpandNode;
//!
//! let text = "Lines($expand=Product($expand=ProductGroup($expand=RangeProperties),ProductType),Lot,LineStore)";
//! let root = ExpandNode::parse(Some(text), None).unwrap();
//! assert_eq!(root.expand_clause(), text);
//!
//! let mut root = ExpandNode::root();
//! root.get_or_add("Lines").get_or_add("Lot");
//! root.get_or_add("Lines").add_select("Quantity");
//! assert_eq!(root.expand_clause(), "Lines($expand=Lot;$select=Quantity)");
//! ```

use std::fmt;

use super::errors::{ParseError, ParseState};

/// Name of the synthetic root node returned by [`ExpandNode::parse`].
pub const ROOT_NAME: &str = ".";

/// One level of an expand/select clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandNode {
    name: String,
    select: Vec<String>,
    expand: Vec<ExpandNode>,
}

impl ExpandNode {
    /// Creates a leaf node.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            select: Vec::new(),
            expand: Vec::new(),
        }
    }

    /// Creates the synthetic root node.
    #[must_use]
    pub fn root() -> Self {
        Self::new(ROOT_NAME)
    }

    /// The navigation property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selected field names, in order.
    #[must_use]
    pub fn select(&self) -> &[String] {
        &self.select
    }

    /// Nested navigation nodes, in order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.expand
    }

    /// Looks up a child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.expand.iter().find(|n| n.name == name)
    }

    /// Returns `true` if the node has neither children nor selected fields.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.select.is_empty() && self.expand.is_empty()
    }

    /// Returns the child named `name`, creating it when absent.
    pub fn get_or_add(&mut self, name: &str) -> &mut Self {
        let index = match self.expand.iter().position(|n| n.name == name) {
            Some(index) => index,
            None => {
                self.expand.push(Self::new(name));
                self.expand.len() - 1
            }
        };
        &mut self.expand[index]
    }

    /// Walks `path` from this node, creating missing nodes.
    pub fn get_or_add_path<I, S>(&mut self, path: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        path.into_iter()
            .fold(self, |node, segment| node.get_or_add(segment.as_ref()))
    }

    /// Appends a selected field name.
    pub fn add_select(&mut self, field: impl Into<String>) -> &mut Self {
        self.select.push(field.into());
        self
    }

    /// Adds `node` as a child, merging it into an existing child of the same
    /// name.
    pub fn merge_child(&mut self, node: Self) {
        let target = self.get_or_add(&node.name);
        target.select.extend(node.select);
        for child in node.expand {
            target.merge_child(child);
        }
    }

    /// The children joined with `,`, or an empty string.
    #[must_use]
    pub fn expand_clause(&self) -> String {
        join(&self.expand)
    }

    /// The selected fields joined with `,`, or an empty string.
    #[must_use]
    pub fn select_clause(&self) -> String {
        self.select.join(",")
    }

    /// Parses an expand clause, plus an optional root-level select clause.
    ///
    /// The result is a root node named [`ROOT_NAME`] whose children are the
    /// top-level expanded properties and whose select list is `select`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] with the offending character position.
    pub fn parse(expand: Option<&str>, select: Option<&str>) -> Result<Self, ParseError> {
        let mut root = match expand.filter(|text| !text.is_empty()) {
            Some(text) => Parser::new().run(text)?,
            None => Self::root(),
        };
        if let Some(select) = select {
            root.select
                .extend(select.split(',').filter(|s| !s.is_empty()).map(str::to_string));
        }
        Ok(root)
    }
}

impl fmt::Display for ExpandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.is_leaf() {
            return Ok(());
        }
        f.write_str("(")?;
        if !self.expand.is_empty() {
            write!(f, "$expand={}", join(&self.expand))?;
        }
        if !self.select.is_empty() {
            if !self.expand.is_empty() {
                f.write_str(";")?;
            }
            write!(f, "$select={}", self.select.join(","))?;
        }
        f.write_str(")")
    }
}

fn join(nodes: &[ExpandNode]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

struct Frame {
    node: ExpandNode,
    state: ParseState,
}

struct Parser {
    stack: Vec<Frame>,
    token: String,
}

impl Parser {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                node: ExpandNode::root(),
                state: ParseState::Expand,
            }],
            token: String::new(),
        }
    }

    fn run(mut self, text: &str) -> Result<ExpandNode, ParseError> {
        let mut length = 0;
        for (position, c) in text.chars().enumerate() {
            length = position + 1;
            match c {
                '(' => self.open(position)?,
                ')' => self.close(position)?,
                '=' => self.keyword(position)?,
                ',' => self.flush(position)?,
                ';' => {
                    self.flush(position)?;
                    self.top().state = ParseState::Clause;
                }
                other => self.token.push(other),
            }
        }
        self.flush(length)?;
        if self.stack.len() > 1 {
            return Err(ParseError::UnclosedParenthesis { position: length });
        }
        let root = self.stack.pop().map(|frame| frame.node);
        Ok(root.unwrap_or_else(ExpandNode::root))
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn open(&mut self, position: usize) -> Result<(), ParseError> {
        let state = self.top().state;
        if state != ParseState::Expand {
            return Err(ParseError::InvalidState { state, position });
        }
        let name = std::mem::take(&mut self.token);
        self.stack.push(Frame {
            node: ExpandNode::new(name),
            state: ParseState::Clause,
        });
        Ok(())
    }

    fn close(&mut self, position: usize) -> Result<(), ParseError> {
        self.flush(position)?;
        if self.stack.len() < 2 {
            return Err(ParseError::UnbalancedParenthesis { position });
        }
        if let Some(frame) = self.stack.pop() {
            self.top().node.merge_child(frame.node);
        }
        Ok(())
    }

    fn keyword(&mut self, position: usize) -> Result<(), ParseError> {
        let state = self.top().state;
        if state != ParseState::Clause {
            return Err(ParseError::InvalidState { state, position });
        }
        let next = match self.token.as_str() {
            "$expand" => ParseState::Expand,
            "$select" => ParseState::Select,
            _ => {
                return Err(ParseError::UnknownClause {
                    keyword: std::mem::take(&mut self.token),
                    position,
                })
            }
        };
        self.token.clear();
        self.top().state = next;
        Ok(())
    }

    fn flush(&mut self, position: usize) -> Result<(), ParseError> {
        if self.token.is_empty() {
            return Ok(());
        }
        let token = std::mem::take(&mut self.token);
        let frame = self.top();
        match frame.state {
            ParseState::Select => {
                frame.node.add_select(token);
            }
            ParseState::Expand => {
                frame.node.get_or_add(&token);
            }
            ParseState::Clause => {
                return Err(ParseError::InvalidState {
                    state: ParseState::Clause,
                    position,
                })
            }
        }
        Ok(())
    }
}

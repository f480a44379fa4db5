//! Expression trees for filters and expand paths.
//!
//! Expressions are built with method chains starting from the parameter
//! handed to a closure: `|o| o.prop("Customer").prop("Name").eq("Contoso")`.
//! The same tree type describes filter predicates, compiled by
//! [`compile_filter`](super::compile_filter), and navigation paths for
//! [`EntityCommand::expand`](super::EntityCommand::expand), where the
//! [`Expr::expand`] family only marks nesting.
//!
//! Arithmetic uses the standard operators:
//!
//! ```rust
//! use domain_api::query::{compile_filter, Expr};
//! use domain_api::resources::SALES_ORDER;
//!
//! let filter = (Expr::param().prop("Amount").prop("Value") * 2).gt(100);
//! assert_eq!(compile_filter(&filter, &SALES_ORDER).unwrap(), "AmountValue mul 2 gt 100");
//! ```

use std::ops;

use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use crate::model::{EntityIdentifier, Resource, TimeSpan, Value};

/// Binary operators with their filter tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// Logical and.
    And,
    /// Logical or.
    Or,
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Remainder.
    Mod,
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
}

impl BinaryOp {
    /// The filter token.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne => 3,
            Self::Gt | Self::Ge | Self::Lt | Self::Le => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::Mod => 6,
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation, `not `.
    Not,
    /// Arithmetic negation, `-`.
    Negate,
}

/// Nesting marker kinds of expand paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpandKind {
    /// Expands below a single reference.
    Single,
    /// Expands a collection property of the target.
    Collection,
    /// Expands below each item of a collection.
    Items,
}

/// An expression node.
#[derive(Clone, Debug)]
pub enum Expr {
    /// The resource in scope: the command's type, or a lambda's element.
    Parameter,
    /// A literal or an in-memory value to be folded.
    Constant(Value),
    /// Access to a declared property.
    Property {
        /// Owner of the property.
        target: Box<Expr>,
        /// Property name.
        name: String,
    },
    /// Access to a property by name without declared metadata.
    Lookup {
        /// Owner of the property.
        target: Box<Expr>,
        /// Property name.
        name: String,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Function call; the receiver, if any, renders as the first argument.
    Call {
        /// Function name, lower-cased on output.
        method: String,
        /// Receiver of a method-style call.
        receiver: Option<Box<Expr>>,
        /// Remaining arguments.
        args: Vec<Expr>,
    },
    /// Lambda body; its parameter is the element of the collection argument.
    Lambda(Box<Expr>),
    /// Membership test against an eagerly evaluated list.
    In {
        /// Tested value.
        value: Box<Expr>,
        /// Candidate values.
        items: Vec<Value>,
    },
    /// Expand nesting marker.
    Expand {
        /// Marker kind.
        kind: ExpandKind,
        /// Path the nested path continues from.
        target: Box<Expr>,
        /// Nested path, rooted at a fresh parameter.
        inner: Box<Expr>,
    },
}

/// A segment of a flattened expand path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PathToken {
    Segment(String),
    Open,
    Close,
}

impl Expr {
    /// The parameter of the current scope.
    #[must_use]
    pub const fn param() -> Self {
        Self::Parameter
    }

    /// The `null` literal.
    #[must_use]
    pub const fn null() -> Self {
        Self::Constant(Value::Null)
    }

    /// A constant value.
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    /// Accesses a declared property of this expression.
    #[must_use]
    pub fn prop(self, name: impl Into<String>) -> Self {
        Self::Property {
            target: Box::new(self),
            name: name.into(),
        }
    }

    /// Accesses a property by name only, rendered as its bare name.
    #[must_use]
    pub fn lookup(self, name: impl Into<String>) -> Self {
        Self::Lookup {
            target: Box::new(self),
            name: name.into(),
        }
    }

    fn binary(self, op: BinaryOp, rhs: impl Into<Self>) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    /// `self eq rhs`.
    #[must_use]
    pub fn eq(self, rhs: impl Into<Self>) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    /// `self ne rhs`.
    #[must_use]
    pub fn ne(self, rhs: impl Into<Self>) -> Self {
        self.binary(BinaryOp::Ne, rhs)
    }

    /// `self gt rhs`.
    #[must_use]
    pub fn gt(self, rhs: impl Into<Self>) -> Self {
        self.binary(BinaryOp::Gt, rhs)
    }

    /// `self ge rhs`.
    #[must_use]
    pub fn ge(self, rhs: impl Into<Self>) -> Self {
        self.binary(BinaryOp::Ge, rhs)
    }

    /// `self lt rhs`.
    #[must_use]
    pub fn lt(self, rhs: impl Into<Self>) -> Self {
        self.binary(BinaryOp::Lt, rhs)
    }

    /// `self le rhs`.
    #[must_use]
    pub fn le(self, rhs: impl Into<Self>) -> Self {
        self.binary(BinaryOp::Le, rhs)
    }

    /// `self and rhs`.
    #[must_use]
    pub fn and(self, rhs: impl Into<Self>) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    /// `self or rhs`.
    #[must_use]
    pub fn or(self, rhs: impl Into<Self>) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    /// `self in (items...)`.
    #[must_use]
    pub fn is_in<I, V>(self, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            value: Box::new(self),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// A method-style call with this expression as the first argument.
    #[must_use]
    pub fn call(self, method: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            method: method.into(),
            receiver: Some(Box::new(self)),
            args,
        }
    }

    /// A free function call.
    #[must_use]
    pub fn function(method: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            method: method.into(),
            receiver: None,
            args,
        }
    }

    /// `contains(self,value)`.
    #[must_use]
    pub fn contains(self, value: impl Into<Self>) -> Self {
        self.call("contains", vec![value.into()])
    }

    /// `startswith(self,value)`.
    #[must_use]
    pub fn starts_with(self, value: impl Into<Self>) -> Self {
        self.call("startswith", vec![value.into()])
    }

    /// `endswith(self,value)`.
    #[must_use]
    pub fn ends_with(self, value: impl Into<Self>) -> Self {
        self.call("endswith", vec![value.into()])
    }

    /// True when `self` is null or equal to `value`.
    #[must_use]
    pub fn equal_null(self, value: impl Into<Self>) -> Self {
        self.call("equalnull", vec![value.into()])
    }

    /// True when `self` is null or not less than `value`.
    #[must_use]
    pub fn greater_equal_null(self, value: impl Into<Self>) -> Self {
        self.call("greaterequalnull", vec![value.into()])
    }

    /// True when `self` is null or not greater than `value`.
    #[must_use]
    pub fn less_equal_null(self, value: impl Into<Self>) -> Self {
        self.call("lessequalnull", vec![value.into()])
    }

    /// True when any element of the collection `self` satisfies `predicate`.
    #[must_use]
    pub fn any(self, predicate: impl FnOnce(Self) -> Self) -> Self {
        self.call("any", vec![Self::Lambda(Box::new(predicate(Self::Parameter)))])
    }

    /// True when every element of the collection `self` satisfies `predicate`.
    #[must_use]
    pub fn all(self, predicate: impl FnOnce(Self) -> Self) -> Self {
        self.call("all", vec![Self::Lambda(Box::new(predicate(Self::Parameter)))])
    }

    /// Expands `path` below the single reference `self`.
    #[must_use]
    pub fn expand(self, path: impl FnOnce(Self) -> Self) -> Self {
        self.nest(ExpandKind::Single, path)
    }

    /// Expands the collection `path` of `self`.
    #[must_use]
    pub fn expand_collection(self, path: impl FnOnce(Self) -> Self) -> Self {
        self.nest(ExpandKind::Collection, path)
    }

    /// Expands `path` below each item of the collection `self`.
    #[must_use]
    pub fn expand_items(self, path: impl FnOnce(Self) -> Self) -> Self {
        self.nest(ExpandKind::Items, path)
    }

    fn nest(self, kind: ExpandKind, path: impl FnOnce(Self) -> Self) -> Self {
        Self::Expand {
            kind,
            target: Box::new(self),
            inner: Box::new(path(Self::Parameter)),
        }
    }

    /// Returns `true` if the expression is a property chain rooted at the
    /// scope parameter.
    #[must_use]
    pub fn is_path(&self) -> bool {
        match self {
            Self::Parameter => true,
            Self::Property { target, .. } | Self::Lookup { target, .. } => target.is_path(),
            _ => false,
        }
    }

    /// Flattens an expand path into segments and nesting markers.
    pub(crate) fn path_tokens(&self, out: &mut Vec<PathToken>) -> Result<(), String> {
        match self {
            Self::Parameter => Ok(()),
            Self::Property { target, name } => {
                target.path_tokens(out)?;
                out.push(PathToken::Segment(name.clone()));
                Ok(())
            }
            Self::Expand { target, inner, .. } => {
                target.path_tokens(out)?;
                out.push(PathToken::Open);
                inner.path_tokens(out)?;
                out.push(PathToken::Close);
                Ok(())
            }
            Self::Lookup { name, .. } => Err(format!("lookup of '{name}' in an expand path")),
            Self::Constant(_) => Err("constant in an expand path".to_string()),
            Self::Binary { op, .. } => Err(format!("operator '{}' in an expand path", op.token())),
            Self::Unary { .. } => Err("unary operator in an expand path".to_string()),
            Self::Call { method, .. } => Err(format!("call to '{method}' in an expand path")),
            Self::Lambda(_) => Err("lambda in an expand path".to_string()),
            Self::In { .. } => Err("membership test in an expand path".to_string()),
        }
    }
}

macro_rules! impl_binary_operator {
    ($($trait:ident :: $method:ident => $op:ident),+ $(,)?) => {
        $(
            impl<R: Into<Expr>> ops::$trait<R> for Expr {
                type Output = Self;

                fn $method(self, rhs: R) -> Self {
                    self.binary(BinaryOp::$op, rhs)
                }
            }
        )+
    };
}

impl_binary_operator! {
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Mod,
}

impl ops::Not for Expr {
    type Output = Self;

    fn not(self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }
}

impl ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        Self::Unary {
            op: UnaryOp::Negate,
            operand: Box::new(self),
        }
    }
}

macro_rules! impl_from_constant {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Self::Constant(Value::from(value))
                }
            }
        )+
    };
}

impl_from_constant!(
    &str,
    String,
    bool,
    i32,
    i64,
    f64,
    Uuid,
    DateTime<Utc>,
    DateTime<FixedOffset>,
    TimeSpan,
    EntityIdentifier,
    Resource,
);

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Constant(value)
    }
}

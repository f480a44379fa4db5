//! Compiles expression trees into `$filter` text.
//!
//! Property chains rooted at the scope parameter render as paths: a step
//! through an entity-typed property joins with `/`, a step through a complex
//! property concatenates names. Expressions that are not rooted at the
//! parameter are evaluated in memory and rendered as literals.
//!
//! # Example
//!
//! ```rust
//! use domain_api::query::{compile_filter, Expr};
//! use domain_api::resources::SALES_ORDER;
//!
//! let o = Expr::param();
//! let filter = o
//!     .clone()
//!     .prop("Customer")
//!     .prop("Name")
//!     .eq("Contoso")
//!     .and(o.prop("ShipToAddress").prop("City").ne(Expr::null()));
//!
//! assert_eq!(
//!     compile_filter(&filter, &SALES_ORDER).unwrap(),
//!     "Customer/Name eq 'Contoso' and ShipToAddressCity ne null"
//! );
//! ```

use chrono::Utc;

use super::errors::CompileError;
use super::expr::{Expr, UnaryOp};
use crate::model::{PropertyType, RawValue, ResourceDescriptor, Value};

const PRIMARY: u8 = 8;
const UNARY: u8 = 7;
const MEMBERSHIP: u8 = 4;

/// Compiles a predicate over resources of type `scope` into filter text.
///
/// # Errors
///
/// Returns [`CompileError`] for unknown properties, literals without a
/// filter form, and constructs with no filter rendering.
pub fn compile_filter(expr: &Expr, scope: &'static ResourceDescriptor) -> Result<String, CompileError> {
    let (text, _) = render(expr, scope)?;
    tracing::trace!(resource = scope.type_name, filter = %text, "compiled filter");
    Ok(text)
}

/// Renders `expr`, returning the text and its binding strength.
fn render(expr: &Expr, scope: &'static ResourceDescriptor) -> Result<(String, u8), CompileError> {
    match expr {
        Expr::Property { .. } | Expr::Lookup { .. } if expr.is_path() => {
            let (path, _) = resolve_path(expr, scope)?;
            Ok((path, PRIMARY))
        }
        Expr::Property { .. } | Expr::Lookup { .. } | Expr::Constant(_) => {
            Ok((literal(&evaluate(expr)?)?, PRIMARY))
        }
        Expr::Parameter => Err(CompileError::unsupported("the scope parameter itself")),
        Expr::Binary { op, lhs, rhs } => {
            let precedence = op.precedence();
            let left = operand(lhs, scope, precedence)?;
            let right = operand(rhs, scope, precedence + 1)?;
            Ok((format!("{left} {} {right}", op.token()), precedence))
        }
        Expr::Unary { op, operand: inner } => {
            let text = operand(inner, scope, UNARY)?;
            let text = match op {
                UnaryOp::Not => format!("not {text}"),
                UnaryOp::Negate => format!("-{text}"),
            };
            Ok((text, UNARY))
        }
        Expr::Call {
            method,
            receiver,
            args,
        } => render_call(method, receiver.as_deref(), args, scope),
        Expr::In { value, items } => {
            let tested = operand(value, scope, PRIMARY)?;
            let items = items.iter().map(literal).collect::<Result<Vec<_>, _>>()?;
            Ok((format!("{tested} in ({})", items.join(",")), MEMBERSHIP))
        }
        Expr::Lambda(_) => Err(CompileError::unsupported("lambda outside any/all")),
        Expr::Expand { .. } => Err(CompileError::unsupported("expand marker in a filter")),
    }
}

/// Renders an operand, parenthesizing it when it binds looser than `min`.
fn operand(expr: &Expr, scope: &'static ResourceDescriptor, min: u8) -> Result<String, CompileError> {
    let (text, precedence) = render(expr, scope)?;
    if precedence < min {
        Ok(format!("({text})"))
    } else {
        Ok(text)
    }
}

fn render_call(
    method: &str,
    receiver: Option<&Expr>,
    args: &[Expr],
    scope: &'static ResourceDescriptor,
) -> Result<(String, u8), CompileError> {
    let all: Vec<&Expr> = receiver.into_iter().chain(args).collect();
    let mut rendered = Vec::with_capacity(all.len());
    for arg in &all {
        let text = match arg {
            Expr::Lambda(body) => {
                let element = lambda_scope(all.first().copied(), scope)?;
                render(body, element)?.0
            }
            other => render(other, scope)?.0,
        };
        rendered.push(text);
    }
    Ok((format!("{}({})", method.to_lowercase(), rendered.join(",")), PRIMARY))
}

/// The element type of the collection a lambda ranges over.
fn lambda_scope(
    collection: Option<&Expr>,
    scope: &'static ResourceDescriptor,
) -> Result<&'static ResourceDescriptor, CompileError> {
    let collection = collection
        .filter(|c| c.is_path())
        .ok_or_else(|| CompileError::unsupported("lambda without a collection argument"))?;
    let (path, ty) = resolve_path(collection, scope)?;
    ty.element_resource()
        .ok_or_else(|| CompileError::unsupported(format!("lambda over non-collection '{path}'")))
}

/// Resolves a parameter-rooted chain to its path text and declared type.
fn resolve_path(
    expr: &Expr,
    scope: &'static ResourceDescriptor,
) -> Result<(String, PropertyType), CompileError> {
    match expr {
        Expr::Property { target, name } => {
            let (prefix, owner) = match target.as_ref() {
                Expr::Parameter => (String::new(), scope),
                inner => {
                    let (path, ty) = resolve_path(inner, scope)?;
                    match ty {
                        PropertyType::Entity(d) => (format!("{path}/"), d),
                        PropertyType::Complex(d) => (path, d),
                        other => {
                            return Err(CompileError::unsupported(format!(
                                "property '{name}' of {} value '{path}'",
                                other.name()
                            )))
                        }
                    }
                }
            };
            let ty = owner
                .property_type(name)
                .ok_or_else(|| CompileError::UnknownProperty {
                    type_name: owner.type_name,
                    property: name.clone(),
                })?;
            Ok((format!("{prefix}{name}"), ty))
        }
        Expr::Lookup { target, name } => {
            let text = match target.as_ref() {
                Expr::Parameter => name.clone(),
                inner => {
                    let (path, ty) = resolve_path(inner, scope)?;
                    if matches!(ty, PropertyType::Entity(_)) {
                        format!("{path}/{name}")
                    } else {
                        format!("{path}{name}")
                    }
                }
            };
            Ok((text, PropertyType::Object))
        }
        _ => Err(CompileError::unsupported("a non-property expression in a path")),
    }
}

/// Folds an expression that does not depend on the scope parameter.
fn evaluate(expr: &Expr) -> Result<Value, CompileError> {
    match expr {
        Expr::Constant(value) => Ok(value.clone()),
        Expr::Property { target, name } | Expr::Lookup { target, name } => match evaluate(target)? {
            Value::Resource(resource) => Ok(resource.get_value(name)?),
            Value::Null => Ok(Value::Null),
            _ => Err(CompileError::unsupported(format!(
                "property '{name}' of a non-resource constant"
            ))),
        },
        _ => Err(CompileError::unsupported("a computed constant")),
    }
}

/// Renders a value as a filter literal.
fn literal(value: &Value) -> Result<String, CompileError> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) | Value::Enum(s) => quote(s),
        Value::Guid(g) => g.hyphenated().to_string(),
        Value::DateTime(d) => d.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        Value::TimeSpan(t) => t.to_string(),
        Value::Identifier(id) => quote(&id.to_string()),
        Value::Resource(resource) if resource.descriptor().is_entity() => resource
            .identifier()
            .map_or_else(|| "null".to_string(), |id| quote(&id.to_string())),
        Value::Resource(_) => return Err(CompileError::UnsupportedLiteral { kind: "complex resource" }),
        Value::Binary(_) => return Err(CompileError::UnsupportedLiteral { kind: "binary" }),
        Value::Collection(_) => return Err(CompileError::UnsupportedLiteral { kind: "collection" }),
        Value::Raw(raw) => match raw {
            RawValue::Null => "null".to_string(),
            RawValue::Bool(b) => b.to_string(),
            RawValue::Number(n) => n.to_string(),
            RawValue::String(s) => quote(s),
            other => return Err(CompileError::UnsupportedLiteral { kind: other.kind_name() }),
        },
    })
}

/// Single-quotes text, doubling embedded quotes.
fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityIdentifier, PropertyDescriptor, RawMap, Resource, TimeSpan};
    use chrono::{DateTime, FixedOffset};
    use uuid::Uuid;

    static TAG: ResourceDescriptor = ResourceDescriptor::entity(
        "Test.Tag",
        "Test_Tags",
        &[PropertyDescriptor::new("Label", PropertyType::String)],
    );

    static DIMENSIONS: ResourceDescriptor = ResourceDescriptor::complex(
        "Test.Dimensions",
        &[PropertyDescriptor::new("Width", PropertyType::Double)],
    );

    static ITEM: ResourceDescriptor = ResourceDescriptor::entity(
        "Test.Item",
        "Test_Items",
        &[
            PropertyDescriptor::new("Name", PropertyType::String),
            PropertyDescriptor::new("Count", PropertyType::Int32),
            PropertyDescriptor::new("Size", PropertyType::Complex(&DIMENSIONS)),
            PropertyDescriptor::new("Parent", PropertyType::Entity(&ITEM)),
            PropertyDescriptor::new("Tags", PropertyType::Collection(&PropertyType::Entity(&TAG))),
            PropertyDescriptor::new("Active", PropertyType::Boolean),
        ],
    );

    fn o() -> Expr {
        Expr::param()
    }

    fn compile(expr: &Expr) -> String {
        compile_filter(expr, &ITEM).unwrap()
    }

    #[test]
    fn test_paths_join_entities_and_concatenate_complex() {
        assert_eq!(compile(&o().prop("Parent").prop("Name").eq("x")), "Parent/Name eq 'x'");
        assert_eq!(compile(&o().prop("Size").prop("Width").gt(2.5)), "SizeWidth gt 2.5");
        assert_eq!(
            compile(&o().prop("Parent").prop("Size").prop("Width").le(1)),
            "Parent/SizeWidth le 1"
        );
    }

    #[test]
    fn test_operators_and_spacing() {
        let expr = (o().prop("Count") + 1).ge(3).or(!o().prop("Active"));
        assert_eq!(compile(&expr), "Count add 1 ge 3 or not Active");
        assert_eq!(compile(&(-o().prop("Count")).lt(0)), "-Count lt 0");
        assert_eq!(compile(&(o().prop("Count") % 2).eq(0)), "Count mod 2 eq 0");
    }

    #[test]
    fn test_parenthesizes_looser_operands() {
        let expr = o().prop("Active").and(o().prop("Count").eq(1).or(o().prop("Count").eq(2)));
        assert_eq!(compile(&expr), "Active and (Count eq 1 or Count eq 2)");
        let expr = ((o().prop("Count") + 1) * 2).eq(4);
        assert_eq!(compile(&expr), "(Count add 1) mul 2 eq 4");
        assert_eq!(compile(&!o().prop("Count").eq(1)), "not (Count eq 1)");
    }

    #[test]
    fn test_literals() {
        let id = Uuid::parse_str("5c4b3a29-1807-4f6e-9d5c-4b3a29180706").unwrap();
        let at: DateTime<FixedOffset> = DateTime::parse_from_rfc3339("2024-03-01T10:20:30+02:00").unwrap();
        assert_eq!(compile(&o().prop("Name").eq("O'Neil")), "Name eq 'O''Neil'");
        assert_eq!(compile(&o().prop("Active").eq(true)), "Active eq true");
        assert_eq!(compile(&o().lookup("Guid").eq(id)), format!("Guid eq {id}"));
        assert_eq!(compile(&o().lookup("At").ge(at)), "At ge 2024-03-01T08:20:30Z");
        assert_eq!(compile(&o().lookup("Span").eq(TimeSpan::new(1, 2, 3, 4))), "Span eq 1.02:03:04");
        assert_eq!(
            compile(&o().prop("Parent").eq(EntityIdentifier::new("Test_Items", id))),
            format!("Parent eq 'Test_Items({id})'")
        );
    }

    #[test]
    fn test_in_renders_membership() {
        let expr = o().prop("Name").is_in(["a", "b"]);
        assert_eq!(compile(&expr), "Name in ('a','b')");
    }

    #[test]
    fn test_lookup_renders_bare_name() {
        assert_eq!(compile(&o().lookup("CustomProperty_Color").eq("red")), "CustomProperty_Color eq 'red'");
    }

    #[test]
    fn test_calls_render_receiver_first_without_spaces() {
        assert_eq!(compile(&o().prop("Name").contains("ab")), "contains(Name,'ab')");
        assert_eq!(
            compile(&Expr::function("Now", vec![]).gt(o().lookup("Due"))),
            "now() gt Due"
        );
        assert_eq!(
            compile(&o().prop("Count").greater_equal_null(5)),
            "greaterequalnull(Count,5)"
        );
    }

    #[test]
    fn test_lambda_scope_is_collection_element() {
        let expr = o().prop("Tags").any(|t| t.prop("Label").eq("hot"));
        assert_eq!(compile(&expr), "any(Tags,Label eq 'hot')");

        let error = compile_filter(&o().prop("Name").any(|t| t.prop("Label").eq("x")), &ITEM).unwrap_err();
        assert!(matches!(error, CompileError::Unsupported { .. }));
    }

    #[test]
    fn test_constant_folding_reads_in_memory_resources() {
        let other = Resource::create(&ITEM, RawMap::from_iter([("Name", RawValue::from("Bolt"))]));
        let expr = o().prop("Name").eq(Expr::constant(other).prop("Name"));
        assert_eq!(compile(&expr), "Name eq 'Bolt'");
    }

    #[test]
    fn test_entity_constant_renders_quoted_identifier() {
        let id = Uuid::parse_str("5c4b3a29-1807-4f6e-9d5c-4b3a29180706").unwrap();
        let parent = Resource::id_resource(&ITEM, id).unwrap();
        assert_eq!(
            compile(&o().prop("Parent").eq(parent)),
            format!("Parent eq 'Test_Items({id})'")
        );
    }

    #[test]
    fn test_failures() {
        assert!(matches!(
            compile_filter(&o().prop("Missing").eq(1), &ITEM),
            Err(CompileError::UnknownProperty { type_name: "Test.Item", .. })
        ));
        let complex = Resource::new(&DIMENSIONS);
        assert!(matches!(
            compile_filter(&o().prop("Size").eq(complex), &ITEM),
            Err(CompileError::UnsupportedLiteral { .. })
        ));
        assert!(compile_filter(&o().prop("Name").prop("Length"), &ITEM).is_err());
        assert!(compile_filter(&o().prop("Parent").expand(|p| p.prop("Name")), &ITEM).is_err());
    }
}

//! Integration tests for expand paths, expand trees and projections.
//!
//! These tests cover:
//! - Typed expand paths over the sample sales model
//! - Parsing and serializing nested `$expand`/`$select` clauses
//! - Merging expansions and projections into existing clauses

use domain_api::model::ConversionError;
use domain_api::query::{
    CompileError, EntityCommand, ExpandNode, Expr, ParseError, Projection, QueryError, Shape,
};
use domain_api::resources::{Document, SalesOrder, SALES_ORDER};

fn orders() -> EntityCommand<SalesOrder> {
    EntityCommand::new().unwrap()
}

#[test]
fn test_expand_items_nests_below_collection() {
    let command = orders()
        .expand(|o| {
            o.prop("Lines")
                .expand_items(|l| l.prop("Product").expand(|p| p.prop("ProductGroup")))
        })
        .unwrap();

    assert_eq!(command.expand_clause(), Some("Lines($expand=Product($expand=ProductGroup))"));
    assert_eq!(command.select_clause(), None);
}

#[test]
fn test_expand_builds_multi_branch_tree() {
    let command = orders()
        .expand(|o| {
            o.prop("Lines")
                .expand_items(|l| {
                    l.prop("Product")
                        .expand(|p| {
                            p.prop("ProductGroup")
                                .expand_collection(|g| g.prop("RangeProperties"))
                        })
                        .expand(|p| p.prop("ProductType"))
                })
                .expand_items(|l| l.prop("Lot"))
                .expand_items(|l| l.prop("LineStore"))
        })
        .unwrap();

    assert_eq!(
        command.expand_clause(),
        Some("Lines($expand=Product($expand=ProductGroup($expand=RangeProperties),ProductType),Lot,LineStore)")
    );
}

#[test]
fn test_sibling_expansions_from_the_root() {
    let command = orders()
        .expand(|o| {
            o.expand(|so| so.prop("Customer"))
                .expand_collection(|so| so.prop("Lines"))
        })
        .unwrap();

    assert_eq!(command.expand_clause(), Some("Customer,Lines"));
}

#[test]
fn test_repeated_expands_merge_into_one_tree() {
    let command = orders()
        .expand(|o| o.prop("Lines").expand_items(|l| l.prop("Product")))
        .unwrap()
        .expand(|o| o.prop("Lines").expand_items(|l| l.prop("Lot")))
        .unwrap()
        .expand(|o| o.prop("Customer"))
        .unwrap();

    assert_eq!(command.expand_clause(), Some("Lines($expand=Product,Lot),Customer"));
}

#[test]
fn test_expand_all_accepts_several_paths() {
    let command = orders()
        .expand_all([
            Expr::param().prop("Customer"),
            Expr::param().prop("Lines").expand_items(|l| l.prop("LineStore")),
        ])
        .unwrap();

    assert_eq!(command.expand_clause(), Some("Customer,Lines($expand=LineStore)"));
}

#[test]
fn test_expand_rejects_scalars_and_unknown_names() {
    let scalar = orders().expand(|o| o.prop("DocumentNo")).unwrap_err();
    assert!(matches!(scalar, QueryError::Compile(CompileError::Unsupported { .. })));

    let unknown = orders()
        .expand(|o| o.prop("Lines").expand_items(|l| l.prop("Warehouse")))
        .unwrap_err();
    assert!(matches!(
        unknown,
        QueryError::Compile(CompileError::UnknownProperty { type_name: "Crm.Sales.SalesOrderLine", .. })
    ));

    let computed = orders().expand(|o| o.prop("Customer").eq("x")).unwrap_err();
    assert!(matches!(computed, QueryError::Compile(CompileError::Unsupported { .. })));
}

#[test]
fn test_expand_keeps_existing_select_clause() {
    let command = orders()
        .select::<OrderSummary>()
        .unwrap()
        .expand(|o| o.prop("Customer"))
        .unwrap();

    assert_eq!(command.select_clause(), Some("DocumentNo,Customer,Lines"));
    assert_eq!(
        command.expand_clause(),
        Some("Lines($expand=Product;$select=Quantity,Product),Customer")
    );
}

#[test]
fn test_parse_round_trips_nested_clauses() {
    let clauses = [
        "Lines",
        "Customer,Lines",
        "Lines($expand=Product($expand=ProductGroup($expand=RangeProperties),ProductType),Lot,LineStore)",
        "Lines($expand=Product($select=ProductGroup,ProductType),Lot,LineStore)",
        "Lines($expand=Product;$select=Quantity,Notes)",
    ];
    for clause in clauses {
        let node = ExpandNode::parse(Some(clause), None).unwrap();
        assert_eq!(node.expand_clause(), clause, "round trip of {clause}");
    }
}

#[test]
fn test_parse_reads_nested_and_root_selects() {
    let node = ExpandNode::parse(
        Some("Lines($expand=Product($select=PartNumber);$select=Quantity,Product)"),
        Some("DocumentNo,Lines"),
    )
    .unwrap();

    assert_eq!(node.select_clause(), "DocumentNo,Lines");
    let lines = node.child("Lines").unwrap();
    assert_eq!(lines.select(), ["Quantity", "Product"]);
    assert_eq!(lines.child("Product").unwrap().select_clause(), "PartNumber");
}

#[test]
fn test_parse_errors_report_positions() {
    let unclosed = ExpandNode::parse(Some("Lines($expand=Lot"), None).unwrap_err();
    assert!(matches!(unclosed, ParseError::UnclosedParenthesis { .. }));

    let unbalanced = ExpandNode::parse(Some("Lines)"), None).unwrap_err();
    assert!(matches!(unbalanced, ParseError::UnbalancedParenthesis { .. }));
    assert!(unbalanced.position() > 0);
}

#[test]
fn test_get_or_add_path_merges_into_parsed_tree() {
    let mut root = ExpandNode::parse(Some("Lines($expand=Product)"), None).unwrap();
    root.get_or_add_path(["Lines", "Lot"]);
    root.get_or_add_path(["Customer"]);
    root.get_or_add_path(["Lines", "Product", "ProductGroup"]);

    assert_eq!(root.expand_clause(), "Lines($expand=Product($expand=ProductGroup),Lot),Customer");
}

struct OrderSummary {
    number: Option<String>,
    line_count: usize,
}

impl Projection<SalesOrder> for OrderSummary {
    fn shape() -> Shape {
        Shape::new()
            .field("DocumentNo")
            .identifier("CustomerId")
            .nested("Lines", Shape::new().field("Quantity").reference("Product"))
    }

    fn project(order: &SalesOrder) -> Result<Self, ConversionError> {
        Ok(Self {
            number: order.document_no()?,
            line_count: order.lines()?.map_or(0, |lines| lines.items().len()),
        })
    }
}

#[test]
fn test_projection_shape_becomes_select_and_expand() {
    let command = orders().select::<OrderSummary>().unwrap();

    assert_eq!(command.select_clause(), Some("DocumentNo,Customer,Lines"));
    assert_eq!(
        command.expand_clause(),
        Some("Lines($expand=Product;$select=Quantity,Product)")
    );
}

#[test]
fn test_projection_keeps_earlier_command_state() {
    let command = orders()
        .filter(|o| o.prop("DocumentNo").starts_with("SO-"))
        .unwrap()
        .top(5)
        .select::<OrderSummary>()
        .unwrap();

    assert_eq!(command.filter_clause(), Some("startswith(DocumentNo,'SO-')"));
    assert_eq!(command.command().top(), Some(5));
    assert!(command.uri_string().starts_with("Crm_Sales_SalesOrders?$expand="));
}

#[test]
fn test_projection_over_unknown_property_fails() {
    struct Broken;

    impl Projection<SalesOrder> for Broken {
        fn shape() -> Shape {
            Shape::new().field("OrderTotal")
        }

        fn project(_: &SalesOrder) -> Result<Self, ConversionError> {
            Ok(Self)
        }
    }

    let error = orders().select::<Broken>().unwrap_err();
    assert!(matches!(
        error,
        QueryError::Compile(CompileError::UnknownProperty { type_name: "Crm.Sales.SalesOrder", .. })
    ));
    assert!(SALES_ORDER.property("OrderTotal").is_none());
}

#[test]
fn test_projection_results_are_computed_from_loaded_orders() {
    let json = serde_json::json!({
        "DocumentNo": "SO-7",
        "Lines": [{"Quantity": 1}, {"Quantity": 4}]
    });
    let order: SalesOrder = domain_api::model::ApiResource::convert(&json).unwrap();
    let summary = OrderSummary::project(&order).unwrap();

    assert_eq!(summary.number.as_deref(), Some("SO-7"));
    assert_eq!(summary.line_count, 2);
}

//! Integration tests for filter compilation over the sample model.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use domain_api::model::{ApiResource, EntityIdentifier, EntityResource, Value};
use domain_api::query::{compile_filter, CompileError, EntityCommand, Expr};
use domain_api::resources::{Customer, DocumentState, SalesOrder, CUSTOMER, SALES_ORDER};

fn o() -> Expr {
    Expr::param()
}

fn compile(expr: &Expr) -> String {
    compile_filter(expr, &SALES_ORDER).unwrap()
}

#[test]
fn test_reference_and_complex_paths() {
    let expr = o()
        .prop("Customer")
        .prop("Address")
        .prop("City")
        .eq("Sofia")
        .and(o().prop("ShipToAddress").prop("Country").ne(Expr::null()));

    assert_eq!(compile(&expr), "Customer/AddressCity eq 'Sofia' and ShipToAddressCountry ne null");
}

#[test]
fn test_inherited_properties_and_enum_literals() {
    let expr = o()
        .prop("State")
        .eq(Value::from(DocumentState::Released))
        .and(o().prop("DocumentNo").ends_with("-01"));

    assert_eq!(compile(&expr), "State eq 'Released' and endswith(DocumentNo,'-01')");
}

#[test]
fn test_date_constants_render_in_utc() {
    let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let expr = o().prop("DocumentDate").ge(from);

    assert_eq!(compile(&expr), "DocumentDate ge 2026-01-01T00:00:00Z");
}

#[test]
fn test_lambda_over_lines_uses_line_scope() {
    let expr = o()
        .prop("Lines")
        .any(|l| l.clone().prop("Product").prop("PartNumber").eq("CH-01").and(l.prop("Quantity").gt(2)));

    assert_eq!(compile(&expr), "any(Lines,Product/PartNumber eq 'CH-01' and Quantity gt 2)");
}

#[test]
fn test_lambda_body_cannot_use_order_properties() {
    let expr = o().prop("Lines").all(|l| l.prop("DocumentNo").eq("x"));
    let error = compile_filter(&expr, &SALES_ORDER).unwrap_err();

    assert_eq!(
        error,
        CompileError::UnknownProperty {
            type_name: "Crm.Sales.SalesOrderLine",
            property: "DocumentNo".to_string(),
        }
    );
}

#[test]
fn test_captured_customer_folds_to_identifier() {
    let id = Uuid::parse_str("0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a").unwrap();
    let customer = Customer::id_obj(id).unwrap();
    let expr = o().prop("Customer").eq(Value::from(customer));

    assert_eq!(compile(&expr), format!("Customer eq 'Crm_Customers({id})'"));
}

#[test]
fn test_captured_property_values_are_folded() {
    let customer = Customer::new();
    customer.set_name(Some("O'Brien Ltd".to_string())).unwrap();
    let captured = Expr::from(Value::from(customer.clone()));
    let expr = o().prop("Customer").prop("Name").eq(captured.prop("Name"));

    assert_eq!(compile(&expr), "Customer/Name eq 'O''Brien Ltd'");
}

#[test]
fn test_membership_of_identifiers() {
    let ids = [
        Uuid::parse_str("11111111-1111-4111-8111-111111111111").unwrap(),
        Uuid::parse_str("22222222-2222-4222-8222-222222222222").unwrap(),
    ];
    let expr = o().prop("Id").is_in(ids);

    assert_eq!(
        compile(&expr),
        "Id in (11111111-1111-4111-8111-111111111111,22222222-2222-4222-8222-222222222222)"
    );
}

#[test]
fn test_arithmetic_precedence_on_complex_members() {
    let expr = ((o().prop("Amount").prop("Value") - 10) / 2).lt(o().prop("Customer").prop("CreditLimit").prop("Value"));

    assert_eq!(compile(&expr), "(AmountValue sub 10) div 2 lt Customer/CreditLimitValue");
}

#[test]
fn test_lookup_of_custom_properties() {
    let expr = o().lookup("CustomProperty_Priority").eq("High").or(o().prop("Notes").contains("urgent"));

    assert_eq!(compile(&expr), "CustomProperty_Priority eq 'High' or contains(Notes,'urgent')");
}

#[test]
fn test_identifier_literal_is_quoted() {
    let id = EntityIdentifier::new(
        "Crm_Customers",
        Uuid::parse_str("0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a").unwrap(),
    );
    let expr = o().prop("Customer").eq(id);

    assert_eq!(
        compile(&expr),
        "Customer eq 'Crm_Customers(0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a)'"
    );
}

#[test]
fn test_unknown_property_names_the_type() {
    let error = compile_filter(&o().prop("Nmae").eq("x"), &CUSTOMER).unwrap_err();
    assert!(error.to_string().contains("Crm.Customer"));
    assert!(error.to_string().contains("Nmae"));
}

#[test]
fn test_command_filters_are_joined_with_and() {
    let command = EntityCommand::<SalesOrder>::new()
        .unwrap()
        .filter(|o| o.clone().prop("State").eq(Value::from(DocumentState::Planned)).or(o.prop("Notes").eq(Expr::null())))
        .unwrap()
        .filter(|o| o.prop("Customer").prop("Active").eq(true))
        .unwrap();

    assert_eq!(
        command.filter_clause(),
        Some("(State eq 'Planned' or Notes eq null) and Customer/Active eq true")
    );
}

#[test]
fn test_new_resource_is_not_a_filter_literal_until_identified() {
    let customer = Customer::new();
    let expr = o().prop("Customer").eq(Value::from(customer.clone()));
    assert_eq!(compile(&expr), "Customer eq null");

    customer
        .resource()
        .update(&domain_api::model::RawMap::from_iter([(
            "Id",
            domain_api::model::RawValue::from("0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a"),
        )]));
    assert!(EntityResource::identifier(&customer).is_some());
    assert_eq!(
        compile(&o().prop("Customer").eq(Value::from(customer))),
        "Customer eq 'Crm_Customers(0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a)'"
    );
}

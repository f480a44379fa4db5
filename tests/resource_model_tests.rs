//! Integration tests for the resource model.
//!
//! These tests cover:
//! - Change tracking and the cascade from complex values to their owner
//! - Minimal write payloads with references reduced to identifiers
//! - Merging server responses without marking changes
//! - Registry lookups and subtype resolution

use uuid::Uuid;

use domain_api::model::{
    ApiResource, ComplexResource, EntityIdentifier, EntityResource, MissingMetadataError,
    MultilanguageString, RawMap, RawValue, Resource, ResourceRegistry, ODATA_ID, ODATA_TYPE,
};
use domain_api::query::QueryCommand;
use domain_api::resources::{
    self, Address, Amount, Customer, Document, DocumentState, Product, SalesOrder, SalesOrderLine,
    CUSTOMER, DOCUMENT, SALES_ORDER,
};

fn raw(json: serde_json::Value) -> RawMap {
    match RawValue::from(json) {
        RawValue::Object(node) => node.read().clone(),
        other => panic!("expected an object, got {}", other.kind_name()),
    }
}

#[test]
fn test_new_resources_are_stamped_and_unmodified() {
    let order = SalesOrder::new();
    assert_eq!(
        order.resource().raw(ODATA_TYPE),
        Some(RawValue::from("Erp.Crm_Sales_SalesOrder"))
    );
    assert!(!order.resource().is_modified());
    assert!(order.resource().raw_changes().is_none());
}

#[test]
fn test_setting_an_equal_value_does_not_mark_changes() {
    let customer = Customer::create(raw(serde_json::json!({"Name": "Contoso"})));
    customer.set_name(Some("Contoso".to_string())).unwrap();
    assert!(!customer.resource().is_modified());

    customer.set_name(Some("Fabrikam".to_string())).unwrap();
    assert_eq!(customer.resource().changed_properties(), vec!["Name".to_string()]);
}

#[test]
fn test_complex_change_cascades_to_owner() {
    let order = SalesOrder::new();
    order.set_ship_to_address(Some(Address::new())).unwrap();
    order.resource().clear_changes();

    let ship_to = order.ship_to_address().unwrap().unwrap();
    ship_to.set_street(Some("1 Vitosha Blvd".to_string())).unwrap();

    assert!(ship_to.resource().is_property_modified("Street"));
    assert!(order.resource().is_property_modified("ShipToAddress"));

    let (owner, property) = ship_to.owner().unwrap();
    assert!(owner.ptr_eq(order.resource()));
    assert_eq!(property, "ShipToAddress");
}

#[test]
fn test_complex_change_cascades_through_two_levels() {
    let customer = Customer::create(raw(serde_json::json!({
        "Name": "Contoso",
        "CustomProperty_Segment": {
            "Value": "Retail",
            "Description": {"EN": "Retail customers"}
        }
    })));

    let description = {
        let segment = customer.resource().custom_property("Segment").unwrap().unwrap();
        assert!(segment == "Retail");
        segment.description().unwrap().unwrap()
    };
    assert!(description.owner().is_none());

    description.set("bg", Some("Търговия на дребно")).unwrap();

    assert!(customer.resource().is_property_modified("CustomProperty_Segment"));
    let changes = customer.resource().raw_changes().unwrap();
    assert_eq!(changes.keys().collect::<Vec<_>>(), ["CustomProperty_Segment"]);
    let segment = changes
        .get("CustomProperty_Segment")
        .and_then(RawValue::as_object)
        .unwrap();
    let text = segment
        .read()
        .get("Description")
        .and_then(RawValue::as_object)
        .cloned()
        .unwrap();
    assert_eq!(text.read().get("BG"), Some(&RawValue::from("Търговия на дребно")));
}

#[test]
fn test_cascade_after_owner_is_dropped_is_a_no_op() {
    let address = {
        let order = SalesOrder::new();
        order.set_ship_to_address(Some(Address::new())).unwrap();
        order.ship_to_address().unwrap().unwrap()
    };

    assert!(address.owner().is_none());
    address.set_city(Some("Varna".to_string())).unwrap();
    assert!(address.resource().is_property_modified("City"));
}

#[test]
fn test_assigning_a_complex_value_merges_into_existing_storage() {
    let order = SalesOrder::create(raw(serde_json::json!({
        "ShipToAddress": {"Street": "Main 1", "City": "Ruse"}
    })));
    let before = order.ship_to_address().unwrap().unwrap();

    let replacement = Address::new();
    replacement.set_city(Some("Burgas".to_string())).unwrap();
    order.set_ship_to_address(Some(replacement)).unwrap();

    assert_eq!(before.city().unwrap().as_deref(), Some("Burgas"));
    assert_eq!(before.street().unwrap().as_deref(), Some("Main 1"));
    assert!(order.resource().is_property_modified("ShipToAddress"));
}

#[test]
fn test_raw_changes_reduce_references_to_identifiers() {
    let order = SalesOrder::create(raw(serde_json::json!({
        "@odata.id": "Crm_Sales_SalesOrders(7f3b7f0c-2c1d-4f6e-8a9b-0c1d2e3f4a5b)",
        "DocumentNo": "SO-1",
        "Notes": "keep"
    })));
    let customer = Customer::create(raw(serde_json::json!({
        "@odata.id": "Crm_Customers(0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a)",
        "Name": "Contoso",
        "Active": true
    })));

    order.set_customer(Some(customer)).unwrap();
    order.set_amount(Some(Amount::of(99.5, "EUR").unwrap())).unwrap();

    let changes = order.resource().raw_changes().unwrap();
    let keys: Vec<&String> = changes.keys().collect();
    assert_eq!(keys, ["Customer", "Amount"]);

    let customer = changes.get("Customer").and_then(RawValue::as_object).unwrap();
    assert_eq!(customer.read().len(), 1);
    assert!(customer.read().contains_key(ODATA_ID));

    let amount = changes.get("Amount").and_then(RawValue::as_object).unwrap();
    assert_eq!(amount.read().get("Currency"), Some(&RawValue::from("EUR")));
}

#[test]
fn test_update_merges_without_marking_changes() {
    let customer = Customer::create(raw(serde_json::json!({
        "Name": "Contoso",
        "Address": {"City": "Sofia", "Street": "Main 1"}
    })));

    let changed = customer.resource().update(&raw(serde_json::json!({
        "Active": true,
        "Address": {"City": "Plovdiv"}
    })));

    assert!(changed);
    assert!(!customer.resource().is_modified());
    assert!(customer.active().unwrap());
    let address = customer.address().unwrap().unwrap();
    assert_eq!(address.city().unwrap().as_deref(), Some("Plovdiv"));
    assert_eq!(address.street().unwrap().as_deref(), Some("Main 1"));

    let again = customer.resource().update(&raw(serde_json::json!({"Active": true})));
    assert!(!again);
}

#[test]
fn test_clear_changes_of_named_properties() {
    let customer = Customer::new();
    customer.set_name(Some("A".to_string())).unwrap();
    customer.set_number(Some("C-1".to_string())).unwrap();
    customer.resource().clear_changes_of(["Name"]);

    assert_eq!(customer.resource().changed_properties(), vec!["Number".to_string()]);
}

#[test]
fn test_lines_set_through_collection_are_owned_by_order() {
    let order = SalesOrder::new();
    let line = SalesOrderLine::new();
    line.set_line_no(10).unwrap();
    order.set_lines(Some(vec![line.clone()]));
    order.resource().clear_changes();

    let lines = order.lines().unwrap().unwrap();
    assert_eq!(lines.items()[0], line);
    assert!(std::sync::Arc::ptr_eq(&lines, &order.lines().unwrap().unwrap()));

    order.set_lines(None);
    assert!(order.lines().unwrap().is_none());
    assert!(order.resource().is_property_modified("Lines"));
}

#[test]
fn test_entity_identity_and_equality() {
    let id = Uuid::parse_str("0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a").unwrap();
    let a = Customer::id_obj(id).unwrap();
    let b = Customer::create(raw(serde_json::json!({
        "@odata.id": "Crm_Customers(0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a)",
        "Name": "Contoso"
    })));

    assert_eq!(a, b);
    assert_eq!(a.id(), Some(id));
    assert!(!a.is_expanded());
    assert!(b.is_expanded());
    assert_eq!(a.identifier(), Some(EntityIdentifier::new("Crm_Customers", id)));
    assert_ne!(Customer::new(), Customer::new());
}

#[test]
fn test_multilanguage_values_are_tracked() {
    let product = Product::new();
    product
        .set_name(Some(MultilanguageString::from_pairs([("en", "Chair")]).unwrap()))
        .unwrap();
    product.resource().clear_changes();

    let name = product.name().unwrap().unwrap();
    name.set("bg", Some("Стол")).unwrap();

    assert!(product.resource().is_property_modified("Name"));
    assert_eq!(name.get("BG").unwrap().as_deref(), Some("Стол"));
    assert!(name.set("bul", Some("x")).is_err());
}

#[test]
fn test_registry_resolves_subtypes_by_discriminator() {
    let registry = resources::registry();
    let payload = raw(serde_json::json!({"@odata.type": "Erp.Crm_Sales_SalesOrder"}));

    let resolved = registry.resolve(&DOCUMENT, &payload);
    assert!(std::ptr::eq(resolved, &SALES_ORDER));

    let unknown = raw(serde_json::json!({"@odata.type": "Erp.Crm_Sales_Unknown"}));
    assert!(std::ptr::eq(registry.resolve(&DOCUMENT, &unknown), &DOCUMENT));
}

#[test]
fn test_registry_creates_and_references_entities() {
    let registry = resources::registry();
    let customer = registry
        .create("Crm_Customers", raw(serde_json::json!({"Name": "Contoso"})))
        .unwrap();
    assert!(std::ptr::eq(customer.descriptor(), &CUSTOMER));

    let identifier: EntityIdentifier = "Crm_Sales_SalesOrders(7f3b7f0c-2c1d-4f6e-8a9b-0c1d2e3f4a5b)"
        .parse()
        .unwrap();
    let reference = registry.reference(&identifier).unwrap();
    assert!(std::ptr::eq(reference.descriptor(), &SALES_ORDER));
    assert_eq!(reference.identifier(), Some(identifier));

    assert!(matches!(
        registry.create("Nope_Things", RawMap::new()),
        Err(MissingMetadataError::UnknownEntitySet { .. })
    ));
}

#[test]
fn test_custom_namespace_registry_stamps_new_resources() {
    let registry = ResourceRegistry::new("Custom.").with(&CUSTOMER);
    let resource: Resource = registry.new_resource(&CUSTOMER);
    assert_eq!(resource.odata_type().as_deref(), Some("Custom.Crm_Customer"));
}

#[test]
fn test_insert_and_update_commands_carry_changes_only() {
    let order = SalesOrder::new();
    order.set_document_no(Some("SO-9".to_string())).unwrap();
    order.set_state(DocumentState::Released).unwrap();

    let insert = QueryCommand::insert(order.resource()).unwrap().unwrap();
    let payload: serde_json::Value = serde_json::from_str(insert.payload().unwrap()).unwrap();
    assert_eq!(payload["DocumentNo"], "SO-9");
    assert_eq!(payload["State"], "Released");
    assert!(payload.get("@odata.type").is_none());

    assert!(matches!(
        QueryCommand::update(order.resource()),
        Err(MissingMetadataError::NoIdentity { .. })
    ));

    order.resource().clear_changes();
    assert!(QueryCommand::insert(order.resource()).unwrap().is_none());
}

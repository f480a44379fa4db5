//! Integration tests for executing commands through a recording executor.
//!
//! These tests cover:
//! - Loading single entities and collections
//! - `first` and `count`
//! - Insert, update, delete and reload through [`DomainApi`]
//! - Bound action and function invocation

use std::collections::VecDeque;

use parking_lot::Mutex;
use uuid::Uuid;

use domain_api::model::{
    ApiResource, ConversionError, EntityIdentifier, EntityResource, RawMap, RawValue,
};
use domain_api::query::{
    CommandExecutor, CommandKind, EntityCommand, ExecutorError, HttpMethod, Param, Projection,
    QueryCommand, Shape,
};
use domain_api::resources::{
    self, Customer, Document, DocumentState, SalesOrder, CUSTOMER,
};
use domain_api::{DomainApi, DomainApiConfig, DomainApiError, ServiceRootUri};

const CUSTOMER_ID: &str = "0b9a8c2e-54f4-4b7e-9d3a-1f2e3d4c5b6a";
const ORDER_ID: &str = "7f3b7f0c-2c1d-4f6e-8a9b-0c1d2e3f4a5b";

/// Replays queued responses and records every executed command.
#[derive(Default)]
struct RecordingExecutor {
    responses: Mutex<VecDeque<Option<RawMap>>>,
    texts: Mutex<VecDeque<String>>,
    executed: Mutex<Vec<QueryCommand>>,
}

impl RecordingExecutor {
    fn respond(self, json: serde_json::Value) -> Self {
        self.responses.lock().push_back(Some(raw(json)));
        self
    }

    fn respond_empty(self) -> Self {
        self.responses.lock().push_back(None);
        self
    }

    fn respond_text(self, text: &str) -> Self {
        self.texts.lock().push_back(text.to_string());
        self
    }

    fn executed(&self) -> Vec<QueryCommand> {
        self.executed.lock().clone()
    }
}

impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, command: &QueryCommand) -> Result<Option<RawMap>, ExecutorError> {
        self.executed.lock().push(command.clone());
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| ExecutorError::new(format!("no response queued for {command}")))
    }

    async fn execute_text(&self, command: &QueryCommand) -> Result<String, ExecutorError> {
        self.executed.lock().push(command.clone());
        Ok(self.texts.lock().pop_front().unwrap_or_default())
    }
}

fn raw(json: serde_json::Value) -> RawMap {
    match RawValue::from(json) {
        RawValue::Object(node) => node.read().clone(),
        other => panic!("expected an object, got {}", other.kind_name()),
    }
}

fn api(executor: RecordingExecutor) -> DomainApi<RecordingExecutor> {
    let config = DomainApiConfig::builder()
        .service_root(ServiceRootUri::new("https://erp.example.com/api/domain/odata").unwrap())
        .build()
        .unwrap();
    DomainApi::new(executor, config, resources::registry())
}

fn customer_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "@odata.id": format!("Crm_Customers({CUSTOMER_ID})"),
        "Id": CUSTOMER_ID,
        "Name": name,
        "Active": true
    })
}

#[tokio::test]
async fn test_load_reads_collection_value() {
    let executor = RecordingExecutor::default().respond(serde_json::json!({
        "value": [customer_json("Contoso"), {"Name": "Fabrikam"}]
    }));
    let command = EntityCommand::<Customer>::new()
        .unwrap()
        .filter(|c| c.prop("Active").eq(true))
        .unwrap();

    let result = command.load(&executor).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].name().unwrap().as_deref(), Some("Contoso"));
    assert_eq!(result[1].name().unwrap().as_deref(), Some("Fabrikam"));
    assert_eq!(
        executor.executed()[0].uri_string(),
        "Crm_Customers?$filter=Active eq true"
    );
}

#[tokio::test]
async fn test_load_by_id_reads_single_entity() {
    let executor = RecordingExecutor::default().respond(customer_json("Contoso"));
    let id = Uuid::parse_str(CUSTOMER_ID).unwrap();

    let result = EntityCommand::<Customer>::new()
        .unwrap()
        .id(id)
        .load(&executor)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id(), Some(id));
    let executed = executor.executed();
    assert_eq!(executed[0].kind(), CommandKind::SingleEntity);
    assert_eq!(executed[0].uri_string(), format!("Crm_Customers({CUSTOMER_ID})"));
}

#[tokio::test]
async fn test_load_of_empty_response_is_empty() {
    let executor = RecordingExecutor::default().respond_empty();
    let result = EntityCommand::<Customer>::new().unwrap().load(&executor).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_load_rejects_responses_without_entities() {
    let executor = RecordingExecutor::default().respond(serde_json::json!({"error": "nope"}));
    let error = EntityCommand::<Customer>::new()
        .unwrap()
        .load(&executor)
        .await
        .unwrap_err();
    assert!(matches!(error, DomainApiError::Conversion(ConversionError::UnexpectedType { .. })));
}

#[tokio::test]
async fn test_load_resolves_subtypes_through_registry() {
    let executor = RecordingExecutor::default().respond(serde_json::json!({
        "value": [{"@odata.type": "Erp.Crm_Sales_SalesOrder", "DocumentNo": "SO-1"}]
    }));
    let api = api(executor);

    let loaded = api
        .command::<resources::SalesOrder>()
        .unwrap()
        .load(&api)
        .await
        .unwrap();

    assert!(std::ptr::eq(
        loaded[0].resource().descriptor(),
        &resources::SALES_ORDER
    ));
}

#[tokio::test]
async fn test_first_limits_to_one() {
    let executor = RecordingExecutor::default()
        .respond(serde_json::json!({"value": [customer_json("Contoso")]}))
        .respond(serde_json::json!({"value": []}));
    let command = EntityCommand::<Customer>::new()
        .unwrap()
        .filter(|c| c.prop("Name").starts_with("Con"))
        .unwrap();

    let first = command.first(&executor).await.unwrap().unwrap();
    assert_eq!(first.name().unwrap().as_deref(), Some("Contoso"));
    assert!(command.first(&executor).await.unwrap().is_none());

    let executed = executor.executed();
    assert_eq!(executed[0].top(), Some(1));
    assert_eq!(command.command().top(), None);
}

#[tokio::test]
async fn test_count_parses_text_response() {
    let executor = RecordingExecutor::default().respond_text("42\n").respond_text("many");
    let command = EntityCommand::<Customer>::new()
        .unwrap()
        .filter(|c| c.prop("Active").eq(true))
        .unwrap();

    assert_eq!(command.count(&executor).await.unwrap(), 42);
    let executed = executor.executed();
    assert_eq!(executed[0].kind(), CommandKind::Count);
    assert_eq!(executed[0].uri_string(), "Crm_Customers/$count?$filter=Active eq true");

    assert!(matches!(
        command.count(&executor).await,
        Err(DomainApiError::Executor(_))
    ));
}

struct CustomerName(Option<String>);

impl Projection<Customer> for CustomerName {
    fn shape() -> Shape {
        Shape::new().field("Name")
    }

    fn project(customer: &Customer) -> Result<Self, ConversionError> {
        customer.name().map(Self)
    }
}

#[tokio::test]
async fn test_projected_results() {
    let executor = RecordingExecutor::default().respond(serde_json::json!({
        "value": [{"Name": "Contoso"}, {"Name": null}]
    }));
    let command = EntityCommand::<Customer>::new()
        .unwrap()
        .select::<CustomerName>()
        .unwrap();

    let result = command.load(&executor).await.unwrap();
    let names: Vec<Option<&str>> = result.results().unwrap().iter().map(|n| n.0.as_deref()).collect();

    assert_eq!(names, [Some("Contoso"), None]);
    assert_eq!(executor.executed()[0].uri_string(), "Crm_Customers?$select=Name");
}

#[tokio::test]
async fn test_insert_sends_changes_and_merges_response() {
    let api = api(RecordingExecutor::default().respond(customer_json("Contoso")));
    let customer: Customer = api.new_resource();
    customer.set_name(Some("Contoso".to_string())).unwrap();

    api.insert(&customer).await.unwrap();

    assert_eq!(customer.id(), Some(Uuid::parse_str(CUSTOMER_ID).unwrap()));
    assert!(!customer.resource().is_modified());
    let executed = api.executor().executed();
    assert_eq!(executed[0].kind(), CommandKind::Insert);
    assert_eq!(executed[0].kind().http_method(), HttpMethod::Post);
    let payload: serde_json::Value = serde_json::from_str(executed[0].payload().unwrap()).unwrap();
    assert_eq!(payload, serde_json::json!({"Name": "Contoso"}));
}

#[tokio::test]
async fn test_update_without_changes_sends_nothing() {
    let api = api(RecordingExecutor::default());
    let customer = Customer::create(raw(customer_json("Contoso")));

    api.update(&customer).await.unwrap();

    assert!(api.executor().executed().is_empty());
}

#[tokio::test]
async fn test_update_patches_changed_properties() {
    let api = api(RecordingExecutor::default().respond_empty());
    let customer = Customer::create(raw(customer_json("Contoso")));
    customer.set_active(false).unwrap();

    api.update(&customer).await.unwrap();

    let executed = api.executor().executed();
    assert_eq!(executed[0].kind().http_method(), HttpMethod::Patch);
    assert_eq!(executed[0].uri_string(), format!("Crm_Customers({CUSTOMER_ID})"));
    assert_eq!(executed[0].payload(), Some(r#"{"Active":false}"#));
    assert!(!customer.resource().is_modified());
}

#[tokio::test]
async fn test_update_of_unsaved_entity_fails() {
    let api = api(RecordingExecutor::default());
    let customer: Customer = api.new_resource();
    customer.set_name(Some("New".to_string())).unwrap();

    let error = api.update(&customer).await.unwrap_err();
    assert!(matches!(error, DomainApiError::Metadata(_)));
}

#[tokio::test]
async fn test_delete_addresses_entity() {
    let api = api(RecordingExecutor::default());
    let identifier = EntityIdentifier::new("Crm_Customers", Uuid::parse_str(CUSTOMER_ID).unwrap());

    api.delete(&identifier).await.unwrap();

    let executed = api.executor().executed();
    assert_eq!(executed[0].kind(), CommandKind::Delete);
    assert_eq!(executed[0].to_string(), format!("Delete Crm_Customers({CUSTOMER_ID})"));
}

#[tokio::test]
async fn test_reload_merges_expanded_response() {
    let api = api(RecordingExecutor::default().respond(serde_json::json!({
        "@odata.id": format!("Crm_Sales_SalesOrders({ORDER_ID})"),
        "DocumentNo": "SO-1",
        "State": "Completed",
        "Customer": customer_json("Contoso")
    })));
    let order = SalesOrder::id_obj(Uuid::parse_str(ORDER_ID).unwrap()).unwrap();

    api.reload(&order, [domain_api::query::Expr::param().prop("Customer")]).await.unwrap();

    assert_eq!(order.state().unwrap(), DocumentState::Completed);
    assert_eq!(order.customer().unwrap().unwrap().name().unwrap().as_deref(), Some("Contoso"));
    assert!(!order.resource().is_modified());
    assert_eq!(
        api.executor().executed()[0].uri_string(),
        format!("Crm_Sales_SalesOrders({ORDER_ID})?$expand=Customer")
    );
}

#[tokio::test]
async fn test_reload_many_filters_by_ids() {
    let second = "5c1c5c8e-1f1c-4a6e-9a7c-3d9d8b6a2f10";
    let api = api(RecordingExecutor::default().respond(serde_json::json!({
        "value": [
            {"Id": second, "Name": "Second"},
            {"Id": CUSTOMER_ID, "Name": "First"}
        ]
    })));
    let customers = [
        Customer::id_obj(Uuid::parse_str(CUSTOMER_ID).unwrap()).unwrap(),
        Customer::id_obj(Uuid::parse_str(second).unwrap()).unwrap(),
        Customer::new(),
    ];

    api.reload_many(&customers, []).await.unwrap();

    assert_eq!(customers[0].name().unwrap().as_deref(), Some("First"));
    assert_eq!(customers[1].name().unwrap().as_deref(), Some("Second"));
    assert_eq!(customers[2].name().unwrap(), None);
    assert_eq!(
        api.executor().executed()[0].filter_clause(),
        Some(format!("Id in ({CUSTOMER_ID},{second})").as_str())
    );
}

#[tokio::test]
async fn test_invoke_action_posts_parameters() {
    let api = api(RecordingExecutor::default().respond(serde_json::json!({
        "@odata.context": "$metadata#Edm.Boolean",
        "value": true
    })));
    let order = SalesOrder::id_obj(Uuid::parse_str(ORDER_ID).unwrap()).unwrap();
    let customer = Customer::id_obj(Uuid::parse_str(CUSTOMER_ID).unwrap()).unwrap();

    let result = api
        .invoke_action(
            &order,
            "ChangeState",
            &[
                Param::new("newState", "Released"),
                Param::new("customer", customer.resource().clone()),
            ],
        )
        .await
        .unwrap();

    assert_eq!(result, Some(RawValue::Bool(true)));
    let executed = api.executor().executed();
    assert_eq!(executed[0].kind().http_method(), HttpMethod::Post);
    assert_eq!(
        executed[0].uri_string(),
        format!("Crm_Sales_SalesOrders({ORDER_ID})/ChangeState")
    );
    let payload: serde_json::Value = serde_json::from_str(executed[0].payload().unwrap()).unwrap();
    assert_eq!(
        payload,
        serde_json::json!({
            "newState": "Released",
            "customer": {"@odata.id": format!("Crm_Customers({CUSTOMER_ID})")}
        })
    );
}

#[tokio::test]
async fn test_invoke_function_returns_object_results() {
    let api = api(RecordingExecutor::default().respond(serde_json::json!({
        "Total": 12.5,
        "Currency": "EUR"
    })));
    let order = SalesOrder::id_obj(Uuid::parse_str(ORDER_ID).unwrap()).unwrap();

    let result = api.invoke_function(&order, "GetTotal", &[]).await.unwrap().unwrap();

    let object = result.as_object().unwrap();
    assert_eq!(object.read().get("Currency"), Some(&RawValue::from("EUR")));
    assert_eq!(api.executor().executed()[0].kind().http_method(), HttpMethod::Get);
}

#[tokio::test]
async fn test_executor_failures_surface_as_errors() {
    let api = api(RecordingExecutor::default());
    let order = SalesOrder::id_obj(Uuid::parse_str(ORDER_ID).unwrap()).unwrap();
    order.set_document_no(Some("SO-2".to_string())).unwrap();

    let error = api.update(&order).await.unwrap_err();
    assert!(matches!(error, DomainApiError::Executor(_)));
    assert!(order.resource().is_modified());
}

#[test]
fn test_absolute_uri_joins_service_root() {
    let api = api(RecordingExecutor::default());
    let command = api
        .command::<Customer>()
        .unwrap()
        .filter(|c| c.prop("Name").eq("A B"))
        .unwrap();

    assert_eq!(
        api.absolute_uri(&command),
        "https://erp.example.com/api/domain/odata/Crm_Customers?$filter=Name%20eq%20%27A%20B%27"
    );
    assert!(CUSTOMER.is_entity());
}

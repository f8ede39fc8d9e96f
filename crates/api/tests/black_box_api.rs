use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use catalog_export_api::app::{AppServices, build_router};
use catalog_export_auth::StaticTokenVerifier;
use catalog_export_core::{EntityId, LanguageId};
use catalog_export_infra::{
    pagination::{CursorPaginator, PageSize},
    store::InMemoryCatalogStore,
};
use catalog_export_products::{FieldPolicy, GroupTranslation, Product, PropertyGroup, PropertyGroupOption};
use catalog_export_sales::{Order, OrderLineItem};

const TOKEN: &str = "test-token";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(store: InMemoryCatalogStore, page_size: usize) -> Self {
        // Same router as prod, over a seeded in-memory store on an ephemeral port.
        let services = AppServices::in_memory(
            Arc::new(store),
            CursorPaginator::new(PageSize::new(page_size).unwrap()),
            FieldPolicy::Deny,
        );
        let app = build_router(services, Arc::new(StaticTokenVerifier::new(TOKEN)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = reqwest::Client::new()
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn color_group() -> PropertyGroup {
    PropertyGroup {
        id: EntityId::new(),
        name: "Color".to_string(),
        translations: vec![GroupTranslation {
            language_id: LanguageId::new(),
            name: Some("Color".to_string()),
        }],
    }
}

fn option(group: &PropertyGroup, value: &str) -> PropertyGroupOption {
    PropertyGroupOption {
        id: EntityId::new(),
        group_id: group.id,
        name: value.to_string(),
        group: Some(group.clone()),
    }
}

/// Products with cursors 5, 7 and 9; 7 is a variant of 5.
fn seeded_store() -> InMemoryCatalogStore {
    let color = color_group();

    let mut parent = Product::new(EntityId::new(), 5, "SW-5");
    let mut variant = Product::new(EntityId::new(), 7, "SW-5.1");
    variant.parent_id = Some(parent.id);
    variant.options = vec![option(&color, "Red")];
    variant.properties = vec![option(&color, "Blue")];
    variant.fields.insert("media".to_string(), json!([{"id": "cover"}]));
    variant.fields.insert("stock".to_string(), json!(3));
    parent.child_count = 1;
    parent.children = vec![variant.clone()];

    let mut simple = Product::new(EntityId::new(), 9, "SW-9");
    simple.options = vec![option(&color, "Green")];

    let mut line = OrderLineItem::new(EntityId::new(), "product", "Shirt Red");
    line.product_id = Some(variant.id);
    line.product = Some(variant);
    let mut order = Order::new(EntityId::new(), 1, "10001");
    order.line_items = vec![line, OrderLineItem::new(EntityId::new(), "promotion", "Promo")];

    let store = InMemoryCatalogStore::new();
    store.upsert_product(parent).unwrap();
    store.upsert_product(simple).unwrap();
    store.upsert_order(order).unwrap();
    store
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn(InMemoryCatalogStore::new(), 1).await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_required_for_export_endpoints() {
    let srv = TestServer::spawn(seeded_store(), 1).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/export/product?from_id=0", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], json!("error"));
    assert_eq!(body["error"], json!("unauthorized"));

    let res = client
        .get(format!("{}/export/order?from_id=0", srv.base_url))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn export_token_header_is_accepted() {
    let srv = TestServer::spawn(seeded_store(), 1).await;
    let res = reqwest::Client::new()
        .get(format!("{}/export/product?from_id=0", srv.base_url))
        .header("X-Export-Token", TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn from_id_is_validated() {
    let srv = TestServer::spawn(seeded_store(), 1).await;

    let (status, body) = srv.get("/export/product").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("bad_request"));

    let (status, _) = srv.get("/export/product?from_id=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Rejected by the query extractor itself, still answered as JSON.
    let (status, body) = srv.get("/export/order?from_id=1&from_id=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], json!("error"));
    assert_eq!(body["error"], json!("bad_request"));
}

#[tokio::test]
async fn product_page_reports_last_cursor() {
    let srv = TestServer::spawn(seeded_store(), 3).await;

    let (status, body) = srv.get("/export/product?from_id=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_name"], json!("product"));
    assert_eq!(body["last_id"], json!(9));

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);

    assert_eq!(data[0]["type"], json!("configurable"));
    assert_eq!(data[0]["parent_auto_increment"], json!(0));
    assert_eq!(data[0]["options"], json!([{"label": "Color", "value": "Red"}]));

    assert_eq!(data[1]["type"], json!("simple"));
    assert_eq!(data[1]["parent_auto_increment"], json!(5));
    assert_eq!(data[1]["stock"], json!(3));
    assert!(data[1].get("media").is_none());

    assert_eq!(data[2]["options"], json!([{"label": "Color", "value": "Green"}]));
}

#[tokio::test]
async fn default_page_size_is_one_and_resumes_inclusively() {
    let srv = TestServer::spawn(seeded_store(), 1).await;

    let (_, first) = srv.get("/export/product?from_id=0").await;
    assert_eq!(first["data"].as_array().unwrap().len(), 1);
    assert_eq!(first["last_id"], json!(5));

    let (_, next) = srv.get("/export/product?from_id=6").await;
    assert_eq!(next["last_id"], json!(7));
}

#[tokio::test]
async fn empty_page_has_null_last_id() {
    let srv = TestServer::spawn(seeded_store(), 1).await;

    let (status, body) = srv.get("/export/product?from_id=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"entity_name": "product", "data": [], "last_id": null}));
}

#[tokio::test]
async fn order_export_maps_product_line_items() {
    let srv = TestServer::spawn(seeded_store(), 10).await;

    let (status, body) = srv.get("/export/order?from_id=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_name"], json!("order"));
    assert_eq!(body["last_id"], json!(1));

    let items = body["data"][0]["lineItems"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    let product = &items[0]["product"];
    assert_eq!(product["autoIncrement"], json!(7));
    assert_eq!(product["parent"], json!({"autoIncrement": 5, "productNumber": "SW-5"}));
    assert_eq!(product["options"][0]["value"], json!("Red, Blue"));
    assert!(product["options"][0]["attribute_id"].is_string());
}

#[tokio::test]
async fn dangling_parent_is_reported_as_data_inconsistency() {
    let store = InMemoryCatalogStore::new();
    let mut orphan = Product::new(EntityId::new(), 1, "SW-1");
    orphan.parent_id = Some(EntityId::new());
    store.upsert_product(orphan).unwrap();
    let srv = TestServer::spawn(store, 1).await;

    let (status, body) = srv.get("/export/product?from_id=0").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("data_inconsistency"));
}

#[tokio::test]
async fn unknown_routes_are_json_not_found() {
    let srv = TestServer::spawn(InMemoryCatalogStore::new(), 1).await;

    let (status, body) = srv.get("/export/customer?from_id=0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], json!("error"));
    assert_eq!(body["error"], json!("not_found"));
}

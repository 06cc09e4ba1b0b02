use rust_decimal::Decimal;
use serde_json::json;
use storedash::prelude::*;
use storedash::session::Session;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sign_in(client: &Storedash, user_id: &str) {
    client.session().set_session(Session::new(
        "test-token".into(),
        "test-refresh".into(),
        user_id.into(),
        3600,
    ));
}

fn product_input(name: &str) -> ProductInput {
    ProductInput {
        name: name.into(),
        description: "A digital product".into(),
        price: Decimal::new(1999, 2),
        category: Category::Ebook,
        download_limit: 5,
        ..ProductInput::default()
    }
}

fn product_row(id: &str, user_id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": user_id,
        "name": name,
        "description": "A digital product",
        "price": 19.99,
        "discount": null,
        "category": "ebook",
        "file_url": null,
        "download_limit": 5,
        "download_count": 0,
        "license_key": null,
        "status": "active",
        "created_at": "2024-05-01T10:00:00Z"
    })
}

fn customer_row(id: &str, user_id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": user_id,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "ada@example.com",
        "created_at": "2024-05-01T10:00:00Z"
    })
}

fn membership_row(id: &str, user_id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": user_id,
        "name": "Pro",
        "description": "Everything included",
        "price": 29.99,
        "billing_cycle": "monthly",
        "features": ["Priority support"],
        "max_members": null,
        "member_count": 3,
        "status": "active",
        "created_at": "2024-05-01T10:00:00Z"
    })
}

fn sale_row(id: &str, user_id: &str, amount: f64) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": user_id,
        "product_id": "p-1",
        "customer_id": "c-1",
        "amount": amount,
        "status": "completed",
        "payment_method": "card",
        "created_at": "2024-05-02T08:30:00Z"
    })
}

/// Mount GET mocks for all four entity tables, scoped to `user_id`.
async fn mount_load_mocks(
    server: &MockServer,
    user_id: &str,
    products: serde_json::Value,
    customers: serde_json::Value,
    memberships: serde_json::Value,
    sales: serde_json::Value,
) {
    for (table, rows) in [
        ("products", products),
        ("customers", customers),
        ("memberships", memberships),
        ("sales", sales),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .and(query_param("user_id", format!("eq.{}", user_id)))
            .and(query_param("order", "created_at.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn add_product_requires_authentication() {
    let client = Storedash::new("http://localhost:1", "fake-key");
    let mut store = client.entity_store();

    let err = store.add_product(&product_input("Guide")).await.unwrap_err();

    assert!(matches!(err, Error::NotAuthenticated));
    assert!(store.products().is_empty());
}

#[tokio::test]
async fn add_product_appends_store_returned_row() {
    let mock_server = MockServer::start().await;

    // The payload must carry the owning user id
    Mock::given(method("POST"))
        .and(path("/rest/v1/products"))
        .and(body_partial_json(json!([{ "user_id": "u-1", "name": "Guide" }])))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([product_row("p-1", "u-1", "Guide")])),
        )
        .mount(&mock_server)
        .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();

    let created = store.add_product(&product_input("Guide")).await.unwrap();

    // The store-assigned id and timestamp win, never a local guess
    assert_eq!(created.id, "p-1");
    assert_eq!(created.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    assert_eq!(store.products().len(), 1);
    assert_eq!(store.products()[0].id, "p-1");
}

#[tokio::test]
async fn sync_loads_all_four_collections() {
    let mock_server = MockServer::start().await;
    mount_load_mocks(
        &mock_server,
        "u-1",
        json!([product_row("p-1", "u-1", "Guide"), product_row("p-2", "u-1", "Course")]),
        json!([customer_row("c-1", "u-1")]),
        json!([membership_row("m-1", "u-1")]),
        json!([sale_row("s-1", "u-1", 19.99)]),
    )
    .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();

    store.sync().await;

    assert_eq!(store.products().len(), 2);
    assert_eq!(store.customers().len(), 1);
    assert_eq!(store.memberships().len(), 1);
    assert_eq!(store.sales().len(), 1);
    assert_eq!(store.memberships()[0].member_count, 3);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn update_product_applies_server_truth_preserving_order() {
    let mock_server = MockServer::start().await;
    mount_load_mocks(
        &mock_server,
        "u-1",
        json!([product_row("p-1", "u-1", "Guide"), product_row("p-2", "u-1", "Course")]),
        json!([]),
        json!([]),
        json!([]),
    )
    .await;

    // The update is scoped by both the row id and the owner
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/products"))
        .and(query_param("id", "eq.p-1"))
        .and(query_param("user_id", "eq.u-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([product_row("p-1", "u-1", "Guide, 2nd ed.")])),
        )
        .mount(&mock_server)
        .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();
    store.sync().await;

    let updated = store
        .update_product("p-1", &product_input("Guide, 2nd ed."))
        .await
        .unwrap();

    assert_eq!(updated.name, "Guide, 2nd ed.");
    assert_eq!(store.products().len(), 2);
    assert_eq!(store.products()[0].name, "Guide, 2nd ed.");
    assert_eq!(store.products()[1].id, "p-2");
}

#[tokio::test]
async fn failed_update_leaves_collection_untouched() {
    let mock_server = MockServer::start().await;
    mount_load_mocks(
        &mock_server,
        "u-1",
        json!([product_row("p-1", "u-1", "Guide")]),
        json!([]),
        json!([]),
        json!([]),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "42501",
            "message": "permission denied for table products"
        })))
        .mount(&mock_server)
        .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();
    store.sync().await;

    let err = store
        .update_product("p-1", &product_input("Hijacked"))
        .await
        .unwrap_err();

    match err {
        Error::Store(details) => {
            assert_eq!(details.status, Some(403));
            assert_eq!(details.code.as_deref(), Some("42501"));
        }
        other => panic!("expected store error, got {:?}", other),
    }
    assert_eq!(store.products()[0].name, "Guide");
}

#[tokio::test]
async fn delete_product_removes_only_the_target() {
    let mock_server = MockServer::start().await;
    mount_load_mocks(
        &mock_server,
        "u-1",
        json!([product_row("p-1", "u-1", "Guide"), product_row("p-2", "u-1", "Course")]),
        json!([]),
        json!([]),
        json!([]),
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/products"))
        .and(query_param("id", "eq.p-1"))
        .and(query_param("user_id", "eq.u-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();
    store.sync().await;

    store.delete_product("p-1").await.unwrap();

    assert_eq!(store.products().len(), 1);
    assert_eq!(store.products()[0].id, "p-2");
}

#[tokio::test]
async fn failed_delete_keeps_the_element() {
    let mock_server = MockServer::start().await;
    mount_load_mocks(
        &mock_server,
        "u-1",
        json!([product_row("p-1", "u-1", "Guide")]),
        json!([]),
        json!([]),
        json!([]),
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "connection to the database failed"
        })))
        .mount(&mock_server)
        .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();
    store.sync().await;

    let err = store.delete_product("p-1").await.unwrap_err();

    assert!(matches!(err, Error::Store(_)));
    assert_eq!(store.products().len(), 1);
}

#[tokio::test]
async fn add_sale_appends_audit_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/sales"))
        .and(body_partial_json(json!([{ "user_id": "u-1" }])))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([sale_row("s-1", "u-1", 20.0)])),
        )
        .mount(&mock_server)
        .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();

    let input = SaleInput {
        product_id: Some("p-1".into()),
        customer_id: Some("c-1".into()),
        amount: Decimal::from(20),
        ..SaleInput::default()
    };
    let created = store.add_sale(&input).await.unwrap();

    assert_eq!(created.id, "s-1");
    assert_eq!(store.sales().len(), 1);
    assert_eq!(store.sales()[0].amount_or_zero(), Decimal::from(20));
}

#[tokio::test]
async fn sign_out_clears_all_collections() {
    let mock_server = MockServer::start().await;
    mount_load_mocks(
        &mock_server,
        "u-1",
        json!([product_row("p-1", "u-1", "Guide")]),
        json!([customer_row("c-1", "u-1")]),
        json!([membership_row("m-1", "u-1")]),
        json!([sale_row("s-1", "u-1", 19.99)]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();
    store.sync().await;
    assert_eq!(store.products().len(), 1);

    client.session().sign_out().await.unwrap();
    store.sync().await;

    assert!(store.products().is_empty());
    assert!(store.customers().is_empty());
    assert!(store.memberships().is_empty());
    assert!(store.sales().is_empty());
}

#[tokio::test]
async fn failed_reload_leaves_prior_collections_in_place() {
    let mock_server = MockServer::start().await;

    // First load succeeds once per table, after which the store responds
    // with an error.
    for (table, rows) in [
        ("products", json!([product_row("p-1", "u-1", "Guide")])),
        ("customers", json!([customer_row("c-1", "u-1")])),
        ("memberships", json!([])),
        ("sales", json!([])),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "message": "service unavailable"
        })))
        .mount(&mock_server)
        .await;

    let client = Storedash::new(&mock_server.uri(), "fake-key");
    sign_in(&client, "u-1");
    let mut store = client.entity_store();
    store.sync().await;
    assert_eq!(store.products().len(), 1);

    let err = store.reload().await.unwrap_err();

    assert!(matches!(err, Error::Store(_)));
    assert_eq!(store.products().len(), 1);
    assert_eq!(store.customers().len(), 1);
    assert!(!store.is_loading());
}

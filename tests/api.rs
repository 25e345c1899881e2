use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use serde_json::{json, Value};
use tower::ServiceExt;

use dragon_mart::auth::{TokenService, TokenSubject};
use dragon_mart::models::user::Role;
use dragon_mart::store::memory::{
    MemoryOrderRepository, MemoryProductRepository, MemoryUserRepository,
};
use dragon_mart::{create_router, AppState};

const SECRET: &str = "integration-secret";
const ADMIN_EMAIL: &str = "admin@dragonmart.ae";
const ADMIN_PASSWORD: &str = "admin-pass";

#[fixture]
fn state() -> AppState {
    AppState::new(
        Arc::new(MemoryUserRepository::new()),
        Arc::new(MemoryProductRepository::new()),
        Arc::new(MemoryOrderRepository::new()),
        TokenService::new(SECRET),
    )
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, name: &str, email: &str) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "phone": "+971501112222",
            "password": "pa55word"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn customer_token(app: &Router) -> String {
    register(app, "Hamdan", "hamdan@example.com").await;
    login(app, "hamdan@example.com", "pa55word").await
}

async fn admin_token(state: &AppState, app: &Router) -> String {
    state
        .credentials
        .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

fn checkout_body(items: Value) -> Value {
    json!({
        "items": items,
        "customer": {
            "name": "Hamdan",
            "phone": "+971501112222",
            "address": "Dragon Mart 2, Dubai"
        }
    })
}

#[rstest]
#[tokio::test]
async fn root_reports_ok(state: AppState) {
    let app = create_router(state);

    let (status, body) = send(&app, Method::GET, "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
}

#[rstest]
#[tokio::test]
async fn unknown_route_is_a_json_404(state: AppState) {
    let app = create_router(state);

    let (status, body) = send(&app, Method::GET, "/nowhere", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_is_rejected(state: AppState) {
    let app = create_router(state);
    register(&app, "Hamdan", "hamdan@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Someone else",
            "email": "hamdan@example.com",
            "phone": "+971500000000",
            "password": "different"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is already registered");
}

#[rstest]
#[case(json!({ "name": "A", "email": "a@example.com", "phone": "1" }))]
#[case(json!({ "name": " ", "email": "a@example.com", "phone": "1", "password": "x" }))]
#[case(json!({}))]
#[tokio::test]
async fn registration_requires_every_field(state: AppState, #[case] payload: Value) {
    let app = create_router(state);

    let (status, body) = send(&app, Method::POST, "/api/auth/register", None, Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[rstest]
#[tokio::test]
async fn malformed_json_is_a_json_400(state: AppState) {
    let app = create_router(state);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[rstest]
#[tokio::test]
async fn login_returns_token_and_hash_free_user(state: AppState) {
    let app = create_router(state);
    register(&app, "Hamdan", "hamdan@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "hamdan@example.com", "password": "pa55word" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(body["user"]["role"], "customer");
    assert!(!body.to_string().contains("$2b$"));
    assert!(body["user"].get("passwordHash").is_none());
}

#[rstest]
#[case("hamdan@example.com", "wrong")]
#[case("ghost@example.com", "pa55word")]
#[tokio::test]
async fn bad_login_does_not_reveal_which_part_failed(
    state: AppState,
    #[case] email: &str,
    #[case] password: &str,
) {
    let app = create_router(state);
    register(&app, "Hamdan", "hamdan@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");
}

#[rstest]
#[tokio::test]
async fn me_returns_the_token_owner(state: AppState) {
    let app = create_router(state);
    let token = customer_token(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "hamdan@example.com");
    assert_eq!(body["name"], "Hamdan");
    assert_eq!(body["role"], "customer");
    assert!(body.get("user").is_none());
    assert!(!body.to_string().contains("$2b$"));
}

#[rstest]
#[tokio::test]
async fn me_rejects_missing_and_malformed_headers(state: AppState) {
    let app = create_router(state);

    let (status, _) = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some("a.b"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is malformed");
}

#[rstest]
#[tokio::test]
async fn expired_token_is_unauthenticated(state: AppState) {
    let tokens = state.tokens.clone();
    let app = create_router(state);
    let stale = tokens
        .issue_at(
            &TokenSubject {
                user_id: uuid::Uuid::new_v4(),
                email: "old@example.com".to_string(),
                role: Role::Customer,
            },
            Utc::now() - Duration::days(30),
        )
        .unwrap();

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&stale), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");
}

#[rstest]
#[tokio::test]
async fn seeding_twice_yields_the_fixed_catalogue_once(state: AppState) {
    let app = create_router(state);

    let (status, first) = send(&app, Method::POST, "/api/products/seed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    let (_, second) = send(&app, Method::POST, "/api/products/seed", None, None).await;

    let (status, listed) = send(&app, Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let listed = listed.as_array().unwrap();
    let seeded = second["data"].as_array().unwrap();
    assert_eq!(listed.len(), first["data"].as_array().unwrap().len());
    assert_eq!(listed, seeded);
    assert!(listed.iter().all(|product| product["currency"] == "AED"));
    assert!(listed.iter().all(|product| product["price"].is_number()));
}

#[rstest]
#[tokio::test]
async fn checkout_requires_a_token(state: AppState) {
    let app = create_router(state);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/checkout",
        None,
        Some(checkout_body(json!([{ "name": "Lantern", "price": 39.99, "quantity": 1 }]))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn checkout_with_empty_cart_is_rejected(state: AppState) {
    let app = create_router(state);
    let token = customer_token(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/checkout",
        Some(&token),
        Some(checkout_body(json!([]))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cart is empty");

    let (_, orders) = send(&app, Method::GET, "/orders", None, None).await;
    assert_eq!(orders, json!([]));
}

#[rstest]
#[tokio::test]
async fn checkout_records_a_pending_order(state: AppState) {
    let app = create_router(state);
    let token = customer_token(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/checkout",
        Some(&token),
        Some(checkout_body(json!([
            { "productId": "p-1", "name": "Lantern", "price": 39.99, "quantity": 2 }
        ]))),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let (_, orders) = send(&app, Method::GET, "/orders", None, None).await;
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], body["orderId"]);
    assert_eq!(orders[0]["status"], "Pending");
    assert!(orders[0]["createdAt"].is_string());
    assert_eq!(orders[0]["items"][0]["productId"], "p-1");
    assert_eq!(orders[0]["items"][0]["quantity"], 2);
}

#[rstest]
#[tokio::test]
async fn legacy_orders_are_listed_newest_first(state: AppState) {
    let app = create_router(state);

    for name in ["Aisha", "Bilal", "Chen"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/orders",
            None,
            Some(json!({
                "customerName": name,
                "phone": "+97150",
                "address": "Dubai",
                "items": [{ "name": "Tea set", "price": 149, "quantity": 1 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["customer"]["name"], name);
        assert!(body["ownerUserId"].is_null());
    }

    let (status, orders) = send(&app, Method::GET, "/orders", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = orders
        .as_array()
        .unwrap()
        .iter()
        .map(|order| order["customer"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Chen", "Bilal", "Aisha"]);
}

#[rstest]
#[tokio::test]
async fn legacy_order_without_items_is_rejected(state: AppState) {
    let app = create_router(state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        None,
        Some(json!({ "customerName": "Aisha", "phone": "+97150", "address": "Dubai" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cart is empty");
}

#[rstest]
#[tokio::test]
async fn admin_listing_is_gated_by_role(state: AppState) {
    let app = create_router(state.clone());
    let customer = customer_token(&app).await;

    let (status, _) = send(&app, Method::GET, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let admin = admin_token(&state, &app).await;
    let (status, body) = send(&app, Method::GET, "/api/orders", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[rstest]
#[tokio::test]
async fn admin_listing_resolves_owner_details(state: AppState) {
    let app = create_router(state.clone());
    let customer = customer_token(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/checkout",
        Some(&customer),
        Some(checkout_body(json!([{ "name": "Jade bracelet", "price": 89, "quantity": 1 }]))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    send(
        &app,
        Method::POST,
        "/orders",
        None,
        Some(json!({
            "customerName": "Walk-in",
            "phone": "+97150",
            "address": "Dubai",
            "items": [{ "name": "Cushion", "price": 45, "quantity": 3 }]
        })),
    )
    .await;

    let admin = admin_token(&state, &app).await;
    let (status, body) = send(&app, Method::GET, "/api/orders", Some(&admin), None).await;

    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders[0]["owner"].is_null());
    assert_eq!(
        orders[1]["owner"],
        json!({
            "name": "Hamdan",
            "email": "hamdan@example.com",
            "phone": "+971501112222"
        })
    );
}

#[rstest]
#[tokio::test]
async fn empty_checkout_is_reported_before_missing_customer_details(state: AppState) {
    let app = create_router(state);
    let token = customer_token(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/checkout",
        Some(&token),
        Some(json!({ "items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cart is empty");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/checkout",
        Some(&token),
        Some(json!({ "items": [{ "name": "Lantern", "price": 39.99, "quantity": 1 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Customer name and phone are required");
}

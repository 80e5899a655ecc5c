//! Fake storefront API for integration testing.
//!
//! Serves the fixture catalogue from an axum router bound to an ephemeral
//! port, records every request, and lets a test switch the shape of the
//! shop listing response.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use storefront_client::{ClientConfig, StorefrontClient};

use super::fixtures::{product_fixtures, shop_fixtures, GOOD_TOKEN};

/// Shape of the `/shops` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopsShape {
    Envelope,
    Bare,
    Garbage,
}

/// A request as seen by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct FakeState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shops_shape: Arc<Mutex<ShopsShape>>,
    shops_login_required: Arc<Mutex<bool>>,
}

impl FakeState {
    fn record(&self, path: String, query: &HashMap<String, String>, headers: &HeaderMap) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        self.requests.lock().unwrap().push(RecordedRequest {
            path,
            query: query.clone(),
            authorization,
        });
    }
}

/// Handle to a running fake storefront.
pub struct FakeStorefront {
    pub base_url: String,
    state: FakeState,
}

impl FakeStorefront {
    /// Start the server on 127.0.0.1 with an ephemeral port.
    pub async fn start() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let state = FakeState {
            requests: Arc::new(Mutex::new(Vec::new())),
            shops_shape: Arc::new(Mutex::new(ShopsShape::Envelope)),
            shops_login_required: Arc::new(Mutex::new(false)),
        };

        let app = Router::new()
            .route("/api/v1/shops", get(list_shops))
            .route("/api/v1/shops/my-shops", get(my_shops))
            .route("/api/v1/shops/id/:id", get(shop_by_id))
            .route("/api/v1/shops/slug/:slug", get(shop_by_slug))
            .route("/api/v1/products", get(list_products))
            .route("/api/v1/products/seller/:seller_id", get(seller_products))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind fake storefront")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            state,
        })
    }

    pub fn client(&self) -> StorefrontClient {
        let config = ClientConfig::new(&self.base_url).expect("valid base url");
        StorefrontClient::new(&config).expect("client builds")
    }

    pub fn set_shops_shape(&self, shape: ShopsShape) {
        *self.state.shops_shape.lock().unwrap() = shape;
    }

    /// Make the public shop listing answer 401 to anonymous requests.
    pub fn require_login_for_shops(&self) {
        *self.state.shops_login_required.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

// ============================================================================
// Handlers
// ============================================================================

enum Auth {
    Missing,
    Valid,
    Invalid,
}

fn check_auth(headers: &HeaderMap) -> Auth {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        None => Auth::Missing,
        Some(value) if value == format!("Bearer {}", GOOD_TOKEN) => Auth::Valid,
        Some(_) => Auth::Invalid,
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthorized" })),
    )
        .into_response()
}

fn param<T: std::str::FromStr>(query: &HashMap<String, String>, key: &str, default: T) -> T {
    query
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn paginate(items: Vec<Value>, query: &HashMap<String, String>) -> Value {
    let page: usize = param(query, "page", 1);
    let limit: usize = param(query, "limit", 10);
    let total = items.len();
    let data: Vec<Value> = items
        .into_iter()
        .skip((page.max(1) - 1) * limit)
        .take(limit)
        .collect();

    json!({
        "success": true,
        "data": data,
        "meta": {
            "total": total,
            "page": page,
            "limit": limit,
            "totalPages": total.div_ceil(limit.max(1)),
        }
    })
}

fn filter_shops(query: &HashMap<String, String>) -> Vec<Value> {
    let search = query.get("search").map(|s| s.to_lowercase());
    let active: Option<bool> = query.get("active").and_then(|v| v.parse().ok());

    shop_fixtures()
        .into_iter()
        .filter(|shop| match &search {
            Some(term) => shop["name"]
                .as_str()
                .map(|n| n.to_lowercase().contains(term))
                .unwrap_or(false),
            None => true,
        })
        .filter(|shop| match active {
            Some(active) => shop["isActive"].as_bool() == Some(active),
            None => true,
        })
        .collect()
}

async fn list_shops(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record("/api/v1/shops".into(), &query, &headers);

    let login_required = *state.shops_login_required.lock().unwrap();
    match check_auth(&headers) {
        Auth::Invalid => return unauthorized(),
        Auth::Missing if login_required => return unauthorized(),
        _ => {}
    }

    let shops = filter_shops(&query);
    let shape = *state.shops_shape.lock().unwrap();
    match shape {
        ShopsShape::Envelope => Json(paginate(shops, &query)).into_response(),
        ShopsShape::Bare => Json(Value::Array(shops)).into_response(),
        ShopsShape::Garbage => Json(json!({ "shops": shops })).into_response(),
    }
}

async fn my_shops(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record("/api/v1/shops/my-shops".into(), &query, &headers);

    match check_auth(&headers) {
        Auth::Valid => {
            let mine: Vec<Value> = shop_fixtures().into_iter().take(1).collect();
            Json(paginate(mine, &query)).into_response()
        }
        _ => unauthorized(),
    }
}

async fn shop_by_id(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(format!("/api/v1/shops/id/{}", id), &HashMap::new(), &headers);

    match shop_fixtures().into_iter().find(|s| s["id"] == id.as_str()) {
        Some(shop) => Json(json!({ "data": shop })).into_response(),
        None => (StatusCode::NOT_FOUND, "Shop not found").into_response(),
    }
}

async fn shop_by_slug(
    State(state): State<FakeState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(format!("/api/v1/shops/slug/{}", slug), &HashMap::new(), &headers);

    match shop_fixtures().into_iter().find(|s| s["slug"] == slug.as_str()) {
        Some(shop) => Json(shop).into_response(),
        None => (StatusCode::NOT_FOUND, "Shop not found").into_response(),
    }
}

async fn list_products(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record("/api/v1/products".into(), &query, &headers);

    let shop_id = query.get("shopId").cloned();
    if shop_id.as_deref() == Some("shop-broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "count unavailable").into_response();
    }
    if shop_id.as_deref() == Some("shop-no-total") {
        // One item but no total in meta.
        let first: Vec<Value> = product_fixtures().into_iter().take(1).collect();
        return Json(json!({ "data": first, "meta": { "page": 1, "limit": 1 } })).into_response();
    }

    let products: Vec<Value> = product_fixtures()
        .into_iter()
        .filter(|p| match &shop_id {
            Some(id) => p["shopId"] == id.as_str(),
            None => true,
        })
        .collect();

    Json(paginate(products, &query)).into_response()
}

async fn seller_products(
    State(state): State<FakeState>,
    Path(seller_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record(
        format!("/api/v1/products/seller/{}", seller_id),
        &query,
        &headers,
    );

    match check_auth(&headers) {
        Auth::Valid => {}
        _ => return unauthorized(),
    }

    let products: Vec<Value> = product_fixtures()
        .into_iter()
        .filter(|p| p["sellerId"] == seller_id.as_str())
        .collect();

    let mut body = paginate(products, &query);
    // Seller listings carry their items under `products`.
    if let Some(data) = body.as_object_mut().and_then(|o| o.remove("data")) {
        body["products"] = data;
    }
    Json(body).into_response()
}

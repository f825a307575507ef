//! Integration tests for the E-Shop cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eshop-integration-tests
//! ```
//!
//! No external services are needed. Each test starts a [`MockCartBackend`]
//! on an ephemeral local port and points a real `CartApiClient` at it.
//!
//! # Mock backend behavior
//!
//! - Product ids are returned in extended-JSON form (`{ "$oid": "..." }`)
//! - Repeated adds merge into one line; an optional stock limit caps quantities
//! - A session that never added anything gets a body without `items`
//! - Any route can be made to fail with a 500, and every route can be slowed down

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Routes of the mock backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    GetCart,
    AddItem,
    RemoveItem,
    UpdateQuantity,
    ClearCart,
    CreateOrder,
}

/// A cart line as stored by the mock backend.
#[derive(Debug, Clone)]
struct Line {
    product_id: String,
    name: String,
    price: Value,
    image: String,
    category: String,
    quantity: u32,
}

impl Line {
    fn to_json(&self) -> Value {
        json!({
            "product": { "$oid": self.product_id },
            "name": self.name,
            "price": self.price,
            "image": self.image,
            "category": self.category,
            "quantity": self.quantity,
        })
    }
}

#[derive(Default)]
struct BackendState {
    cart_created: bool,
    lines: Vec<Line>,
    stock_limit: Option<u32>,
    failing: HashSet<Route>,
    partial_clear_failure: bool,
    latency: Option<Duration>,
    requests: HashMap<Route, usize>,
    authorization: Option<String>,
    clear_bodies: Vec<Value>,
    orders: Vec<Value>,
}

type Shared = Arc<Mutex<BackendState>>;

/// An in-process cart backend serving the REST cart API under `/api`.
///
/// The server stops when the value is dropped.
pub struct MockCartBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockCartBackend {
    /// Start a backend on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the local listener cannot be bound.
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = router(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// API base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Make every request to `route` answer 500.
    pub async fn fail(&self, route: Route) {
        self.state.lock().await.failing.insert(route);
    }

    /// Stop failing requests to `route`.
    pub async fn recover(&self, route: Route) {
        self.state.lock().await.failing.remove(&route);
    }

    /// Make the next clear drop the first line and then answer 500.
    pub async fn fail_clear_partially(&self) {
        self.state.lock().await.partial_clear_failure = true;
    }

    /// Cap every line quantity at `limit`.
    pub async fn set_stock_limit(&self, limit: Option<u32>) {
        self.state.lock().await.stock_limit = limit;
    }

    /// Delay every response by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().await.latency = latency;
    }

    /// Number of requests received on `route`.
    pub async fn requests(&self, route: Route) -> usize {
        self.state.lock().await.requests.get(&route).copied().unwrap_or(0)
    }

    /// Number of requests received on any route.
    pub async fn total_requests(&self) -> usize {
        self.state.lock().await.requests.values().sum()
    }

    /// `Authorization` header of the most recent request.
    pub async fn last_authorization(&self) -> Option<String> {
        self.state.lock().await.authorization.clone()
    }

    /// JSON bodies received by the clear route, in order.
    pub async fn clear_bodies(&self) -> Vec<Value> {
        self.state.lock().await.clear_bodies.clone()
    }

    /// JSON bodies received by the order route, in order.
    pub async fn orders(&self) -> Vec<Value> {
        self.state.lock().await.orders.clone()
    }

    /// Quantities currently stored, keyed by product id.
    pub async fn quantities(&self) -> HashMap<String, u32> {
        self.state
            .lock()
            .await
            .lines
            .iter()
            .map(|line| (line.product_id.clone(), line.quantity))
            .collect()
    }
}

impl Drop for MockCartBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/add", post(add_item))
        .route("/cart/clear", delete(clear_cart))
        .route("/cart/{product_id}", delete(remove_item))
        .route("/cart/{product_id}/quantity", put(update_quantity))
        .route("/orders", post(create_order));

    Router::new().nest("/api", api).with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Record the request, apply latency, and decide whether it should fail.
async fn enter(state: &Shared, route: Route, headers: &HeaderMap) -> Result<(), Response> {
    let latency = {
        let mut s = state.lock().await;
        *s.requests.entry(route).or_default() += 1;
        s.authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        s.latency
    };

    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }

    if state.lock().await.failing.contains(&route) {
        return Err(server_error());
    }
    Ok(())
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Internal server error" })),
    )
        .into_response()
}

fn cart_body(state: &BackendState) -> Value {
    if state.cart_created {
        json!({ "items": state.lines.iter().map(Line::to_json).collect::<Vec<_>>() })
    } else {
        json!({ "message": "No cart found" })
    }
}

fn cap(quantity: u32, limit: Option<u32>) -> u32 {
    limit.map_or(quantity, |limit| quantity.min(limit))
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = enter(&state, Route::GetCart, &headers).await {
        return response;
    }
    Json(cart_body(&*state.lock().await)).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    product_id: String,
    name: String,
    price: Value,
    #[serde(default)]
    image: String,
    quantity: u32,
    #[serde(default)]
    category: String,
}

async fn add_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    if let Err(response) = enter(&state, Route::AddItem, &headers).await {
        return response;
    }

    let mut s = state.lock().await;
    s.cart_created = true;
    let limit = s.stock_limit;
    match s.lines.iter_mut().find(|l| l.product_id == body.product_id) {
        Some(line) => line.quantity = cap(line.quantity + body.quantity, limit),
        None => s.lines.push(Line {
            product_id: body.product_id,
            name: body.name,
            price: body.price,
            image: body.image,
            category: body.category,
            quantity: cap(body.quantity, limit),
        }),
    }
    Json(cart_body(&s)).into_response()
}

async fn remove_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Response {
    if let Err(response) = enter(&state, Route::RemoveItem, &headers).await {
        return response;
    }

    state
        .lock()
        .await
        .lines
        .retain(|l| l.product_id != product_id);
    Json(json!({ "message": "Item removed from cart" })).into_response()
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: u32,
}

async fn update_quantity(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(body): Json<QuantityBody>,
) -> Response {
    if let Err(response) = enter(&state, Route::UpdateQuantity, &headers).await {
        return response;
    }

    let mut s = state.lock().await;
    let limit = s.stock_limit;
    match s.lines.iter_mut().find(|l| l.product_id == product_id) {
        Some(line) => {
            line.quantity = cap(body.quantity, limit);
            Json(json!({ "message": "Quantity updated" })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Item not found in cart" })),
        )
            .into_response(),
    }
}

async fn clear_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(response) = enter(&state, Route::ClearCart, &headers).await {
        return response;
    }

    let mut s = state.lock().await;
    s.clear_bodies
        .push(serde_json::from_slice(&body).unwrap_or(Value::Null));

    if s.partial_clear_failure {
        s.partial_clear_failure = false;
        if !s.lines.is_empty() {
            s.lines.remove(0);
        }
        return server_error();
    }

    s.lines.clear();
    Json(json!({ "message": "Cart cleared" })).into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = enter(&state, Route::CreateOrder, &headers).await {
        return response;
    }

    let mut s = state.lock().await;
    s.orders.push(body.clone());
    let id = format!("order-{}", s.orders.len());
    (
        StatusCode::CREATED,
        Json(json!({
            "_id": id,
            "items": body.get("items").cloned().unwrap_or_default(),
            "isPaid": false,
        })),
    )
        .into_response()
}

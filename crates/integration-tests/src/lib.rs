//! Integration test support for Robe.
//!
//! [`MockBackend`] serves the shop backend's REST surface from memory on an
//! ephemeral localhost port, so the storefront and admin clients can be
//! exercised end to end without network access.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p robe-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await?;
//! backend.add_product(json!({"_id": "p1", "name": "Sharee", "price": 2500, "category": "sharee"}));
//! let dir = tempfile::tempdir()?;
//! let store = Storefront::new(backend.storefront_config(dir.path(), "60")?)?;
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path as UrlPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use robe_admin::config::AdminConfig;
use robe_storefront::config::StorefrontConfig;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Default)]
struct Backend {
    products: Mutex<Vec<Value>>,
    orders: Mutex<Vec<Value>>,
    coupons: Mutex<Vec<Value>>,
    users: Mutex<Vec<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    required_token: Mutex<Option<String>>,
    fail_orders: AtomicBool,
    wrap_lists: AtomicBool,
    next_id: AtomicU64,
}

impl Backend {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// A list body, bare or wrapped as `{ key: [...] }`.
    fn list(&self, key: &str, items: Vec<Value>) -> Json<Value> {
        if self.wrap_lists.load(Ordering::Relaxed) {
            let mut wrapped = Map::new();
            wrapped.insert(key.to_string(), Value::Array(items));
            Json(Value::Object(wrapped))
        } else {
            Json(Value::Array(items))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn id_of(value: &Value) -> Option<&str> {
    value.get("_id").and_then(Value::as_str)
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

/// Insert `value` with a fresh `_id`, returning the id.
fn insert(backend: &Backend, items: &Mutex<Vec<Value>>, prefix: &str, mut value: Value) -> Option<String> {
    let id = backend.next_id(prefix);
    value
        .as_object_mut()?
        .insert("_id".to_string(), Value::String(id.clone()));
    lock(items).push(value);
    Some(id)
}

fn remove(items: &Mutex<Vec<Value>>, id: &str) -> bool {
    let mut items = lock(items);
    let before = items.len();
    items.retain(|item| id_of(item) != Some(id));
    items.len() != before
}

// =============================================================================
// MockBackend
// =============================================================================

/// In-memory shop backend bound to `127.0.0.1` on a random port.
///
/// The server task is aborted on drop.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<Backend>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Bind and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(Backend::default());

        let app = Router::new()
            .route("/products", get(list_products).post(create_product))
            .route(
                "/products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/verify-coupon", post(verify_coupon))
            .route("/orders", get(list_orders).post(create_order))
            .route("/coupons", get(list_coupons).post(create_coupon))
            .route("/coupons/{id}", delete(delete_coupon))
            .route("/users", get(list_users))
            .route("/users/role/{email}", get(user_role))
            .route("/upload", post(upload))
            .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Base URL of the running backend.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Storefront configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if `shipping_fee` is not a valid price.
    pub fn storefront_config(
        &self,
        data_dir: &Path,
        shipping_fee: &str,
    ) -> Result<StorefrontConfig, robe_storefront::config::ConfigError> {
        let url = self.url();
        let data_dir = data_dir.display().to_string();
        StorefrontConfig::from_lookup(|key| match key {
            "ROBE_API_URL" => Some(url.clone()),
            "ROBE_DATA_DIR" => Some(data_dir.clone()),
            "ROBE_SHIPPING_FEE" => Some(shipping_fee.to_string()),
            _ => None,
        })
    }

    /// Admin configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if `token` fails admin token validation.
    pub fn admin_config(&self, token: Option<&str>) -> Result<AdminConfig, robe_admin::config::ConfigError> {
        let url = self.url();
        AdminConfig::from_lookup(|key| match key {
            "ROBE_ADMIN_API_URL" => Some(url.clone()),
            "ROBE_ADMIN_TOKEN" => token.map(str::to_string),
            _ => None,
        })
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Store a product document as-is (it should carry its own `_id`).
    pub fn add_product(&self, product: Value) {
        lock(&self.state.products).push(product);
    }

    pub fn add_user(&self, email: &str, role: &str) {
        let id = self.state.next_id("user");
        lock(&self.state.users).push(json!({
            "_id": id,
            "email": email,
            "name": email.split('@').next().unwrap_or_default(),
            "role": role,
        }));
    }

    pub fn add_coupon(&self, code: &str, discount: u32, user_email: &str) {
        let id = self.state.next_id("coupon");
        lock(&self.state.coupons).push(json!({
            "_id": id,
            "code": code,
            "discount": discount,
            "userEmail": user_email,
        }));
    }

    // =========================================================================
    // Behavior switches
    // =========================================================================

    /// Make `POST /orders` answer 500.
    pub fn fail_orders(&self, fail: bool) {
        self.state.fail_orders.store(fail, Ordering::Relaxed);
    }

    /// Serve lists as `{ "products": [...] }` instead of a bare array.
    pub fn wrap_lists(&self, wrap: bool) {
        self.state.wrap_lists.store(wrap, Ordering::Relaxed);
    }

    /// Answer 401 to any request without this bearer token.
    pub fn require_token(&self, token: &str) {
        *lock(&self.state.required_token) = Some(token.to_string());
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    #[must_use]
    pub fn products(&self) -> Vec<Value> {
        lock(&self.state.products).clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        lock(&self.state.orders).clone()
    }

    #[must_use]
    pub fn coupons(&self) -> Vec<Value> {
        lock(&self.state.coupons).clone()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Number of requests received for `method path`.
    #[must_use]
    pub fn hits(&self, method: &str, path: &str) -> usize {
        lock(&self.state.requests)
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

type Shared = State<Arc<Backend>>;

async fn record(State(state): Shared, request: Request, next: Next) -> Response {
    let recorded = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header("authorization"),
            request_id: header("x-request-id"),
        }
    };
    let authorized = lock(&state.required_token)
        .as_ref()
        .is_none_or(|token| recorded.authorization.as_deref() == Some(format!("Bearer {token}").as_str()));
    lock(&state.requests).push(recorded);

    if !authorized {
        return message(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    next.run(request).await
}

async fn list_products(State(state): Shared) -> Json<Value> {
    let products = lock(&state.products).clone();
    state.list("products", products)
}

async fn get_product(State(state): Shared, UrlPath(id): UrlPath<String>) -> Response {
    let found = lock(&state.products)
        .iter()
        .find(|p| id_of(p) == Some(id.as_str()))
        .cloned();
    found.map_or_else(
        || message(StatusCode::NOT_FOUND, "Product not found"),
        |product| Json(product).into_response(),
    )
}

async fn create_product(State(state): Shared, Json(body): Json<Value>) -> Response {
    match insert(&state, &state.products, "prod", body) {
        Some(id) => Json(json!({ "acknowledged": true, "insertedId": id })).into_response(),
        None => message(StatusCode::BAD_REQUEST, "expected a JSON object"),
    }
}

async fn update_product(
    State(state): Shared,
    UrlPath(id): UrlPath<String>,
    Json(body): Json<Value>,
) -> Response {
    let Some(changes) = body.as_object() else {
        return message(StatusCode::BAD_REQUEST, "expected a JSON object");
    };
    let mut products = lock(&state.products);
    let Some(product) = products
        .iter_mut()
        .find(|p| id_of(p) == Some(id.as_str()))
        .and_then(Value::as_object_mut)
    else {
        return message(StatusCode::NOT_FOUND, "Product not found");
    };
    for (key, value) in changes {
        product.insert(key.clone(), value.clone());
    }
    Json(json!({ "modifiedCount": 1 })).into_response()
}

async fn delete_product(State(state): Shared, UrlPath(id): UrlPath<String>) -> Response {
    if remove(&state.products, &id) {
        Json(json!({ "deletedCount": 1 })).into_response()
    } else {
        message(StatusCode::NOT_FOUND, "Product not found")
    }
}

async fn verify_coupon(State(state): Shared, Json(body): Json<Value>) -> Response {
    let code = body.get("code").and_then(Value::as_str).unwrap_or_default();
    let discount = lock(&state.coupons)
        .iter()
        .find(|c| {
            c.get("code")
                .and_then(Value::as_str)
                .is_some_and(|stored| stored.eq_ignore_ascii_case(code))
        })
        .and_then(|c| c.get("discount").cloned());

    match discount {
        Some(discount) => Json(json!({ "valid": true, "discountAmount": discount })).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "valid": false, "message": "Invalid coupon code" })),
        )
            .into_response(),
    }
}

async fn list_orders(State(state): Shared) -> Json<Value> {
    let orders = lock(&state.orders).clone();
    state.list("orders", orders)
}

async fn create_order(State(state): Shared, Json(body): Json<Value>) -> Response {
    if state.fail_orders.load(Ordering::Relaxed) {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    match insert(&state, &state.orders, "order", body) {
        Some(id) => Json(json!({ "acknowledged": true, "insertedId": id })).into_response(),
        None => message(StatusCode::BAD_REQUEST, "expected a JSON object"),
    }
}

async fn list_coupons(State(state): Shared) -> Json<Value> {
    let coupons = lock(&state.coupons).clone();
    state.list("coupons", coupons)
}

async fn create_coupon(State(state): Shared, Json(body): Json<Value>) -> Response {
    match insert(&state, &state.coupons, "coupon", body) {
        Some(id) => Json(json!({ "acknowledged": true, "insertedId": id })).into_response(),
        None => message(StatusCode::BAD_REQUEST, "expected a JSON object"),
    }
}

async fn delete_coupon(State(state): Shared, UrlPath(id): UrlPath<String>) -> Response {
    if remove(&state.coupons, &id) {
        Json(json!({ "deletedCount": 1 })).into_response()
    } else {
        message(StatusCode::NOT_FOUND, "Coupon not found")
    }
}

async fn list_users(State(state): Shared) -> Json<Value> {
    let users = lock(&state.users).clone();
    state.list("users", users)
}

async fn user_role(State(state): Shared, UrlPath(email): UrlPath<String>) -> Json<Value> {
    let role = lock(&state.users)
        .iter()
        .find(|u| u.get("email").and_then(Value::as_str) == Some(email.as_str()))
        .and_then(|u| u.get("role").cloned())
        .unwrap_or(Value::Null);
    Json(json!({ "role": role }))
}

async fn upload(State(state): Shared, Json(body): Json<Value>) -> Response {
    let is_image = body
        .get("image")
        .and_then(Value::as_str)
        .is_some_and(|data| data.starts_with("data:image/") && data.contains(";base64,"));
    if !is_image {
        return message(StatusCode::BAD_REQUEST, "expected an image data URL");
    }
    let id = state.next_id("img");
    Json(json!({ "url": format!("https://cdn.mock/uploads/{id}") })).into_response()
}

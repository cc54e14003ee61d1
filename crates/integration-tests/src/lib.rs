//! Integration tests for Moto Parts.
//!
//! The storefront and admin libraries are driven against [`TestServer`], an
//! in-process stand-in for the remote store API built with `axum`. It keeps
//! its records in memory, records every request it receives and can be told
//! to reject order headers or individual order lines.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p moto-parts-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let server = TestServer::start(FakeStore::seeded()).await;
//! let api = server.api();
//! api.products().await?;
//! api.products().await?;
//! assert_eq!(server.store().count("GET", "/products"), 1);
//! ```

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use moto_parts_core::{
    AddressId, BrandId, ModelId, Money, OrderId, OrderLineId, OrderStatus, PaymentMethod,
    ProductId, Rating, ReviewId, Role, UserId,
};
use moto_parts_storefront::AppState;
use moto_parts_storefront::api::{
    Address, ApiClient, Brand, Model, Order, OrderLine, Product, Review, User,
};
use moto_parts_storefront::config::{ApiConfig, ClientConfig};
use moto_parts_storefront::session::SessionStore;

/// Password of the seeded customer.
pub const CUSTOMER_PASSWORD: &str = "rider-password";
/// Password of the seeded admin.
pub const ADMIN_PASSWORD: &str = "admin-password";

// =============================================================================
// Store Data
// =============================================================================

/// A request as the fake API saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// JSON body, or `null` when there was none.
    pub body: Value,
}

/// A user together with the password the fake accepts for them.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub password: String,
}

/// Everything the fake API holds.
#[derive(Debug, Default)]
pub struct StoreData {
    pub brands: Vec<Brand>,
    pub models: Vec<Model>,
    pub products: Vec<Product>,
    pub accounts: Vec<Account>,
    pub addresses: Vec<(UserId, Address)>,
    pub orders: Vec<Order>,
    pub order_lines: Vec<(OrderId, OrderLine)>,
    pub reviews: Vec<Review>,
    pub requests: Vec<RecordedRequest>,
    /// Answer `POST /orders` with a server error.
    pub reject_orders: bool,
    /// Answer `POST /order-lines` with 422 for these products.
    pub reject_lines_for: HashSet<ProductId>,
    /// Hold `GET /products` answers this long after reading the data.
    pub listing_delay: Option<Duration>,
    next_id: i64,
}

impl StoreData {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared handle on the fake API's data.
#[derive(Debug, Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<StoreData>>,
}

impl FakeStore {
    /// A store with two brands, two models, three products, one customer
    /// with one address, one admin and a few past orders.
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::default();
        store.with(|data| {
            data.next_id = 100;

            data.brands = vec![brand(1, "Honda"), brand(2, "Yamaha")];
            data.models = vec![
                model(1, "CB500F", Some(1)),
                model(2, "MT-07", Some(2)),
            ];
            data.products = vec![
                product(1, "Brake pads", 1250, 20, Some(1)),
                product(2, "Chain kit", 8990, 3, Some(2)),
                product(3, "Air filter", 1500, 8, Some(2)),
            ];

            data.accounts = vec![
                Account {
                    user: user(1, "Marta", "Lopez", "marta@example.com", Role::Customer),
                    password: CUSTOMER_PASSWORD.to_string(),
                },
                Account {
                    user: user(2, "Store", "Admin", "admin@example.com", Role::Admin),
                    password: ADMIN_PASSWORD.to_string(),
                },
            ];
            data.addresses = vec![(
                UserId::new(1),
                Address {
                    id: AddressId::new(5),
                    street: "Gran Via 4".to_string(),
                    city: "Bilbao".to_string(),
                    country: "Spain".to_string(),
                    postal_code: "48001".to_string(),
                },
            )];

            data.orders = vec![
                past_order(10, 1, (2026, 2, 27), OrderStatus::Completed),
                past_order(11, 1, (2026, 3, 2), OrderStatus::Shipped),
                past_order(12, 3, (2026, 3, 15), OrderStatus::Pending),
                past_order(13, 1, (2026, 4, 1), OrderStatus::Pending),
            ];

            data.reviews = vec![Review {
                id: ReviewId::new(1),
                user_id: UserId::new(1),
                product_id: ProductId::new(1),
                rating: Rating::new(4).unwrap_or_default(),
                comment: "Good bite, little dust".to_string(),
                created_at: None,
                author: Some("Marta".to_string()),
            }];
        });
        store
    }

    /// Run `f` with exclusive access to the data.
    pub fn with<T>(&self, f: impl FnOnce(&mut StoreData) -> T) -> T {
        let mut data = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.with(|data| data.requests.clone())
    }

    /// Requests with this method and path.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.with(|data| {
            data.requests
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .cloned()
                .collect()
        })
    }

    /// How many requests with this method and path were received.
    #[must_use]
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests_to(method, path).len()
    }
}

fn brand(id: i64, name: &str) -> Brand {
    Brand {
        id: BrandId::new(id),
        name: name.to_string(),
        description: String::new(),
    }
}

fn model(id: i64, name: &str, brand: Option<i64>) -> Model {
    Model {
        id: ModelId::new(id),
        name: name.to_string(),
        description: String::new(),
        brand_id: brand.map(BrandId::new),
    }
}

fn product(id: i64, name: &str, cents: i64, stock: u32, model: Option<i64>) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("{name} for street bikes"),
        price: Money::from_cents(cents),
        stock,
        model_id: model.map(ModelId::new),
    }
}

fn user(id: i64, first: &str, last: &str, email: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: Some("612345678".to_string()),
        birth_date: NaiveDate::from_ymd_opt(1990, 4, 12),
        gender: None,
        role,
    }
}

fn past_order(id: i64, user: i64, (y, m, d): (i32, u32, u32), status: OrderStatus) -> Order {
    Order {
        id: OrderId::new(id),
        user_id: UserId::new(user),
        order_date: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single(),
        status,
        total_amount: Money::from_cents(2500),
        shipping_address: "Gran Via 4, Bilbao, Spain, 48001".to_string(),
        payment_method: PaymentMethod::Card,
        delivery_date: NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|day| day.checked_add_days(chrono::Days::new(7)))
            .unwrap_or_default(),
    }
}

// =============================================================================
// Server
// =============================================================================

/// The fake store API, listening on a random local port.
pub struct TestServer {
    store: FakeStore,
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Bind `127.0.0.1:0` and serve `store` until dropped.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(store: FakeStore) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = router(store.clone());
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { store, addr, task }
    }

    #[must_use]
    pub const fn store(&self) -> &FakeStore {
        &self.store
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// API settings pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL does not parse.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.base_url()).expect("Test server URL is valid")
    }

    /// A fresh client with its own catalog cache.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client fails to build.
    #[must_use]
    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.api_config()).expect("Failed to build API client")
    }

    /// Application state with an in-memory session.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client fails to build.
    #[must_use]
    pub fn state(&self) -> AppState {
        let config = ClientConfig {
            api: self.api_config(),
            session_dir: PathBuf::from(".moto-session-unused"),
            sentry_dsn: None,
            sentry_environment: None,
        };
        AppState::with_session(config, SessionStore::in_memory())
            .expect("Failed to build application state")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn router(store: FakeStore) -> Router {
    Router::new()
        // Auth
        .route("/auth/login", post(login))
        .route("/auth/register", post(accept))
        .route("/auth/reset-password", post(accept))
        // Users
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).put(accept).delete(accept))
        // Addresses
        .route("/addresses", post(create_address))
        .route(
            "/addresses/{id}",
            get(list_addresses).put(accept).delete(accept),
        )
        // Catalog
        .route("/brands", get(list_brands).post(accept))
        .route("/brands/{id}", put(accept).delete(accept))
        .route("/models", get(list_models).post(accept))
        .route("/models/{id}", put(accept).delete(accept))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Orders
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", put(update_order))
        .route("/orders/user/{id}", get(user_orders))
        .route("/orders/{id}/lines", get(order_lines))
        .route("/order-lines", post(create_order_line))
        // Reviews
        .route("/reviews", get(list_reviews).post(accept))
        .route("/reviews/{id}", put(accept).delete(accept))
        .route("/reviews/product/{id}", get(product_reviews))
        .route("/reviews/user/{id}", get(user_reviews))
        .layer(middleware::from_fn_with_state(store.clone(), record))
        .with_state(store)
}

/// Log the request, body included, before handing it on.
async fn record(State(store): State<FakeStore>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    store.with(|data| {
        data.requests.push(RecordedRequest {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            body: json,
        });
    });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// =============================================================================
// Handlers
// =============================================================================

/// Writes whose effect the tests only check through the request log.
async fn accept() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(store): State<FakeStore>, Json(body): Json<LoginBody>) -> Response {
    let account = store.with(|data| {
        data.accounts
            .iter()
            .find(|a| a.user.email == body.email && a.password == body.password)
            .map(|a| a.user.clone())
    });

    match account {
        Some(user) => Json(json!({ "userId": user.id, "role": user.role })).into_response(),
        None => (StatusCode::UNAUTHORIZED, "bad credentials").into_response(),
    }
}

async fn list_users(State(store): State<FakeStore>) -> Json<Vec<User>> {
    Json(store.with(|data| data.accounts.iter().map(|a| a.user.clone()).collect()))
}

async fn get_user(State(store): State<FakeStore>, Path(id): Path<i64>) -> Response {
    store
        .with(|data| {
            data.accounts
                .iter()
                .find(|a| a.user.id == UserId::new(id))
                .map(|a| a.user.clone())
        })
        .map_or_else(not_found, |user| Json(user).into_response())
}

async fn list_addresses(State(store): State<FakeStore>, Path(user): Path<i64>) -> Json<Vec<Address>> {
    Json(store.with(|data| {
        data.addresses
            .iter()
            .filter(|(owner, _)| *owner == UserId::new(user))
            .map(|(_, address)| address.clone())
            .collect()
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressBody {
    user_id: UserId,
    street: String,
    city: String,
    country: String,
    postal_code: String,
}

async fn create_address(State(store): State<FakeStore>, Json(body): Json<AddressBody>) -> StatusCode {
    store.with(|data| {
        let id = AddressId::new(data.next_id());
        data.addresses.push((
            body.user_id,
            Address {
                id,
                street: body.street,
                city: body.city,
                country: body.country,
                postal_code: body.postal_code,
            },
        ));
    });
    StatusCode::CREATED
}

async fn list_brands(State(store): State<FakeStore>) -> Json<Vec<Brand>> {
    Json(store.with(|data| data.brands.clone()))
}

async fn list_models(State(store): State<FakeStore>) -> Json<Vec<Model>> {
    Json(store.with(|data| data.models.clone()))
}

async fn list_products(State(store): State<FakeStore>) -> Json<Vec<Product>> {
    let (products, delay) = store.with(|data| (data.products.clone(), data.listing_delay));
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(products)
}

async fn get_product(State(store): State<FakeStore>, Path(id): Path<i64>) -> Response {
    store
        .with(|data| {
            data.products
                .iter()
                .find(|p| p.id == ProductId::new(id))
                .cloned()
        })
        .map_or_else(not_found, |product| Json(product).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    name: String,
    description: String,
    price: Money,
    stock: u32,
    model_id: ModelId,
}

impl ProductBody {
    fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            model_id: Some(self.model_id),
        }
    }
}

async fn create_product(State(store): State<FakeStore>, Json(body): Json<ProductBody>) -> StatusCode {
    store.with(|data| {
        let id = ProductId::new(data.next_id());
        data.products.push(body.into_product(id));
    });
    StatusCode::CREATED
}

async fn update_product(
    State(store): State<FakeStore>,
    Path(id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> StatusCode {
    let id = ProductId::new(id);
    store.with(|data| {
        match data.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                *product = body.into_product(id);
                StatusCode::NO_CONTENT
            }
            None => StatusCode::NOT_FOUND,
        }
    })
}

async fn delete_product(State(store): State<FakeStore>, Path(id): Path<i64>) -> StatusCode {
    store.with(|data| {
        data.products.retain(|p| p.id != ProductId::new(id));
    });
    StatusCode::NO_CONTENT
}

async fn list_orders(State(store): State<FakeStore>) -> Json<Vec<Order>> {
    Json(store.with(|data| data.orders.clone()))
}

async fn user_orders(State(store): State<FakeStore>, Path(user): Path<i64>) -> Json<Vec<Order>> {
    Json(store.with(|data| {
        data.orders
            .iter()
            .filter(|o| o.user_id == UserId::new(user))
            .cloned()
            .collect()
    }))
}

async fn order_lines(State(store): State<FakeStore>, Path(order): Path<i64>) -> Json<Vec<OrderLine>> {
    Json(store.with(|data| {
        data.order_lines
            .iter()
            .filter(|(id, _)| *id == OrderId::new(order))
            .map(|(_, line)| line.clone())
            .collect()
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody {
    user_id: UserId,
    status: OrderStatus,
    total_amount: Money,
    shipping_address: String,
    payment_method: PaymentMethod,
    delivery_date: NaiveDate,
}

async fn create_order(State(store): State<FakeStore>, Json(body): Json<OrderBody>) -> Response {
    store.with(|data| {
        if data.reject_orders {
            return (StatusCode::INTERNAL_SERVER_ERROR, "order storage unavailable").into_response();
        }

        let id = OrderId::new(data.next_id());
        data.orders.push(Order {
            id,
            user_id: body.user_id,
            order_date: Some(Utc::now()),
            status: body.status,
            total_amount: body.total_amount,
            shipping_address: body.shipping_address,
            payment_method: body.payment_method,
            delivery_date: body.delivery_date,
        });
        (StatusCode::CREATED, Json(json!({ "orderId": id }))).into_response()
    })
}

async fn update_order(
    State(store): State<FakeStore>,
    Path(id): Path<i64>,
    Json(order): Json<Order>,
) -> StatusCode {
    store.with(|data| {
        match data.orders.iter_mut().find(|o| o.id == OrderId::new(id)) {
            Some(stored) => {
                *stored = order;
                StatusCode::NO_CONTENT
            }
            None => StatusCode::NOT_FOUND,
        }
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderLineBody {
    order_id: OrderId,
    product_id: ProductId,
    quantity: u32,
}

async fn create_order_line(
    State(store): State<FakeStore>,
    Json(body): Json<OrderLineBody>,
) -> Response {
    store.with(|data| {
        if data.reject_lines_for.contains(&body.product_id) {
            return (StatusCode::UNPROCESSABLE_ENTITY, "product is out of stock").into_response();
        }
        let Some(product) = data.products.iter().find(|p| p.id == body.product_id).cloned()
        else {
            return not_found();
        };

        let id = OrderLineId::new(data.next_id());
        let subtotal = Money::new(product.price.amount() * Decimal::from(body.quantity));
        data.order_lines.push((
            body.order_id,
            OrderLine {
                id,
                product_id: product.id,
                product_name: Some(product.name),
                quantity: body.quantity,
                unit_price: product.price,
                subtotal,
            },
        ));
        StatusCode::CREATED.into_response()
    })
}

async fn list_reviews(State(store): State<FakeStore>) -> Json<Vec<Review>> {
    Json(store.with(|data| data.reviews.clone()))
}

async fn product_reviews(
    State(store): State<FakeStore>,
    Path(product): Path<i64>,
) -> Json<Vec<Review>> {
    Json(store.with(|data| {
        data.reviews
            .iter()
            .filter(|r| r.product_id == ProductId::new(product))
            .cloned()
            .collect()
    }))
}

async fn user_reviews(State(store): State<FakeStore>, Path(user): Path<i64>) -> Json<Vec<Review>> {
    Json(store.with(|data| {
        data.reviews
            .iter()
            .filter(|r| r.user_id == UserId::new(user))
            .cloned()
            .collect()
    }))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

// system-tests/tests/helpers/store_stub.rs
// ============================================================================
// Module: Store Stub
// Description: Seeded in-memory storefront API for system-tests.
// Purpose: Run the conformance catalog without a network dependency.
// Dependencies: axum, storefront-client, time, tokio
// ============================================================================

//! ## Overview
//! The stub serves the storefront resource layout from a fixed seed. Writes
//! are echoed but never persisted, like the public deployment. Faults bend one
//! behavior at a time so suites can prove the catalog notices.

use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde_json::json;
use storefront_client::Address;
use storefront_client::Cart;
use storefront_client::CartProduct;
use storefront_client::CreateProductRequest;
use storefront_client::Geolocation;
use storefront_client::LoginRequest;
use storefront_client::Name;
use storefront_client::Product;
use storefront_client::Rating;
use storefront_client::UpdateProductRequest;
use storefront_client::User;
use time::OffsetDateTime;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tokio::time::sleep;

// ============================================================================
// SECTION: Faults
// ============================================================================

/// How the stub answers for a resource that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingStyle {
    /// `200` with an empty body, as the public deployment does.
    #[default]
    EmptyBody,
    /// `200` with `null`.
    Null,
    /// `200` with `{}`.
    EmptyObject,
    /// `404` with an error payload.
    NotFound,
    /// `500` with an error payload.
    ServerError,
}

/// Deviations from a well-behaved store.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreFaults {
    /// Answer for missing resources.
    pub missing: MissingStyle,
    /// Delay added before every response.
    pub latency: Duration,
    /// One electronics product reports another category when listed.
    pub mislabel_category: bool,
    /// Carts after the first reference products that do not exist.
    pub dangling_cart_refs: bool,
    /// Every login is refused.
    pub reject_logins: bool,
    /// The second user's email has no `@`.
    pub malformed_user_email: bool,
}

// ============================================================================
// SECTION: Seed
// ============================================================================

/// Username of the seeded demo account.
pub const DEMO_USERNAME: &str = "mor_2314";
/// Password of the seeded demo account.
pub const DEMO_PASSWORD: &str = "83r5^_";
/// Token handed out for a successful login.
pub const DEMO_TOKEN: &str = "stub-token.mor_2314";

/// Offset added to product ids in dangling cart references.
const DANGLING_OFFSET: i64 = 900;

struct Seed {
    products: Vec<Product>,
    carts: Vec<Cart>,
    users: Vec<User>,
}

fn product(id: i64, title: &str, price: f64, category: &str) -> Product {
    Product {
        id,
        title: title.to_string(),
        price,
        description: format!("{title} from the seeded catalog"),
        category: category.to_string(),
        image: format!("https://store.test/img/{id}.jpg"),
        rating: Rating {
            rate: 3.9,
            count: 120,
        },
    }
}

fn cart(id: i64, user_id: i64, lines: &[(i64, i64)]) -> Cart {
    Cart {
        id,
        user_id,
        date: Some(OffsetDateTime::UNIX_EPOCH.saturating_add(time::Duration::days(18_322))),
        products: lines
            .iter()
            .map(|&(product_id, quantity)| CartProduct {
                product_id,
                quantity,
            })
            .collect(),
    }
}

fn user(id: i64, username: &str, password: &str, first: &str, last: &str) -> User {
    User {
        id,
        email: format!("{first}@gmail.com"),
        username: username.to_string(),
        password: password.to_string(),
        name: Name {
            firstname: first.to_string(),
            lastname: last.to_string(),
        },
        address: Address {
            city: "kilcoole".to_string(),
            street: "new road".to_string(),
            number: 7682,
            zipcode: "12926-3874".to_string(),
            geolocation: Geolocation {
                lat: "-37.3159".to_string(),
                long: "81.1496".to_string(),
            },
        },
        phone: "1-570-236-7033".to_string(),
    }
}

impl Seed {
    fn new(faults: &StoreFaults) -> Self {
        let products = vec![
            product(1, "Fjallraven Backpack", 109.95, "men's clothing"),
            product(2, "Mens Casual Slim Fit", 15.99, "men's clothing"),
            product(3, "John Hardy Chain Bracelet", 695.0, "jewelery"),
            product(4, "Solid Gold Petite Micropave", 168.0, "jewelery"),
            product(5, "WD 2TB Elements Portable Drive", 64.0, "electronics"),
            product(6, "SanDisk SSD PLUS 1TB", 109.0, "electronics"),
            product(7, "Rain Jacket Women Windbreaker", 39.99, "women's clothing"),
        ];
        let mut carts = vec![
            cart(1, 1, &[(1, 4), (2, 1), (3, 6)]),
            cart(2, 1, &[(2, 4), (1, 10), (4, 2)]),
            cart(3, 2, &[(7, 2), (5, 1)]),
        ];
        if faults.dangling_cart_refs {
            for line in carts.iter_mut().skip(1).flat_map(|cart| cart.products.iter_mut()) {
                line.product_id += DANGLING_OFFSET;
            }
        }
        let mut users = vec![
            user(1, "johnd", "m38rmF$", "john", "doe"),
            user(2, DEMO_USERNAME, DEMO_PASSWORD, "david", "morrison"),
        ];
        if faults.malformed_user_email
            && let Some(second) = users.get_mut(1)
        {
            second.email = "morrison.gmail.com".to_string();
        }
        Self {
            products,
            carts,
            users,
        }
    }

    fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category) {
                categories.push(product.category.clone());
            }
        }
        categories
    }
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Request metadata captured by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path as received.
    pub path: String,
    /// `Authorization` header, when present.
    pub authorization: Option<String>,
}

/// Handle for the stub store server; shuts it down on drop.
pub struct StoreStubHandle {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StoreStubHandle {
    /// Returns the store base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns captured requests in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }
}

impl Drop for StoreStubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

#[derive(Clone)]
struct StoreState {
    seed: Arc<Seed>,
    faults: StoreFaults,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Spawns a well-behaved store.
pub fn spawn_store() -> Result<StoreStubHandle, String> {
    spawn_store_with_faults(StoreFaults::default())
}

/// Spawns a store with the given faults on its own runtime thread.
pub fn spawn_store_with_faults(faults: StoreFaults) -> Result<StoreStubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("store stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("store stub listener nonblocking failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("store stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}/");

    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = StoreState {
        seed: Arc::new(Seed::new(&faults)),
        faults,
        requests: Arc::clone(&requests),
    };
    let app = router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(StoreStubHandle {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
        requests,
    })
}

fn router(state: StoreState) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/categories", get(list_categories))
        .route("/products/category/{name}", get(products_in_category))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).patch(update_product).delete(get_product),
        )
        .route("/carts", get(list_carts))
        .route("/carts/{id}", get(get_cart))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/auth/login", post(login))
        .layer(middleware::from_fn_with_state(state.clone(), record_and_delay))
        .with_state(state)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

async fn record_and_delay(
    State(state): State<StoreState>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization,
        });
    }
    if !state.faults.latency.is_zero() {
        sleep(state.faults.latency).await;
    }
    next.run(request).await
}

fn missing(style: MissingStyle) -> Response {
    let json = [(header::CONTENT_TYPE, "application/json")];
    match style {
        MissingStyle::EmptyBody => (StatusCode::OK, json, "").into_response(),
        MissingStyle::Null => (StatusCode::OK, json, "null").into_response(),
        MissingStyle::EmptyObject => (StatusCode::OK, json, "{}").into_response(),
        MissingStyle::NotFound => {
            (StatusCode::NOT_FOUND, Json(json!({"message": "not found", "code": 404})))
                .into_response()
        }
        MissingStyle::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "boom", "code": 500})))
                .into_response()
        }
    }
}

fn find<'a, T>(items: &'a [T], raw_id: &str, id_of: impl Fn(&T) -> i64) -> Option<&'a T> {
    let id: i64 = raw_id.parse().ok()?;
    items.iter().find(|item| id_of(item) == id)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
    sort: Option<String>,
}

async fn list_products(
    State(state): State<StoreState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let mut products = state.seed.products.clone();
    if query.sort.as_deref() == Some("desc") {
        products.reverse();
    }
    if let Some(limit) = query.limit {
        products.truncate(limit);
    }
    Json(products).into_response()
}

async fn list_categories(State(state): State<StoreState>) -> Response {
    Json(state.seed.categories()).into_response()
}

async fn products_in_category(
    State(state): State<StoreState>,
    Path(name): Path<String>,
) -> Response {
    let mut listed: Vec<Product> =
        state.seed.products.iter().filter(|product| product.category == name).cloned().collect();
    if listed.is_empty() {
        return match state.faults.missing {
            MissingStyle::NotFound | MissingStyle::ServerError => missing(state.faults.missing),
            _ => Json(listed).into_response(),
        };
    }
    if state.faults.mislabel_category
        && name == "electronics"
        && let Some(first) = listed.first_mut()
    {
        first.category = "jewelery".to_string();
    }
    Json(listed).into_response()
}

async fn get_product(State(state): State<StoreState>, Path(id): Path<String>) -> Response {
    find(&state.seed.products, &id, |product| product.id)
        .map_or_else(|| missing(state.faults.missing), |product| Json(product).into_response())
}

async fn create_product(
    State(state): State<StoreState>,
    Json(body): Json<CreateProductRequest>,
) -> Response {
    let next_id = state.seed.products.iter().map(|product| product.id).max().unwrap_or(0) + 1;
    let created = Product {
        id: next_id,
        title: body.title,
        price: body.price,
        description: body.description,
        category: body.category,
        image: body.image,
        rating: Rating::default(),
    };
    Json(created).into_response()
}

async fn update_product(
    State(state): State<StoreState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Response {
    let Some(existing) = find(&state.seed.products, &id, |product| product.id) else {
        return missing(state.faults.missing);
    };
    let mut updated = existing.clone();
    if let Some(title) = body.title {
        updated.title = title;
    }
    if let Some(price) = body.price {
        updated.price = price;
    }
    if let Some(description) = body.description {
        updated.description = description;
    }
    if let Some(image) = body.image {
        updated.image = image;
    }
    if let Some(category) = body.category {
        updated.category = category;
    }
    Json(updated).into_response()
}

async fn list_carts(State(state): State<StoreState>) -> Response {
    Json(state.seed.carts.clone()).into_response()
}

async fn get_cart(State(state): State<StoreState>, Path(id): Path<String>) -> Response {
    find(&state.seed.carts, &id, |cart| cart.id)
        .map_or_else(|| missing(state.faults.missing), |cart| Json(cart).into_response())
}

async fn list_users(State(state): State<StoreState>) -> Response {
    Json(state.seed.users.clone()).into_response()
}

async fn get_user(State(state): State<StoreState>, Path(id): Path<String>) -> Response {
    find(&state.seed.users, &id, |user| user.id)
        .map_or_else(|| missing(state.faults.missing), |user| Json(user).into_response())
}

async fn login(State(state): State<StoreState>, Json(body): Json<LoginRequest>) -> Response {
    let known = state
        .seed
        .users
        .iter()
        .any(|user| user.username == body.username && user.password == body.password);
    if known && !state.faults.reject_logins {
        let token = if body.username == DEMO_USERNAME {
            DEMO_TOKEN.to_string()
        } else {
            format!("stub-token.{}", body.username)
        };
        return Json(json!({ "token": token })).into_response();
    }
    (StatusCode::UNAUTHORIZED, "username or password is incorrect").into_response()
}

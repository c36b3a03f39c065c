// crates/storefront-client/src/client.rs
// ============================================================================
// Module: Storefront HTTP Client
// Description: One method per storefront resource operation.
// Purpose: Issue JSON requests with retries and capture response metadata.
// Dependencies: reqwest, serde, tokio, tracing, url
// ============================================================================

//! ## Overview
//! [`StoreClient`] is built once from [`ApiConfig`]: base URL, timeout and
//! retry policy are fixed for its lifetime and apply to every operation.
//!
//! The bearer token is the only mutable setting. It lives in a shared cell,
//! so setting it on a client also affects every clone of that client.
//! Scenarios that need isolated credentials build their own client.
//!
//! A [`RequestObserver`] sees each call once, after its URL is resolved and
//! before the first attempt is sent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;
use std::time::Instant;

use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use storefront_config::ApiConfig;
use tokio::time::sleep;
use tracing::debug;
use tracing::warn;
use url::Url;

use crate::error::ClientError;
use crate::models::Cart;
use crate::models::CreateProductRequest;
use crate::models::LoginRequest;
use crate::models::LoginResponse;
use crate::models::Product;
use crate::models::UpdateProductRequest;
use crate::models::User;
use crate::response::ApiResponse;
use crate::response::ApiResult;
use crate::response::ResponseMeta;
use crate::retry::FailureKind;
use crate::retry::RetryPolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type sent in `Content-Type` and `Accept`.
const JSON_MEDIA_TYPE: &str = "application/json";
/// User agent identifying the suite.
const USER_AGENT: &str = concat!("storefront-conformance/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Request Plan
// ============================================================================

/// Method, path and optional query/body for one call.
struct RequestPlan {
    /// HTTP method.
    method: Method,
    /// Path segments appended to the base URL.
    segments: Vec<String>,
    /// Query parameters.
    query: Vec<(&'static str, String)>,
    /// JSON body.
    body: Option<Value>,
}

impl RequestPlan {
    /// Starts a plan for `method` on the given path segments.
    fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Adds a query parameter.
    fn query(mut self, name: &'static str, value: impl ToString) -> Self {
        self.query.push((name, value.to_string()));
        self
    }

    /// Attaches a JSON body.
    fn body<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body).map_err(|err| ClientError::Encode(err.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }
}

// ============================================================================
// SECTION: Request Observer
// ============================================================================

/// A call as it is about to be sent.
#[derive(Clone, Copy)]
pub struct OutgoingRequest<'a> {
    /// HTTP method name.
    pub method: &'a str,
    /// Absolute URL including the query string.
    pub url: &'a Url,
    /// JSON body, when the call has one.
    pub body: Option<&'a Value>,
}

/// Callback invoked once per call with the resolved request.
pub type RequestObserver = Arc<dyn Fn(&OutgoingRequest<'_>) + Send + Sync>;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Typed client for the storefront API.
#[derive(Clone)]
pub struct StoreClient {
    /// Underlying HTTP client with default headers and timeout.
    http: Client,
    /// Base URL every path is appended to.
    base_url: Url,
    /// Retry policy for transient transport failures.
    retry: RetryPolicy,
    /// Bearer token shared by this client and its clones.
    auth_token: Arc<RwLock<Option<String>>>,
    /// Hook called before each call is sent.
    observer: Option<RequestObserver>,
}

impl fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .field("observed", &self.is_observed())
            .finish_non_exhaustive()
    }
}

impl StoreClient {
    /// Builds a client from the API configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the base URL is invalid or the HTTP
    /// client cannot be constructed.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let base_url =
            config.parsed_base_url().map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        Self::new(base_url, config.timeout(), RetryPolicy::from_config(config))
    }

    /// Builds a client from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the HTTP client cannot be
    /// constructed, or [`ClientError::InvalidUrl`] for a base URL that cannot
    /// carry a path.
    pub fn new(base_url: Url, timeout: Duration, retry: RetryPolicy) -> Result<Self, ClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!("{base_url} cannot be a base url")));
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        Ok(Self {
            http,
            base_url,
            retry,
            auth_token: Arc::new(RwLock::new(None)),
            observer: None,
        })
    }

    /// Returns this client with `observer` called before every call.
    ///
    /// The token cell stays shared with the original client.
    #[must_use]
    pub fn with_request_observer(mut self, observer: RequestObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Returns true when a request observer is installed.
    #[must_use]
    pub const fn is_observed(&self) -> bool {
        self.observer.is_some()
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Attaches a bearer token to every subsequent request of this client and
    /// its clones.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.auth_token.write() {
            *guard = Some(token.into());
        }
    }

    /// Removes the bearer token.
    pub fn clear_auth_token(&self) {
        if let Ok(mut guard) = self.auth_token.write() {
            *guard = None;
        }
    }

    /// Returns the current bearer token.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token.read().ok().and_then(|guard| guard.clone())
    }

    /// Builds the absolute URL for a path relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when the base URL cannot carry a
    /// path.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let plan = RequestPlan::new(Method::GET, segments.iter().copied());
        self.resource_url(&plan)
    }

    // ------------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------------

    /// `GET /products`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.execute(RequestPlan::new(Method::GET, ["products"])).await
    }

    /// `GET /products/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn get_product(&self, id: i64) -> ApiResult<Product> {
        self.execute(RequestPlan::new(Method::GET, ["products".to_string(), id.to_string()])).await
    }

    /// `GET /products?limit={limit}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn list_products_limited(&self, limit: i64) -> ApiResult<Vec<Product>> {
        self.execute(RequestPlan::new(Method::GET, ["products"]).query("limit", limit)).await
    }

    /// `GET /products?sort={sort}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn list_products_sorted(&self, sort: &str) -> ApiResult<Vec<Product>> {
        self.execute(RequestPlan::new(Method::GET, ["products"]).query("sort", sort)).await
    }

    /// `GET /products/categories`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn list_categories(&self) -> ApiResult<Vec<String>> {
        self.execute(RequestPlan::new(Method::GET, ["products", "categories"])).await
    }

    /// `GET /products/category/{name}`; the name is encoded as one segment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn list_products_in_category(&self, name: &str) -> ApiResult<Vec<Product>> {
        self.execute(RequestPlan::new(Method::GET, ["products", "category", name])).await
    }

    /// `POST /products`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on encoding or transport failure.
    pub async fn create_product(&self, body: &CreateProductRequest) -> ApiResult<Product> {
        self.execute(RequestPlan::new(Method::POST, ["products"]).body(body)?).await
    }

    /// `PUT /products/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on encoding or transport failure.
    pub async fn update_product(&self, id: i64, body: &UpdateProductRequest) -> ApiResult<Product> {
        let plan = RequestPlan::new(Method::PUT, ["products".to_string(), id.to_string()]);
        self.execute(plan.body(body)?).await
    }

    /// `PATCH /products/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on encoding or transport failure.
    pub async fn patch_product(&self, id: i64, body: &UpdateProductRequest) -> ApiResult<Product> {
        let plan = RequestPlan::new(Method::PATCH, ["products".to_string(), id.to_string()]);
        self.execute(plan.body(body)?).await
    }

    /// `DELETE /products/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn delete_product(&self, id: i64) -> ApiResult<Product> {
        self.execute(RequestPlan::new(Method::DELETE, ["products".to_string(), id.to_string()]))
            .await
    }

    // ------------------------------------------------------------------------
    // Carts
    // ------------------------------------------------------------------------

    /// `GET /carts`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn list_carts(&self) -> ApiResult<Vec<Cart>> {
        self.execute(RequestPlan::new(Method::GET, ["carts"])).await
    }

    /// `GET /carts/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn get_cart(&self, id: i64) -> ApiResult<Cart> {
        self.execute(RequestPlan::new(Method::GET, ["carts".to_string(), id.to_string()])).await
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// `GET /users`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.execute(RequestPlan::new(Method::GET, ["users"])).await
    }

    /// `GET /users/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn get_user(&self, id: i64) -> ApiResult<User> {
        self.execute(RequestPlan::new(Method::GET, ["users".to_string(), id.to_string()])).await
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    /// `POST /auth/login`. The returned token is not attached automatically.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on encoding or transport failure.
    pub async fn login(&self, body: &LoginRequest) -> ApiResult<LoginResponse> {
        self.execute(RequestPlan::new(Method::POST, ["auth", "login"]).body(body)?).await
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    /// Resolves a plan to an absolute URL.
    fn resource_url(&self, plan: &RequestPlan) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ClientError::InvalidUrl(format!("{} cannot be a base url", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(plan.segments.iter());
        }
        if !plan.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &plan.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Sends a plan, retrying transient failures, and decodes the response.
    async fn execute<T: DeserializeOwned>(&self, plan: RequestPlan) -> ApiResult<T> {
        let url = self.resource_url(&plan)?;
        if let Some(observer) = &self.observer {
            observer(&OutgoingRequest {
                method: plan.method.as_str(),
                url: &url,
                body: plan.body.as_ref(),
            });
        }
        let mut attempt = 0u32;
        loop {
            attempt = attempt.saturating_add(1);
            let mut request = self.http.request(plan.method.clone(), url.clone());
            if let Some(body) = &plan.body {
                request = request.json(body);
            }
            if let Some(token) = self.auth_token() {
                request = request.bearer_auth(token);
            }
            debug!(method = %plan.method, url = %url, attempt, "sending request");

            let started = Instant::now();
            let outcome = match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let headers = collect_headers(response.headers());
                    response.bytes().await.map(|body| (status, headers, body.to_vec()))
                }
                Err(err) => Err(err),
            };

            match outcome {
                Ok((status, headers, body)) => {
                    let meta = ResponseMeta {
                        method: plan.method.to_string(),
                        url: url.to_string(),
                        status,
                        elapsed: started.elapsed(),
                        headers,
                        body,
                        attempts: attempt,
                    };
                    debug!(
                        method = %plan.method,
                        url = %url,
                        status,
                        elapsed_ms = meta.elapsed.as_millis(),
                        "received response"
                    );
                    return Ok(ApiResponse::decode(meta));
                }
                Err(err) => {
                    let kind = FailureKind::classify(&err);
                    if self.retry.should_retry(kind, attempt) {
                        let delay = self.retry.delay_after(attempt);
                        warn!(
                            method = %plan.method,
                            url = %url,
                            attempt,
                            ?kind,
                            delay_ms = delay.as_millis(),
                            error = %err,
                            "transient failure, retrying"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(ClientError::from_send(&err, attempt));
                }
            }
        }
    }
}

/// Flattens headers to lowercase names with their first value.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected = BTreeMap::new();
    for (name, value) in headers {
        collected
            .entry(name.as_str().to_string())
            .or_insert_with(|| value.to_str().unwrap_or("<binary>").to_string());
    }
    collected
}

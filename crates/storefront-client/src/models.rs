// crates/storefront-client/src/models.rs
// ============================================================================
// Module: Storefront Models
// Description: Wire records for products, users, carts, and auth.
// Purpose: Mirror the API's JSON shapes for typed decoding.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Plain data-transfer records. They carry no invariants beyond field
//! presence; every field defaults so partial responses still decode, and the
//! scenarios decide what "valid" means.

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Products
// ============================================================================

/// Catalog product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Remote identifier.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Long description.
    pub description: String,
    /// Category name.
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Aggregate rating.
    pub rating: Rating,
}

/// Aggregate product rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rating {
    /// Average score.
    pub rate: f64,
    /// Number of ratings.
    pub count: i64,
}

/// Body for `POST /products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateProductRequest {
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Long description.
    pub description: String,
    /// Image URL.
    pub image: String,
    /// Category name.
    pub category: String,
}

/// Body for `PUT`/`PATCH /products/{id}`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Category name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// Registered user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Remote identifier.
    pub id: i64,
    /// Contact email.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Login password as served by the API.
    pub password: String,
    /// Personal name.
    pub name: Name,
    /// Postal address.
    pub address: Address,
    /// Phone number.
    pub phone: String,
}

/// Personal name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Name {
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// City.
    pub city: String,
    /// Street.
    pub street: String,
    /// House number.
    pub number: i64,
    /// Postal code.
    pub zipcode: String,
    /// Coordinates.
    pub geolocation: Geolocation,
}

/// Coordinates, served as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geolocation {
    /// Latitude.
    pub lat: String,
    /// Longitude.
    pub long: String,
}

// ============================================================================
// SECTION: Carts
// ============================================================================

/// Shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cart {
    /// Remote identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Creation date.
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    /// Line items.
    pub products: Vec<CartProduct>,
}

impl Cart {
    /// Returns true when the cart carries a date after the Unix epoch.
    #[must_use]
    pub fn has_date(&self) -> bool {
        self.date.is_some_and(|date| date > OffsetDateTime::UNIX_EPOCH)
    }
}

/// Cart line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CartProduct {
    /// Referenced product.
    pub product_id: i64,
    /// Units.
    pub quantity: i64,
}

// ============================================================================
// SECTION: Auth
// ============================================================================

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl LoginRequest {
    /// Builds a login request.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful login payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    /// Session token.
    pub token: String,
}

/// Error payload some endpoints return alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub message: String,
    /// Application error code.
    pub code: i64,
}

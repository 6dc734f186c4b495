//! Request and response types for the Buy Me A Gift API

use serde::{Deserialize, Serialize};

/// Authentication tokens returned by the login and signup endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Short-lived access token, sent as `Bearer <token>`
    pub token: String,
    /// Longer-lived refresh token used to obtain a new access token
    pub refresh: String,
}

/// Login / signup credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A product record as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub rank: i32,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
    /// Category id the product belongs to
    pub product_category: i64,
}

/// Payload for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub rank: i32,
    pub product_category: i64,
}

/// Reference to a product, used when adding to the wishlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub product: i64,
}

/// Response of the password reset request endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetResponse {
    pub success: bool,
    pub message: String,
}

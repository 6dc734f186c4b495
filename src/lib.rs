//! Buy Me A Gift Rust Client
//!
//! A Rust client library for the Buy Me A Gift REST API (products, user
//! accounts, wishlist), with bearer-token authentication, per-request token
//! verification, and auto-refresh on expiry.

pub mod api_client;
pub mod error;
pub mod token_store;
pub mod types;

pub use api_client::{ApiClient, ApiClientConfig, AuthFailureHook};
pub use error::{ClientError, Result};
pub use token_store::{MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use types::{AuthTokens, Credentials, NewProduct, PasswordResetResponse, Product, WishlistEntry};

//! API client with bearer-token authentication and automatic token refresh

use crate::error::{ClientError, Result};
use crate::token_store::{MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::types::*;
use async_singleflight::Group;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Singleflight key for the single refresh coordination point
const REFRESH_FLIGHT_KEY: &str = "token-refresh";

/// Macro to check HTTP response status and return error if not successful
macro_rules! check_response {
    ($response:expr) => {
        if !$response.status().is_success() {
            let status = $response.status();
            let body = $response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }
    };
}

#[derive(Serialize)]
struct VerifyRequest {
    token: String,
}

#[derive(Serialize)]
struct RefreshRequest {
    refresh: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Serialize)]
struct PasswordResetRequest {
    email: String,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Backend origin including the API prefix, e.g. `http://127.0.0.1:8000/api`
    pub base_url: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
        }
    }
}

/// Callback invoked on unrecoverable authentication failure (no refresh token,
/// or the refresh call itself failed)
///
/// A browser embedding would navigate to `/login` here; tests assert on it.
pub type AuthFailureHook = Arc<dyn Fn() + Send + Sync>;

/// Client for the Buy Me A Gift REST API
///
/// Holds two HTTP instances bound to the same origin: a plain one for the
/// public product listing and the internal verify/refresh calls, and an
/// authenticated one that runs the bearer-token protocol before every request.
pub struct ApiClient {
    config: ApiClientConfig,
    store: Arc<dyn TokenStore>,
    on_auth_failure: AuthFailureHook,
    http: Client,
    authed_http: Client,
    /// Singleflight group so concurrent requests with an expired token share
    /// one refresh call instead of racing their own
    refresh_singleflight: Group<String, String>,
}

impl ApiClient {
    /// Create a client with an in-memory token store and a no-op failure hook
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        Self::with_capabilities(config, Arc::new(MemoryTokenStore::new()), Arc::new(|| {}))
    }

    /// Create a client with injected storage and auth-failure capabilities
    ///
    /// # Arguments
    /// * `config` - Client configuration (base URL)
    /// * `store` - Key-value storage for the access and refresh tokens
    /// * `on_auth_failure` - Invoked when authentication cannot be recovered
    pub fn with_capabilities(
        config: ApiClientConfig,
        store: Arc<dyn TokenStore>,
        on_auth_failure: AuthFailureHook,
    ) -> Result<Self> {
        reqwest::Url::parse(&config.base_url)
            .map_err(|e| ClientError::Configuration(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            config,
            store,
            on_auth_failure,
            http: Client::new(),
            authed_http: Client::new(),
            refresh_singleflight: Group::new(),
        })
    }

    /// Get the token store (for advanced usage)
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// List the product catalog
    ///
    /// Public endpoint, no authentication. All failures are swallowed and
    /// yield an empty list, indistinguishable from an empty catalog.
    pub async fn get_products(&self) -> Vec<Product> {
        match self.try_get_products().await {
            Ok(products) => products,
            Err(e) => {
                debug!(error = %e, "Product listing failed, returning empty list");
                Vec::new()
            }
        }
    }

    async fn try_get_products(&self) -> Result<Vec<Product>> {
        let url = format!("{}/products", self.config.base_url);
        let response = self.http.get(&url).send().await?;
        check_response!(response);
        Ok(response.json().await?)
    }

    /// Create a product, returning the created record
    pub async fn add_product(&self, product: &NewProduct) -> Result<Product> {
        let response = self
            .authed_request(Method::POST, "/products/add")
            .await
            .json(product)
            .send()
            .await?;
        check_response!(response);
        Ok(response.json().await?)
    }

    /// Log in with email and password
    ///
    /// The returned access and refresh tokens are persisted into the store.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthTokens> {
        self.obtain_tokens("/user/login", credentials).await
    }

    /// Register a new account with email and password
    ///
    /// The returned access and refresh tokens are persisted into the store.
    pub async fn signup(&self, credentials: &Credentials) -> Result<AuthTokens> {
        self.obtain_tokens("/user/signup", credentials).await
    }

    async fn obtain_tokens(&self, path: &str, credentials: &Credentials) -> Result<AuthTokens> {
        let response = self
            .authed_request(Method::POST, path)
            .await
            .json(credentials)
            .send()
            .await?;
        check_response!(response);

        let tokens: AuthTokens = response.json().await?;
        self.store.set(ACCESS_TOKEN_KEY, &tokens.token);
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh);
        info!("Obtained access and refresh tokens");

        Ok(tokens)
    }

    /// Get the caller's wishlist
    pub async fn wishlist(&self) -> Result<Vec<Product>> {
        let response = self
            .authed_request(Method::GET, "/user/wishlist")
            .await
            .send()
            .await?;
        check_response!(response);
        Ok(response.json().await?)
    }

    /// Add a product to the caller's wishlist
    pub async fn add_to_wishlist(&self, entry: &WishlistEntry) -> Result<serde_json::Value> {
        let response = self
            .authed_request(Method::POST, "/user/wishlist/add")
            .await
            .json(entry)
            .send()
            .await?;
        check_response!(response);
        Ok(response.json().await?)
    }

    /// Request a password reset link for the given email
    pub async fn request_password_reset(&self, email: &str) -> Result<PasswordResetResponse> {
        let request = PasswordResetRequest {
            email: email.to_string(),
        };
        let response = self
            .authed_request(Method::POST, "/user/password_reset")
            .await
            .json(&request)
            .send()
            .await?;
        check_response!(response);
        Ok(response.json().await?)
    }

    /// Build a request on the authenticated instance, running the bearer-token
    /// protocol first
    async fn authed_request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.authed_http.request(method, &url);
        if let Some(header) = self.bearer_header().await {
            request = request.header(AUTHORIZATION, header);
        }
        request
    }

    /// Resolve the Authorization header value for an outgoing request
    ///
    /// This runs the interceptor protocol:
    /// - No stored token: the request goes out without a header.
    /// - Stored token verifies: `Bearer <token>`.
    /// - Verification says expired: refresh, then `Bearer <new>` on success.
    /// - Verification fails any other way, or the refresh cycle cannot
    ///   recover: the stale header is sent as-is and the backend gets the
    ///   final word.
    async fn bearer_header(&self) -> Option<String> {
        let token = self.store.get(ACCESS_TOKEN_KEY)?;
        let mut header = format!("Bearer {token}");

        match self.verify_token(&token).await {
            Ok(()) => {}
            Err(ClientError::TokenExpired) => {
                debug!("Token expired, refreshing");
                if let Some(access) = self.refresh_access_token().await {
                    header = format!("Bearer {access}");
                }
            }
            Err(e) => {
                warn!(error = %e, "Token verification failed, sending request with current token");
            }
        }

        Some(header)
    }

    /// Check the stored access token against the verification endpoint
    async fn verify_token(&self, token: &str) -> Result<()> {
        let url = format!("{}/token/verify", self.config.base_url);
        let request = VerifyRequest {
            token: token.to_string(),
        };

        let response = self.http.post(&url).json(&request).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::TokenExpired);
        }
        check_response!(response);
        Ok(())
    }

    /// Run the refresh sub-protocol, returning the new access token if one
    /// was obtained
    ///
    /// Concurrent callers share a single refresh via singleflight, so the
    /// store write and the failure hook fire once per actual attempt. When no
    /// refresh token is stored, or the refresh call fails, the auth-failure
    /// hook is invoked and `None` is returned; the in-flight request proceeds
    /// with its stale header.
    async fn refresh_access_token(&self) -> Option<String> {
        let Some(refresh_token) = self.store.get(REFRESH_TOKEN_KEY) else {
            warn!("Refresh token not found, redirecting to login");
            (self.on_auth_failure)();
            return None;
        };

        let (access, error, _shared) = self
            .refresh_singleflight
            .work(REFRESH_FLIGHT_KEY, async {
                match self.do_refresh(&refresh_token).await {
                    Ok(access) => {
                        self.store.set(ACCESS_TOKEN_KEY, &access);
                        info!("Access token refreshed successfully");
                        Ok(access)
                    }
                    Err(e) => {
                        let err_msg = e.to_string();
                        warn!(error = %err_msg, "Token refresh failed, redirecting to login");
                        (self.on_auth_failure)();
                        Err(err_msg)
                    }
                }
            })
            .await;

        if let Some(err) = error {
            debug!(error = %err, "Proceeding with stale access token");
        }
        access
    }

    /// Exchange the refresh token for a new access token
    async fn do_refresh(&self, refresh_token: &str) -> Result<String> {
        let url = format!("{}/refresh", self.config.base_url);
        let request = RefreshRequest {
            refresh: refresh_token.to_string(),
        };

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Authentication(format!(
                "Refresh request failed with status {status}: {body}"
            )));
        }

        let refresh_response: RefreshResponse = response.json().await?;
        Ok(refresh_response.access)
    }
}

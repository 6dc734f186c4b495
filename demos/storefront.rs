//! Storefront example
//!
//! Usage:
//!   cargo run --example storefront

use std::sync::Arc;

use buymeagift_client::{ApiClient, ApiClientConfig, Credentials, MemoryTokenStore, WishlistEntry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Configuration
    let base_url = std::env::var("BUYMEAGIFT_API")
        .unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());

    let email = std::env::var("BUYMEAGIFT_EMAIL")
        .unwrap_or_else(|_| "gifter@example.com".to_string());

    let password = std::env::var("BUYMEAGIFT_PASSWORD")
        .unwrap_or_else(|_| "hunter2".to_string());

    println!("=== Buy Me A Gift Client Example ===");
    println!("API: {}", base_url);
    println!();

    let client = ApiClient::with_capabilities(
        ApiClientConfig {
            base_url: base_url.clone(),
        },
        Arc::new(MemoryTokenStore::new()),
        Arc::new(|| println!("! Session expired, please log in again")),
    )?;

    // Public catalog, no authentication required
    let products = client.get_products().await;
    println!("✓ Catalog has {} products", products.len());
    for product in &products {
        println!("  - {} ({:.2})", product.name, product.price);
    }
    println!();

    // Log in; the returned tokens are persisted into the injected store
    println!("Logging in as {}...", email);
    let tokens = client.login(&Credentials { email, password }).await?;
    println!(
        "✓ Logged in, access token: {}...",
        &tokens.token[..tokens.token.len().min(20)]
    );
    println!();

    // Wishlist operations send the bearer token
    let wishlist = client.wishlist().await?;
    println!("✓ Wishlist has {} products", wishlist.len());

    if let Some(product) = products.first() {
        client
            .add_to_wishlist(&WishlistEntry {
                product: product.id,
            })
            .await?;
        println!("✓ Added {} to the wishlist", product.name);
    }

    println!();
    println!("Done!");

    Ok(())
}

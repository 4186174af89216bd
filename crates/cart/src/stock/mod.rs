//! Stock and product lookups.
//!
//! The cart store depends on [`StockService`] only; [`HttpStockService`]
//! talks to the stock API over HTTP:
//!
//! - `GET /stock/{id}` - available quantity, never cached
//! - `GET /products/{id}` - product metadata, cached in memory for 5 minutes

mod http;

pub use http::HttpStockService;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, StockEntry};
use thiserror::Error;

/// Errors that can occur when looking up stock or products.
#[derive(Debug, Error)]
pub enum StockError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Client could not be configured.
    #[error("Client error: {0}")]
    Client(String),
}

/// Source of available stock and product metadata.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Current available quantity for `id`.
    async fn stock(&self, id: ProductId) -> Result<StockEntry, StockError>;

    /// Metadata for `id`.
    async fn product(&self, id: ProductId) -> Result<Product, StockError>;
}

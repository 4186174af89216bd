//! HTTP client for the stock API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, StockEntry};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{StockError, StockService};
use crate::config::StockApiConfig;

const PRODUCT_CACHE_CAPACITY: u64 = 1000;
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Response bodies are truncated to this many characters in errors and logs.
const MAX_BODY_IN_ERROR: usize = 200;

/// Stock API client.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpStockService {
    inner: Arc<HttpStockServiceInner>,
}

struct HttpStockServiceInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl HttpStockService {
    /// Create a new stock API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &StockApiConfig) -> Result<Self, StockError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| StockError::Client(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(HttpStockServiceInner {
                client,
                base_url: with_trailing_slash(config.base_url.clone()),
                products,
            }),
        })
    }

    /// URL for `{base}/{collection}/{id}`.
    fn endpoint(&self, collection: &str, id: ProductId) -> Result<Url, StockError> {
        Ok(self.inner.base_url.join(&format!("{collection}/{id}"))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, StockError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(StockError::NotFound(url.path().to_string()));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %truncate(&body),
                "Stock API returned non-success status"
            );
            return Err(StockError::Api {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %truncate(&body),
                "Failed to parse stock API response"
            );
            StockError::Parse(e)
        })
    }
}

#[async_trait]
impl StockService for HttpStockService {
    #[instrument(level = "debug", skip_all, fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<StockEntry, StockError> {
        let url = self.endpoint("stock", id)?;
        let stock: StockEntry = self.get_json(url).await?;
        debug!(amount = stock.amount, "Fetched stock");
        Ok(stock)
    }

    #[instrument(level = "debug", skip_all, fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, StockError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Product cache hit");
            return Ok(product);
        }

        let url = self.endpoint("products", id)?;
        let product: Product = self.get_json(url).await?;
        self.inner.products.insert(id, product.clone()).await;
        debug!("Fetched product");
        Ok(product)
    }
}

impl std::fmt::Debug for HttpStockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStockService")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Ensure relative joins append to the base path instead of replacing its last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_BODY_IN_ERROR).collect()
}

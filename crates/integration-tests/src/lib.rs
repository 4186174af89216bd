//! Integration tests for Rocketshoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! No external services are needed. [`StubStockApi`] serves `/stock/{id}` and
//! `/products/{id}` from an in-process `axum` server on an ephemeral port, in
//! the same JSON shape as the real stock API.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::{
    CartStore, DEFAULT_STORAGE_KEY, FileStore, HttpStockService, Notifier, ProductId,
    StockApiConfig, StockEntry,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

#[derive(Default)]
struct Catalog {
    stock: HashMap<i64, u32>,
    products: HashMap<i64, Value>,
    failing: bool,
}

#[derive(Clone, Default)]
struct StubState {
    catalog: Arc<Mutex<Catalog>>,
    stock_requests: Arc<AtomicUsize>,
    product_requests: Arc<AtomicUsize>,
}

impl StubState {
    fn catalog(&self) -> MutexGuard<'_, Catalog> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process stand-in for the stock API.
///
/// The server task is aborted when the stub is dropped.
pub struct StubStockApi {
    state: StubState,
    base_url: Url,
    server: JoinHandle<()>,
}

impl StubStockApi {
    /// Bind to an ephemeral localhost port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = StubState::default();
        let app = Router::new()
            .route("/stock/{id}", get(get_stock))
            .route("/products/{id}", get(get_product))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub stock API");
        let addr = listener
            .local_addr()
            .expect("Failed to read stub stock API address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = format!("http://{addr}")
            .parse()
            .expect("Stub address is a valid URL");

        Self {
            state,
            base_url,
            server,
        }
    }

    /// Register a product, priced as the real API does (a JSON number).
    pub fn add_product(&self, id: i64, title: &str, price: f64, stock: u32) {
        let mut catalog = self.state.catalog();
        catalog.products.insert(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
            }),
        );
        catalog.stock.insert(id, stock);
    }

    pub fn set_stock(&self, id: i64, amount: u32) {
        self.state.catalog().stock.insert(id, amount);
    }

    /// Make every request fail with 500 until turned off again.
    pub fn set_failing(&self, failing: bool) {
        self.state.catalog().failing = failing;
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.stock_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }

    /// Client configuration pointing at this stub.
    #[must_use]
    pub fn config(&self) -> StockApiConfig {
        let mut config = StockApiConfig::new(self.base_url.clone());
        config.timeout = Duration::from_secs(5);
        config
    }

    /// An HTTP stock client pointing at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> HttpStockService {
        HttpStockService::new(&self.config()).expect("Failed to build stock client")
    }
}

impl Drop for StubStockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Open a cart store persisted in the JSON file at `path`.
pub fn open_store(
    stock: HttpStockService,
    path: &Path,
    notifier: Arc<dyn Notifier>,
) -> CartStore {
    CartStore::open(
        Arc::new(stock),
        Arc::new(FileStore::new(path)),
        notifier,
        DEFAULT_STORAGE_KEY,
    )
}

async fn get_stock(
    State(state): State<StubState>,
    UrlPath(id): UrlPath<i64>,
) -> Result<Json<StockEntry>, StatusCode> {
    state.stock_requests.fetch_add(1, Ordering::SeqCst);
    let catalog = state.catalog();
    if catalog.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    catalog
        .stock
        .get(&id)
        .map(|amount| {
            Json(StockEntry {
                id: ProductId::new(id),
                amount: *amount,
            })
        })
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_product(
    State(state): State<StubState>,
    UrlPath(id): UrlPath<i64>,
) -> Result<Json<Value>, StatusCode> {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    let catalog = state.catalog();
    if catalog.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    catalog
        .products
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

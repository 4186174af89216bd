//! Rocketshoes Cart - Cart store with local persistence and stock validation.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart and is the only thing that changes it
//! - [`StockService`] validates quantities against the stock API before any increase
//! - [`KeyValueStore`] holds the serialized cart under one key, rewritten on every change
//! - [`Notifier`] receives a [`CartNotice`] for every failed operation
//!
//! Operations never return errors. Callers read the result through
//! [`CartStore::cart`] or a [`CartStore::subscribe`] receiver.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use rocketshoes_cart::{
//!     CartConfig, CartStore, FileStore, HttpStockService, ProductId, TracingNotifier,
//! };
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::open(
//!     Arc::new(HttpStockService::new(&config.api)?),
//!     Arc::new(FileStore::new(&config.storage_path)),
//!     Arc::new(TracingNotifier),
//!     config.storage_key.clone(),
//! );
//!
//! store.add_product(ProductId::new(1)).await;
//! println!("{} items", store.cart().total_quantity());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod notify;
pub mod stock;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError, DEFAULT_STORAGE_KEY, StockApiConfig};
pub use error::CartError;
pub use notify::{CartNotice, Notifier, RecordingNotifier, TracingNotifier};
pub use stock::{HttpStockService, StockError, StockService};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{AmountUpdate, CartStore};

pub use rocketshoes_core::{Cart, LineItem, Price, Product, ProductId, StockEntry};

//! The cart store.
//!
//! [`CartStore`] owns the cart. Each operation validates against the
//! [`StockService`], derives a new [`Cart`], writes it to the
//! [`KeyValueStore`], and only then publishes it to subscribers. Failures are
//! reported to the [`Notifier`] and leave both the published cart and the
//! stored copy untouched.
//!
//! Operations are expected to run one at a time. Nothing serializes them:
//! two overlapping operations each read the current cart, and the one that
//! commits last wins.

use std::sync::Arc;

use rocketshoes_core::{Cart, LineItem, ProductId, StockEntry};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::CartError;
use crate::notify::{CartNotice, Notifier};
use crate::stock::StockService;
use crate::storage::{KeyValueStore, StorageError};

/// A direct quantity change for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountUpdate {
    pub product_id: ProductId,
    /// Desired quantity. Values `<= 0` are ignored.
    pub amount: i64,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    const fn name(self) -> &'static str {
        match self {
            Self::Add => "add_product",
            Self::Remove => "remove_product",
            Self::Update => "update_product_amount",
        }
    }

    const fn failure_notice(self) -> CartNotice {
        match self {
            Self::Add => CartNotice::AddFailed,
            Self::Remove => CartNotice::RemoveFailed,
            Self::Update => CartNotice::UpdateFailed,
        }
    }
}

/// Shopping cart state, persisted under a single storage key.
pub struct CartStore {
    stock: Arc<dyn StockService>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    key: String,
    state: watch::Sender<Arc<Cart>>,
}

impl CartStore {
    /// Open the store, loading the cart persisted under `key`.
    ///
    /// A missing key starts an empty cart. An unreadable or corrupt value is
    /// logged and also starts an empty cart; the stored value is left in place
    /// until the next successful change overwrites it.
    pub fn open(
        stock: Arc<dyn StockService>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let cart = load_cart(storage.as_ref(), &key);
        debug!(key = %key, items = cart.len(), "Cart loaded");
        let (state, _) = watch::channel(Arc::new(cart));

        Self {
            stock,
            storage,
            notifier,
            key,
            state,
        }
    }

    /// The current cart.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        Arc::clone(&self.state.borrow())
    }

    /// Observe every cart published from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.state.subscribe()
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Add one unit of a product.
    ///
    /// Appends a new line item with amount 1, or increments an existing one,
    /// provided stock covers the resulting amount.
    #[instrument(level = "debug", skip_all, fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        if let Err(err) = self.try_add_product(product_id).await {
            self.report(Operation::Add, &err);
        }
    }

    /// Remove a product's line item.
    #[instrument(level = "debug", skip_all, fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) {
        if let Err(err) = self.try_remove_product(product_id) {
            self.report(Operation::Remove, &err);
        }
    }

    /// Set a product's quantity.
    ///
    /// Amounts `<= 0` and products not in the cart are ignored silently.
    #[instrument(
        level = "debug",
        skip_all,
        fields(product_id = %update.product_id, amount = update.amount)
    )]
    pub async fn update_product_amount(&self, update: AmountUpdate) {
        let requested = match u64::try_from(update.amount) {
            Ok(requested) if requested > 0 => requested,
            _ => return,
        };
        if let Err(err) = self
            .try_update_product_amount(update.product_id, requested)
            .await
        {
            self.report(Operation::Update, &err);
        }
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let stock = self.stock.stock(product_id).await?;
        let current = self.cart();

        let next = if let Some(item) = current.get(product_id) {
            let amount = item.amount.saturating_add(1);
            ensure_covered(&stock, product_id, u64::from(amount))?;
            current
                .with_amount(product_id, amount)
                .ok_or(CartError::NotInCart(product_id))?
        } else {
            let product = self.stock.product(product_id).await?;
            ensure_covered(&stock, product_id, 1)?;
            current
                .with_appended(LineItem::new(product, 1))
                .ok_or(CartError::AlreadyInCart(product_id))?
        };

        let cart = self.commit(next)?;
        info!(
            amount = cart.amount_of(product_id),
            stock = stock.amount,
            "Added product to cart"
        );
        Ok(())
    }

    fn try_remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let next = self
            .cart()
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        let cart = self.commit(next)?;
        info!(items = cart.len(), "Removed product from cart");
        Ok(())
    }

    async fn try_update_product_amount(
        &self,
        product_id: ProductId,
        requested: u64,
    ) -> Result<(), CartError> {
        let stock = self.stock.stock(product_id).await?;

        let Some(amount) = u32::try_from(requested)
            .ok()
            .filter(|amount| stock.covers(*amount))
        else {
            // Subscribers that echoed the rejected value get the unchanged cart back.
            self.state.send_modify(|_| {});
            return Err(exceeded(&stock, product_id, requested));
        };

        let Some(next) = self.cart().with_amount(product_id, amount) else {
            debug!("Product not in cart, nothing to update");
            return Ok(());
        };

        self.commit(next)?;
        info!(amount, stock = stock.amount, "Updated product amount");
        Ok(())
    }

    /// Persist `next`, then publish it.
    fn commit(&self, next: Cart) -> Result<Arc<Cart>, CartError> {
        let value = serde_json::to_string(&next).map_err(StorageError::from)?;
        self.storage.set(&self.key, &value)?;

        let next = Arc::new(next);
        self.state.send_replace(Arc::clone(&next));
        Ok(next)
    }

    fn report(&self, operation: Operation, err: &CartError) {
        if err.is_user_recoverable() {
            debug!(operation = operation.name(), error = %err, "Cart operation rejected");
        } else {
            warn!(operation = operation.name(), error = %err, "Cart operation failed");
        }
        self.notifier.notify(err.notice(operation.failure_notice()));
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("cart", &self.cart())
            .finish_non_exhaustive()
    }
}

fn ensure_covered(
    stock: &StockEntry,
    product_id: ProductId,
    requested: u64,
) -> Result<(), CartError> {
    if requested <= u64::from(stock.amount) {
        Ok(())
    } else {
        Err(exceeded(stock, product_id, requested))
    }
}

const fn exceeded(stock: &StockEntry, product_id: ProductId, requested: u64) -> CartError {
    CartError::StockExceeded {
        product_id,
        requested,
        available: stock.amount,
    }
}

fn load_cart(storage: &dyn KeyValueStore, key: &str) -> Cart {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    match serde_json::from_str::<Vec<LineItem>>(&raw) {
        Ok(items) => {
            let stored = items.len();
            let cart = Cart::from_items(items);
            if cart.len() != stored {
                warn!(
                    key = %key,
                    stored,
                    kept = cart.len(),
                    "Stored cart had duplicate or empty items"
                );
            }
            cart
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Stored cart is not valid JSON, starting empty");
            Cart::new()
        }
    }
}

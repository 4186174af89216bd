//! Failure causes inside cart operations.
//!
//! `CartError` never leaves the store: each operation converts it into a
//! [`CartNotice`] for the notifier and logs the underlying cause.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::notify::CartNotice;
use crate::stock::StockError;
use crate::storage::StorageError;

/// Why a cart operation did not change the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds available stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    StockExceeded {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// The cart holds no item for this product.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The cart already holds an item for this product.
    #[error("Product {0} is already in the cart")]
    AlreadyInCart(ProductId),

    /// Stock or product lookup failed.
    #[error("Stock service error: {0}")]
    Stock(#[from] StockError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// The notice to show for this error, given the operation's generic failure notice.
    #[must_use]
    pub const fn notice(&self, on_failure: CartNotice) -> CartNotice {
        match self {
            Self::StockExceeded { .. } => CartNotice::StockExceeded,
            _ => on_failure,
        }
    }

    /// Whether the user can fix this by choosing a different quantity or product.
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(self, Self::StockExceeded { .. } | Self::NotInCart(_))
    }
}

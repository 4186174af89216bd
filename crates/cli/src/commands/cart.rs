//! Cart commands.
//!
//! Each invocation opens the file-backed cart, applies at most one operation,
//! and reports the resulting cart together with any notices it produced.
//!
//! # Environment Variables
//!
//! - `ROCKETSHOES_API_URL` - Stock API base URL
//! - `ROCKETSHOES_STORAGE_PATH` - Local storage file
//!
//! See `rocketshoes_cart::config` for the full list.

use std::sync::Arc;

use rocketshoes_cart::{
    AmountUpdate, Cart, CartConfig, CartNotice, CartStore, FileStore, HttpStockService,
    ProductId, RecordingNotifier, StockError,
};
use tracing::info;

/// One cart operation, or none for `show`.
#[derive(Debug, Clone, Copy)]
pub enum CartAction {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update(AmountUpdate),
}

/// Result of running a cart command.
#[derive(Debug)]
pub struct Outcome {
    pub cart: Arc<Cart>,
    pub notices: Vec<CartNotice>,
}

/// Open the cart described by `config` and apply `action`.
///
/// # Errors
///
/// Returns an error if the stock API client cannot be built. Failed cart
/// operations are not errors; they are returned as notices.
pub async fn run(config: &CartConfig, action: CartAction) -> Result<Outcome, StockError> {
    let stock = HttpStockService::new(&config.api)?;
    let notices = Arc::new(RecordingNotifier::new());
    let store = CartStore::open(
        Arc::new(stock),
        Arc::new(FileStore::new(&config.storage_path)),
        notices.clone(),
        config.storage_key.clone(),
    );

    info!(
        storage = %config.storage_path.display(),
        api = %config.api.base_url,
        ?action,
        "Running cart command"
    );

    match action {
        CartAction::Show => {}
        CartAction::Add(product_id) => store.add_product(product_id).await,
        CartAction::Remove(product_id) => store.remove_product(product_id),
        CartAction::Update(update) => store.update_product_amount(update).await,
    }

    Ok(Outcome {
        cart: store.cart(),
        notices: notices.take(),
    })
}

/// Render a cart as a plain-text table.
#[must_use]
pub fn format_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut lines: Vec<String> = cart
        .iter()
        .map(|item| {
            format!(
                "#{:<4} {:<40} {:>3} x {:>10} = {:>10}",
                item.id.as_i64(),
                item.name,
                item.amount,
                item.price.to_string(),
                item.subtotal().to_string(),
            )
        })
        .collect();

    lines.push(format!(
        "{} products, {} items, total {}",
        cart.len(),
        cart.total_quantity(),
        cart.total()
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use rocketshoes_cart::{LineItem, Price, Product};

    use super::*;

    fn line(id: i64, name: &str, cents: i64, amount: u32) -> LineItem {
        LineItem::new(
            Product {
                id: ProductId::new(id),
                name: name.to_string(),
                price: Price::from_cents(cents),
                image_url: String::new(),
            },
            amount,
        )
    }

    #[test]
    fn test_format_empty_cart() {
        assert_eq!(format_cart(&Cart::new()), "Cart is empty");
    }

    #[test]
    fn test_format_cart_lists_items_and_total() {
        let cart = Cart::from_items([
            line(1, "Tênis de Caminhada", 17_990, 2),
            line(3, "Tênis Adidas", 21_990, 1),
        ]);

        let output = format_cart(&cart);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines.first().is_some_and(|l| l.starts_with("#1")));
        assert!(lines.first().is_some_and(|l| l.contains("$359.80")));
        assert!(lines.get(1).is_some_and(|l| l.contains("Tênis Adidas")));
        assert_eq!(
            lines.get(2).copied(),
            Some("2 products, 3 items, total $579.70")
        );
    }
}

//! Cart line items and the cart itself.
//!
//! A [`Cart`] is an immutable value: every change produces a new `Cart` and
//! leaves the original untouched, so snapshots handed to observers stay valid.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// One product and the quantity held in the cart.
///
/// Serialized with the same field names as [`Product`], plus `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    #[serde(rename = "title", alias = "name")]
    pub name: String,
    pub price: Price,
    #[serde(rename = "image", alias = "imageUrl")]
    pub image_url: String,
    pub amount: u32,
}

impl LineItem {
    /// Create a line item for `product` holding `amount` units.
    #[must_use]
    pub fn new(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            image_url: product.image_url,
            amount,
        }
    }

    /// Unit price times amount.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// Ordered cart contents, unique by product ID.
///
/// Insertion order is display order. Serializes as a JSON array of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items in order.
    ///
    /// Later duplicates of an ID are discarded, as are items with `amount == 0`.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut kept: Vec<LineItem> = Vec::new();
        for item in items {
            if item.amount == 0 || kept.iter().any(|k| k.id == item.id) {
                continue;
            }
            kept.push(item);
        }
        Self { items: kept }
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// The line item for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity held for `id`, zero when absent.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Sum of all amounts. Widened so that many large lines cannot overflow.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// A new cart with `item` appended.
    ///
    /// Returns `None` if the cart already holds `item.id` or `item.amount` is zero.
    #[must_use]
    pub fn with_appended(&self, item: LineItem) -> Option<Self> {
        if item.amount == 0 || self.contains(item.id) {
            return None;
        }
        let mut items = self.items.clone();
        items.push(item);
        Some(Self { items })
    }

    /// A new cart with the amount for `id` set to `amount`, position unchanged.
    ///
    /// Returns `None` if `id` is absent or `amount` is zero.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        if amount == 0 || !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    LineItem {
                        amount,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self { items })
    }

    /// A new cart without the item for `id`, other items in the same order.
    ///
    /// Returns `None` if `id` is absent.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        Some(Self { items })
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(items: Vec<LineItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(id: i64, amount: u32) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            name: format!("Tênis {id}"),
            price: Price::from_cents(10_000 + id * 100),
            image_url: format!("https://cdn.example.com/{id}.jpg"),
            amount,
        }
    }

    fn ids(cart: &Cart) -> Vec<i64> {
        cart.iter().map(|i| i.id.as_i64()).collect()
    }

    #[test]
    fn test_from_items_drops_duplicates_and_zero_amounts() {
        let cart = Cart::from_items([item(1, 1), item(2, 0), item(1, 5), item(3, 2)]);
        assert_eq!(ids(&cart), vec![1, 3]);
        assert_eq!(cart.amount_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_with_appended_keeps_original() {
        let original = Cart::from_items([item(1, 1)]);
        let next = original.with_appended(item(2, 1)).unwrap();

        assert_eq!(ids(&original), vec![1]);
        assert_eq!(ids(&next), vec![1, 2]);
        assert!(next.with_appended(item(2, 1)).is_none());
        assert!(next.with_appended(item(3, 0)).is_none());
    }

    #[test]
    fn test_with_amount_changes_only_target() {
        let cart = Cart::from_items([item(1, 1), item(2, 1), item(3, 4)]);
        let next = cart.with_amount(ProductId::new(2), 3).unwrap();

        assert_eq!(ids(&next), vec![1, 2, 3]);
        assert_eq!(next.items()[0], cart.items()[0]);
        assert_eq!(next.items()[1].amount, 3);
        assert_eq!(next.items()[2], cart.items()[2]);
        assert_eq!(cart.amount_of(ProductId::new(2)), 1);

        assert!(cart.with_amount(ProductId::new(9), 3).is_none());
        assert!(cart.with_amount(ProductId::new(1), 0).is_none());
    }

    #[test]
    fn test_without_preserves_order() {
        let cart = Cart::from_items([item(1, 1), item(2, 1), item(3, 1)]);
        let next = cart.without(ProductId::new(2)).unwrap();

        assert_eq!(ids(&next), vec![1, 3]);
        assert!(next.without(ProductId::new(2)).is_none());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from_items([item(1, 2), item(2, 1)]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        // 2 x 101.00 + 1 x 102.00
        assert_eq!(cart.total(), Price::from_cents(30_400));
        assert_eq!(Cart::new().total(), Price::ZERO);
    }

    #[test]
    fn test_total_quantity_of_large_amounts() {
        let cart = Cart::from_items([item(1, u32::MAX), item(2, u32::MAX), item(3, 2)]);
        assert_eq!(cart.total_quantity(), 2 * u64::from(u32::MAX) + 2);
    }

    #[test]
    fn test_json_layout() {
        let cart = Cart::from_items([item(1, 2)]);
        let value = serde_json::to_value(&cart).unwrap();

        assert_eq!(
            value,
            serde_json::json!([{
                "id": 1,
                "title": "Tênis 1",
                "price": "101.00",
                "image": "https://cdn.example.com/1.jpg",
                "amount": 2
            }])
        );

        let back: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(back, cart);
    }
}

//! Product and stock payloads served by the stock API.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Product metadata, as returned by `GET /products/{id}`.
///
/// The API names the display name `title` and the image URL `image`;
/// `name` and `imageUrl` are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "title", alias = "name")]
    pub name: String,
    pub price: Price,
    #[serde(rename = "image", alias = "imageUrl")]
    pub image_url: String,
}

/// Available quantity for a product, as returned by `GET /stock/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: ProductId,
    pub amount: u32,
}

impl StockEntry {
    /// Whether `requested` units fit in the available stock.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}

//! JSON response types.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use stockroom_core::Product;

/// Product as returned by `GET /api/product/{barcode}`.
///
/// Decouples the JSON contract from the database row: camelCase keys and
/// a formatted price next to the raw cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub barcode: String,
    pub category: String,
    pub price_cents: i64,
    /// Display price, e.g. "$1.50".
    pub price: String,
    pub stock_quantity: i64,
    pub low_stock: bool,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            price: p.price().to_string(),
            low_stock: p.is_low_stock(),
            id: p.id,
            name: p.name,
            barcode: p.barcode,
            category: p.category,
            price_cents: p.price_cents,
            stock_quantity: p.stock_quantity,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthDto {
    /// "ok" or "degraded"
    pub status: String,
    pub database: bool,
}

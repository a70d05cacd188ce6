//! # Routes
//!
//! Route table and shared form helpers.
//!
//! ## Route Map
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Public                         │  Behind require_session            │
//! │  ───────────────────────────    │  ───────────────────────────────── │
//! │  GET  /login        auth        │  GET  /               inventory    │
//! │  POST /login        auth        │  GET  /products       inventory    │
//! │  GET  /logout       auth        │  GET  /inventory      inventory    │
//! │  GET  /health       api         │  POST /add-product    inventory    │
//! │  GET  /api/product/{barcode}    │  GET  /suppliers      inventory    │
//! │                     api         │  POST /add-supplier   inventory    │
//! │                                 │  GET  /users          inventory    │
//! │                                 │  POST /users/add      inventory    │
//! │                                 │  GET  /pos            stock        │
//! │                                 │  POST /sell           stock        │
//! │                                 │  POST /restock        stock        │
//! │                                 │  GET  /barcode        stock        │
//! │                                 │  GET  /transactions   stock        │
//! │                                 │  GET  /reports        stock        │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod inventory;
pub mod stock;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use stockroom_core::ValidationError;

use crate::session::require_session;
use crate::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/health", get(api::health))
        .route("/api/product/{barcode}", get(api::product_by_barcode));

    let protected = Router::new()
        .route("/", get(inventory::dashboard))
        .route("/products", get(inventory::products))
        .route("/inventory", get(inventory::products))
        .route("/add-product", post(inventory::add_product))
        .route("/suppliers", get(inventory::suppliers))
        .route("/add-supplier", post(inventory::add_supplier))
        .route("/users", get(inventory::users))
        .route("/users/add", post(inventory::add_user))
        .route("/pos", get(stock::pos))
        .route("/sell", post(stock::sell))
        .route("/restock", post(stock::restock))
        .route("/barcode", get(stock::barcode))
        .route("/transactions", get(stock::transactions))
        .route("/reports", get(stock::reports))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    public.merge(protected).with_state(state)
}

// =============================================================================
// Form Helpers
// =============================================================================

/// `?notice=<code>` set by the redirect after a successful form post.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    #[serde(default)]
    pub notice: Option<String>,
}

impl NoticeQuery {
    /// Maps the notice code to the sentence shown on the page. Unknown
    /// codes show nothing.
    pub fn message(&self) -> Option<&'static str> {
        match self.notice.as_deref()? {
            "product-added" => Some("Product added."),
            "supplier-added" => Some("Supplier added."),
            "user-added" => Some("User added."),
            "sale-recorded" => Some("Sale recorded."),
            "stock-received" => Some("Delivery recorded."),
            _ => None,
        }
    }
}

/// Parses an integer form field. Form fields arrive as text so that a bad
/// number is a 400 with a readable message.
pub fn parse_number(field: &str, raw: &str) -> Result<i64, ValidationError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    raw.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a whole number".to_string(),
    })
}

/// HTML checkboxes are either absent or carry their `value`.
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "on" | "1" | "yes"))
}

// =============================================================================
// Router Tests
// =============================================================================

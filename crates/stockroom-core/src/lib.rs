//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate holds the domain model of the stockroom: products, the stock
//! ledger, suppliers and staff accounts, plus money arithmetic and input
//! validation. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser (server-rendered HTML)                   │   │
//! │  │    Dashboard ──► Inventory ──► POS / Sell ──► Reports            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP forms / JSON                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/web (axum)                              │   │
//! │  │    session gate, handlers, views                                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   money   │  │ validation│                  │   │
//! │  │   │  Product  │  │   Money   │  │   rules   │                  │   │
//! │  │   │  Ledger   │  │  parsing  │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                stockroom-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockTransaction, Supplier, User)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::Money;
//!
//! // Prices arrive from forms as decimal strings
//! let price = Money::parse("10.99").unwrap();
//! assert_eq!(price.cents(), 1099);
//! assert_eq!((price * 3).to_string(), "$32.97");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity moved by a single ledger entry.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Products with fewer units than this are counted as low-stock alerts
/// on the dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Upper bound on a product's stock level, and on its magnitude when an
/// oversell has taken it negative. Keeps `stock_quantity + delta` far
/// from the i64 limit, where SQLite would silently switch to REAL.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000_000;

/// Highest unit price accepted, in cents ($10,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

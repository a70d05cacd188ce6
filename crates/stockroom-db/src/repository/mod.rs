//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  db.ledger().record_sale(id, 3, policy)                        │
//! │       ▼                                                                 │
//! │  LedgerRepository                                                      │
//! │  ├── record_sale(&self, product_id, quantity, policy)                  │
//! │  ├── record_stock_in(&self, product_id, quantity)                      │
//! │  ├── recent(&self, limit)                                              │
//! │  └── product_summaries(&self)                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Handlers never write SQL; each table's queries live in one file.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product catalog and lookups
//! - [`LedgerRepository`](ledger::LedgerRepository) - Atomic stock movements and ledger reads
//! - [`SupplierRepository`](supplier::SupplierRepository) - Supplier records
//! - [`UserRepository`](user::UserRepository) - Staff accounts and credential checks
//! - [`SessionRepository`](session::SessionRepository) - Server-side login sessions

pub mod ledger;
pub mod product;
pub mod session;
pub mod supplier;
pub mod user;

use uuid::Uuid;

/// Generates a new row ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

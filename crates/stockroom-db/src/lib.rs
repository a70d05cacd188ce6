//! # stockroom-db: Database Layer for Stockroom
//!
//! This crate provides database access for Stockroom.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  axum handler (POST /sell)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockroom-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ LedgerRepo    │    │              │  │   │
//! │  │   │ Connection    │    │ SupplierRepo  │    │              │  │   │
//! │  │   │ Management    │    │ UserRepo      │    │              │  │   │
//! │  │   │               │    │ SessionRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./stockroom.db                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, ledger, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//! use stockroom_core::StockPolicy;
//!
//! let db = Database::new(DbConfig::new("./stockroom.db")).await?;
//!
//! let product = db.products().get_by_barcode("5449000000996").await?;
//! db.ledger().record_sale(&product.id, 3, StockPolicy::Strict).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use repository::session::SessionRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::user::UserRepository;

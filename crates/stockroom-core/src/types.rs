//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    Product      │   │ StockTransaction │   │    Supplier     │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id (UUID)      │◄──│  product_id (FK) │   │  id (UUID)      │      │
//! │  │  barcode (uniq) │   │  type            │   │  name, contact  │      │
//! │  │  price_cents    │   │  quantity        │   │  address        │      │
//! │  │  stock_quantity │   │  created_at      │   └─────────────────┘      │
//! │  └─────────────────┘   └──────────────────┘                            │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │      User       │   │ TransactionType  │   │  StockPolicy    │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  username(uniq) │   │  Sale            │   │  Strict         │      │
//! │  │  role           │   │  StockIn         │   │  AllowNegative  │      │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ledger Invariant
//! For every product, `stock_quantity` equals its initial stock plus the sum
//! of `StockIn` quantities minus the sum of `Sale` quantities in the ledger.
//! Only the ledger repository writes `stock_quantity` after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A product held in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on lists and the POS page.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, internal code). Unique.
    pub barcode: String,

    /// Free-form category label ("Beverages", "Snacks", ...).
    pub category: String,

    /// Unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level. Negative only after an overridden oversell.
    pub stock_quantity: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// True when the product counts towards the dashboard's low-stock alerts.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity < LOW_STOCK_THRESHOLD
    }
}

/// Input for creating a product (already validated by the caller).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub barcode: String,
    pub category: String,
    pub price_cents: i64,
    pub stock_quantity: i64,
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// Kind of stock movement recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Units left the store (stock decremented).
    Sale,
    /// Units arrived from a supplier (stock incremented).
    StockIn,
}

impl TransactionType {
    /// Signed stock change for `quantity` units of this movement.
    pub const fn stock_delta(&self, quantity: i64) -> i64 {
        match self {
            TransactionType::Sale => -quantity,
            TransactionType::StockIn => quantity,
        }
    }

    /// Human-readable label for views.
    pub const fn label(&self) -> &'static str {
        match self {
            TransactionType::Sale => "Sale",
            TransactionType::StockIn => "Stock In",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One append-only ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockTransaction {
    pub id: String,
    pub product_id: String,
    pub transaction_type: TransactionType,
    /// Units moved. Always positive; the direction comes from the type.
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A ledger row joined with the product name, for the transactions view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub transaction_type: TransactionType,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// Per-product aggregate of the ledger, for the reports view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductLedgerSummary {
    pub product_id: String,
    pub product_name: String,
    pub price_cents: i64,
    pub stock_quantity: i64,
    pub units_sold: i64,
    pub units_stocked_in: i64,
}

impl ProductLedgerSummary {
    /// Revenue at the current unit price. Saturates instead of overflowing.
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.price_cents) * self.units_sold
    }
}

/// What to do when a sale would take stock below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Reject the sale with `InsufficientStock`.
    #[default]
    Strict,
    /// Record the sale and let stock go negative (explicit override).
    AllowNegative,
}

impl StockPolicy {
    /// Builds the policy from the sell form's override checkbox.
    pub fn from_override(allow_oversell: bool) -> Self {
        if allow_oversell {
            StockPolicy::AllowNegative
        } else {
            StockPolicy::Strict
        }
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub address: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact: String,
    pub address: String,
}

// =============================================================================
// Users
// =============================================================================

/// Staff role. Stored and displayed only; no route checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Cashier,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Manager, UserRole::Cashier];

    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Cashier => "cashier",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Cashier
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "cashier" => Ok(UserRole::Cashier),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: UserRole::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            }),
        }
    }
}

/// A staff account. The password hash never leaves the db crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub role: UserRole,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a staff account. `password` is plaintext here and is
/// hashed by the user repository before it reaches storage.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub role: UserRole,
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Aggregate counts shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_products: i64,
    /// Sum of all Sale quantities in the ledger.
    pub total_sold: i64,
    /// Products with stock below [`LOW_STOCK_THRESHOLD`].
    pub low_stock_alerts: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            name: "Cola 330ml".to_string(),
            barcode: "5449000000996".to_string(),
            category: "Beverages".to_string(),
            price_cents: 150,
            stock_quantity: stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stock_delta_direction() {
        assert_eq!(TransactionType::Sale.stock_delta(3), -3);
        assert_eq!(TransactionType::StockIn.stock_delta(3), 3);
    }

    #[test]
    fn test_policy_default_is_strict() {
        assert_eq!(StockPolicy::default(), StockPolicy::Strict);
        assert_eq!(StockPolicy::from_override(true), StockPolicy::AllowNegative);
        assert_eq!(StockPolicy::from_override(false), StockPolicy::Strict);
    }

    #[test]
    fn test_low_stock_threshold() {
        assert!(product(9).is_low_stock());
        assert!(!product(10).is_low_stock());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(" cashier ".parse::<UserRole>().unwrap(), UserRole::Cashier);
        assert!(matches!(
            "owner".parse::<UserRole>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_summary_revenue() {
        let summary = ProductLedgerSummary {
            product_id: "p-1".to_string(),
            product_name: "Cola".to_string(),
            price_cents: 150,
            stock_quantity: 7,
            units_sold: 3,
            units_stocked_in: 0,
        };
        assert_eq!(summary.revenue().cents(), 450);
    }

    #[test]
    fn test_new_user_debug_hides_password() {
        let user = NewUser {
            name: "Ada".to_string(),
            username: "ada".to_string(),
            role: UserRole::Admin,
            password: "hunter22hunter".to_string(),
        };
        assert!(!format!("{:?}", user).contains("hunter22"));
    }
}

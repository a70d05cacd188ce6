//! # Supplier Repository
//!
//! Plain inserts and listings. Suppliers are not linked to products or
//! stock movements.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use stockroom_core::{NewSupplier, Supplier};

/// Repository for supplier records.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Inserts a supplier.
    pub async fn insert(&self, new: &NewSupplier) -> DbResult<Supplier> {
        debug!(name = %new.name, "Inserting supplier");

        let supplier = Supplier {
            id: generate_id(),
            name: new.name.clone(),
            contact: new.contact.clone(),
            address: new.address.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists suppliers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact, address, created_at
            FROM suppliers
            ORDER BY name COLLATE NOCASE
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }
}

//! # Validation Module
//!
//! Input validation for everything that arrives from a form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTML form attributes (required, min, maxlength)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: axum handler (Rust)                                          │
//! │  ├── Type validation (form deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (barcode, username)                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_barcode, validate_quantity};
//!
//! assert!(validate_barcode("5449000000996").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewProduct, NewSupplier, NewUser, UserRole};
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_BARCODE_LEN: usize = 64;
const MAX_FREE_TEXT_LEN: usize = 500;
const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

fn required_trimmed(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

fn optional_trimmed(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a display name (product, supplier or person).
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    required_trimmed(field, name, MAX_NAME_LEN)
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Only letters, digits and hyphens (covers EAN/UPC and internal codes)
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_barcode;
///
/// assert!(validate_barcode("5449000000996").is_ok());
/// assert!(validate_barcode("INT-0042").is_ok());
/// assert!(validate_barcode("has space").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = required_trimmed("barcode", barcode, MAX_BARCODE_LEN)?;

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(barcode)
}

/// Validates a username.
///
/// ## Rules
/// - 3 to 50 characters
/// - Letters, digits, `_`, `.`, `-`
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = required_trimmed("username", username, MAX_USERNAME_LEN)?;

    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: MIN_USERNAME_LEN,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, '_', '.', and '-'".to_string(),
        });
    }

    Ok(username)
}

/// Validates a new password. Not trimmed: whitespace is significant.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a ledger quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// POS: sell form submitted with quantity 5
///       │
///       ▼
/// validate_quantity(5) ← THIS FUNCTION
///       │
///       ├── qty <= 0?  → 400 "quantity must be positive"
///       ├── qty > 999? → 400 "quantity must be between 1 and 999"
///       └── OK → ledger transaction
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be between 0 and MAX_PRICE_CENTS
/// - Zero is allowed (free items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates an opening stock level for a new product.
pub fn validate_initial_stock(stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_QUANTITY).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: "stock_quantity".to_string(),
            min: 0,
            max: MAX_STOCK_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Record Builders
// =============================================================================

/// Validates raw add-product form fields and builds a [`NewProduct`].
pub fn validate_new_product(
    name: &str,
    barcode: &str,
    category: &str,
    price: &str,
    stock_quantity: i64,
) -> ValidationResult<NewProduct> {
    let name = validate_name("product_name", name)?;
    let barcode = validate_barcode(barcode)?;
    let category = optional_trimmed("category", category, MAX_CATEGORY_LEN)?;
    let price = Money::parse(price)?;
    validate_price_cents(price.cents())?;
    validate_initial_stock(stock_quantity)?;

    Ok(NewProduct {
        name,
        barcode,
        category,
        price_cents: price.cents(),
        stock_quantity,
    })
}

/// Validates raw add-supplier form fields and builds a [`NewSupplier`].
pub fn validate_new_supplier(
    name: &str,
    contact: &str,
    address: &str,
) -> ValidationResult<NewSupplier> {
    Ok(NewSupplier {
        name: validate_name("name", name)?,
        contact: optional_trimmed("contact", contact, MAX_FREE_TEXT_LEN)?,
        address: optional_trimmed("address", address, MAX_FREE_TEXT_LEN)?,
    })
}

/// Validates raw add-user form fields and builds a [`NewUser`].
pub fn validate_new_user(
    name: &str,
    username: &str,
    role: &str,
    password: &str,
) -> ValidationResult<NewUser> {
    let name = validate_name("name", name)?;
    let username = validate_username(username)?;
    let role: UserRole = role.parse()?;
    validate_password(password)?;

    Ok(NewUser {
        name,
        username,
        role,
        password: password.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("5449000000996").is_ok());
        assert!(validate_barcode("ABC-123").is_ok());
        assert_eq!(validate_barcode("  12345678 ").unwrap(), "12345678");

        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("   ").is_err());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode("under_score").is_err());
        assert!(validate_barcode(&"1".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "  Cola  ").unwrap(), "Cola");
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(matches!(
            validate_price_cents(MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange { max: MAX_PRICE_CENTS, .. })
        ));
    }

    #[test]
    fn test_validate_initial_stock_bounds() {
        assert!(validate_initial_stock(0).is_ok());
        assert!(validate_initial_stock(MAX_STOCK_QUANTITY).is_ok());
        assert!(validate_initial_stock(-1).is_err());
        assert!(validate_initial_stock(MAX_STOCK_QUANTITY + 1).is_err());
        assert!(validate_initial_stock(i64::MAX).is_err());
    }

    #[test]
    fn test_new_product_rejects_extreme_values() {
        assert!(validate_new_product("Gold bar", "GOLD-1", "", "10000000.00", 1).is_ok());
        assert!(validate_new_product("Gold bar", "GOLD-1", "", "10000000.01", 1).is_err());
        assert!(
            validate_new_product("Gold bar", "GOLD-1", "", "92233720368547758.07", 1).is_err()
        );
        assert!(validate_new_product("Cola", "COLA-1", "", "1.50", i64::MAX).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ada.l").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let product = validate_new_product(" Cola 330ml ", "5449000000996", "Beverages", "1.50", 10)
            .unwrap();
        assert_eq!(product.name, "Cola 330ml");
        assert_eq!(product.price_cents, 150);
        assert_eq!(product.stock_quantity, 10);

        assert!(validate_new_product("Cola", "5449000000996", "", "-1.00", 10).is_err());
        assert!(validate_new_product("Cola", "5449000000996", "", "1.00", -1).is_err());
        assert!(validate_new_product("Cola", "", "", "1.00", 1).is_err());
    }

    #[test]
    fn test_validate_new_user() {
        let user = validate_new_user("Ada", "ada", "manager", "correct horse").unwrap();
        assert_eq!(user.role, UserRole::Manager);

        assert!(validate_new_user("Ada", "ada", "owner", "correct horse").is_err());
        assert!(validate_new_user("Ada", "ada", "admin", "short").is_err());
    }

    #[test]
    fn test_validate_new_supplier() {
        let supplier = validate_new_supplier("Acme", "", " 1 Main St ").unwrap();
        assert_eq!(supplier.contact, "");
        assert_eq!(supplier.address, "1 Main St");
        assert!(validate_new_supplier(" ", "x", "y").is_err());
    }
}

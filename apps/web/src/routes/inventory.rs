//! # Catalog Pages
//!
//! Dashboard, products, suppliers and users: list pages with an add form,
//! and the form posts that create records.

use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::{Extension, Form};
use serde::Deserialize;
use tracing::info;

use stockroom_core::validation::{validate_new_product, validate_new_supplier, validate_new_user};

use crate::error::WebResult;
use crate::routes::{parse_number, NoticeQuery};
use crate::session::CurrentUser;
use crate::views;
use crate::AppState;

// =============================================================================
// Dashboard
// =============================================================================

/// GET /
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> WebResult<Html<String>> {
    let stats = state.db.dashboard_stats().await?;
    let products = state.db.products().list().await?;

    Ok(Html(views::dashboard_page(&user, &stats, &products)))
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddProductForm {
    pub product_name: String,
    pub barcode: String,
    pub category: String,
    pub price: String,
    pub stock_quantity: String,
}

/// GET /products, GET /inventory
pub async fn products(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<NoticeQuery>,
) -> WebResult<Html<String>> {
    let products = state.db.products().list().await?;

    Ok(Html(views::products_page(&user, &products, query.message())))
}

/// POST /add-product
pub async fn add_product(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<AddProductForm>,
) -> WebResult<Redirect> {
    let stock_quantity = parse_number("stock_quantity", &form.stock_quantity)?;
    let new_product = validate_new_product(
        &form.product_name,
        &form.barcode,
        &form.category,
        &form.price,
        stock_quantity,
    )?;

    let product = state.db.products().insert(&new_product).await?;
    info!(
        product_id = %product.id,
        barcode = %product.barcode,
        by = %user.username,
        "Product added"
    );

    Ok(Redirect::to("/products?notice=product-added"))
}

// =============================================================================
// Suppliers
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddSupplierForm {
    pub name: String,
    pub contact: String,
    pub address: String,
}

/// GET /suppliers
pub async fn suppliers(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<NoticeQuery>,
) -> WebResult<Html<String>> {
    let suppliers = state.db.suppliers().list().await?;

    Ok(Html(views::suppliers_page(&user, &suppliers, query.message())))
}

/// POST /add-supplier
pub async fn add_supplier(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<AddSupplierForm>,
) -> WebResult<Redirect> {
    let new_supplier = validate_new_supplier(&form.name, &form.contact, &form.address)?;

    let supplier = state.db.suppliers().insert(&new_supplier).await?;
    info!(supplier_id = %supplier.id, by = %user.username, "Supplier added");

    Ok(Redirect::to("/suppliers?notice=supplier-added"))
}

// =============================================================================
// Users
// =============================================================================

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct AddUserForm {
    pub name: String,
    pub username: String,
    pub role: String,
    pub password: String,
}

/// GET /users
pub async fn users(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<NoticeQuery>,
) -> WebResult<Html<String>> {
    let users = state.db.users().list().await?;

    Ok(Html(views::users_page(&user, &users, query.message())))
}

/// POST /users/add
pub async fn add_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<AddUserForm>,
) -> WebResult<Redirect> {
    let new_user = validate_new_user(&form.name, &form.username, &form.role, &form.password)?;

    let created = state.db.users().insert(&new_user).await?;
    info!(
        user_id = %created.id,
        username = %created.username,
        role = %created.role,
        by = %user.username,
        "User added"
    );

    Ok(Redirect::to("/users?notice=user-added"))
}

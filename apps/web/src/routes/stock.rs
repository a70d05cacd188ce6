//! # Stock Movements
//!
//! The POS page, the sell/restock posts that write the ledger, and the
//! pages computed from the ledger.
//!
//! ## Sell Flow
//! ```text
//! POST /sell (product_id, quantity, allow_oversell?)
//!      │
//!      ▼
//! parse quantity ── not a number ──► 400
//!      │
//!      ▼
//! ledger.record_sale(id, qty, policy)   ← one transaction
//!      │
//!      ├── NotFound ───────────► 404
//!      ├── InsufficientStock ──► 409
//!      ├── store unavailable ──► 503
//!      ▼
//! 303 /pos?notice=sale-recorded
//! ```

use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::{Extension, Form};
use serde::Deserialize;
use tracing::info;

use stockroom_core::StockPolicy;

use crate::error::WebResult;
use crate::routes::{checkbox, parse_number, NoticeQuery};
use crate::session::CurrentUser;
use crate::views;
use crate::AppState;

/// Entries shown on the transactions page.
const RECENT_TRANSACTIONS: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SellForm {
    pub product_id: String,
    pub quantity: String,
    pub allow_oversell: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RestockForm {
    pub product_id: String,
    pub quantity: String,
}

/// GET /pos
pub async fn pos(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<NoticeQuery>,
) -> WebResult<Html<String>> {
    let products = state.db.products().list().await?;

    Ok(Html(views::pos_page(&user, &products, query.message())))
}

/// POST /sell
pub async fn sell(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<SellForm>,
) -> WebResult<Redirect> {
    let quantity = parse_number("quantity", &form.quantity)?;
    let policy = StockPolicy::from_override(checkbox(form.allow_oversell.as_deref()));

    let entry = state
        .db
        .ledger()
        .record_sale(form.product_id.trim(), quantity, policy)
        .await?;

    info!(
        transaction_id = %entry.id,
        product_id = %entry.product_id,
        quantity,
        ?policy,
        by = %user.username,
        "Sale recorded"
    );

    Ok(Redirect::to("/pos?notice=sale-recorded"))
}

/// POST /restock
pub async fn restock(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<RestockForm>,
) -> WebResult<Redirect> {
    let quantity = parse_number("quantity", &form.quantity)?;

    let entry = state
        .db
        .ledger()
        .record_stock_in(form.product_id.trim(), quantity)
        .await?;

    info!(
        transaction_id = %entry.id,
        product_id = %entry.product_id,
        quantity,
        by = %user.username,
        "Delivery recorded"
    );

    Ok(Redirect::to("/pos?notice=stock-received"))
}

/// GET /barcode
pub async fn barcode(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    Html(views::barcode_page(&user))
}

/// GET /transactions
pub async fn transactions(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> WebResult<Html<String>> {
    let entries = state.db.ledger().recent(RECENT_TRANSACTIONS).await?;

    Ok(Html(views::transactions_page(&user, &entries)))
}

/// GET /reports
pub async fn reports(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> WebResult<Html<String>> {
    let summaries = state.db.ledger().product_summaries().await?;

    Ok(Html(views::reports_page(&user, &summaries)))
}

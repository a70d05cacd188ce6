//! # Views
//!
//! Server-rendered HTML pages.
//!
//! Every page goes through [`layout`]; every interpolated value goes
//! through [`escape`]. Forms post `application/x-www-form-urlencoded`
//! bodies whose field names match the handler form structs.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};

use stockroom_core::{
    DashboardStats, LedgerEntry, Money, Product, ProductLedgerSummary, Supplier, TransactionType,
    User, UserRole, LOW_STOCK_THRESHOLD, MAX_ITEM_QUANTITY,
};

// =============================================================================
// Helpers
// =============================================================================

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn flash(notice: Option<&str>) -> String {
    match notice {
        Some(msg) => format!(r#"<p class="notice">{}</p>"#, escape(msg)),
        None => String::new(),
    }
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#222}\
nav{background:#263238;padding:.6rem 1rem}nav a{color:#eceff1;margin-right:1rem;text-decoration:none}\
nav .who{float:right;color:#b0bec5}main{padding:1rem 2rem}\
table{border-collapse:collapse;margin:1rem 0}td,th{border:1px solid #ccc;padding:.3rem .6rem;text-align:left}\
.low{color:#c62828;font-weight:bold}.notice{background:#e8f5e9;padding:.5rem}\
.error{background:#ffebee;padding:.5rem}.stats div{display:inline-block;margin-right:2rem}\
form.inline{display:inline}label{display:block;margin:.3rem 0}";

/// Wraps a page body with the document shell and navigation.
pub fn layout(title: &str, user: Option<&User>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<nav>
<a href="/">Dashboard</a><a href="/products">Products</a><a href="/pos">POS</a>
<a href="/barcode">Barcode</a><a href="/transactions">Transactions</a><a href="/reports">Reports</a>
<a href="/suppliers">Suppliers</a><a href="/users">Users</a>
<span class="who">{} ({}) <a href="/logout">Log out</a></span>
</nav>"#,
            escape(&user.name),
            user.role,
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · Stockroom</title>
<style>{STYLE}</style>
</head>
<body>
{nav}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

// =============================================================================
// Auth
// =============================================================================

/// Login form. `error` is shown above the form after a failed attempt.
pub fn login_page(error: Option<&str>, username: &str) -> String {
    let error = match error {
        Some(msg) => format!(r#"<p class="error">{}</p>"#, escape(msg)),
        None => String::new(),
    };

    let body = format!(
        r#"{error}
<form method="post" action="/login">
<label>Username <input name="username" value="{username}" required autofocus></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        username = escape(username),
    );

    layout("Log in", None, &body)
}

/// Error page for failed HTML requests.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<p class="error">{}</p>
<p><a href="javascript:history.back()">Go back</a> · <a href="/">Dashboard</a></p>"#,
        escape(message)
    );

    layout(
        status.canonical_reason().unwrap_or("Error"),
        None,
        &body,
    )
}

// =============================================================================
// Products
// =============================================================================

fn product_rows(products: &[Product]) -> String {
    if products.is_empty() {
        return r#"<tr><td colspan="5">No products yet.</td></tr>"#.to_string();
    }

    products
        .iter()
        .map(|p| {
            let stock_class = if p.is_low_stock() { r#" class="low""# } else { "" };
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td{}>{}</td></tr>\n",
                escape(&p.name),
                escape(&p.barcode),
                escape(&p.category),
                p.price(),
                stock_class,
                p.stock_quantity,
            )
        })
        .collect()
}

fn product_table(products: &[Product]) -> String {
    format!(
        r#"<table>
<tr><th>Name</th><th>Barcode</th><th>Category</th><th>Price</th><th>Stock</th></tr>
{}</table>"#,
        product_rows(products)
    )
}

/// Dashboard: headline counters and the product list.
pub fn dashboard_page(user: &User, stats: &DashboardStats, products: &[Product]) -> String {
    let body = format!(
        r#"<section class="stats">
<div><strong>{}</strong> products</div>
<div><strong>{}</strong> units sold</div>
<div><strong>{}</strong> low-stock alerts (under {})</div>
</section>
{}"#,
        stats.total_products,
        stats.total_sold,
        stats.low_stock_alerts,
        LOW_STOCK_THRESHOLD,
        product_table(products),
    );

    layout("Dashboard", Some(user), &body)
}

/// Product list with the add-product form.
pub fn products_page(user: &User, products: &[Product], notice: Option<&str>) -> String {
    let body = format!(
        r#"{}
{}
<h2>Add product</h2>
<form method="post" action="/add-product">
<label>Name <input name="product_name" required maxlength="200"></label>
<label>Barcode <input name="barcode" required maxlength="64" pattern="[A-Za-z0-9-]+"></label>
<label>Category <input name="category" maxlength="100"></label>
<label>Price <input name="price" required inputmode="decimal" placeholder="0.00"></label>
<label>Opening stock <input name="stock_quantity" type="number" min="0" value="0" required></label>
<button type="submit">Add product</button>
</form>"#,
        flash(notice),
        product_table(products),
    );

    layout("Products", Some(user), &body)
}

// =============================================================================
// POS
// =============================================================================

fn product_options(products: &[Product]) -> String {
    products
        .iter()
        .map(|p| {
            format!(
                r#"<option value="{}">{} ({}) · {} in stock</option>"#,
                escape(&p.id),
                escape(&p.name),
                escape(&p.barcode),
                p.stock_quantity,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sell and restock forms.
pub fn pos_page(user: &User, products: &[Product], notice: Option<&str>) -> String {
    let options = product_options(products);

    let body = format!(
        r#"{notice}
<h2>Sell</h2>
<form method="post" action="/sell">
<label>Product <select name="product_id" required>{options}</select></label>
<label>Quantity <input name="quantity" type="number" min="1" max="{max}" value="1" required></label>
<label><input type="checkbox" name="allow_oversell" value="true"> Allow oversell (stock may go negative)</label>
<button type="submit">Record sale</button>
</form>
<h2>Restock</h2>
<form method="post" action="/restock">
<label>Product <select name="product_id" required>{options}</select></label>
<label>Quantity <input name="quantity" type="number" min="1" max="{max}" value="1" required></label>
<button type="submit">Record delivery</button>
</form>"#,
        notice = flash(notice),
        max = MAX_ITEM_QUANTITY,
    );

    layout("Point of Sale", Some(user), &body)
}

/// Barcode lookup page. Queries `/api/product/{barcode}` from the browser.
pub fn barcode_page(user: &User) -> String {
    let body = r#"<form id="lookup">
<label>Barcode <input id="code" required autofocus pattern="[A-Za-z0-9-]+"></label>
<button type="submit">Look up</button>
</form>
<pre id="result"></pre>
<script>
document.getElementById('lookup').addEventListener('submit', async (e) => {
  e.preventDefault();
  const code = encodeURIComponent(document.getElementById('code').value.trim());
  const res = await fetch('/api/product/' + code);
  const body = await res.json();
  document.getElementById('result').textContent = res.ok
    ? body.name + ' · ' + body.price + ' · ' + body.stockQuantity + ' in stock'
    : body.message;
});
</script>"#;

    layout("Barcode Lookup", Some(user), body)
}

// =============================================================================
// Ledger views
// =============================================================================

/// Most recent ledger entries.
pub fn transactions_page(user: &User, entries: &[LedgerEntry]) -> String {
    let rows: String = if entries.is_empty() {
        r#"<tr><td colspan="4">No transactions recorded.</td></tr>"#.to_string()
    } else {
        entries
            .iter()
            .map(|e| {
                let signed = match e.transaction_type {
                    TransactionType::Sale => format!("-{}", e.quantity),
                    TransactionType::StockIn => format!("+{}", e.quantity),
                };
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    timestamp(&e.created_at),
                    escape(&e.product_name),
                    e.transaction_type,
                    signed,
                )
            })
            .collect()
    };

    let body = format!(
        r#"<table>
<tr><th>When (UTC)</th><th>Product</th><th>Type</th><th>Quantity</th></tr>
{rows}</table>"#
    );

    layout("Transactions", Some(user), &body)
}

/// Per-product ledger totals with overall revenue.
pub fn reports_page(user: &User, summaries: &[ProductLedgerSummary]) -> String {
    let total_revenue: Money = summaries.iter().map(|s| s.revenue()).sum();
    let total_units = summaries
        .iter()
        .fold(0i64, |acc, s| acc.saturating_add(s.units_sold));

    let rows: String = summaries
        .iter()
        .map(|s| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&s.product_name),
                s.units_sold,
                s.units_stocked_in,
                s.stock_quantity,
                s.revenue(),
            )
        })
        .collect();

    let body = format!(
        r#"<table>
<tr><th>Product</th><th>Units sold</th><th>Units received</th><th>In stock</th><th>Revenue</th></tr>
{rows}<tr><th>Total</th><th>{total_units}</th><th></th><th></th><th>{total_revenue}</th></tr>
</table>
<p>Revenue is units sold at the current unit price.</p>"#
    );

    layout("Reports", Some(user), &body)
}

// =============================================================================
// Suppliers & users
// =============================================================================

/// Supplier list with the add-supplier form.
pub fn suppliers_page(user: &User, suppliers: &[Supplier], notice: Option<&str>) -> String {
    let rows: String = suppliers
        .iter()
        .map(|s| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&s.name),
                escape(&s.contact),
                escape(&s.address),
            )
        })
        .collect();

    let body = format!(
        r#"{}
<table>
<tr><th>Name</th><th>Contact</th><th>Address</th></tr>
{}</table>
<h2>Add supplier</h2>
<form method="post" action="/add-supplier">
<label>Name <input name="name" required maxlength="200"></label>
<label>Contact <input name="contact" maxlength="500"></label>
<label>Address <input name="address" maxlength="500"></label>
<button type="submit">Add supplier</button>
</form>"#,
        flash(notice),
        rows,
    );

    layout("Suppliers", Some(user), &body)
}

/// User list with the add-user form.
pub fn users_page(user: &User, users: &[User], notice: Option<&str>) -> String {
    let rows: String = users
        .iter()
        .map(|u| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&u.username),
                escape(&u.name),
                u.role,
                timestamp(&u.created_at),
            )
        })
        .collect();

    let roles: String = UserRole::ALL
        .iter()
        .map(|r| format!(r#"<option value="{r}">{r}</option>"#))
        .collect();

    let body = format!(
        r#"{}
<table>
<tr><th>Username</th><th>Name</th><th>Role</th><th>Created</th></tr>
{}</table>
<h2>Add user</h2>
<form method="post" action="/users/add">
<label>Name <input name="name" required maxlength="200"></label>
<label>Username <input name="username" required minlength="3" maxlength="50"></label>
<label>Role <select name="role">{}</select></label>
<label>Password <input name="password" type="password" required minlength="8"></label>
<button type="submit">Add user</button>
</form>"#,
        flash(notice),
        rows,
        roles,
    );

    layout("Users", Some(user), &body)
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # JSON API
//!
//! Unauthenticated endpoints: barcode lookup and health.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use stockroom_core::validation::validate_barcode;
use stockroom_core::CoreError;

use crate::dto::{HealthDto, ProductDto};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/product/{barcode}
///
/// ## Returns
/// * `200` - [`ProductDto`]
/// * `400` - barcode has invalid characters
/// * `404` - no product carries this barcode
pub async fn product_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<ProductDto>> {
    let barcode = validate_barcode(&barcode)?;
    debug!(barcode = %barcode, "Barcode lookup");

    let product = state
        .db
        .products()
        .get_by_barcode(&barcode)
        .await?
        .ok_or(CoreError::ProductNotFound(barcode))?;

    Ok(Json(ProductDto::from(product)))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthDto>) {
    let database = state.db.health_check().await;

    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthDto {
            status: label.to_string(),
            database,
        }),
    )
}

//! Order history and confirmation route handlers.
//!
//! Thin reads over the order repository, scoped to the signed-in user.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use hk_leather_core::{OrderId, format_pkr};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// List the user's orders, newest first.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<serde_json::Value>> {
    let orders = state.orders().list_for_user(user).await?;

    let rows: Vec<_> = orders
        .iter()
        .map(|o| {
            json!({
                "id": o.id,
                "status": o.status,
                "total": format_pkr(o.total_amount),
                "payment_method": o.payment_method,
                "item_count": o.item_count,
                "created_at": o.created_at,
            })
        })
        .collect();

    Ok(Json(json!({ "orders": rows })))
}

/// Fetch one order with its snapshotted items.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let (order, items) = state
        .orders()
        .get_for_user(OrderId::new(order_id), user)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("order".to_owned()),
            other => AppError::Database(other),
        })?;

    let item_rows: Vec<_> = items
        .iter()
        .map(|i| {
            json!({
                "product_name": i.product_name,
                "product_image": i.product_image,
                "quantity": i.quantity,
                "unit_price": format_pkr(i.unit_price),
            })
        })
        .collect();

    Ok(Json(json!({
        "id": order.id,
        "status": order.status,
        "total": format_pkr(order.total_amount),
        "shipping_address": order.shipping_address,
        "shipping_city": order.shipping_city,
        "shipping_postal_code": order.shipping_postal_code,
        "payment_method": order.payment_method,
        "notes": order.notes,
        "created_at": order.created_at,
        "items": item_rows,
    })))
}

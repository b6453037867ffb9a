use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;

use super::{json_body, parse_date, required, today};
use crate::{
    activity::log_activity,
    database::Database,
    error::{AppError, AppResult},
    middleware::require_api_user,
    models::{lenient_i64, stock::PURCHASE_SELECT, NewActivity, PurchaseRow},
    state::AppState,
};

#[derive(Deserialize)]
pub struct PurchasePayload {
    #[serde(default, deserialize_with = "lenient_i64")]
    product_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    supplier_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    quantity_purchased: Option<i64>,
    purchase_date: Option<String>,
}

async fn find_purchase(db: &Database, purchase_id: i64) -> AppResult<PurchaseRow> {
    sqlx::query_as::<_, PurchaseRow>(&format!("{} WHERE pu.purchase_id = ?", PURCHASE_SELECT))
        .bind(purchase_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
}

async fn exists(db: &Database, sql: &str, id: i64) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(sql).bind(id).fetch_one(db).await?;
    Ok(count > 0)
}

pub async fn list_purchases(State(state): State<AppState>) -> AppResult<Json<Vec<PurchaseRow>>> {
    let purchases = sqlx::query_as::<_, PurchaseRow>(&format!("{} ORDER BY pu.purchase_id", PURCHASE_SELECT))
        .fetch_all(&state.db)
        .await?;
    Ok(Json(purchases))
}

/// Records a purchase and restocks the product's inventory row, if any.
pub async fn create_purchase(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<PurchasePayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user = require_api_user(&cookies, &state).await?;
    let body = json_body(payload)?;

    let product_id = required(body.product_id, "product_id")?;
    let supplier_id = required(body.supplier_id, "supplier_id")?;
    let quantity_purchased = required(body.quantity_purchased, "quantity_purchased")?;
    if quantity_purchased <= 0 {
        return Err(AppError::bad_request("Quantity purchased must be greater than zero"));
    }
    let purchase_date = parse_date(body.purchase_date.as_deref(), "purchase_date")?.unwrap_or_else(today);

    if !exists(&state.db, "SELECT COUNT(*) FROM products WHERE product_id = ?", product_id).await? {
        return Err(AppError::bad_request("Product not found"));
    }
    if !exists(&state.db, "SELECT COUNT(*) FROM suppliers WHERE supplier_id = ?", supplier_id).await? {
        return Err(AppError::bad_request("Supplier not found"));
    }

    let mut tx = state.db.begin().await?;

    let purchase_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO purchases (product_id, supplier_id, quantity_purchased, purchase_date)
        VALUES (?, ?, ?, ?)
        RETURNING purchase_id
        "#,
    )
    .bind(product_id)
    .bind(supplier_id)
    .bind(quantity_purchased)
    .bind(purchase_date)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE inventory SET stock_quantity = stock_quantity + ?, restock_date = ?
        WHERE inventory_id = (
            SELECT inventory_id FROM inventory WHERE product_id = ? ORDER BY inventory_id LIMIT 1
        )
        "#,
    )
    .bind(quantity_purchased)
    .bind(purchase_date)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let purchase = find_purchase(&state.db, purchase_id).await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "purchase_recorded",
            "purchases",
            purchase_id,
            format!(
                "Recorded purchase of {} units of '{}'",
                quantity_purchased,
                purchase.product_label()
            ),
        ),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "purchase": purchase })),
    ))
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use askama::Template;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;

use super::{json_body, parse_date, render, required, today, PageContext, PageResult};
use crate::{
    activity::log_activity,
    database::Database,
    error::{AppError, AppResult},
    middleware::{require_api_user, require_page_user},
    models::{lenient_i64, stock::SALE_SELECT, NewActivity, Product, SaleRow},
    state::AppState,
};

#[derive(Template)]
#[template(path = "sales.html")]
struct SalesTemplate {
    page: PageContext,
    sales: Vec<SaleRow>,
    products: Vec<Product>,
}

#[derive(Deserialize)]
pub struct SalePayload {
    #[serde(default, deserialize_with = "lenient_i64")]
    product_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    quantity_sold: Option<i64>,
    sale_date: Option<String>,
}

pub async fn find_sale(db: &Database, sale_id: i64) -> AppResult<SaleRow> {
    sqlx::query_as::<_, SaleRow>(&format!("{} WHERE s.sale_id = ?", SALE_SELECT))
        .bind(sale_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn sales_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> PageResult {
    let user = require_page_user(&cookies, &state, &uri)
        .await
        .map_err(IntoResponse::into_response)?;

    let load = async {
        let sales = sqlx::query_as::<_, SaleRow>(&format!(
            "{} ORDER BY s.sale_date DESC, s.sale_id DESC",
            SALE_SELECT
        ))
        .fetch_all(&state.db)
        .await?;
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY product_id")
            .fetch_all(&state.db)
            .await?;
        Ok::<_, sqlx::Error>((sales, products))
    };
    let (sales, products) = load.await.map_err(|e| {
        log::error!("failed to load sales: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })?;

    let template = SalesTemplate {
        page: PageContext::for_user(&cookies, &user, "sales"),
        sales,
        products,
    };
    render(&template)
}

pub async fn list_sales(State(state): State<AppState>) -> AppResult<Json<Vec<SaleRow>>> {
    let sales = sqlx::query_as::<_, SaleRow>(&format!("{} ORDER BY s.sale_id", SALE_SELECT))
        .fetch_all(&state.db)
        .await?;
    Ok(Json(sales))
}

/// Records a sale and takes the units out of stock in one transaction.
pub async fn create_sale(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<SalePayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user = require_api_user(&cookies, &state).await?;
    let body = json_body(payload)?;

    let product_id = required(body.product_id, "product_id")?;
    let quantity_sold = required(body.quantity_sold, "quantity_sold")?;
    if quantity_sold <= 0 {
        return Err(AppError::bad_request("Quantity sold must be greater than zero"));
    }
    let sale_date = parse_date(body.sale_date.as_deref(), "sale_date")?.unwrap_or_else(today);

    let mut tx = state.db.begin().await?;

    let inventory = sqlx::query_as::<_, (i64, i64)>(
        "SELECT inventory_id, stock_quantity FROM inventory WHERE product_id = ? ORDER BY inventory_id LIMIT 1",
    )
    .bind(product_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((inventory_id, available)) = inventory else {
        return Err(AppError::bad_request("Product not found in inventory"));
    };

    // The guard in the WHERE clause keeps stock from going negative
    // even if another sale committed since the read above.
    let updated = sqlx::query(
        "UPDATE inventory SET stock_quantity = stock_quantity - ? WHERE inventory_id = ? AND stock_quantity >= ?",
    )
    .bind(quantity_sold)
    .bind(inventory_id)
    .bind(quantity_sold)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::bad_request(format!(
            "Insufficient stock. Available: {}",
            available
        )));
    }

    let sale_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sales (product_id, quantity_sold, sale_date) VALUES (?, ?, ?) RETURNING sale_id",
    )
    .bind(product_id)
    .bind(quantity_sold)
    .bind(sale_date)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let sale = find_sale(&state.db, sale_id).await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "sale_recorded",
            "sales",
            sale_id,
            format!(
                "Recorded sale of {} units of '{}'",
                quantity_sold,
                sale.product_label()
            ),
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "sale": sale }))))
}

/// Deletes a sale and puts its units back into stock.
pub async fn delete_sale(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(sale_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let user = require_api_user(&cookies, &state).await?;
    let sale = find_sale(&state.db, sale_id).await?;

    let mut tx = state.db.begin().await?;

    // Only the request that actually removes the row restocks.
    let deleted = sqlx::query_as::<_, (i64, i64)>(
        "DELETE FROM sales WHERE sale_id = ? RETURNING product_id, quantity_sold",
    )
    .bind(sale_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((product_id, quantity_sold)) = deleted else {
        return Err(AppError::NotFound);
    };

    sqlx::query(
        r#"
        UPDATE inventory SET stock_quantity = stock_quantity + ?
        WHERE inventory_id = (
            SELECT inventory_id FROM inventory WHERE product_id = ? ORDER BY inventory_id LIMIT 1
        )
        "#,
    )
    .bind(quantity_sold)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "delete_sale",
            "sales",
            sale_id,
            format!(
                "Deleted sale of {} units of '{}'",
                quantity_sold,
                sale.product_label()
            ),
        ),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Sale deleted and inventory restored"
    })))
}

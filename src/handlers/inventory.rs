use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use askama::Template;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;

use super::{json_body, parse_date, render, PageContext, PageResult};
use crate::{
    activity::log_activity,
    database::Database,
    error::{AppError, AppResult},
    filters,
    middleware::{require_api_user, require_page_user},
    models::{lenient_i64, stock::INVENTORY_SELECT, InventoryRow, NewActivity, Product},
    state::AppState,
};

#[derive(Template)]
#[template(path = "inventory.html")]
struct InventoryTemplate {
    page: PageContext,
    inventory_items: Vec<InventoryRow>,
    products: Vec<Product>,
}

#[derive(Deserialize)]
pub struct InventoryPayload {
    #[serde(default, deserialize_with = "lenient_i64")]
    stock_quantity: Option<i64>,
    restock_date: Option<String>,
}

pub async fn find_inventory(db: &Database, inventory_id: i64) -> AppResult<InventoryRow> {
    sqlx::query_as::<_, InventoryRow>(&format!("{} WHERE i.inventory_id = ?", INVENTORY_SELECT))
        .bind(inventory_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
}

async fn all_inventory(db: &Database) -> Result<Vec<InventoryRow>, sqlx::Error> {
    sqlx::query_as::<_, InventoryRow>(&format!("{} ORDER BY i.inventory_id", INVENTORY_SELECT))
        .fetch_all(db)
        .await
}

pub async fn inventory_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> PageResult {
    let user = require_page_user(&cookies, &state, &uri)
        .await
        .map_err(IntoResponse::into_response)?;

    let load = async {
        let inventory_items = all_inventory(&state.db).await?;
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY product_id")
            .fetch_all(&state.db)
            .await?;
        Ok::<_, sqlx::Error>((inventory_items, products))
    };
    let (inventory_items, products) = load.await.map_err(|e| {
        log::error!("failed to load inventory: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })?;

    let template = InventoryTemplate {
        page: PageContext::for_user(&cookies, &user, "inventory"),
        inventory_items,
        products,
    };
    render(&template)
}

pub async fn list_inventory(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryRow>>> {
    Ok(Json(all_inventory(&state.db).await?))
}

/// Sets the stock level and/or restock date of one inventory row.
pub async fn update_inventory(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(inventory_id): Path<i64>,
    payload: Result<Json<InventoryPayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let user = require_api_user(&cookies, &state).await?;
    let existing = find_inventory(&state.db, inventory_id).await?;
    let body = json_body(payload)?;

    let old_quantity = existing.stock_quantity;
    let new_quantity = body.stock_quantity.unwrap_or(old_quantity);
    if new_quantity < 0 {
        return Err(AppError::bad_request("Stock quantity cannot be negative"));
    }
    let restock_date = parse_date(body.restock_date.as_deref(), "restock_date")?
        .or(existing.restock_date);

    sqlx::query("UPDATE inventory SET stock_quantity = ?, restock_date = ? WHERE inventory_id = ?")
        .bind(new_quantity)
        .bind(restock_date)
        .bind(inventory_id)
        .execute(&state.db)
        .await?;

    let inventory = find_inventory(&state.db, inventory_id).await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "edit_inventory",
            "inventory",
            inventory_id,
            format!(
                "Updated stock for '{}' from {} to {}",
                inventory.product_label(),
                old_quantity,
                inventory.stock_quantity
            ),
        ),
    )
    .await;

    Ok(Json(json!({ "success": true, "inventory": inventory })))
}

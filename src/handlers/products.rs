use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use askama::Template;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;

use super::{json_body, render, required, today, PageContext, PageResult};
use crate::{
    activity::log_activity,
    database::Database,
    error::{AppError, AppResult},
    filters,
    middleware::{require_api_user, require_page_user},
    models::{lenient_f64, lenient_i64, NewActivity, Product},
    state::AppState,
};

#[derive(Template)]
#[template(path = "products.html")]
struct ProductsTemplate {
    page: PageContext,
    products: Vec<Product>,
}

#[derive(Deserialize)]
pub struct ProductPayload {
    product_name: Option<String>,
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    initial_stock: Option<i64>,
}

fn validate_price(price: f64) -> AppResult<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::bad_request("Price must be a non-negative number"));
    }
    Ok(price)
}

fn validate_text(value: String, field: &str) -> AppResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::bad_request(format!("'{}' cannot be empty", field)));
    }
    Ok(value)
}

pub async fn find_product(db: &Database, product_id: i64) -> AppResult<Product> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE product_id = ?")
        .bind(product_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn products_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> PageResult {
    let user = require_page_user(&cookies, &state, &uri)
        .await
        .map_err(IntoResponse::into_response)?;

    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY product_id")
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            log::error!("failed to list products: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?;

    let template = ProductsTemplate {
        page: PageContext::for_user(&cookies, &user, "products"),
        products,
    };
    render(&template)
}

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY product_id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Product>> {
    Ok(Json(find_product(&state.db, product_id).await?))
}

/// Creates the product together with its (initially empty) inventory row.
pub async fn create_product(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user = require_api_user(&cookies, &state).await?;
    let body = json_body(payload)?;

    let product_name = validate_text(required(body.product_name, "product_name")?, "product_name")?;
    let category = validate_text(required(body.category, "category")?, "category")?;
    let price = validate_price(required(body.price, "price")?)?;
    let initial_stock = body.initial_stock.unwrap_or(0);
    if initial_stock < 0 {
        return Err(AppError::bad_request("Initial stock cannot be negative"));
    }

    let mut tx = state.db.begin().await?;

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (product_name, category, price) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(&product_name)
    .bind(&category)
    .bind(price)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO inventory (product_id, stock_quantity, restock_date) VALUES (?, ?, ?)")
        .bind(product.product_id)
        .bind(initial_stock)
        .bind(today())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "add_product",
            "products",
            product.product_id,
            format!("Added product '{}'", product.product_name),
        ),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "product": product })),
    ))
}

pub async fn update_product(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(product_id): Path<i64>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let user = require_api_user(&cookies, &state).await?;
    let existing = find_product(&state.db, product_id).await?;
    let body = json_body(payload)?;

    let product_name = match body.product_name {
        Some(name) => validate_text(name, "product_name")?,
        None => existing.product_name,
    };
    let category = match body.category {
        Some(category) => validate_text(category, "category")?,
        None => existing.category,
    };
    let price = match body.price {
        Some(price) => validate_price(price)?,
        None => existing.price,
    };

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET product_name = ?, category = ?, price = ? WHERE product_id = ? RETURNING *",
    )
    .bind(&product_name)
    .bind(&category)
    .bind(price)
    .bind(product_id)
    .fetch_one(&state.db)
    .await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "edit_product",
            "products",
            product_id,
            format!("Updated product '{}'", product.product_name),
        ),
    )
    .await;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// Deleting a product also removes its inventory, sales and purchases.
pub async fn delete_product(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let user = require_api_user(&cookies, &state).await?;
    let product = find_product(&state.db, product_id).await?;

    sqlx::query("DELETE FROM products WHERE product_id = ?")
        .bind(product_id)
        .execute(&state.db)
        .await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "delete_product",
            "products",
            product_id,
            format!("Deleted product '{}'", product.product_name),
        ),
    )
    .await;

    Ok(Json(json!({ "success": true, "message": "Product deleted" })))
}

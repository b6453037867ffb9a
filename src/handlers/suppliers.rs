use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use askama::Template;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;

use super::{json_body, render, required, PageContext, PageResult};
use crate::{
    activity::log_activity,
    database::Database,
    error::{AppError, AppResult},
    middleware::{require_api_user, require_page_user},
    models::{NewActivity, Supplier},
    state::AppState,
};

#[derive(Template)]
#[template(path = "suppliers.html")]
struct SuppliersTemplate {
    page: PageContext,
    suppliers: Vec<Supplier>,
}

#[derive(Deserialize)]
pub struct SupplierPayload {
    supplier_name: Option<String>,
    contact_info: Option<String>,
}

fn non_empty(value: String, field: &str) -> AppResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::bad_request(format!("'{}' cannot be empty", field)));
    }
    Ok(value)
}

pub async fn find_supplier(db: &Database, supplier_id: i64) -> AppResult<Supplier> {
    sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE supplier_id = ?")
        .bind(supplier_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn suppliers_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> PageResult {
    let user = require_page_user(&cookies, &state, &uri)
        .await
        .map_err(IntoResponse::into_response)?;

    let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY supplier_id")
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            log::error!("failed to list suppliers: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?;

    let template = SuppliersTemplate {
        page: PageContext::for_user(&cookies, &user, "suppliers"),
        suppliers,
    };
    render(&template)
}

pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<Supplier>>> {
    let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY supplier_id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(suppliers))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<i64>,
) -> AppResult<Json<Supplier>> {
    Ok(Json(find_supplier(&state.db, supplier_id).await?))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<SupplierPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user = require_api_user(&cookies, &state).await?;
    let body = json_body(payload)?;

    let supplier_name = non_empty(required(body.supplier_name, "supplier_name")?, "supplier_name")?;
    let contact_info = non_empty(required(body.contact_info, "contact_info")?, "contact_info")?;

    let supplier = sqlx::query_as::<_, Supplier>(
        "INSERT INTO suppliers (supplier_name, contact_info) VALUES (?, ?) RETURNING *",
    )
    .bind(&supplier_name)
    .bind(&contact_info)
    .fetch_one(&state.db)
    .await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "add_supplier",
            "suppliers",
            supplier.supplier_id,
            format!("Added supplier '{}'", supplier.supplier_name),
        ),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "supplier": supplier })),
    ))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(supplier_id): Path<i64>,
    payload: Result<Json<SupplierPayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let user = require_api_user(&cookies, &state).await?;
    let existing = find_supplier(&state.db, supplier_id).await?;
    let body = json_body(payload)?;

    let supplier_name = match body.supplier_name {
        Some(name) => non_empty(name, "supplier_name")?,
        None => existing.supplier_name,
    };
    let contact_info = match body.contact_info {
        Some(contact) => non_empty(contact, "contact_info")?,
        None => existing.contact_info,
    };

    let supplier = sqlx::query_as::<_, Supplier>(
        "UPDATE suppliers SET supplier_name = ?, contact_info = ? WHERE supplier_id = ? RETURNING *",
    )
    .bind(&supplier_name)
    .bind(&contact_info)
    .bind(supplier_id)
    .fetch_one(&state.db)
    .await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "edit_supplier",
            "suppliers",
            supplier_id,
            format!("Updated supplier '{}'", supplier.supplier_name),
        ),
    )
    .await;

    Ok(Json(json!({ "success": true, "supplier": supplier })))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(supplier_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let user = require_api_user(&cookies, &state).await?;
    let supplier = find_supplier(&state.db, supplier_id).await?;

    // purchases go with it (ON DELETE CASCADE)
    sqlx::query("DELETE FROM suppliers WHERE supplier_id = ?")
        .bind(supplier_id)
        .execute(&state.db)
        .await?;

    log_activity(
        &state.db,
        &user,
        NewActivity::new(
            "delete_supplier",
            "suppliers",
            supplier_id,
            format!("Deleted supplier '{}'", supplier.supplier_name),
        ),
    )
    .await;

    Ok(Json(json!({ "success": true, "message": "Supplier deleted" })))
}

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Json},
};
use askama::Template;
use serde_json::{json, Value};
use tower_cookies::Cookies;

use super::{render, today, PageContext, PageResult};
use crate::{
    forecast,
    middleware::require_page_user,
    state::AppState,
};

#[derive(Template)]
#[template(path = "ai_insights.html")]
struct InsightsTemplate {
    page: PageContext,
}

pub async fn insights_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> PageResult {
    let user = require_page_user(&cookies, &state, &uri)
        .await
        .map_err(IntoResponse::into_response)?;

    let template = InsightsTemplate {
        page: PageContext::for_user(&cookies, &user, "ai-insights"),
    };
    render(&template)
}

// The analytics endpoints report failure in-band with `success: false`
// so the charts can show a message instead of breaking.

pub async fn predict(State(state): State<AppState>) -> Json<Value> {
    match forecast::predict_low_stock(&state.db, today()).await {
        Ok(report) => Json(json!({
            "success": true,
            "predictions": report.predictions,
            "timestamp": report.timestamp,
        })),
        Err(e) => {
            log::error!("forecast failed: {}", e);
            Json(json!({ "success": false, "error": e.to_string(), "predictions": [] }))
        }
    }
}

pub async fn sales_trend(State(state): State<AppState>) -> Json<Value> {
    match forecast::sales_trend(&state.db, today()).await {
        Ok(trend) => Json(json!({
            "success": true,
            "dates": trend.dates,
            "quantities": trend.quantities,
        })),
        Err(e) => {
            log::error!("sales trend failed: {}", e);
            Json(json!({ "success": false, "error": e.to_string() }))
        }
    }
}

pub async fn category_sales(State(state): State<AppState>) -> Json<Value> {
    match forecast::category_sales(&state.db).await {
        Ok(breakdown) => Json(json!({
            "success": true,
            "categories": breakdown.categories,
            "sales": breakdown.sales,
        })),
        Err(e) => {
            log::error!("category sales failed: {}", e);
            Json(json!({ "success": false, "error": e.to_string() }))
        }
    }
}

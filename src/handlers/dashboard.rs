use axum::{
    extract::State,
    http::Uri,
    response::IntoResponse,
};
use askama::Template;
use tower_cookies::Cookies;

use super::{render, PageContext, PageResult};
use crate::{
    activity,
    database::Database,
    middleware::{require_page_user, CurrentUser},
    models::{stock::SALE_SELECT, ActivityLog, LowStockItem, SaleRow},
    state::AppState,
};

/// Stock below this many units counts as low on the dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 20;

#[derive(Default)]
struct DashboardStats {
    total_products: i64,
    total_sales: i64,
    low_stock_count: i64,
    total_suppliers: i64,
    recent_sales: Vec<SaleRow>,
    low_stock_items: Vec<LowStockItem>,
    recent_activities: Vec<ActivityLog>,
    user_actions_count: i64,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    page: PageContext,
    stats: DashboardStats,
    error: String,
}

pub async fn dashboard(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> PageResult {
    let user = require_page_user(&cookies, &state, &uri)
        .await
        .map_err(IntoResponse::into_response)?;

    let (stats, error) = match load_stats(&state.db, &user).await {
        Ok(stats) => (stats, String::new()),
        Err(e) => {
            log::error!("failed to load dashboard: {}", e);
            (DashboardStats::default(), e.to_string())
        }
    };

    let template = DashboardTemplate {
        page: PageContext::for_user(&cookies, &user, "dashboard"),
        stats,
        error,
    };
    render(&template)
}

async fn load_stats(db: &Database, user: &CurrentUser) -> Result<DashboardStats, sqlx::Error> {
    let total_products = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(db)
        .await?;

    let total_sales = sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(quantity_sold), 0) FROM sales")
        .fetch_one(db)
        .await?;

    let low_stock_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inventory WHERE stock_quantity < ?")
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(db)
        .await?;

    let total_suppliers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers")
        .fetch_one(db)
        .await?;

    let recent_sales = sqlx::query_as::<_, SaleRow>(&format!(
        "{} ORDER BY s.sale_date DESC, s.sale_id DESC LIMIT 5",
        SALE_SELECT
    ))
    .fetch_all(db)
    .await?;

    let low_stock_items = sqlx::query_as::<_, LowStockItem>(
        r#"
        SELECT i.inventory_id, i.product_id, p.product_name, p.category, i.stock_quantity
        FROM inventory i
        JOIN products p ON p.product_id = i.product_id
        WHERE i.stock_quantity < ?
        ORDER BY i.stock_quantity
        LIMIT 5
        "#,
    )
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_all(db)
    .await?;

    let recent_activities = activity::recent_for_user(db, user.user_id, 10).await?;
    let user_actions_count = activity::count_for_user(db, user.user_id).await?;

    Ok(DashboardStats {
        total_products,
        total_sales,
        low_stock_count,
        total_suppliers,
        recent_sales,
        low_stock_items,
        recent_activities,
        user_actions_count,
    })
}

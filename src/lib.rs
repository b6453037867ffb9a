pub mod activity;
pub mod config;
pub mod database;
pub mod error;
pub mod filters;
pub mod forecast;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use config::Config;
pub use state::AppState;

/// Connects, migrates and seeds the database described by `config`.
pub async fn prepare_state(config: Config) -> anyhow::Result<AppState> {
    let db = database::create_database_pool(&config.database_url).await?;

    let purged = middleware::purge_expired_sessions(&db, chrono::Utc::now().naive_utc()).await?;
    if purged > 0 {
        log::info!("removed {} expired sessions", purged);
    }

    database::seed::ensure_admin_user(&db, config.bcrypt_cost).await?;
    if config.seed_sample_data {
        database::seed::seed_sample_data(&db).await?;
    }

    Ok(AppState::new(db, config))
}

pub fn build_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // Public pages
        .route("/", get(handlers::auth::home))
        .route(
            "/login",
            get(handlers::auth::login_page).post(handlers::auth::login),
        )
        .route(
            "/register",
            get(handlers::auth::register_page).post(handlers::auth::register),
        )
        .route(
            "/logout",
            get(handlers::auth::logout).post(handlers::auth::logout),
        )

        // Pages behind the login
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/products", get(handlers::products::products_page))
        .route("/suppliers", get(handlers::suppliers::suppliers_page))
        .route("/inventory", get(handlers::inventory::inventory_page))
        .route("/sales", get(handlers::sales::sales_page))
        .route("/ai-insights", get(handlers::insights::insights_page))

        // Activity log
        .route("/api/activity-log", get(handlers::activity::my_activity))
        .route("/api/activity-log/all", get(handlers::activity::all_activity))

        // Products
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )

        // Suppliers
        .route(
            "/api/suppliers",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route(
            "/api/suppliers/:id",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )

        // Inventory, sales and purchases
        .route("/api/inventory", get(handlers::inventory::list_inventory))
        .route("/api/inventory/:id", put(handlers::inventory::update_inventory))
        .route(
            "/api/sales",
            get(handlers::sales::list_sales).post(handlers::sales::create_sale),
        )
        .route(
            "/api/sales/:id",
            axum::routing::delete(handlers::sales::delete_sale),
        )
        .route(
            "/api/purchases",
            get(handlers::purchases::list_purchases).post(handlers::purchases::create_purchase),
        )

        // Forecasting
        .route("/api/predict", get(handlers::insights::predict))
        .route("/api/sales-trend", get(handlers::insights::sales_trend))
        .route("/api/category-sales", get(handlers::insights::category_sales))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(error::not_found)

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(1024 * 1024)),
        )
        .with_state(state)
}

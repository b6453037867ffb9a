use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

use super::{forecast_product, rank_by_urgency, ForecastInput, ProductForecast, SalePoint};
use crate::database::Database;
use crate::models::{Product, TIMESTAMP_FORMAT, DATE_FORMAT};

pub const TREND_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct ForecastReport {
    pub predictions: Vec<ProductForecast>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SalesTrend {
    pub dates: Vec<String>,
    pub quantities: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct CategorySales {
    pub categories: Vec<String>,
    pub sales: Vec<i64>,
}

#[derive(sqlx::FromRow)]
struct SaleHistoryRow {
    product_id: i64,
    sale_date: NaiveDate,
    quantity_sold: i64,
}

/// Forecasts every product as of `today`, most urgent first.
pub async fn predict_low_stock(db: &Database, today: NaiveDate) -> Result<ForecastReport, sqlx::Error> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY product_id")
        .fetch_all(db)
        .await?;

    // First inventory row per product, as the sale/purchase handlers use.
    let stock: HashMap<i64, i64> = sqlx::query_as::<_, (i64, i64)>(
        "SELECT product_id, stock_quantity FROM inventory ORDER BY inventory_id DESC",
    )
    .fetch_all(db)
    .await?
    .into_iter()
    .collect();

    let mut history: HashMap<i64, Vec<SalePoint>> = HashMap::new();
    let rows = sqlx::query_as::<_, SaleHistoryRow>(
        "SELECT product_id, sale_date, quantity_sold FROM sales ORDER BY sale_date, sale_id",
    )
    .fetch_all(db)
    .await?;
    for row in rows {
        history.entry(row.product_id).or_default().push(SalePoint {
            date: row.sale_date,
            quantity: row.quantity_sold,
        });
    }

    let mut predictions: Vec<ProductForecast> = products
        .iter()
        .map(|product| {
            let input = ForecastInput {
                product_id: product.product_id,
                product_name: &product.product_name,
                category: &product.category,
                current_stock: stock.get(&product.product_id).copied().unwrap_or(0),
            };
            let sales = history.get(&product.product_id).map(Vec::as_slice).unwrap_or(&[]);
            forecast_product(input, sales, today)
        })
        .collect();

    rank_by_urgency(&mut predictions);

    Ok(ForecastReport {
        predictions,
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    })
}

/// Units sold per day over the trailing window, oldest first.
pub async fn sales_trend(db: &Database, today: NaiveDate) -> Result<SalesTrend, sqlx::Error> {
    let since = today - Duration::days(TREND_WINDOW_DAYS);
    let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
        "SELECT sale_date, SUM(quantity_sold) FROM sales WHERE sale_date >= ? GROUP BY sale_date ORDER BY sale_date",
    )
    .bind(since)
    .fetch_all(db)
    .await?;

    let (dates, quantities) = rows
        .into_iter()
        .map(|(date, quantity)| (date.format(DATE_FORMAT).to_string(), quantity))
        .unzip();

    Ok(SalesTrend { dates, quantities })
}

/// Units sold per category, in the order categories first appear in the catalog.
pub async fn category_sales(db: &Database) -> Result<CategorySales, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT p.category, COALESCE(SUM(s.quantity_sold), 0)
        FROM products p
        LEFT JOIN sales s ON s.product_id = p.product_id
        GROUP BY p.product_id
        ORDER BY p.product_id
        "#,
    )
    .fetch_all(db)
    .await?;

    let mut categories: Vec<String> = Vec::new();
    let mut sales: Vec<i64> = Vec::new();
    for (category, total) in rows {
        match categories.iter().position(|c| *c == category) {
            Some(idx) => sales[idx] += total,
            None => {
                categories.push(category);
                sales.push(total);
            }
        }
    }

    Ok(CategorySales { categories, sales })
}

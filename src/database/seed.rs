use chrono::{NaiveDate, Utc};

use super::Database;
use crate::utils::hash_password;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@inventory.com";

const SAMPLE_PRODUCTS: &[(&str, &str, f64)] = &[
    ("Laptop", "Electronics", 899.99),
    ("Mouse", "Electronics", 25.99),
    ("Keyboard", "Electronics", 49.99),
    ("Monitor", "Electronics", 199.99),
    ("Desk Chair", "Furniture", 149.99),
    ("Notebook", "Stationery", 3.99),
    ("Pen Set", "Stationery", 12.99),
    ("USB Cable", "Electronics", 8.99),
];

const SAMPLE_SUPPLIERS: &[(&str, &str)] = &[
    ("TechSupply Co.", "tech@supply.com"),
    ("Office Depot", "sales@officedepot.com"),
    ("FurniturePro", "info@furniturepro.com"),
];

// (product index, stock, restock (month, day)) in 2025
const SAMPLE_INVENTORY: &[(usize, i64, (u32, u32))] = &[
    (0, 50, (11, 15)),
    (1, 120, (11, 10)),
    (2, 80, (11, 12)),
    (3, 35, (11, 20)),
    (4, 25, (11, 18)),
    (5, 200, (11, 8)),
    (6, 150, (11, 9)),
    (7, 90, (11, 11)),
];

const SAMPLE_SALES: &[(usize, i64, (u32, u32))] = &[
    (0, 5, (10, 25)),
    (1, 15, (10, 26)),
    (0, 3, (10, 27)),
    (2, 8, (10, 28)),
    (3, 4, (10, 29)),
    (1, 12, (10, 30)),
    (5, 25, (10, 31)),
    (6, 18, (11, 1)),
    (0, 2, (11, 1)),
    (4, 3, (11, 2)),
];

// (product index, supplier index, quantity, (month, day))
const SAMPLE_PURCHASES: &[(usize, usize, i64, (u32, u32))] = &[
    (0, 0, 30, (10, 20)),
    (1, 0, 100, (10, 21)),
    (4, 2, 20, (10, 22)),
    (5, 1, 150, (10, 23)),
];

fn sample_date((month, day): (u32, u32)) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::from_ymd_opt(2025, month, day)
        .ok_or_else(|| sqlx::Error::Protocol(format!("invalid sample date 2025-{}-{}", month, day)))
}

/// Creates the default administrator when the users table is empty.
pub async fn ensure_admin_user(db: &Database, bcrypt_cost: u32) -> Result<bool, sqlx::Error> {
    let user_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    if user_count > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD, bcrypt_cost)
        .map_err(|e| sqlx::Error::Protocol(format!("failed to hash admin password: {}", e)))?;

    sqlx::query(
        "INSERT INTO users (username, email, password_hash, join_date, is_admin) VALUES (?, ?, ?, ?, 1)",
    )
    .bind(DEFAULT_ADMIN_USERNAME)
    .bind(DEFAULT_ADMIN_EMAIL)
    .bind(password_hash)
    .bind(Utc::now().naive_utc())
    .execute(db)
    .await?;

    log::info!(
        "Default admin user created (username: {}, password: {})",
        DEFAULT_ADMIN_USERNAME,
        DEFAULT_ADMIN_PASSWORD
    );
    Ok(true)
}

/// Fills an empty catalog with a small demo data set.
pub async fn seed_sample_data(db: &Database) -> Result<bool, sqlx::Error> {
    let product_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(db)
        .await?;
    if product_count > 0 {
        return Ok(false);
    }

    let mut tx = db.begin().await?;

    let mut product_ids = Vec::with_capacity(SAMPLE_PRODUCTS.len());
    for (name, category, price) in SAMPLE_PRODUCTS {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO products (product_name, category, price) VALUES (?, ?, ?) RETURNING product_id",
        )
        .bind(name)
        .bind(category)
        .bind(price)
        .fetch_one(&mut *tx)
        .await?;
        product_ids.push(id);
    }

    let mut supplier_ids = Vec::with_capacity(SAMPLE_SUPPLIERS.len());
    for (name, contact) in SAMPLE_SUPPLIERS {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO suppliers (supplier_name, contact_info) VALUES (?, ?) RETURNING supplier_id",
        )
        .bind(name)
        .bind(contact)
        .fetch_one(&mut *tx)
        .await?;
        supplier_ids.push(id);
    }

    for (product, stock, restock) in SAMPLE_INVENTORY {
        sqlx::query("INSERT INTO inventory (product_id, stock_quantity, restock_date) VALUES (?, ?, ?)")
            .bind(product_ids[*product])
            .bind(stock)
            .bind(sample_date(*restock)?)
            .execute(&mut *tx)
            .await?;
    }

    for (product, quantity, date) in SAMPLE_SALES {
        sqlx::query("INSERT INTO sales (product_id, quantity_sold, sale_date) VALUES (?, ?, ?)")
            .bind(product_ids[*product])
            .bind(quantity)
            .bind(sample_date(*date)?)
            .execute(&mut *tx)
            .await?;
    }

    for (product, supplier, quantity, date) in SAMPLE_PURCHASES {
        sqlx::query(
            "INSERT INTO purchases (product_id, supplier_id, quantity_purchased, purchase_date) VALUES (?, ?, ?, ?)",
        )
        .bind(product_ids[*product])
        .bind(supplier_ids[*supplier])
        .bind(quantity)
        .bind(sample_date(*date)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    log::info!("Database initialized with sample data");
    Ok(true)
}

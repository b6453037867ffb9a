use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

// Each row type carries the joined product (and supplier) name, the way
// the listing pages and the JSON API present them.

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryRow {
    pub inventory_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub stock_quantity: i64,
    pub restock_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleRow {
    pub sale_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity_sold: i64,
    pub sale_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseRow {
    pub purchase_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub supplier_id: i64,
    pub supplier_name: Option<String>,
    pub quantity_purchased: i64,
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Clone, FromRow)]
pub struct LowStockItem {
    pub inventory_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub category: String,
    pub stock_quantity: i64,
}

pub const INVENTORY_SELECT: &str = r#"
    SELECT i.inventory_id, i.product_id, p.product_name, i.stock_quantity, i.restock_date
    FROM inventory i
    LEFT JOIN products p ON p.product_id = i.product_id
"#;

pub const SALE_SELECT: &str = r#"
    SELECT s.sale_id, s.product_id, p.product_name, s.quantity_sold, s.sale_date
    FROM sales s
    LEFT JOIN products p ON p.product_id = s.product_id
"#;

pub const PURCHASE_SELECT: &str = r#"
    SELECT pu.purchase_id, pu.product_id, p.product_name, pu.supplier_id, su.supplier_name,
           pu.quantity_purchased, pu.purchase_date
    FROM purchases pu
    LEFT JOIN products p ON p.product_id = pu.product_id
    LEFT JOIN suppliers su ON su.supplier_id = pu.supplier_id
"#;

const UNKNOWN: &str = "Unknown";

impl InventoryRow {
    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn restock_label(&self) -> String {
        self.restock_date
            .map(|date| date.format(super::DATE_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

impl SaleRow {
    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or(UNKNOWN)
    }
}

impl PurchaseRow {
    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn supplier_label(&self) -> &str {
        self.supplier_name.as_deref().unwrap_or(UNKNOWN)
    }
}

pub mod activity;
pub mod catalog;
pub mod stock;
pub mod user;

pub use activity::{ActivityLog, NewActivity};
pub use catalog::{Product, Supplier};
pub use stock::{InventoryRow, LowStockItem, PurchaseRow, SaleRow};
pub use user::User;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialises a timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn serialize_timestamp<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accepts `12`, `12.5` or `"12.5"`: HTML inputs post numbers as strings.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(NumberOrText::Int(i)) => Ok(Some(i as f64)),
        Some(NumberOrText::Float(f)) => Ok(Some(f)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("could not convert string to float: '{}'", s))),
    }
}

/// Integer counterpart of [`lenient_f64`]. Floats are rejected.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(NumberOrText::Int(i)) => Ok(Some(i)),
        Some(NumberOrText::Float(f)) => Err(serde::de::Error::custom(format!(
            "invalid literal for int(): '{}'",
            f
        ))),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid literal for int(): '{}'", s))),
    }
}

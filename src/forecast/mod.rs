//! Per-product sales forecasting.
//!
//! Each product's sales history is reduced to `(days since first sale,
//! quantity sold)` pairs, fitted with a straight line and evaluated at
//! today's offset. The predicted daily demand then decides how many days
//! the current stock lasts and which status tier the product falls into.

pub mod regression;
pub mod report;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

pub use regression::LinearFit;
pub use report::{category_sales, predict_low_stock, sales_trend};

/// Days reported when there is no predicted demand.
pub const NO_STOCKOUT_SENTINEL: i64 = 999;
pub const CRITICAL_DAYS: i64 = 3;
pub const WARNING_DAYS: i64 = 7;
pub const LOW_STOCK_UNITS: i64 = 10;
pub const MIN_SALES_FOR_FIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalePoint {
    pub date: NaiveDate,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Critical,
    Warning,
    LowStock,
    Healthy,
    InsufficientData,
}

impl StockStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "⚠️ Critical - Low Stock",
            Self::Warning => "⚠️ Warning - Stock Running Low",
            Self::LowStock => "⚠️ Low Stock",
            Self::Healthy => "✅ Healthy Stock",
            Self::InsufficientData => "Insufficient Data",
        }
    }

    fn classify(days_until_stockout: i64, predicted_sales: f64, current_stock: i64) -> Self {
        if days_until_stockout <= CRITICAL_DAYS && predicted_sales > 0.0 {
            Self::Critical
        } else if days_until_stockout <= WARNING_DAYS && predicted_sales > 0.0 {
            Self::Warning
        } else if current_stock < LOW_STOCK_UNITS {
            Self::LowStock
        } else {
            Self::Healthy
        }
    }
}

impl Serialize for StockStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    fn from_sample_size(n: usize) -> Self {
        match n {
            n if n >= 5 => Self::High,
            n if n >= 3 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Days of stock left, or `"N/A"` when the product is not running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockoutEta {
    Days(i64),
    NotApplicable,
}

impl StockoutEta {
    fn from_days(days: i64) -> Self {
        if days < NO_STOCKOUT_SENTINEL {
            Self::Days(days)
        } else {
            Self::NotApplicable
        }
    }

    pub fn sort_key(self) -> i64 {
        match self {
            Self::Days(days) => days,
            Self::NotApplicable => NO_STOCKOUT_SENTINEL,
        }
    }
}

impl Serialize for StockoutEta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Days(days) => serializer.serialize_i64(*days),
            Self::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductForecast {
    pub product_id: i64,
    pub product_name: String,
    pub category: String,
    pub current_stock: i64,
    #[serde(serialize_with = "serialize_rate")]
    pub predicted_sales: f64,
    pub days_until_stockout: StockoutEta,
    pub status: StockStatus,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_score: Option<f64>,
}

/// The product being forecast, independent of how it was loaded.
#[derive(Debug, Clone)]
pub struct ForecastInput<'a> {
    pub product_id: i64,
    pub product_name: &'a str,
    pub category: &'a str,
    pub current_stock: i64,
}

pub fn forecast_product(input: ForecastInput<'_>, sales: &[SalePoint], today: NaiveDate) -> ProductForecast {
    let mut history = sales.to_vec();
    history.sort_by_key(|sale| sale.date);

    let insufficient = ProductForecast {
        product_id: input.product_id,
        product_name: input.product_name.to_string(),
        category: input.category.to_string(),
        current_stock: input.current_stock,
        predicted_sales: 0.0,
        days_until_stockout: StockoutEta::NotApplicable,
        status: StockStatus::InsufficientData,
        confidence: Confidence::Low,
        model_score: None,
    };

    let first_sale = match history.first() {
        Some(first) if history.len() >= MIN_SALES_FOR_FIT => first.date,
        _ => return insufficient,
    };

    let xs: Vec<f64> = history
        .iter()
        .map(|sale| (sale.date - first_sale).num_days() as f64)
        .collect();
    let ys: Vec<f64> = history.iter().map(|sale| sale.quantity as f64).collect();

    let fit = match LinearFit::fit(&xs, &ys) {
        Some(fit) => fit,
        None => return insufficient,
    };

    let today_offset = (today - first_sale).num_days() as f64;
    let predicted_sales = fit.predict(today_offset).max(0.0);

    let days = if predicted_sales > 0.0 {
        (input.current_stock as f64 / predicted_sales).trunc() as i64
    } else {
        NO_STOCKOUT_SENTINEL
    };

    ProductForecast {
        predicted_sales: round2(predicted_sales),
        days_until_stockout: StockoutEta::from_days(days),
        status: StockStatus::classify(days, predicted_sales, input.current_stock),
        confidence: Confidence::from_sample_size(history.len()),
        model_score: Some(round2(fit.r_squared(&xs, &ys))),
        ..insufficient
    }
}

/// Orders forecasts so the soonest stockouts come first. Ties keep their order.
pub fn rank_by_urgency(forecasts: &mut [ProductForecast]) {
    forecasts.sort_by_key(|f| f.days_until_stockout.sort_key());
}

/// Rounds to cents, halves to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// No demand is reported as the integer `0`, any other rate as a float.
fn serialize_rate<S: Serializer>(rate: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if *rate == 0.0 {
        serializer.serialize_i64(0)
    } else {
        serializer.serialize_f64(*rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(stock: i64) -> ForecastInput<'static> {
        ForecastInput {
            product_id: 1,
            product_name: "Laptop",
            category: "Electronics",
            current_stock: stock,
        }
    }

    fn sales(points: &[(NaiveDate, i64)]) -> Vec<SalePoint> {
        points
            .iter()
            .map(|(date, quantity)| SalePoint { date: *date, quantity: *quantity })
            .collect()
    }

    #[test]
    fn one_sale_is_not_enough() {
        let history = sales(&[(date(2025, 10, 1), 5)]);
        let f = forecast_product(input(50), &history, date(2025, 10, 5));
        assert_eq!(f.status, StockStatus::InsufficientData);
        assert_eq!(f.predicted_sales, 0.0);
        assert_eq!(f.days_until_stockout, StockoutEta::NotApplicable);
        assert_eq!(f.confidence, Confidence::Low);
        assert!(f.model_score.is_none());
        assert_eq!(f.current_stock, 50);
    }

    #[test]
    fn flat_demand_projects_stockout() {
        // 10 units a day, 25 left: 2 days => critical
        let history = sales(&[(date(2025, 10, 1), 10), (date(2025, 10, 2), 10)]);
        let f = forecast_product(input(25), &history, date(2025, 10, 3));
        assert_eq!(f.predicted_sales, 10.0);
        assert_eq!(f.days_until_stockout, StockoutEta::Days(2));
        assert_eq!(f.status, StockStatus::Critical);
        assert_eq!(f.model_score, Some(1.0));
    }

    #[test]
    fn trend_is_extrapolated_to_today() {
        // y = 2 + 2x, today is day 4 => 10 units/day, 65 in stock => 6 days
        let history = sales(&[
            (date(2025, 10, 1), 2),
            (date(2025, 10, 2), 4),
            (date(2025, 10, 3), 6),
        ]);
        let f = forecast_product(input(65), &history, date(2025, 10, 5));
        assert_eq!(f.predicted_sales, 10.0);
        assert_eq!(f.days_until_stockout, StockoutEta::Days(6));
        assert_eq!(f.status, StockStatus::Warning);
        assert_eq!(f.confidence, Confidence::Medium);
    }

    #[test]
    fn falling_demand_is_clamped_to_zero() {
        let history = sales(&[(date(2025, 10, 1), 20), (date(2025, 10, 2), 10)]);
        let f = forecast_product(input(5), &history, date(2025, 12, 1));
        assert_eq!(f.predicted_sales, 0.0);
        assert_eq!(f.days_until_stockout, StockoutEta::NotApplicable);
        // no demand but under ten units
        assert_eq!(f.status, StockStatus::LowStock);
    }

    #[test]
    fn long_runway_is_healthy_and_reported_as_not_applicable() {
        let history = sales(&[
            (date(2025, 10, 1), 1),
            (date(2025, 10, 2), 1),
            (date(2025, 10, 3), 1),
            (date(2025, 10, 4), 1),
            (date(2025, 10, 5), 1),
        ]);
        let f = forecast_product(input(5000), &history, date(2025, 10, 6));
        assert_eq!(f.days_until_stockout, StockoutEta::NotApplicable);
        assert_eq!(f.status, StockStatus::Healthy);
        assert_eq!(f.confidence, Confidence::High);
    }

    #[test]
    fn unsorted_history_is_ordered_by_date() {
        let history = sales(&[(date(2025, 10, 3), 6), (date(2025, 10, 1), 2), (date(2025, 10, 2), 4)]);
        let f = forecast_product(input(65), &history, date(2025, 10, 5));
        assert_eq!(f.predicted_sales, 10.0);
    }

    #[test]
    fn ranking_puts_soonest_first_and_keeps_ties_stable() {
        let mk = |id, eta| ProductForecast {
            product_id: id,
            product_name: String::new(),
            category: String::new(),
            current_stock: 0,
            predicted_sales: 0.0,
            days_until_stockout: eta,
            status: StockStatus::Healthy,
            confidence: Confidence::Low,
            model_score: None,
        };
        let mut list = vec![
            mk(1, StockoutEta::NotApplicable),
            mk(2, StockoutEta::Days(5)),
            mk(3, StockoutEta::NotApplicable),
            mk(4, StockoutEta::Days(1)),
        ];
        rank_by_urgency(&mut list);
        let ids: Vec<i64> = list.iter().map(|f| f.product_id).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn serialises_like_the_api_expects() {
        let history = sales(&[(date(2025, 10, 1), 10), (date(2025, 10, 2), 10)]);
        let f = forecast_product(input(25), &history, date(2025, 10, 3));
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["days_until_stockout"], 2);
        assert_eq!(json["status"], "⚠️ Critical - Low Stock");
        assert_eq!(json["confidence"], "Low");
        assert_eq!(json["model_score"], 1.0);

        let lone = forecast_product(input(3), &history[..1], date(2025, 10, 3));
        let json = serde_json::to_value(&lone).unwrap();
        assert_eq!(json["days_until_stockout"], "N/A");
        assert!(json.get("model_score").is_none());
        assert!(json["predicted_sales"].is_i64());
        assert_eq!(json["predicted_sales"], 0);
    }

    #[test]
    fn halves_round_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-0.0), 0.0);
    }
}

use std::borrow::Borrow;
use std::fmt::Display;

use askama::Result;

// Custom template filters, used as `{{ product.price|currency }}`.

/// Formats an amount as dollars with two decimals.
#[allow(clippy::unnecessary_wraps)]
pub fn currency<T: Display>(amount: T) -> Result<String> {
    Ok(format!("${:.2}", amount))
}

/// Maps a stock level to a Bootstrap badge colour.
#[allow(clippy::unnecessary_wraps)]
pub fn stock_badge<T: Borrow<i64>>(quantity: T) -> Result<&'static str> {
    let quantity = *quantity.borrow();
    Ok(if quantity < 10 {
        "danger"
    } else if quantity < 20 {
        "warning"
    } else {
        "success"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_rounds_to_cents() {
        assert_eq!(currency(899.99).unwrap(), "$899.99");
        assert_eq!(currency(&3.5).unwrap(), "$3.50");
    }

    #[test]
    fn stock_badges() {
        assert_eq!(stock_badge(3i64).unwrap(), "danger");
        assert_eq!(stock_badge(&15i64).unwrap(), "warning");
        assert_eq!(stock_badge(120i64).unwrap(), "success");
    }
}

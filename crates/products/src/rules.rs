//! Inventory consistency rules.
//!
//! Each rule validates a requested change against the current product
//! snapshot and returns the field update to persist. Rules never touch
//! storage and never mutate their inputs; applying the returned
//! [`StockUpdate`] is the caller's job.
//!
//! Date semantics: calendar dates only, both bounds inclusive.
//! A date equal to the arrival date or to `today` is valid; anything strictly
//! in the future is always rejected.

use chrono::NaiveDate;

use stockroom_core::{DomainError, DomainResult};

use crate::product::{NewProduct, Product, StockUpdate};

/// Require `arrival_date <= date <= today`.
pub fn check_date_window(
    arrival_date: NaiveDate,
    date: NaiveDate,
    today: NaiveDate,
    what: &str,
) -> DomainResult<()> {
    if date > today {
        return Err(DomainError::date(format!(
            "{what} {date} is after today ({today})"
        )));
    }
    if date < arrival_date {
        return Err(DomainError::date(format!(
            "{what} {date} is before the arrival date ({arrival_date})"
        )));
    }
    Ok(())
}

/// Validate a registration request and build the initial record.
///
/// Model uniqueness is not checked here: it depends on the gateway's state.
pub fn check_registration(new: NewProduct, today: NaiveDate) -> DomainResult<Product> {
    if new.quantity == 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    if !new.selling_price.is_finite() || new.selling_price <= 0.0 {
        return Err(DomainError::validation("selling price must be a positive number"));
    }

    let arrival_date = new.arrival_date.unwrap_or(today);
    if arrival_date > today {
        return Err(DomainError::date(format!(
            "arrival date {arrival_date} is after today ({today})"
        )));
    }

    let details = new
        .details
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(Product {
        model: new.model,
        category: new.category,
        quantity: new.quantity,
        details,
        selling_price: new.selling_price,
        arrival_date,
        selling_date: None,
    })
}

/// Plan a quantity increase (new arrivals of an existing model).
pub fn plan_arrival(
    product: &Product,
    delta: u32,
    change_date: Option<NaiveDate>,
    today: NaiveDate,
) -> DomainResult<StockUpdate> {
    if let Some(date) = change_date {
        check_date_window(product.arrival_date, date, today, "change date")?;
    }
    if delta == 0 {
        return Err(DomainError::validation("quantity change must be greater than zero"));
    }

    let quantity = product
        .quantity
        .checked_add(delta)
        .ok_or_else(|| DomainError::validation("quantity overflow"))?;

    Ok(StockUpdate {
        expected_quantity: product.quantity,
        quantity,
        selling_date: None,
    })
}

/// Plan a sale of `requested` units.
///
/// Emptying the stock stamps the selling date (the supplied one, else
/// `today`); the record itself is kept.
pub fn plan_sale(
    product: &Product,
    requested: u32,
    selling_date: Option<NaiveDate>,
    today: NaiveDate,
) -> DomainResult<StockUpdate> {
    if let Some(date) = selling_date {
        check_date_window(product.arrival_date, date, today, "selling date")?;
    }
    if requested == 0 {
        return Err(DomainError::validation("sale quantity must be greater than zero"));
    }

    let quantity = product
        .quantity
        .checked_sub(requested)
        .ok_or(DomainError::LowProductStock {
            requested,
            available: product.quantity,
        })?;

    Ok(StockUpdate {
        expected_quantity: product.quantity,
        quantity,
        selling_date: (quantity == 0).then(|| selling_date.unwrap_or(today)),
    })
}

//! Products domain module.
//!
//! This crate contains the product record and the inventory consistency
//! rules, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage). Every rule takes "today" as an explicit argument.

pub mod product;
pub mod query;
pub mod rules;

pub use product::{Category, NewProduct, Product, StockUpdate};
pub use query::{ProductFilter, ProductQuery};
pub use rules::{check_date_window, check_registration, plan_arrival, plan_sale};

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, Entity, ModelName};

use crate::query::{ProductFilter, ProductQuery};

/// Product category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Smartphone,
    Laptop,
    Appliance,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Smartphone, Category::Laptop, Category::Appliance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Smartphone => "Smartphone",
            Category::Laptop => "Laptop",
            Category::Appliance => "Appliance",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown category '{s}'")))
    }
}

/// Stored product record.
///
/// A product whose quantity reaches zero stays a valid record; it is simply
/// unavailable until the next arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub model: ModelName,
    pub category: Category,
    pub quantity: u32,
    pub details: Option<String>,
    pub selling_price: f64,
    pub arrival_date: NaiveDate,
    /// Set by the sale that empties the stock.
    pub selling_date: Option<NaiveDate>,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

impl Entity for Product {
    type Id = ModelName;
    type Patch = StockUpdate;
    type Filter = ProductFilter;

    fn id(&self) -> &Self::Id {
        &self.model
    }

    fn is_stale(&self, patch: &Self::Patch) -> bool {
        self.quantity != patch.expected_quantity
    }

    fn apply_patch(&mut self, patch: &Self::Patch) {
        self.quantity = patch.quantity;
        if let Some(date) = patch.selling_date {
            self.selling_date = Some(date);
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        if filter.available_only && !self.is_available() {
            return false;
        }
        match &filter.query {
            ProductQuery::All => true,
            ProductQuery::Category(category) => self.category == *category,
            ProductQuery::Model(model) => self.model == *model,
        }
    }
}

/// Registration request. A missing arrival date means "today".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub model: ModelName,
    pub category: Category,
    pub quantity: u32,
    pub details: Option<String>,
    pub selling_price: f64,
    pub arrival_date: Option<NaiveDate>,
}

/// Field update produced by the stock rules.
///
/// Carries the quantity it was planned against; a gateway must refuse it once
/// the stored quantity has moved on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub expected_quantity: u32,
    /// New absolute quantity.
    pub quantity: u32,
    /// Recorded when present; an absent value leaves the stored date untouched.
    pub selling_date: Option<NaiveDate>,
}

//! Read-side product selection.

use stockroom_core::ModelName;

/// Grouping requested by a catalog read.
///
/// The grouping and its argument travel together, so "category grouping
/// without a category" cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductQuery {
    #[default]
    All,
    Category(crate::Category),
    Model(ModelName),
}

impl ProductQuery {
    /// The single model this query pins, if any. Such queries require the
    /// model to exist.
    pub fn model(&self) -> Option<&ModelName> {
        match self {
            ProductQuery::Model(model) => Some(model),
            _ => None,
        }
    }
}

/// Gateway-level filter: a query plus an optional in-stock restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductFilter {
    pub query: ProductQuery,
    pub available_only: bool,
}

impl ProductFilter {
    pub fn new(query: ProductQuery) -> Self {
        Self {
            query,
            available_only: false,
        }
    }

    /// Restrict to products with quantity > 0.
    pub fn available(mut self) -> Self {
        self.available_only = true;
        self
    }
}

//! PC builds: a named set of categories priced from the cheapest listings.

#[cfg(feature = "http")]
pub mod client;
pub mod wire;

use crate::domain::product::Product;
use crate::shared::{ProductId, RowId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: RowId,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
    /// Category → pinned product.
    #[serde(default)]
    pub product_overrides: BTreeMap<String, ProductId>,
    /// Category → quantity (1 when absent).
    #[serde(default)]
    pub product_quantities: BTreeMap<String, u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ─── NewBuild ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildValidationError {
    MissingName,
    NoCategories,
    ZeroQuantity(String),
}

impl fmt::Display for BuildValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildValidationError::MissingName => write!(f, "Build name is required"),
            BuildValidationError::NoCategories => {
                write!(f, "A build needs at least one category")
            }
            BuildValidationError::ZeroQuantity(c) => {
                write!(f, "Quantity for '{}' must be at least 1", c)
            }
        }
    }
}

impl std::error::Error for BuildValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBuild {
    pub name: String,
    pub categories: Vec<String>,
    pub auto_refresh: bool,
    pub product_overrides: BTreeMap<String, ProductId>,
    pub product_quantities: BTreeMap<String, u32>,
}

impl Default for NewBuild {
    fn default() -> Self {
        Self {
            name: String::new(),
            categories: Vec::new(),
            auto_refresh: true,
            product_overrides: BTreeMap::new(),
            product_quantities: BTreeMap::new(),
        }
    }
}

impl NewBuild {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds the category, or removes it if already present.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(pos) = self.categories.iter().position(|c| c == category) {
            self.categories.remove(pos);
        } else {
            self.categories.push(category.to_string());
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    pub fn pin(mut self, category: impl Into<String>, product: ProductId) -> Self {
        self.product_overrides.insert(category.into(), product);
        self
    }

    pub fn quantity(mut self, category: impl Into<String>, quantity: u32) -> Self {
        self.product_quantities.insert(category.into(), quantity);
        self
    }

    pub fn validate(&self) -> Result<(), BuildValidationError> {
        if self.name.trim().is_empty() {
            return Err(BuildValidationError::MissingName);
        }
        if self.categories.is_empty() {
            return Err(BuildValidationError::NoCategories);
        }
        if let Some((category, _)) = self.product_quantities.iter().find(|(_, q)| **q == 0) {
            return Err(BuildValidationError::ZeroQuantity(category.clone()));
        }
        Ok(())
    }
}

// ─── Pricing ─────────────────────────────────────────────────────────────────

/// Cheapest listing in each category. Ties keep the first listing seen.
pub fn cheapest_per_category(products: &[Product]) -> BTreeMap<String, &Product> {
    let mut out: BTreeMap<String, &Product> = BTreeMap::new();
    for p in products {
        match out.get(&p.category) {
            Some(best) if best.current_price <= p.current_price => {}
            _ => {
                out.insert(p.category.clone(), p);
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildLine {
    pub category: String,
    pub product: Product,
    pub quantity: u32,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildQuote {
    pub lines: Vec<BuildLine>,
    /// Categories with no listing; they add nothing to the total.
    pub missing: Vec<String>,
    pub total: Decimal,
}

impl Build {
    /// Price the build: a pinned product when it is still listed, otherwise
    /// the cheapest listing in the category.
    pub fn quote(&self, products: &[Product]) -> BuildQuote {
        let cheapest = cheapest_per_category(products);
        let mut lines = Vec::new();
        let mut missing = Vec::new();

        for category in &self.categories {
            let pinned = self
                .product_overrides
                .get(category)
                .and_then(|id| products.iter().find(|p| &p.id == id));
            let Some(product) = pinned.or_else(|| cheapest.get(category).copied()) else {
                missing.push(category.clone());
                continue;
            };
            let quantity = self.product_quantities.get(category).copied().unwrap_or(1).max(1);
            lines.push(BuildLine {
                category: category.clone(),
                subtotal: product.current_price * Decimal::from(quantity),
                product: product.clone(),
                quantity,
            });
        }

        let total = lines.iter().map(|l| l.subtotal).sum();
        BuildQuote {
            lines,
            missing,
            total,
        }
    }
}

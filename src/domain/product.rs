use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::money::Money;

pub type ProductId = String;

/// Catalog entry. The cart keeps a copy of it but never edits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_public_id: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            image_url: String::new(),
            image_public_id: None,
            category: String::new(),
            stock: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Query options for listing the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl ProductFilter {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|c| product.category == c)
    }

    /// Applies the filter to an already-fetched list.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let matching = products.into_iter().filter(|p| self.matches(p));
        match self.limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn json_uses_camel_case_and_tolerates_missing_optionals() {
        let raw = r#"{
            "id": "1",
            "name": "Headphones",
            "price": 199.99,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }"#;
        let p: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(p.price, Money::from_str("199.99").unwrap());
        assert_eq!(p.stock, 0);
        assert!(!p.in_stock());

        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("imagePublicId").is_none());
    }

    #[test]
    fn filter_by_category_and_limit() {
        let products = vec![
            Product::new("1", "Headphones", Money::from_units(200)).in_category("audio"),
            Product::new("2", "Mouse", Money::from_units(20)).in_category("input"),
            Product::new("3", "Speaker", Money::from_units(80)).in_category("audio"),
        ];

        let audio = ProductFilter::category("audio").apply(products.clone());
        assert_eq!(audio.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), ["1", "3"]);

        let first = ProductFilter::default().limit(1).apply(products);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "1");
    }
}

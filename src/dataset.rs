//! immutable reference data: catalog, purchase history and preference matrix
//!
//! everything here is built once at startup and shared read-only between requests.
//! iteration order is the order entries were supplied in, and the scorers rely on it
//! as the tie-break for equal scores.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// errors raised while assembling a dataset
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("catalog is empty")]
    EmptyCatalog,

    #[error("duplicate product in catalog: {0}")]
    DuplicateProduct(String),

    #[error("product {product} has {actual} features, expected {expected}")]
    FeatureLength {
        product: String,
        expected: usize,
        actual: usize,
    },

    #[error("user {user} purchased unknown product {product}")]
    UnknownPurchase { user: String, product: String },

    #[error("preference row for {user} has {actual} values, expected {expected}")]
    PreferenceRowLength {
        user: String,
        expected: usize,
        actual: usize,
    },

    #[error("preference for {user} on {product} is {value}, expected a value in [0, 1]")]
    PreferenceOutOfRange {
        user: String,
        product: String,
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: String,
    pub features: Vec<f64>,
}

/// product id -> feature vector, in catalog order
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, DatasetError> {
        let dim = products
            .first()
            .map(|p| p.features.len())
            .ok_or(DatasetError::EmptyCatalog)?;

        let mut index = HashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            if product.features.len() != dim {
                return Err(DatasetError::FeatureLength {
                    product: product.id.clone(),
                    expected: dim,
                    actual: product.features.len(),
                });
            }
            if index.insert(product.id.clone(), pos).is_some() {
                return Err(DatasetError::DuplicateProduct(product.id.clone()));
            }
        }

        Ok(Self { products, index })
    }

    pub fn features(&self, product: &str) -> Option<&[f64]> {
        self.index
            .get(product)
            .map(|&pos| self.products[pos].features.as_slice())
    }

    pub fn contains(&self, product: &str) -> bool {
        self.index.contains_key(product)
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Purchases {
    pub user: String,
    pub products: Vec<String>,
}

/// user id -> purchased products, in insertion order
#[derive(Debug, Clone, Default)]
pub struct PurchaseHistory {
    entries: Vec<Purchases>,
}

impl PurchaseHistory {
    pub fn new(entries: Vec<Purchases>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.user.as_str(), e.products.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceRow {
    pub user: String,
    pub scores: Vec<f64>,
}

/// explicit user x product preference table
#[derive(Debug, Clone)]
pub struct PreferenceMatrix {
    products: Vec<String>,
    rows: Vec<PreferenceRow>,
}

impl PreferenceMatrix {
    pub fn new(products: Vec<String>, rows: Vec<PreferenceRow>) -> Result<Self, DatasetError> {
        for (pos, product) in products.iter().enumerate() {
            if products[..pos].contains(product) {
                return Err(DatasetError::DuplicateProduct(product.clone()));
            }
        }
        for row in &rows {
            if row.scores.len() != products.len() {
                return Err(DatasetError::PreferenceRowLength {
                    user: row.user.clone(),
                    expected: products.len(),
                    actual: row.scores.len(),
                });
            }
            for (product, &value) in products.iter().zip(&row.scores) {
                if !(0.0..=1.0).contains(&value) {
                    return Err(DatasetError::PreferenceOutOfRange {
                        user: row.user.clone(),
                        product: product.clone(),
                        value,
                    });
                }
            }
        }
        Ok(Self { products, rows })
    }

    /// (user, preference) for every row of the given product column
    pub fn column(&self, product: &str) -> Option<impl Iterator<Item = (&str, f64)>> {
        let col = self.products.iter().position(|p| p == product)?;
        Some(self.rows.iter().map(move |r| (r.user.as_str(), r.scores[col])))
    }

    #[cfg(test)]
    pub fn get(&self, user: &str, product: &str) -> Option<f64> {
        let col = self.products.iter().position(|p| p == product)?;
        self.rows
            .iter()
            .find(|r| r.user == user)
            .map(|r| r.scores[col])
    }
}

#[derive(Debug, Deserialize)]
struct PreferenceFile {
    products: Vec<String>,
    rows: Vec<PreferenceRow>,
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    products: Vec<Product>,
    purchases: Vec<Purchases>,
    preferences: PreferenceFile,
}

/// all reference data the scorers need
#[derive(Debug, Clone)]
pub struct Dataset {
    pub catalog: Catalog,
    pub purchases: PurchaseHistory,
    pub preferences: PreferenceMatrix,
}

impl Dataset {
    pub fn new(
        catalog: Catalog,
        purchases: PurchaseHistory,
        preferences: PreferenceMatrix,
    ) -> Result<Self, DatasetError> {
        for (user, products) in purchases.iter() {
            if let Some(missing) = products.iter().find(|p| !catalog.contains(p)) {
                return Err(DatasetError::UnknownPurchase {
                    user: user.to_string(),
                    product: missing.clone(),
                });
            }
        }

        Ok(Self {
            catalog,
            purchases,
            preferences,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        let file: DatasetFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse dataset {}", path.display()))?;

        log::debug!(
            "loaded dataset from {}: {} products, {} users",
            path.display(),
            file.products.len(),
            file.purchases.len()
        );

        let catalog = Catalog::new(file.products)?;
        let preferences = PreferenceMatrix::new(file.preferences.products, file.preferences.rows)?;
        Ok(Self::new(
            catalog,
            PurchaseHistory::new(file.purchases),
            preferences,
        )?)
    }

    /// built-in demo data: five skincare/cosmetics products, ten users
    pub fn sample() -> Self {
        const A: &str = "Wardah Lightening Series";
        const B: &str = "Wardah UV Shield Sunscreen Gel SPF 30 PA+++";
        const C: &str = "Wardah Lightening Face Toner (125 mL)";
        const D: &str = "Wardah Exclusive Matte Lip Cream";
        const E: &str = "Wardah Glasting Liquid Lip";

        let product = |id: &str, features: [f64; 3]| Product {
            id: id.to_string(),
            features: features.to_vec(),
        };
        let bought = |user: &str, items: &[&str]| Purchases {
            user: user.to_string(),
            products: items.iter().map(|s| s.to_string()).collect(),
        };

        let catalog = Catalog {
            products: vec![
                product(A, [0.9, 0.1, 0.2]),
                product(B, [0.8, 0.2, 0.1]),
                product(C, [0.1, 0.9, 0.3]),
                product(D, [0.2, 0.1, 0.9]),
                product(E, [0.3, 0.8, 0.2]),
            ],
            index: [A, B, C, D, E]
                .iter()
                .enumerate()
                .map(|(pos, id)| (id.to_string(), pos))
                .collect(),
        };

        let purchases = PurchaseHistory::new(vec![
            bought("U1", &[A, B]),
            bought("U2", &[C]),
            bought("U3", &[D, E]),
            bought("U4", &[B, C]),
            bought("U5", &[A, D]),
            bought("U6", &[A]),
            bought("U7", &[B, E]),
            bought("U8", &[C, D]),
            bought("U9", &[A, C]),
            bought("U10", &[E]),
        ]);

        // columns A..E; U1/U5/U6 lean towards A, U3/U5/U10 towards D, U3/U7/U10 towards E
        let table: [(&str, [f64; 5]); 10] = [
            ("U1", [0.95, 0.2, 0.1, 0.3, 0.4]),
            ("U2", [0.1, 0.9, 0.8, 0.2, 0.3]),
            ("U3", [0.2, 0.3, 0.2, 0.95, 0.85]),
            ("U4", [0.3, 0.8, 0.7, 0.25, 0.4]),
            ("U5", [0.85, 0.1, 0.15, 0.9, 0.25]),
            ("U6", [0.9, 0.2, 0.2, 0.3, 0.2]),
            ("U7", [0.15, 0.7, 0.25, 0.4, 0.9]),
            ("U8", [0.25, 0.4, 0.9, 0.7, 0.6]),
            ("U9", [0.2, 0.3, 0.85, 0.2, 0.2]),
            ("U10", [0.4, 0.6, 0.3, 0.8, 0.95]),
        ];
        let preferences = PreferenceMatrix {
            products: [A, B, C, D, E].iter().map(|s| s.to_string()).collect(),
            rows: table
                .iter()
                .map(|(user, scores)| PreferenceRow {
                    user: user.to_string(),
                    scores: scores.to_vec(),
                })
                .collect(),
        };

        Self {
            catalog,
            purchases,
            preferences,
        }
    }
}

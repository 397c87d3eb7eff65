//! Product document and creation input.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProductError, SHORT_DESCRIPTION_MAX};

/// Unit for product dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    #[default]
    Cm,
    In,
}

/// Unit for product weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    G,
    Kg,
    Lb,
    Oz,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDescription {
    pub short: String,
    pub long: String,
    pub features: Vec<String>,
    pub specifications: BTreeMap<String, String>,
}

impl ProductDescription {
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.short.to_lowercase().contains(needle) || self.long.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub unit: DimensionUnit,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub sku: String,
    pub asin: String,
    pub product_name: String,
    pub description: ProductDescription,
    #[serde(default)]
    pub image_url: String,
    pub product_weight: f64,
    pub product_dimensions: ProductDimensions,
    pub weight_unit: WeightUnit,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Case-insensitive substring match over identifiers, name and description.
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.sku.to_lowercase().contains(&needle)
            || self.asin.to_lowercase().contains(&needle)
            || self.product_name.to_lowercase().contains(&needle)
            || self.description.matches(&needle)
    }
}

/// Description as submitted: plain text is taken as the short description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DescriptionInput {
    Text(String),
    Full(ProductDescription),
}

/// Product creation input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProduct {
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub product_name: Option<String>,
    pub description: Option<DescriptionInput>,
    pub image_url: Option<String>,
    pub product_weight: Option<f64>,
    pub weight_unit: Option<WeightUnit>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub dimension_unit: Option<DimensionUnit>,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn measurement(field: &'static str, value: f64) -> Result<f64, ProductError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProductError::InvalidMeasurement { field });
    }
    Ok(round2(value))
}

impl NewProduct {
    /// Validates the input and builds the product document.
    pub fn into_product(self, created_at: DateTime<Utc>) -> Result<Product, ProductError> {
        let sku = present(&self.sku);
        let asin = present(&self.asin);
        let product_name = present(&self.product_name);
        let description = match self.description {
            Some(DescriptionInput::Text(text)) => Some(ProductDescription {
                short: text.trim().to_string(),
                ..ProductDescription::default()
            }),
            Some(DescriptionInput::Full(mut full)) => {
                full.short = full.short.trim().to_string();
                full.long = full.long.trim().to_string();
                full.features = full
                    .features
                    .into_iter()
                    .map(|f| f.trim().to_string())
                    .collect();
                Some(full)
            }
            None => None,
        }
        .filter(|d| !d.short.is_empty());

        let mut missing = Vec::new();
        if sku.is_none() {
            missing.push("sku");
        }
        if asin.is_none() {
            missing.push("asin");
        }
        if product_name.is_none() {
            missing.push("productName");
        }
        if description.is_none() {
            missing.push("description");
        }
        if self.product_weight.is_none() {
            missing.push("productWeight");
        }
        if self.length.is_none() {
            missing.push("length");
        }
        if self.width.is_none() {
            missing.push("width");
        }
        if self.height.is_none() {
            missing.push("height");
        }

        let (
            Some(sku),
            Some(asin),
            Some(product_name),
            Some(description),
            Some(weight),
            Some(length),
            Some(width),
            Some(height),
        ) = (
            sku,
            asin,
            product_name,
            description,
            self.product_weight,
            self.length,
            self.width,
            self.height,
        )
        else {
            return Err(ProductError::MissingFields(missing));
        };

        let length_chars = description.short.chars().count();
        if length_chars > SHORT_DESCRIPTION_MAX {
            return Err(ProductError::ShortDescriptionTooLong {
                length: length_chars,
            });
        }

        Ok(Product {
            sku,
            asin,
            product_name,
            description,
            image_url: self.image_url.unwrap_or_default(),
            product_weight: measurement("productWeight", weight)?,
            product_dimensions: ProductDimensions {
                length: measurement("length", length)?,
                width: measurement("width", width)?,
                height: measurement("height", height)?,
                unit: self.dimension_unit.unwrap_or_default(),
            },
            weight_unit: self.weight_unit.unwrap_or_default(),
            created_at,
        })
    }
}

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::sweets::repo_types::{Category, Sweet, DEFAULT_IMAGE_URL};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

/// Fully validated field set written by create and update.
#[derive(Debug, Clone)]
pub struct SweetFields {
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub quantity: i32,
    pub description: Option<String>,
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSweetRequest {
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl CreateSweetRequest {
    pub fn validate(self) -> Result<SweetFields, ApiError> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push("Name is required".to_string());
        } else if name.len() > MAX_NAME_LEN {
            errors.push("Sweet name cannot be more than 100 characters".to_string());
        }

        let category = match self.category.as_deref() {
            None => {
                errors.push("Category is required".to_string());
                Category::Other
            }
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.push("Invalid category".to_string());
                Category::Other
            }),
        };

        let price = self.price.unwrap_or_else(|| {
            errors.push("Price is required".to_string());
            0.0
        });
        if !(price.is_finite() && price >= 0.0) {
            errors.push("Price must be a positive number".to_string());
        }

        let quantity = self.quantity.unwrap_or_else(|| {
            errors.push("Quantity is required".to_string());
            0
        });
        if quantity < 0 {
            errors.push("Quantity must be a non-negative integer".to_string());
        }

        if let Some(desc) = &self.description {
            if desc.len() > MAX_DESCRIPTION_LEN {
                errors.push("Description cannot be more than 500 characters".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok(SweetFields {
            name,
            category,
            price,
            quantity,
            description: self.description,
            image_url: self.image_url.unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSweetRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl UpdateSweetRequest {
    /// Validates the supplied fields and merges them over `current`.
    /// Omitted fields keep their stored value; an empty name or image URL is
    /// treated as omitted.
    pub fn merge_into(self, current: &Sweet) -> Result<SweetFields, ApiError> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => {
                if n.len() > MAX_NAME_LEN {
                    errors.push("Sweet name cannot be more than 100 characters".to_string());
                }
                n.to_string()
            }
            _ => current.name.clone(),
        };

        let category = match self.category.as_deref() {
            None => current.category,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.push("Invalid category".to_string());
                current.category
            }),
        };

        let price = self.price.unwrap_or(current.price);
        if !(price.is_finite() && price >= 0.0) {
            errors.push("Price must be a positive number".to_string());
        }

        let quantity = self.quantity.unwrap_or(current.quantity);
        if quantity < 0 {
            errors.push("Quantity must be a non-negative integer".to_string());
        }

        let description = match self.description {
            Some(desc) => {
                if desc.len() > MAX_DESCRIPTION_LEN {
                    errors.push("Description cannot be more than 500 characters".to_string());
                }
                Some(desc)
            }
            None => current.description.clone(),
        };

        let image_url = match self.image_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => current.image_url.clone(),
        };

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok(SweetFields {
            name,
            category,
            price,
            quantity,
            description,
            image_url,
        })
    }
}

/// Query string of `GET /api/sweets/search`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Body of purchase and restock.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: Option<i32>,
}

impl QuantityRequest {
    pub fn validate(&self) -> Result<i32, ApiError> {
        match self.quantity {
            Some(q) if q >= 1 => Ok(q),
            _ => Err(ApiError::Validation(vec![
                "Quantity must be at least 1".to_string(),
            ])),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SweetData {
    pub sweet: Sweet,
}

#[derive(Debug, Serialize)]
pub struct SweetListData {
    pub count: usize,
    pub sweets: Vec<Sweet>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseData {
    pub sweet: Sweet,
    pub purchased_quantity: i32,
    pub total_price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockData {
    pub sweet: Sweet,
    pub restocked_quantity: i32,
}

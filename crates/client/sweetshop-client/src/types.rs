//! Wire types for the Sweet Shop REST backend.

use serde::{Deserialize, Serialize};

/// A catalog item as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sweet {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: u32,
}

impl Sweet {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}

/// Payload for creating an item (an item without its id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweetCreate {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: u32,
}

impl SweetCreate {
    /// Form validation applied before an item is submitted: name and
    /// category are required and the price must be positive.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Category is required".to_string());
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err("Price must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl SweetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
    }
}

/// Body of the purchase and restock calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuantityRequest {
    pub quantity: u32,
}

/// Profile of the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Raw search form as typed by the user. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub name: String,
    pub category: String,
    pub min_price: String,
    pub max_price: String,
}

impl Filter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn by_category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with_price_range(
        mut self,
        min_price: impl Into<String>,
        max_price: impl Into<String>,
    ) -> Self {
        self.min_price = min_price.into();
        self.max_price = max_price.into();
        self
    }

    /// Translate the form into backend query parameters. Numeric fields that
    /// are empty or do not parse to a finite number are dropped.
    pub fn to_search_params(&self) -> SearchParams {
        SearchParams {
            name: non_empty(&self.name),
            category: non_empty(&self.category),
            min_price: parse_price(&self.min_price),
            max_price: parse_price(&self.max_price),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_search_params().is_empty()
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_price(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
}

/// Query parameters of `GET /sweets/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

impl SearchParams {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        assert!(Filter::default().is_empty());
        assert!(Filter::default().to_search_params().is_empty());
    }

    #[test]
    fn test_filter_drops_unparseable_prices() {
        let filter = Filter::default().with_price_range("abc", "  ");
        let params = filter.to_search_params();
        assert!(params.is_empty());
        assert!(filter.is_empty());

        let filter = Filter::default().with_price_range("NaN", "inf");
        assert!(filter.to_search_params().is_empty());
    }

    #[test]
    fn test_filter_keeps_only_present_fields() {
        let filter = Filter {
            category: "cake".to_string(),
            max_price: " 4.5 ".to_string(),
            ..Filter::default()
        };
        let params = filter.to_search_params();
        assert_eq!(params.name, None);
        assert_eq!(params.category.as_deref(), Some("cake"));
        assert_eq!(params.min_price, None);
        assert_eq!(params.max_price, Some(4.5));

        let json = serde_json::to_value(&params).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_sweet_update_skips_absent_fields() {
        let patch = SweetUpdate {
            price: Some(2.5),
            ..SweetUpdate::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "price": 2.5 }));
        assert!(SweetUpdate::default().is_empty());
    }

    #[test]
    fn test_sweet_create_validation() {
        let mut item = SweetCreate {
            name: "Fudge".to_string(),
            category: "candy".to_string(),
            price: 1.25,
            quantity: 0,
        };
        assert!(item.validate().is_ok());

        item.price = 0.0;
        assert!(item.validate().is_err());

        item.price = 1.0;
        item.category = "  ".to_string();
        assert_eq!(item.validate().unwrap_err(), "Category is required");
    }

    #[test]
    fn test_profile_defaults() {
        let profile: UserProfile =
            serde_json::from_value(serde_json::json!({ "id": 7, "username": "bob" })).unwrap();
        assert_eq!(profile.email, "");
        assert!(!profile.is_admin);
    }
}

//! Product and auth models for the dummyjson.com demo API.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A catalog product. Field names follow the dummyjson wire format
/// (camelCase), so the same type covers fetched and locally created
/// products. Identity is the `id`; two products are the same entity
/// iff their ids match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Mint an id for a locally created product. Epoch milliseconds are
/// unique enough for a demo catalog and sort newest-first naturally.
pub fn local_product_id() -> i64 {
    Utc::now().timestamp_millis()
}

/// One page of the `GET /products` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
    pub total: u64,
    pub skip: u32,
    pub limit: u32,
}

/// User input for the new-product form, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
}

/// A product category selectable in the new-product form.
pub struct Category {
    pub name: &'static str,
    pub label: &'static str,
}

/// The fixed category set offered by the form.
pub const CATEGORIES: &[Category] = &[
    Category { name: "beauty", label: "Beauty" },
    Category { name: "fragrances", label: "Fragrances" },
    Category { name: "furniture", label: "Furniture" },
    Category { name: "groceries", label: "Groceries" },
    Category { name: "electronics", label: "Electronics" },
    Category { name: "clothing", label: "Clothing" },
    Category { name: "home-decoration", label: "Home Decoration" },
    Category { name: "skincare", label: "Skincare" },
    Category { name: "automotive", label: "Automotive" },
    Category { name: "sports", label: "Sports" },
    Category { name: "books", label: "Books" },
    Category { name: "toys", label: "Toys" },
    Category { name: "pet-supplies", label: "Pet Supplies" },
    Category { name: "jewelry", label: "Jewelry" },
    Category { name: "shoes", label: "Shoes" },
];

/// Check that a category name belongs to the fixed set.
pub fn is_known_category(name: &str) -> bool {
    CATEGORIES.iter().any(|c| c.name == name)
}

/// Validate new-product input and return the first user-facing error.
pub fn validate_new_product(input: &NewProduct) -> Result<(), String> {
    let title = input.title.trim();
    if title.len() < 3 {
        return Err("Title must be at least 3 characters".to_string());
    }
    if title.len() > 100 {
        return Err("Title cannot exceed 100 characters".to_string());
    }

    let description = input.description.trim();
    if description.len() < 10 {
        return Err("Description must be at least 10 characters".to_string());
    }
    if description.len() > 500 {
        return Err("Description cannot exceed 500 characters".to_string());
    }

    if !input.price.is_finite() || input.price < 0.01 {
        return Err("Price must be at least 0.01".to_string());
    }
    if input.price > 10_000.0 {
        return Err("Price cannot exceed 10000".to_string());
    }

    if !is_known_category(&input.category) {
        return Err(format!("Unknown category: {}", input.category));
    }

    Ok(())
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_mins: Option<u32>,
}

/// Successful login payload: the user profile plus a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// The part of the login response worth keeping for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&LoginResponse> for UserProfile {
    fn from(res: &LoginResponse) -> Self {
        Self {
            id: res.id,
            username: res.username.clone(),
            email: res.email.clone(),
            first_name: res.first_name.clone(),
            last_name: res.last_name.clone(),
            image: res.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewProduct {
        NewProduct {
            title: "Echo Test Product".to_string(),
            description: "Testing echo functionality".to_string(),
            price: 123.45,
            category: "beauty".to_string(),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert_eq!(validate_new_product(&input()), Ok(()));
    }

    #[test]
    fn short_title_rejected() {
        let mut p = input();
        p.title = "ab".to_string();
        assert!(validate_new_product(&p).is_err());
    }

    #[test]
    fn short_description_rejected() {
        let mut p = input();
        p.description = "too short".to_string();
        assert!(validate_new_product(&p).is_err());
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut p = input();
        p.price = 0.0;
        assert!(validate_new_product(&p).is_err());
        p.price = f64::NAN;
        assert!(validate_new_product(&p).is_err());
        p.price = 10_000.01;
        assert!(validate_new_product(&p).is_err());
    }

    #[test]
    fn unknown_category_rejected() {
        let mut p = input();
        p.category = "weaponry".to_string();
        assert!(validate_new_product(&p).is_err());
    }

    #[test]
    fn product_round_trips_camel_case() {
        let product = Product {
            id: 42,
            title: "Lamp".to_string(),
            description: "A small lamp".to_string(),
            price: 19.99,
            category: "furniture".to_string(),
            rating: Some(4.0),
            stock: Some(7),
            discount_percentage: Some(12.5),
            brand: None,
            thumbnail: Some("https://placehold.co/300x200.png".to_string()),
            images: None,
        };
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"discountPercentage\":12.5"));
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn fetched_product_tolerates_missing_optionals() {
        let json = r#"{"id":1,"title":"Pen","description":"Writes","price":2.5}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, "");
        assert_eq!(product.stock, None);
    }
}

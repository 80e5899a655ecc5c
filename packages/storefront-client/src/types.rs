//! Storefront records as returned by the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A record that can be listed and keyed by id.
pub trait Identified {
    fn id(&self) -> &str;
}

// ============================================================================
// Shops
// ============================================================================

/// Seller owning a shop. Only the public profile fields are read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seller: Option<Seller>,
}

/// Shop status as shown in the admin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopStatus {
    Active,
    Inactive,
}

impl ShopStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ShopStatus::Active => "Active",
            ShopStatus::Inactive => "Inactive",
        }
    }
}

impl Shop {
    pub const UNKNOWN_SELLER: &'static str = "Unknown Seller";

    /// Seller's business name, falling back to a placeholder.
    pub fn seller_name(&self) -> &str {
        self.seller
            .as_ref()
            .and_then(|s| s.business_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(Self::UNKNOWN_SELLER)
    }

    pub fn status(&self) -> ShopStatus {
        if self.is_active {
            ShopStatus::Active
        } else {
            ShopStatus::Inactive
        }
    }
}

impl Identified for Shop {
    fn id(&self) -> &str {
        &self.id
    }
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in Rwf. The API sends either a number or a decimal string.
    #[serde(default, deserialize_with = "number_or_string")]
    pub price: Option<f64>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub seller_id: Option<String>,
}

impl Identified for Product {
    fn id(&self) -> &str {
        &self.id
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Option::<Price>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Price::Number(n)) => Ok(Some(n)),
        Some(Price::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid price: {}", s))),
    }
}

//! REST endpoints the listing pipeline reads from.

const API_PREFIX: &str = "api/v1";

/// A listing endpoint of the storefront API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Public shop directory
    Shops,
    /// Shop directory for the admin dashboard
    AdminShops,
    /// Shops owned by the logged-in seller
    MyShops,
    /// Product listing, optionally scoped to one shop
    Products { shop_id: Option<String> },
    /// Products of one seller
    SellerProducts { seller_id: String },
}

impl Endpoint {
    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Shops | Endpoint::AdminShops => format!("{}/shops", API_PREFIX),
            Endpoint::MyShops => format!("{}/shops/my-shops", API_PREFIX),
            Endpoint::Products { .. } => format!("{}/products", API_PREFIX),
            Endpoint::SellerProducts { seller_id } => {
                format!("{}/products/seller/{}", API_PREFIX, seller_id)
            }
        }
    }

    /// Whether a request without a token should fail with `AuthRequired`.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Endpoint::AdminShops | Endpoint::MyShops | Endpoint::SellerProducts { .. }
        )
    }

    /// Query parameters fixed by the endpoint itself.
    pub fn scope_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::Products {
                shop_id: Some(shop_id),
            } => vec![("shopId", shop_id.clone())],
            _ => Vec::new(),
        }
    }

    pub fn shop_by_id(id: &str) -> String {
        format!("{}/shops/id/{}", API_PREFIX, id)
    }

    pub fn shop_by_slug(slug: &str) -> String {
        format!("{}/shops/slug/{}", API_PREFIX, slug)
    }
}

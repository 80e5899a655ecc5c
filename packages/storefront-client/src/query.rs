//! Listing query parameters.
//!
//! A [`QuerySpec`] describes one page request. View models rebuild it
//! wholesale on every parameter change; the `with_*` builders consume and
//! return a new value instead of mutating a shared one.

use serde::{Deserialize, Serialize};

use crate::credentials::AuthToken;
use crate::error::{ListingError, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Server-side filters for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingFilter {
    pub active_only: Option<bool>,
    pub seller_id: Option<String>,
}

impl ListingFilter {
    pub fn active(active: bool) -> Self {
        Self {
            active_only: Some(active),
            seller_id: None,
        }
    }

    pub fn with_seller(mut self, seller_id: impl Into<String>) -> Self {
        self.seller_id = Some(seller_id.into());
        self
    }
}

/// Parameters of a single listing page request.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub search_term: Option<String>,
    pub filter: ListingFilter,
    pub sort_field: Option<String>,
    pub sort_order: SortOrder,
    pub auth_token: Option<AuthToken>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search_term: None,
            filter: ListingFilter::default(),
            sort_field: Some(DEFAULT_SORT_FIELD.to_string()),
            sort_order: SortOrder::Desc,
            auth_token: None,
        }
    }
}

impl QuerySpec {
    /// Spec for the given page, with dashboard defaults for everything else.
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the search term. Blank terms clear the search.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search_term = if term.trim().is_empty() {
            None
        } else {
            Some(term)
        };
        self
    }

    pub fn with_filter(mut self, filter: ListingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, field: Option<String>, order: SortOrder) -> Self {
        self.sort_field = field;
        self.sort_order = order;
        self
    }

    pub fn with_auth_token(mut self, token: Option<AuthToken>) -> Self {
        self.auth_token = token;
        self
    }

    /// Check `page >= 1` and `page_size >= 1`.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(ListingError::invalid_query("page must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(ListingError::invalid_query("page size must be at least 1"));
        }
        Ok(())
    }

    /// Query-string pairs for this spec. Undefined fields are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.page_size.to_string()),
        ];

        if let Some(search) = self.search_term.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(active) = self.filter.active_only {
            pairs.push(("active", active.to_string()));
        }
        if let Some(seller_id) = self.filter.seller_id.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sellerId", seller_id.to_string()));
        }
        if let Some(sort) = self.sort_field.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sort", sort.to_string()));
            pairs.push(("order", self.sort_order.as_str().to_string()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(spec: &QuerySpec) -> Vec<&'static str> {
        spec.query_pairs().into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_defaults_match_dashboard() {
        let spec = QuerySpec::default();
        assert_eq!(
            spec.query_pairs(),
            vec![
                ("page", "1".to_string()),
                ("limit", "10".to_string()),
                ("sort", "createdAt".to_string()),
                ("order", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_undefined_fields_are_omitted() {
        let spec = QuerySpec::page(2, 20).with_sort(None, SortOrder::Asc);
        assert_eq!(keys(&spec), vec!["page", "limit"]);
    }

    #[test]
    fn test_all_fields_appended() {
        let spec = QuerySpec::page(3, 50)
            .with_search("cement bags")
            .with_filter(ListingFilter::active(false).with_seller("seller-9"))
            .with_sort(Some("name".into()), SortOrder::Asc);

        assert_eq!(
            spec.query_pairs(),
            vec![
                ("page", "3".to_string()),
                ("limit", "50".to_string()),
                ("search", "cement bags".to_string()),
                ("active", "false".to_string()),
                ("sellerId", "seller-9".to_string()),
                ("sort", "name".to_string()),
                ("order", "asc".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_search_clears_term() {
        let spec = QuerySpec::default().with_search("cement").with_search("   ");
        assert!(spec.search_term.is_none());
        assert!(!keys(&spec).contains(&"search"));
    }

    #[test]
    fn test_validate_rejects_zero() {
        assert!(QuerySpec::page(0, 10).validate().is_err());
        assert!(QuerySpec::page(1, 0).validate().is_err());
        assert!(QuerySpec::page(1, 1).validate().is_ok());
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let spec = QuerySpec::default().with_auth_token(Some(AuthToken::new("secret-jwt")));
        let debug = format!("{:?}", spec);
        assert!(!debug.contains("secret-jwt"));
    }
}

//! Canonical paginated results and response-shape classification.
//!
//! The storefront API answers listing requests in one of two shapes:
//!
//! ```text
//! [ {..}, {..} ]                                    bare sequence
//! { "data": [..], "meta": { "total", "page", .. } } envelope
//! ```
//!
//! [`ListPayload`] classifies the body once at the service boundary and
//! [`PageEnvelope::from_payload`] normalizes either shape into one value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ListingError, Result};

// ============================================================================
// Wire shapes
// ============================================================================

/// Pagination metadata carried by an envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMeta {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl PayloadMeta {
    /// Total when `meta.total` is absent.
    ///
    /// With `totalPages` every page before the last is full, so the total is
    /// exact on the last page and an upper bound before it. Without it, only
    /// the rows up to and including this page are known to exist.
    fn estimated_total(&self, page: u32, page_size: u32, returned: usize) -> u64 {
        let page_size = u64::from(page_size);
        let returned = returned as u64;
        let estimate = match self.total_pages {
            Some(0) => returned,
            Some(total_pages) if page >= total_pages => {
                u64::from(total_pages - 1) * page_size + returned
            }
            Some(total_pages) => u64::from(total_pages) * page_size,
            None => u64::from(page - 1) * page_size + returned,
        };
        debug!(
            total_pages = ?self.total_pages,
            estimate, "Envelope meta has no total, estimating"
        );
        estimate
    }
}

/// `{data, meta}` envelope. Seller product listings use `products` for the items.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(alias = "products")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<PayloadMeta>,
}

/// The two legal listing response shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Envelope(Envelope<T>),
}

impl<T: DeserializeOwned> ListPayload<T> {
    /// Classify a response body, failing with `MalformedResponse` on any other shape.
    pub fn classify(body: serde_json::Value) -> Result<Self> {
        let shape = match &body {
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(map) if map.contains_key("data") => "envelope",
            serde_json::Value::Object(map) if map.contains_key("products") => "envelope",
            serde_json::Value::Object(_) => {
                return Err(ListingError::malformed(
                    "object without a data or products sequence",
                ))
            }
            other => {
                return Err(ListingError::malformed(format!(
                    "expected a sequence or an envelope, got {}",
                    json_kind(other)
                )))
            }
        };

        serde_json::from_value(body)
            .map_err(|e| ListingError::malformed(format!("invalid {} payload: {}", shape, e)))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ============================================================================
// PageEnvelope
// ============================================================================

/// One page of a listing.
///
/// Invariants: `total_pages == ceil(total / page_size)` and
/// `items.len() <= page_size`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// `ceil(total / page_size)`, with a zero page size treated as one.
pub fn total_pages_for(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

impl<T> PageEnvelope<T> {
    /// An empty page.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            page_size,
            total_pages: 0,
        }
    }

    /// Normalize a classified payload for the requested page.
    ///
    /// A bare sequence, or an envelope without `meta`, is the complete result
    /// set: the requested page is sliced out locally. An envelope with `meta`
    /// already holds the requested page.
    pub fn from_payload(payload: ListPayload<T>, page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let page = page.max(1);

        match payload {
            ListPayload::Bare(items) => Self::from_full_set(items, page, page_size),
            ListPayload::Envelope(Envelope { data, meta: None }) => {
                Self::from_full_set(data, page, page_size)
            }
            ListPayload::Envelope(Envelope {
                mut data,
                meta: Some(meta),
            }) => {
                if data.len() > page_size as usize {
                    warn!(
                        returned = data.len(),
                        page_size, "Server returned more items than the page size, truncating"
                    );
                    data.truncate(page_size as usize);
                }

                let total = meta
                    .total
                    .unwrap_or_else(|| meta.estimated_total(page, page_size, data.len()));
                let total_pages = total_pages_for(total, page_size);

                if let Some(reported) = meta.total_pages {
                    if reported != total_pages {
                        debug!(
                            reported,
                            computed = total_pages,
                            total,
                            page_size,
                            "Server totalPages disagrees with total/limit, using computed value"
                        );
                    }
                }
                if let Some(reported) = meta.page {
                    if reported != page {
                        debug!(reported, requested = page, "Server echoed a different page");
                    }
                }
                Self {
                    items: data,
                    total,
                    page,
                    page_size,
                    total_pages,
                }
            }
        }
    }

    fn from_full_set(items: Vec<T>, page: u32, page_size: u32) -> Self {
        let total = items.len() as u64;
        let start = (page as usize - 1).saturating_mul(page_size as usize);
        let items = items
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();

        Self {
            items,
            total,
            page,
            page_size,
            total_pages: total_pages_for(total, page_size),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the page number lies beyond the last page.
    pub fn page_out_of_range(&self) -> bool {
        self.page > self.total_pages.max(1)
    }

    /// Replace the items, keeping pagination metadata.
    pub fn map<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> PageEnvelope<U> {
        PageEnvelope {
            items: f(self.items),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

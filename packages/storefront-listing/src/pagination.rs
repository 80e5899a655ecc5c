//! Pagination helpers for rendering a listing state.

use std::ops::RangeInclusive;

use storefront_client::{Shop, ShopStatus};

use crate::enrich::ListingRow;
use crate::view_model::ListingState;

/// Page sizes a listing screen offers.
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Local status tabs over the rows of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTab {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusTab {
    pub fn label(&self) -> &'static str {
        match self {
            StatusTab::All => "All Shops",
            StatusTab::Active => "Active",
            StatusTab::Inactive => "Inactive",
        }
    }

    pub fn variants() -> &'static [StatusTab] {
        &[StatusTab::All, StatusTab::Active, StatusTab::Inactive]
    }

    pub fn matches(&self, status: ShopStatus) -> bool {
        match self {
            StatusTab::All => true,
            StatusTab::Active => status == ShopStatus::Active,
            StatusTab::Inactive => status == ShopStatus::Inactive,
        }
    }
}

impl<R, V> ListingState<R, V> {
    /// `(first, last, total)` for a "Showing 1-10 of 42" line; `None` when empty.
    pub fn showing_range(&self) -> Option<(u64, u64, u64)> {
        if self.total == 0 || self.rows.is_empty() {
            return None;
        }

        let page_size = u64::from(self.page_size.max(1));
        let first = u64::from(self.page.saturating_sub(1)) * page_size + 1;
        let last = (u64::from(self.page) * page_size).min(self.total);
        Some((first, last, self.total))
    }

    /// Pagination controls are hidden for a single page.
    pub fn has_pagination_controls(&self) -> bool {
        self.total_pages > 1
    }

    /// Page buttons to render; empty when there is nothing to page through.
    pub fn page_numbers(&self) -> RangeInclusive<u32> {
        if self.total_pages == 0 {
            // An empty inclusive range.
            return 1..=0;
        }
        1..=self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl<V> ListingState<Shop, V> {
    /// Rows of the current page shown under a status tab. No request is made.
    pub fn rows_for_tab(&self, tab: StatusTab) -> Vec<&ListingRow<Shop, V>> {
        self.rows
            .iter()
            .filter(|row| tab.matches(row.item.status()))
            .collect()
    }
}

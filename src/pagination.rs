//! This modules defines the common functionality for paging data.

use crate::transaction::HistoryQuery;

/// The config for pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page.
    pub page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            page_size: 10,
        }
    }
}

impl PaginationConfig {
    /// Parse the raw `page` query parameter.
    ///
    /// Pages are 1-based. Missing, non-numeric and out of range values fall
    /// back to [PaginationConfig::default_page]. There is no upper bound.
    pub fn parse_page(&self, raw_page: Option<&str>) -> u64 {
        raw_page
            .and_then(|raw_page| raw_page.parse::<u64>().ok())
            .filter(|&page| page >= 1)
            .unwrap_or(self.default_page)
    }

    /// The query that selects the transactions on `page`.
    pub fn history_query(&self, page: u64) -> HistoryQuery {
        HistoryQuery {
            limit: self.page_size,
            offset: page.saturating_sub(1).saturating_mul(self.page_size),
        }
    }
}

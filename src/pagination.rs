//! This module defines the common functionality for paging data.

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Resolve the optional `page`/`limit` request parameters into a
    /// concrete page request, substituting defaults and clamping the page
    /// size.
    ///
    /// Zero values are treated as absent, matching the original behaviour
    /// of ignoring non-positive parameters.
    pub fn resolve(&self, page: Option<u64>, limit: Option<u64>) -> PageRequest {
        let page = match page {
            Some(page) if page > 0 => page,
            _ => self.default_page,
        };

        let limit = match limit {
            Some(limit) if limit > 0 => limit.min(self.max_page_size),
            _ => self.default_page_size,
        };

        PageRequest { page, limit }
    }
}

/// A concrete page of data to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The number of rows per page.
    pub limit: u64,
}

impl PageRequest {
    /// The number of rows to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod pagination_tests {
    use super::{PageRequest, PaginationConfig};

    #[test]
    fn resolve_substitutes_defaults() {
        let config = PaginationConfig::default();

        let request = config.resolve(None, None);

        assert_eq!(
            request,
            PageRequest {
                page: 1,
                limit: 10
            }
        );
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn resolve_ignores_zero_values() {
        let config = PaginationConfig::default();

        let request = config.resolve(Some(0), Some(0));

        assert_eq!(
            request,
            PageRequest {
                page: 1,
                limit: 10
            }
        );
    }

    #[test]
    fn resolve_clamps_page_size() {
        let config = PaginationConfig::default();

        let request = config.resolve(Some(3), Some(1_000));

        assert_eq!(
            request,
            PageRequest {
                page: 3,
                limit: 100
            }
        );
        assert_eq!(request.offset(), 200);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::EngineError;

/// Normalised page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Normalise raw query parameters the way clients expect.
    ///
    /// A missing or zero `page` means the first page, a missing or zero
    /// `page_size` means `default_page_size`, and a page size above
    /// `max_page_size` is clamped. Negative values are rejected.
    pub fn from_query(
        page: Option<i64>,
        page_size: Option<i64>,
        default_page_size: u32,
        max_page_size: u32,
    ) -> Result<Self, EngineError> {
        let page = match page.unwrap_or(0) {
            p if p < 0 => {
                return Err(EngineError::InvalidInput(format!("page must not be negative (got {p})")))
            }
            0 => 1,
            p => u32::try_from(p)
                .map_err(|_| EngineError::InvalidInput(format!("page is too large (got {p})")))?,
        };

        let page_size = match page_size.unwrap_or(0) {
            s if s < 0 => {
                return Err(EngineError::InvalidInput(format!(
                    "pageSize must not be negative (got {s})"
                )))
            }
            0 => default_page_size,
            s => u32::try_from(s).unwrap_or(u32::MAX).min(max_page_size),
        };

        Ok(Self { page, page_size })
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

/// Pagination metadata returned next to a page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    #[serde(rename = "perPage")]
    pub per_page: usize,
    #[serde(rename = "previousPage")]
    pub previous_page: u32,
    #[serde(rename = "nextPage")]
    pub next_page: u32,
    #[serde(rename = "totalRecords")]
    pub total_records: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    #[serde(rename = "labelPages")]
    pub label_pages: String,
    /// Page sizes the client can offer next, always including `per_page`
    #[serde(rename = "pageSizes")]
    pub page_sizes: Vec<usize>,
    #[serde(rename = "defaultPageSize")]
    pub default_page_size: usize,
}

/// Page size choices offered when enough records remain
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [5, 10, 15, 20, 25];

impl PageMeta {
    /// Build metadata for a page holding `count` of `total` records
    pub fn new(request: PageRequest, total: i64, count: usize) -> Self {
        let page_size = i64::from(request.page_size.max(1));
        let total = total.max(0);
        let total_pages = (total + page_size - 1) / page_size;
        let page = request.page;

        let previous_page = if page > 1 { page - 1 } else { page };
        let next_page = if i64::from(page) < total_pages { page + 1 } else { page };

        let offset = request.offset();
        let (start, end) = if total > 0 && count > 0 {
            (offset + 1, offset + count as i64)
        } else {
            (0, 0)
        };

        // Records from the first one on this page to the end
        let remaining = total - (start - 1);
        let mut page_sizes = BTreeSet::from([count]);
        if i64::from(page) * page_size <= remaining {
            page_sizes.extend(
                PAGE_SIZE_OPTIONS
                    .iter()
                    .copied()
                    .filter(|&size| size as i64 <= remaining),
            );
        }

        Self {
            current_page: page,
            per_page: count,
            previous_page,
            next_page,
            total_records: total,
            total_pages,
            label_pages: format!("{start}-{end} of {total}"),
            page_sizes: page_sizes.into_iter().collect(),
            default_page_size: count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let request = PageRequest::from_query(None, None, 10, 100).unwrap();
        assert_eq!(request, PageRequest { page: 1, page_size: 10 });
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_query_clamps_page_size() {
        let request = PageRequest::from_query(Some(3), Some(500), 10, 100).unwrap();
        assert_eq!(request.page_size, 100);
        assert_eq!(request.offset(), 200);
    }

    #[test]
    fn test_query_rejects_negatives() {
        assert!(PageRequest::from_query(Some(-1), None, 10, 100).is_err());
        assert!(PageRequest::from_query(None, Some(-5), 10, 100).is_err());
    }

    #[test]
    fn test_meta_page_sizes_on_first_page() {
        let meta = PageMeta::new(PageRequest { page: 1, page_size: 10 }, 25, 10);

        assert_eq!(meta.page_sizes, vec![5, 10, 15, 20, 25]);
        assert_eq!(meta.default_page_size, 10);

        let meta = PageMeta::new(PageRequest { page: 1, page_size: 7 }, 12, 7);
        assert_eq!(meta.page_sizes, vec![5, 7, 10]);
    }

    #[test]
    fn test_meta_middle_page() {
        let meta = PageMeta::new(PageRequest { page: 2, page_size: 10 }, 25, 10);

        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.previous_page, 1);
        assert_eq!(meta.next_page, 3);
        assert_eq!(meta.label_pages, "11-20 of 25");
    }

    #[test]
    fn test_meta_last_page() {
        let meta = PageMeta::new(PageRequest { page: 3, page_size: 10 }, 25, 5);

        assert_eq!(meta.next_page, 3);
        assert_eq!(meta.label_pages, "21-25 of 25");
        assert_eq!(meta.page_sizes, vec![5]);
        assert_eq!(meta.default_page_size, 5);
    }

    #[test]
    fn test_meta_beyond_last_page() {
        let meta = PageMeta::new(PageRequest { page: 7, page_size: 10 }, 25, 0);

        assert_eq!(meta.total_records, 25);
        assert_eq!(meta.per_page, 0);
        assert_eq!(meta.label_pages, "0-0 of 25");
    }

    #[test]
    fn test_meta_empty_result() {
        let meta = PageMeta::new(PageRequest { page: 1, page_size: 10 }, 0, 0);

        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.previous_page, 1);
        assert_eq!(meta.next_page, 1);
    }
}

//! Pagination primitives shared across all list endpoints.

use serde::{Deserialize, Serialize};

/// Pagination query parameters.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    /// Maximum items per page.
    const MAX_PER_PAGE: i64 = 100;

    /// Default items per page.
    const DEFAULT_PER_PAGE: i64 = 15;

    pub fn limit(&self) -> i64 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1);
        (page - 1) * self.limit()
    }

    pub fn current_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Page metadata returned alongside list data.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// Paged result envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T: Serialize> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T: Serialize> Paged<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let per_page = pagination.limit();
        let last_page = ((total + per_page - 1) / per_page).max(1);
        let offset = pagination.offset();
        let (from, to) = if items.is_empty() {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + items.len() as i64))
        };
        Self {
            items,
            meta: PageMeta {
                current_page: pagination.current_page(),
                last_page,
                per_page,
                total,
                from,
                to,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination {
            page: None,
            per_page: None,
        };
        assert_eq!(p.limit(), 15);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn pagination_clamps_per_page() {
        let p = Pagination {
            page: Some(1),
            per_page: Some(500),
        };
        assert_eq!(p.limit(), 100);
    }

    #[test]
    fn pagination_offset_calculation() {
        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn paged_meta_from_to() {
        let p = Pagination {
            page: Some(2),
            per_page: Some(10),
        };
        let result = Paged::new(vec![1, 2, 3], 13, &p);
        assert_eq!(result.meta.last_page, 2);
        assert_eq!(result.meta.from, Some(11));
        assert_eq!(result.meta.to, Some(13));
    }

    #[test]
    fn paged_meta_empty_page() {
        let p = Pagination {
            page: Some(5),
            per_page: Some(10),
        };
        let result = Paged::<i64>::new(vec![], 0, &p);
        assert_eq!(result.meta.last_page, 1);
        assert_eq!(result.meta.from, None);
        assert_eq!(result.meta.to, None);
    }
}

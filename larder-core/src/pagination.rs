//! Pagination metadata and list-query resolution.
//!
//! List endpoints answer with `{ data: [...], pagination: {...} }`. Queries are
//! fully defaulted on the client before they are sent, so the server never
//! has to guess a page size or a sort order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Page size used when neither the caller nor the entity overrides it.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Pagination metadata mirrored from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Default for PaginationMeta {
    fn default() -> Self {
        Self {
            total: 0,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

impl PaginationMeta {
    /// Metadata for a response that carried no envelope: everything
    /// returned is assumed to be the whole result.
    pub fn single_page(len: usize, page: u32, per_page: u32) -> Self {
        Self {
            total: len as u64,
            page,
            per_page,
            total_pages: if len == 0 { 0 } else { 1 },
            has_next: false,
            has_prev: page > 1,
        }
    }
}

/// One page of entities.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Wire shape of a list response. Older API revisions answer with a bare
/// array instead of the envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Envelope(Page<T>),
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_page(self, query: &ResolvedQuery) -> Page<T> {
        match self {
            ListResponse::Envelope(page) => page,
            ListResponse::Bare(data) => {
                let pagination = PaginationMeta::single_page(data.len(), query.page, query.per_page);
                Page { data, pagination }
            }
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: {}. Valid values: asc, desc", s)),
        }
    }
}

/// Page and page size as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }
}

/// A query with every default applied, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_by: &'static str,
    pub order: SortOrder,
    pub filters: Vec<(&'static str, String)>,
}

impl ResolvedQuery {
    /// Applies page defaults and rejects zero page or page size.
    pub fn new(
        paging: PageRequest,
        default_per_page: u32,
        sort_by: &'static str,
        order: SortOrder,
    ) -> ApiResult<Self> {
        let page = paging.page.unwrap_or(1);
        let per_page = paging.per_page.unwrap_or(default_per_page);

        if page < 1 {
            return Err(ApiError::validation("page must be greater than or equal to 1"));
        }
        if per_page < 1 {
            return Err(ApiError::validation(
                "per_page must be greater than or equal to 1",
            ));
        }

        Ok(Self {
            page,
            per_page,
            sort_by,
            order,
            filters: Vec::new(),
        })
    }

    /// Adds a text filter, trimmed; blank values are dropped.
    pub fn text(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.filters.push((key, v.to_string()));
        }
        self
    }

    /// Adds an ID filter; non-positive IDs are dropped.
    pub fn id(mut self, key: &'static str, value: Option<i64>) -> Self {
        if let Some(v) = value.filter(|v| *v > 0) {
            self.filters.push((key, v.to_string()));
        }
        self
    }

    pub fn flag(mut self, key: &'static str, value: Option<bool>) -> Self {
        if let Some(v) = value {
            self.filters.push((key, v.to_string()));
        }
        self
    }

    /// Query-string pairs: filters first, then paging and sorting.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.filters.clone();
        pairs.push(("page", self.page.to_string()));
        pairs.push(("per_page", self.per_page.to_string()));
        pairs.push(("sort_by", self.sort_by.to_string()));
        pairs.push(("order", self.order.as_str().to_string()));
        pairs
    }
}

/// An entity-specific list query.
pub trait ListQuery: Clone + Default + fmt::Debug + Send + Sync + 'static {
    fn resolve(&self) -> ApiResult<ResolvedQuery>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let q = ResolvedQuery::new(PageRequest::default(), 10, "name", SortOrder::Asc).unwrap();
        assert_eq!(
            q.pairs(),
            vec![
                ("page", "1".to_string()),
                ("per_page", "10".to_string()),
                ("sort_by", "name".to_string()),
                ("order", "ASC".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_page_is_rejected() {
        let err = ResolvedQuery::new(PageRequest::new(0, 10), 10, "name", SortOrder::Asc)
            .unwrap_err();
        assert!(err.is_validation());

        let err = ResolvedQuery::new(PageRequest::new(1, 0), 10, "name", SortOrder::Asc)
            .unwrap_err();
        assert!(err.message.contains("per_page"));
    }

    #[test]
    fn test_filters_trimmed_and_dropped() {
        let q = ResolvedQuery::new(PageRequest::default(), 10, "name", SortOrder::Desc)
            .unwrap()
            .text("name", Some("  milk "))
            .text("search", Some("   "))
            .id("category_id", Some(0))
            .id("pantry_id", Some(3))
            .flag("owner", Some(false));
        assert_eq!(
            q.filters,
            vec![
                ("name", "milk".to_string()),
                ("pantry_id", "3".to_string()),
                ("owner", "false".to_string()),
            ]
        );
        assert_eq!(q.pairs().last().unwrap().1, "DESC");
    }

    #[test]
    fn test_envelope_deserializes() {
        let json = r#"{
            "data": [1, 2, 3],
            "pagination": {"total": 3, "page": 1, "per_page": 10, "total_pages": 1,
                           "has_next": false, "has_prev": false}
        }"#;
        let resp: ListResponse<u32> = serde_json::from_str(json).unwrap();
        let q = ResolvedQuery::new(PageRequest::default(), 10, "name", SortOrder::Asc).unwrap();
        let page = resp.into_page(&q);
        assert_eq!(page.data, vec![1, 2, 3]);
        assert!(!page.pagination.has_next);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn test_bare_array_synthesizes_meta() {
        let resp: ListResponse<u32> = serde_json::from_str("[4, 5]").unwrap();
        let q = ResolvedQuery::new(PageRequest::new(2, 5), 10, "name", SortOrder::Asc).unwrap();
        let page = resp.into_page(&q);
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.page, 2);
        assert_eq!(page.pagination.per_page, 5);
        assert!(page.pagination.has_prev);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("up".parse::<SortOrder>().is_err());
    }
}

//! Query-string parameters and the store-neutral query they turn into.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::Book;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIST_LIMIT: i64 = 50;
const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Fields a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Title,
    Author,
    PublishedYear,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Unknown names fall back to `createdAt`.
    pub fn from_param(raw: &str) -> Self {
        match raw {
            "title" => Self::Title,
            "author" => Self::Author,
            "publishedYear" => Self::PublishedYear,
            "updatedAt" => Self::UpdatedAt,
            _ => Self::CreatedAt,
        }
    }

    /// Stored document field name.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::PublishedYear => "publishedYear",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }

    fn compare(&self, a: &Book, b: &Book) -> Ordering {
        match self {
            Self::Title => a.title.cmp(&b.title),
            Self::Author => a.author.cmp(&b.author),
            Self::PublishedYear => a.published_year.cmp(&b.published_year),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only the literal `desc` sorts descending.
    pub fn from_param(raw: &str) -> Self {
        if raw == "desc" {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Conjunction of optional predicates. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Case-insensitive substring of `title` or `author`.
    pub search: Option<String>,
    pub published_year: Option<i32>,
    pub created_since: Option<DateTime<Utc>>,
}

impl BookFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(text) = &self.search {
            let needle = text.to_lowercase();
            if !book.title.to_lowercase().contains(&needle)
                && !book.author.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(year) = self.published_year {
            if book.published_year != Some(year) {
                return false;
            }
        }
        if let Some(since) = self.created_since {
            if book.created_at < since {
                return false;
            }
        }
        true
    }
}

/// One page of a filtered, sorted scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookQuery {
    pub filter: BookFilter,
    pub sort: Sort,
    pub skip: u64,
    pub limit: u64,
}

/// Offset pagination metadata for `GET /api/books`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_books: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// `page` and `limit` must already be at least 1.
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            current_page: page,
            total_pages: total.div_ceil(limit),
            total_books: total,
            has_next_page: page.saturating_mul(limit) < total,
            has_prev_page: page > 1,
        }
    }
}

/// `GET /api/books` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> u64 {
        at_least_one(self.page.unwrap_or(DEFAULT_PAGE))
    }

    pub fn limit(&self) -> u64 {
        at_least_one(self.limit.unwrap_or(DEFAULT_LIST_LIMIT))
    }

    pub fn to_query(&self) -> BookQuery {
        let page = self.page();
        let limit = self.limit();

        BookQuery {
            filter: BookFilter {
                search: self.search.clone().filter(|s| !s.is_empty()),
                ..BookFilter::default()
            },
            sort: Sort {
                field: self
                    .sort_by
                    .as_deref()
                    .map(SortField::from_param)
                    .unwrap_or_default(),
                order: self
                    .sort_order
                    .as_deref()
                    .map(SortOrder::from_param)
                    .unwrap_or_default(),
            },
            skip: (page - 1).saturating_mul(limit),
            limit,
        }
    }
}

/// `GET /api/books/search` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

impl SearchParams {
    /// `None` when the search text is missing or empty.
    pub fn to_query(&self) -> Option<BookQuery> {
        let text = self.q.clone().filter(|q| !q.is_empty())?;

        Some(BookQuery {
            filter: BookFilter::search(text),
            sort: Sort {
                field: SortField::CreatedAt,
                order: SortOrder::Desc,
            },
            skip: 0,
            limit: at_least_one(self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
        })
    }
}

fn at_least_one(value: i64) -> u64 {
    u64::try_from(value.max(1)).unwrap_or(1)
}

//! Paging requests and paged results.
//!
//! Ordering and slicing are executed by the repository; these types only carry
//! the request ([`Pageable`]) and the response ([`Page`]).

use axum::http::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CrudError;

/// Sort direction of a single property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn is_ascending(self) -> bool {
        self == Self::Asc
    }
}

impl FromStr for Direction {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(CrudError::bad_request(format!(
                "Invalid sort direction '{s}', expected 'asc' or 'desc'"
            )))
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl From<Direction> for sea_orm::Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Self::Asc,
            Direction::Desc => Self::Desc,
        }
    }
}

/// One `property,direction` entry of a sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    #[must_use]
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    #[must_use]
    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// Ordered list of sort orders; empty means unsorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<SortOrder>,
}

impl Sort {
    #[must_use]
    pub fn unsorted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn by(orders: Vec<SortOrder>) -> Self {
        Self { orders }
    }

    /// Parse `property[,asc|desc]` entries separated by `;`
    ///
    /// Entries without a direction get `default_direction`; blank entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CrudError::BadRequest` for an empty property or an unknown direction.
    pub fn parse(raw: &str, default_direction: Direction) -> Result<Self, CrudError> {
        let mut orders = Vec::new();
        for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.splitn(2, ',').map(str::trim);
            let property = parts.next().unwrap_or_default();
            if property.is_empty() {
                return Err(CrudError::bad_request(format!(
                    "Invalid sort entry '{entry}'"
                )));
            }
            let direction = match parts.next() {
                Some(d) if !d.is_empty() => d.parse()?,
                _ => default_direction,
            };
            orders.push(SortOrder {
                property: property.to_string(),
                direction,
            });
        }
        Ok(Self { orders })
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }

    #[must_use]
    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortOrder> {
        self.orders.iter()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .orders
            .iter()
            .map(|o| format!("{},{}", o.property, o.direction))
            .collect();
        write!(f, "{}", entries.join(";"))
    }
}

/// Request for one page of records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pageable {
    /// Zero-based page index
    pub page: u64,
    /// Page size; `None` requests every record in a single page
    pub size: Option<u64>,
    pub sort: Sort,
}

impl Pageable {
    /// Page `page` of `size` records; a zero size is raised to one
    #[must_use]
    pub fn of(page: u64, size: u64) -> Self {
        Self {
            page,
            size: Some(size.max(1)),
            sort: Sort::unsorted(),
        }
    }

    #[must_use]
    pub fn unpaged() -> Self {
        Self {
            page: 0,
            size: None,
            sort: Sort::unsorted(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn is_paged(&self) -> bool {
        self.size.is_some()
    }

    /// Index of the first record of the page
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.size.map_or(0, |size| self.page.saturating_mul(size))
    }
}

impl Default for Pageable {
    fn default() -> Self {
        Self::unpaged()
    }
}

/// One page of records plus the totals of the whole result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index
    pub page: u64,
    /// Requested page size (the content length for unpaged requests)
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page for `pageable` out of its content and the total record count
    #[must_use]
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        let size = pageable.size.unwrap_or(content.len() as u64);
        let total_pages = if size == 0 {
            u64::from(total_elements > 0)
        } else {
            total_elements.div_ceil(size)
        };
        Self {
            content,
            page: pageable.page,
            size,
            total_elements,
            total_pages,
        }
    }

    #[must_use]
    pub fn empty(pageable: &Pageable) -> Self {
        Self::new(Vec::new(), pageable, 0)
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    /// Map every record, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            content: self.content.into_iter().map(f).collect::<Result<_, _>>()?,
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        })
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build the `Content-Range` header describing a page: `<resource> <first>-<last>/<total>`
///
/// `last` never exceeds the index of the final record. A page holding no
/// records is described as `<resource> */<total>`.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let range = if limit == 0 || offset >= total_count {
        "*".to_string()
    } else {
        let last = offset.saturating_add(limit - 1).min(total_count - 1);
        format!("{offset}-{last}")
    };

    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {range}/{total_count}");

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    } else if let Ok(value) = format!("items {range}/{total_count}").parse() {
        headers.insert("Content-Range", value);
    }

    headers
}

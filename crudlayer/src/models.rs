use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::CrudConfig;
use crate::errors::CrudError;
use crate::pagination::{Pageable, Sort};

/// Query parameters for paging and sorting resources.
///
/// # Pagination
/// `page` is zero-based; `size` falls back to the configured default and is
/// clamped to the configured maximum.
///
/// # Sorting
/// `sort` holds `property[,asc|desc]` entries separated by `;`, for example
/// `title,asc;id`. Entries without a direction use the configured default
/// direction (descending unless configured otherwise).
#[derive(Debug, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index.
    ///
    /// Example: `0`
    #[param(example = 0)]
    pub page: Option<u64>,
    /// Number of items per page.
    ///
    /// Example: `20`
    #[param(example = 20)]
    pub size: Option<u64>,
    /// Sort orders in the format `property[,asc|desc]`, separated by `;`.
    ///
    /// Example: `title,asc;id,desc`
    #[param(example = "title,asc;id,desc")]
    pub sort: Option<String>,
}

impl PageQuery {
    /// Turn the raw query into a [`Pageable`] using the paging defaults of `config`
    ///
    /// # Errors
    ///
    /// Returns `CrudError::BadRequest` when `sort` is malformed or when the
    /// first record of the requested page lies beyond `u64::MAX`.
    pub fn into_pageable(self, config: &CrudConfig) -> Result<Pageable, CrudError> {
        let sort = match self.sort.as_deref() {
            Some(raw) => Sort::parse(raw, config.default_direction)?,
            None => Sort::unsorted(),
        };
        let page = self.page.unwrap_or(0);
        let size = config.page_size(self.size);
        if page.checked_mul(size).is_none() {
            return Err(CrudError::bad_request(format!(
                "Page {page} of size {size} is out of range"
            )));
        }
        Ok(Pageable {
            page,
            size: Some(size),
            sort,
        })
    }
}

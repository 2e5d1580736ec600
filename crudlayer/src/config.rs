use serde::Deserialize;

use crate::pagination::Direction;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 2000;

/// Paging defaults applied by the HTTP layer when a request leaves them out.
///
/// Deserializable so applications can read it from whatever configuration
/// source they already use; missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrudConfig {
    /// Page size used when `size` is absent
    pub default_page_size: u64,
    /// Upper bound for `size`; larger values are clamped
    pub max_page_size: u64,
    /// Direction for sort entries that name only a property
    pub default_direction: Direction,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            default_direction: Direction::Desc,
        }
    }
}

impl CrudConfig {
    #[must_use]
    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    /// Resolve a requested page size: absent means default, zero means one, too large is clamped
    #[must_use]
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

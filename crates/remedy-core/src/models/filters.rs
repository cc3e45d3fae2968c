//! Filter and pagination types for querying incidents.

use serde::{Deserialize, Serialize};

use super::{Severity, StatusKind};

/// Largest page the store will return.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Filter options for querying incidents. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentFilter {
    pub severity: Option<Severity>,

    pub status: Option<StatusKind>,

    /// Exact source match
    pub source: Option<String>,

    /// Case-insensitive partial match on the title
    pub title_contains: Option<String>,
}

impl IncidentFilter {
    /// Create a filter matching every incident reported by `source`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use remedy_core::models::IncidentFilter;
    ///
    /// let filter = IncidentFilter::for_source("monitoring");
    /// assert_eq!(filter.source.as_deref(), Some("monitoring"));
    /// assert!(filter.status.is_none());
    /// ```
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Default::default()
        }
    }
}

/// Pagination window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            offset,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

//! Parameter structures for engine operations.
//!
//! These structures are shared by every interface (the CLI today) and carry
//! no framework-specific derives beyond serde. Interface layers define their
//! own argument wrappers and convert into these types with `From`.

use serde::{Deserialize, Serialize};

use crate::models::{IncidentFilter, Page, Severity, StatusKind};

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// An inbound incident report, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentSubmission {
    /// Reporting system (required, at most 100 characters)
    pub source: String,
    /// Short summary (required, at most 500 characters)
    pub title: String,
    /// Free-form details (required)
    pub description: String,
    /// Severity name, matched case-insensitively; defaults to MEDIUM
    #[serde(default)]
    pub severity: Option<String>,
}

/// Parameters for listing incidents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListIncidents {
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub status: Option<StatusKind>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title_contains: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    Page::default().limit
}

impl Default for ListIncidents {
    fn default() -> Self {
        Self {
            severity: None,
            status: None,
            source: None,
            title_contains: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl From<&ListIncidents> for (IncidentFilter, Page) {
    /// Split list parameters into the store's filter and page window.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use remedy_core::{models::{IncidentFilter, Page}, params::ListIncidents};
    ///
    /// let params = ListIncidents {
    ///     source: Some("monitoring".to_string()),
    ///     limit: 10,
    ///     ..Default::default()
    /// };
    /// let (filter, page): (IncidentFilter, Page) = (&params).into();
    /// assert_eq!(filter.source.as_deref(), Some("monitoring"));
    /// assert_eq!(page.limit, 10);
    /// ```
    fn from(params: &ListIncidents) -> Self {
        (
            IncidentFilter {
                severity: params.severity,
                status: params.status,
                source: params.source.clone(),
                title_contains: params.title_contains.clone(),
            },
            Page::new(params.limit, params.offset),
        )
    }
}

//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use super::datetime::LocalDateTime;
use crate::models::Incident;

/// Newtype wrapper for displaying a list of incidents as one-line entries.
///
/// # Examples
///
/// ```rust
/// use remedy_core::{
///     display::Incidents,
///     models::{Incident, IncidentStatus, Severity},
/// };
/// use jiff::Timestamp;
///
/// let incident = Incident {
///     id: 3,
///     source: "monitoring".to_string(),
///     title: "DB timeout".to_string(),
///     description: "Connection pool exhausted".to_string(),
///     severity: Severity::High,
///     status: IncidentStatus::Acknowledged,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
///
/// let output = Incidents(vec![incident]).to_string();
/// assert!(output.contains("## DB timeout (ID: 3)"));
/// assert!(output.contains("- **Status**: acknowledged"));
///
/// assert_eq!(Incidents(vec![]).to_string(), "No incidents found.\n");
/// ```
pub struct Incidents(pub Vec<Incident>);

impl Incidents {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Incident> {
        self.0.iter()
    }
}

impl Index<usize> for Incidents {
    type Output = Incident;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Incidents {
    type Item = Incident;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Incidents {
    type Item = &'a Incident;
    type IntoIter = std::slice::Iter<'a, Incident>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Incidents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No incidents found.");
        }

        for incident in &self.0 {
            writeln!(f, "## {} (ID: {})", incident.title, incident.id)?;
            writeln!(f)?;
            writeln!(f, "- **Status**: {}", incident.status)?;
            writeln!(f, "- **Severity**: {}", incident.severity)?;
            writeln!(f, "- **Source**: {}", incident.source)?;
            writeln!(f, "- **Created**: {}", LocalDateTime(&incident.created_at))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

//! Markdown display for models and operation results.
//!
//! Domain models implement `Display` directly in [`models`]. Lists and
//! operation outcomes use the wrapper types in [`collections`] and
//! [`results`], so the CLI never formats data itself and only renders the
//! markdown it receives.
//!
//! ```rust
//! use remedy_core::models::{Confidence, Diagnosis, DiagnosisResult};
//!
//! let result = DiagnosisResult::Success(Diagnosis {
//!     root_cause: "Connection pool exhausted".to_string(),
//!     steps: vec!["restart api".to_string()],
//!     confidence: Confidence::High,
//! });
//! assert!(result.to_string().contains("1. restart api"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;

pub use collections::Incidents;
pub use datetime::{LocalDateTime, MaybeDateTime};
pub use results::StatusChange;

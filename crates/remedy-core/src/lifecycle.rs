//! Incident status machine.
//!
//! Statuses are ranked `Open < Acknowledged < Diagnosed < Resolved` and may
//! only move to a higher rank. Skipping ranks is allowed (an incident can be
//! resolved straight from `Open`). The single same-rank move permitted is
//! `Diagnosed → Diagnosed`, which swaps in a newer diagnosis.
//!
//! [`apply`] is the only path that persists a move. The store write is
//! conditional on the status the move was validated against, so two
//! writers racing on one incident cannot undo each other.

use jiff::Timestamp;
use log::debug;

use crate::{
    error::{InvalidTransition, LifecycleError, StoreError},
    models::{Incident, IncidentStatus, StatusKind},
    repository::IncidentRepository,
};

fn rank(kind: StatusKind) -> u8 {
    match kind {
        StatusKind::Open => 0,
        StatusKind::Acknowledged => 1,
        StatusKind::Diagnosed => 2,
        StatusKind::Resolved => 3,
    }
}

/// Validate a move from `current` to `target` and return the new status.
///
/// # Examples
///
/// ```rust
/// use remedy_core::{lifecycle::advance, models::IncidentStatus};
///
/// assert_eq!(
///     advance(IncidentStatus::Open, IncidentStatus::Acknowledged),
///     Ok(IncidentStatus::Acknowledged)
/// );
/// assert!(advance(IncidentStatus::Resolved, IncidentStatus::Open).is_err());
/// ```
pub fn advance(
    current: IncidentStatus,
    target: IncidentStatus,
) -> Result<IncidentStatus, InvalidTransition> {
    let (from, to) = (current.kind(), target.kind());
    let rediagnosis = from == StatusKind::Diagnosed && to == StatusKind::Diagnosed;

    if rank(to) > rank(from) || rediagnosis {
        Ok(target)
    } else {
        Err(InvalidTransition { from, to })
    }
}

impl Incident {
    /// Move the incident to `target`, refreshing `updated_at` on success.
    pub fn advance(&mut self, target: IncidentStatus) -> Result<(), InvalidTransition> {
        self.status = advance(self.status, target)?;
        self.updated_at = Timestamp::now().max(self.created_at);
        Ok(())
    }
}

/// Validate and persist a move of `incident` to `target`.
///
/// Returns the status kind the move started from together with the stored
/// record. When the stored status changed since `incident` was read, the
/// incident is read again and the move re-validated against what is stored
/// now. Ranks only increase, so this settles after a few rounds at most.
pub async fn apply(
    repository: &dyn IncidentRepository,
    mut incident: Incident,
    target: IncidentStatus,
) -> Result<(StatusKind, Incident), LifecycleError> {
    loop {
        let previous = incident.status.kind();
        incident.advance(target)?;

        match repository
            .update_status(incident.id, previous, incident.status)
            .await
        {
            Ok(updated) => return Ok((previous, updated)),
            Err(StoreError::StatusChanged { id, .. }) => {
                debug!("Incident {id} changed while moving to {}", target.kind());
                incident = repository
                    .find_by_id(id)
                    .await?
                    .ok_or(LifecycleError::NotFound { id })?;
            }
            Err(StoreError::IncidentNotFound { id }) => {
                return Err(LifecycleError::NotFound { id })
            }
            Err(other) => return Err(other.into()),
        }
    }
}

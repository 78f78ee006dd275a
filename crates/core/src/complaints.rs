//! Complaints and their append-only update trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::enums::{ComplaintCategory, ComplaintPriority, ComplaintStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub school_id: Uuid,
    pub raised_by: Uuid,
    pub student_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    pub resolution: Option<String>,
    /// Set exactly when `status` is `resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComplaint {
    pub school_id: Uuid,
    pub raised_by: Uuid,
    pub student_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
}

/// One audit entry. Status fields are set for transitions, `comment` for notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintUpdate {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub updated_by: Option<Uuid>,
    pub from_status: Option<ComplaintStatus>,
    pub to_status: Option<ComplaintStatus>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot move from {from} to {to}")]
    NotAllowed { from: String, to: String },
    #[error("a resolution is required to resolve a complaint")]
    ResolutionRequired,
    #[error("a resolution can only be recorded when resolving, not on {to}")]
    ResolutionNotAllowed { to: String },
}

impl ComplaintStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ComplaintStatus::Resolved | ComplaintStatus::Closed | ComplaintStatus::Rejected
        )
    }

    pub fn can_transition_to(self, next: ComplaintStatus) -> bool {
        use ComplaintStatus::*;
        matches!(
            (self, next),
            (Open, InProgress)
                | (Open, Closed)
                | (Open, Rejected)
                | (InProgress, Resolved)
                | (InProgress, Closed)
                | (InProgress, Rejected)
        )
    }
}

/// Column values to write for an accepted transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintTransition {
    pub from: ComplaintStatus,
    pub to: ComplaintStatus,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Check a status change and compute the resolution fields it writes.
pub fn plan_transition(
    from: ComplaintStatus,
    to: ComplaintStatus,
    resolution: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ComplaintTransition, TransitionError> {
    if !from.can_transition_to(to) {
        return Err(TransitionError::NotAllowed {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    let resolution = resolution.map(str::trim).filter(|r| !r.is_empty());
    match (to, resolution) {
        (ComplaintStatus::Resolved, None) => Err(TransitionError::ResolutionRequired),
        (ComplaintStatus::Resolved, Some(text)) => Ok(ComplaintTransition {
            from,
            to,
            resolution: Some(text.to_string()),
            resolved_at: Some(now),
        }),
        (_, Some(_)) => Err(TransitionError::ResolutionNotAllowed { to: to.to_string() }),
        (_, None) => Ok(ComplaintTransition {
            from,
            to,
            resolution: None,
            resolved_at: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComplaintStatus::*;

    #[test]
    fn test_allowed_paths() {
        assert!(Open.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Resolved));
        assert!(InProgress.can_transition_to(Rejected));
        assert!(!Open.can_transition_to(Resolved));
        assert!(!Open.can_transition_to(Open));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in ComplaintStatus::ALL.iter().filter(|s| s.is_terminal()) {
            for to in ComplaintStatus::ALL {
                assert!(!from.can_transition_to(*to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_resolving_sets_resolved_at() {
        let now = Utc::now();
        let plan = plan_transition(InProgress, Resolved, Some("  replaced the fan "), now).unwrap();
        assert_eq!(plan.resolution.as_deref(), Some("replaced the fan"));
        assert_eq!(plan.resolved_at, Some(now));

        let plan = plan_transition(Open, InProgress, None, now).unwrap();
        assert_eq!(plan.resolved_at, None);
    }

    #[test]
    fn test_resolution_rules() {
        let now = Utc::now();
        assert_eq!(
            plan_transition(InProgress, Resolved, Some("   "), now),
            Err(TransitionError::ResolutionRequired)
        );
        assert!(matches!(
            plan_transition(InProgress, Closed, Some("done"), now),
            Err(TransitionError::ResolutionNotAllowed { .. })
        ));
        assert!(matches!(
            plan_transition(Resolved, Open, None, now),
            Err(TransitionError::NotAllowed { .. })
        ));
    }
}

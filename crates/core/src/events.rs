//! School calendar events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{EventType, TargetAudience, UserRole};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub school_id: Uuid,
    /// When set the event only concerns this class.
    pub class_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub target_audience: TargetAudience,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub school_id: Uuid,
    pub class_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub target_audience: TargetAudience,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl TargetAudience {
    /// Audiences whose events a user with `role` should see.
    pub fn visible_to(role: UserRole) -> Vec<TargetAudience> {
        let mut audiences = vec![TargetAudience::All];
        match role {
            UserRole::Student => audiences.push(TargetAudience::Students),
            UserRole::Parent => audiences.push(TargetAudience::Parents),
            UserRole::Teacher => {
                audiences.push(TargetAudience::Teachers);
                audiences.push(TargetAudience::Staff);
            }
            UserRole::SchoolAdmin | UserRole::SuperAdmin => {
                return TargetAudience::ALL.to_vec();
            }
        }
        audiences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_visibility() {
        let student = TargetAudience::visible_to(UserRole::Student);
        assert_eq!(student, vec![TargetAudience::All, TargetAudience::Students]);
        assert!(TargetAudience::visible_to(UserRole::Teacher).contains(&TargetAudience::Staff));
        assert_eq!(
            TargetAudience::visible_to(UserRole::SchoolAdmin).len(),
            TargetAudience::ALL.len()
        );
    }
}

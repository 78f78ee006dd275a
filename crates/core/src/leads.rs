//! Standalone lead-tracking records: sales inquiries and website contact messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::complaints::TransitionError;
use crate::enums::InquiryStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub school_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub student_count: Option<i64>,
    pub message: Option<String>,
    pub status: InquiryStatus,
    pub notes: Option<String>,
    pub demo_scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewInquiry {
    pub school_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub student_count: Option<i64>,
    pub message: Option<String>,
}

impl InquiryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, InquiryStatus::Denied | InquiryStatus::Onboarded)
    }

    pub fn can_transition_to(self, next: InquiryStatus) -> bool {
        use InquiryStatus::*;
        matches!(
            (self, next),
            (Pending, DemoPlanned)
                | (Pending, Denied)
                | (DemoPlanned, DemoDone)
                | (DemoPlanned, Denied)
                | (DemoDone, Denied)
                | (DemoDone, Onboarded)
        )
    }

    pub fn check_transition(self, next: InquiryStatus) -> Result<(), TransitionError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(TransitionError::NotAllowed {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use InquiryStatus::*;

    #[test]
    fn test_pipeline_order() {
        assert!(Pending.can_transition_to(DemoPlanned));
        assert!(DemoPlanned.can_transition_to(DemoDone));
        assert!(DemoDone.can_transition_to(Onboarded));
        assert!(!Pending.can_transition_to(Onboarded));
        assert!(!DemoDone.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal() {
        assert!(Onboarded.check_transition(Denied).is_err());
        assert!(Denied.is_terminal());
        assert!(!DemoDone.is_terminal());
    }
}

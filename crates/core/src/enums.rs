//! Closed value sets stored in enumerated columns.
//!
//! Every enum exposes `ALL` (used to generate the database `CHECK (col IN ...)`
//! constraint), `as_str` (the stored value), and a `FromStr` that rejects
//! anything outside the set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Role of a user account. Only `SuperAdmin` lives outside a school.
    pub enum UserRole {
        SuperAdmin => "super_admin",
        SchoolAdmin => "school_admin",
        Teacher => "teacher",
        Student => "student",
        Parent => "parent",
    }
}

impl UserRole {
    pub fn requires_school(self) -> bool {
        !matches!(self, UserRole::SuperAdmin)
    }
}

string_enum! {
    pub enum PlanType {
        Free => "free",
        Basic => "basic",
        Standard => "standard",
        Premium => "premium",
        Enterprise => "enterprise",
    }
}

string_enum! {
    pub enum BillingCycle {
        Monthly => "monthly",
        Quarterly => "quarterly",
        Yearly => "yearly",
    }
}

string_enum! {
    pub enum Gender {
        Male => "male",
        Female => "female",
        Other => "other",
    }
}

string_enum! {
    /// How a parent account relates to the students it is linked to.
    pub enum RelationshipType {
        Father => "father",
        Mother => "mother",
        Guardian => "guardian",
        Other => "other",
    }
}

string_enum! {
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
        HalfDay => "half_day",
    }
}

string_enum! {
    pub enum FeeType {
        Tuition => "tuition",
        Admission => "admission",
        Transport => "transport",
        Library => "library",
        Laboratory => "laboratory",
        Sports => "sports",
        Examination => "examination",
        Other => "other",
    }
}

string_enum! {
    /// Payment state of a student fee. Always derived, see [`crate::fees::derive_fee_status`].
    pub enum FeeStatus {
        Pending => "pending",
        Partial => "partial",
        Paid => "paid",
        Overdue => "overdue",
    }
}

string_enum! {
    pub enum PaymentMethod {
        Cash => "cash",
        Card => "card",
        BankTransfer => "bank_transfer",
        Upi => "upi",
        Cheque => "cheque",
        Online => "online",
    }
}

string_enum! {
    pub enum ComplaintCategory {
        Academic => "academic",
        Infrastructure => "infrastructure",
        Transport => "transport",
        Fee => "fee",
        Staff => "staff",
        Safety => "safety",
        Other => "other",
    }
}

string_enum! {
    pub enum ComplaintPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

string_enum! {
    pub enum ComplaintStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
        Rejected => "rejected",
    }
}

string_enum! {
    pub enum EventType {
        Holiday => "holiday",
        Exam => "exam",
        Meeting => "meeting",
        Sports => "sports",
        Cultural => "cultural",
        ParentTeacherMeeting => "parent_teacher_meeting",
        Other => "other",
    }
}

string_enum! {
    pub enum TargetAudience {
        All => "all",
        Students => "students",
        Teachers => "teachers",
        Parents => "parents",
        Staff => "staff",
    }
}

string_enum! {
    /// Sales pipeline stage of an inquiry. Stored values are human-readable labels.
    pub enum InquiryStatus {
        Pending => "Pending",
        DemoPlanned => "Demo Planned",
        DemoDone => "Demo Done",
        Denied => "Denied",
        Onboarded => "Onboarded",
    }
}

string_enum! {
    pub enum DayOfWeek {
        Monday => "monday",
        Tuesday => "tuesday",
        Wednesday => "wednesday",
        Thursday => "thursday",
        Friday => "friday",
        Saturday => "saturday",
        Sunday => "sunday",
    }
}

//! User accounts and the role-specific profile rows hanging off them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{Gender, RelationshipType, UserRole};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    /// `None` only for [`UserRole::SuperAdmin`].
    pub school_id: Option<Uuid>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Account fields for a new user. The password is passed separately and only its hash is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: Uuid,
    pub user_id: Uuid,
    pub school_id: Uuid,
    pub employee_id: String,
    pub qualification: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: i64,
    pub joining_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTeacher {
    pub user_id: Uuid,
    pub school_id: Uuid,
    pub employee_id: String,
    pub qualification: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: i64,
    pub joining_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub school_id: Uuid,
    pub class_id: Uuid,
    pub roll_number: String,
    pub admission_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub blood_group: Option<String>,
    pub address: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub user_id: Uuid,
    pub school_id: Uuid,
    pub class_id: Uuid,
    pub roll_number: String,
    pub admission_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub blood_group: Option<String>,
    pub address: Option<String>,
    pub admission_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub school_id: Uuid,
    pub relationship_type: RelationshipType,
    pub occupation: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewParent {
    pub user_id: Uuid,
    pub school_id: Uuid,
    pub relationship_type: RelationshipType,
    pub occupation: Option<String>,
}

/// Row of the `student_parents` join table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentParent {
    pub student_id: Uuid,
    pub parent_id: Uuid,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

use std::sync::LazyLock;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::academics::NewClass;
use crate::credentials::{PasswordHash, hash_password};
use crate::enums::{ComplaintCategory, ComplaintPriority, FeeType, RelationshipType, UserRole};
use crate::fees::NewFee;
use crate::complaints::NewComplaint;
use crate::people::{NewParent, NewStudent, NewTeacher, NewUser};
use crate::tenancy::NewSchool;

static PASSWORD: LazyLock<PasswordHash> =
    LazyLock::new(|| hash_password("fixture-password").unwrap());

/// One shared hash for `fixture-password`, computed once per test binary.
pub fn password_hash() -> PasswordHash {
    PASSWORD.clone()
}

pub fn school(email: &str) -> NewSchool {
    NewSchool {
        name: format!("School {email}"),
        email: email.to_string(),
        city: Some("Pune".to_string()),
        ..Default::default()
    }
}

pub fn user(role: UserRole, school_id: Option<Uuid>, email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: role.as_str().to_string(),
        phone: None,
        role,
        school_id,
    }
}

pub fn class(school_id: Uuid, grade: &str, section: &str) -> NewClass {
    NewClass {
        school_id,
        grade: grade.to_string(),
        section: section.to_string(),
        class_teacher_id: None,
        academic_year: Some("2024-25".to_string()),
        room_number: None,
        capacity: 40,
        timetable: None,
    }
}

pub fn teacher(user_id: Uuid, school_id: Uuid, employee_id: &str) -> NewTeacher {
    NewTeacher {
        user_id,
        school_id,
        employee_id: employee_id.to_string(),
        qualification: Some("M.Sc".to_string()),
        specialization: None,
        experience_years: 4,
        joining_date: None,
    }
}

pub fn student(user_id: Uuid, school_id: Uuid, class_id: Uuid, roll_number: &str) -> NewStudent {
    NewStudent {
        user_id,
        school_id,
        class_id,
        roll_number: roll_number.to_string(),
        admission_number: format!("ADM-{roll_number}-{}", &user_id.simple().to_string()[..8]),
        date_of_birth: NaiveDate::from_ymd_opt(2012, 5, 17),
        gender: None,
        blood_group: None,
        address: None,
        admission_date: None,
    }
}

pub fn parent(user_id: Uuid, school_id: Uuid) -> NewParent {
    NewParent {
        user_id,
        school_id,
        relationship_type: RelationshipType::Guardian,
        occupation: None,
    }
}

pub fn fee(school_id: Uuid, class_id: Option<Uuid>, amount: i64, due_date: NaiveDate) -> NewFee {
    NewFee {
        school_id,
        class_id,
        name: "Term 1 tuition".to_string(),
        fee_type: FeeType::Tuition,
        amount,
        due_date,
        academic_year: Some("2024-25".to_string()),
        description: None,
    }
}

pub fn complaint(school_id: Uuid, raised_by: Uuid) -> NewComplaint {
    NewComplaint {
        school_id,
        raised_by,
        student_id: None,
        assigned_to: None,
        title: "Broken fan in 10-A".to_string(),
        description: "The ceiling fan has not worked since Monday.".to_string(),
        category: ComplaintCategory::Infrastructure,
        priority: ComplaintPriority::Medium,
    }
}

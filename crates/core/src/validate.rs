//! Field rules checked before a row is written.
//!
//! Database constraints stay authoritative. These validators catch the same
//! mistakes earlier and report all of them at once.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::academics::{MAX_PERIOD, NewAttendance, NewClass, NewSubject, Timetable};
use crate::complaints::NewComplaint;
use crate::events::NewEvent;
use crate::fees::{MAX_AMOUNT, NewFee, ScholarshipAward, ScholarshipDetails};
use crate::leads::{NewContactMessage, NewInquiry};
use crate::people::{NewParent, NewStudent, NewTeacher, NewUser};
use crate::tenancy::{NewSchool, NewSubscription};

pub const NAME_MAX: usize = 100;
pub const TITLE_MAX: usize = 200;
pub const EMAIL_MAX: usize = 255;
pub const PHONE_MAX: usize = 20;
pub const TEXT_MAX: usize = 5000;
pub const MAX_CLASS_CAPACITY: i64 = 200;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingField { field: String },
    #[error("{field} exceeds {max} characters")]
    TooLong { field: String, max: usize },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("invalid email address: {value}")]
    InvalidEmail { value: String },
    #[error("role {role} {reason}")]
    RoleSchoolMismatch { role: String, reason: &'static str },
    #[error("timetable lists {day} more than once")]
    DuplicateDay { day: String },
    #[error("timetable period {period} appears more than once on {day}")]
    DuplicatePeriod { day: String, period: i64 },
    #[error("timetable period {period} on {day} does not end after it starts")]
    SlotEndsBeforeStart { day: String, period: i64 },
    #[error("{field} is before the start")]
    EndsBeforeStart { field: String },
    #[error("{field} belongs to another school")]
    ForeignSchool { field: String },
    #[error("{field} refers to a {role}, expected one of: {expected}")]
    WrongRole {
        field: String,
        role: String,
        expected: String,
    },
}

type Checked = Result<(), Vec<ValidationError>>;

fn finish(errors: Vec<ValidationError>) -> Checked {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn text(field: &str, value: &str, max: usize) -> Vec<ValidationError> {
    if value.trim().is_empty() {
        vec![ValidationError::MissingField {
            field: field.to_string(),
        }]
    } else {
        optional_text(field, Some(value), max)
    }
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> Vec<ValidationError> {
    match value {
        Some(v) if v.chars().count() > max => vec![ValidationError::TooLong {
            field: field.to_string(),
            max,
        }],
        _ => vec![],
    }
}

fn range(field: &str, value: i64, min: i64, max: i64) -> Vec<ValidationError> {
    if (min..=max).contains(&value) {
        vec![]
    } else {
        vec![ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        }]
    }
}

fn non_negative(field: &str, value: i64) -> Vec<ValidationError> {
    range(field, value, 0, i64::MAX)
}

fn money(field: &str, value: i64) -> Vec<ValidationError> {
    range(field, value, 0, MAX_AMOUNT)
}

fn email(value: &str) -> Vec<ValidationError> {
    let mut errors = text("email", value, EMAIL_MAX);
    if errors.is_empty() && !EMAIL_RE.is_match(value) {
        errors.push(ValidationError::InvalidEmail {
            value: value.to_string(),
        });
    }
    errors
}

pub fn is_valid_email(value: &str) -> bool {
    email(value).is_empty()
}

pub fn validate_new_subscription(sub: &NewSubscription) -> Checked {
    finish(
        [
            text("name", &sub.name, NAME_MAX),
            money("price", sub.price),
            non_negative("max_students", sub.limits.max_students),
            non_negative("max_teachers", sub.limits.max_teachers),
            non_negative("max_classes", sub.limits.max_classes),
        ]
        .concat(),
    )
}

pub fn validate_new_school(school: &NewSchool) -> Checked {
    finish(
        [
            text("name", &school.name, TITLE_MAX),
            email(&school.email),
            optional_text("phone", school.phone.as_deref(), PHONE_MAX),
            optional_text("city", school.city.as_deref(), NAME_MAX),
            optional_text("state", school.state.as_deref(), NAME_MAX),
            optional_text("website", school.website.as_deref(), EMAIL_MAX),
        ]
        .concat(),
    )
}

pub fn validate_new_user(user: &NewUser) -> Checked {
    let mut errors = [
        email(&user.email),
        text("first_name", &user.first_name, NAME_MAX),
        text("last_name", &user.last_name, NAME_MAX),
        optional_text("phone", user.phone.as_deref(), PHONE_MAX),
    ]
    .concat();

    match (user.role.requires_school(), user.school_id.is_some()) {
        (true, false) => errors.push(ValidationError::RoleSchoolMismatch {
            role: user.role.to_string(),
            reason: "requires a school",
        }),
        (false, true) => errors.push(ValidationError::RoleSchoolMismatch {
            role: user.role.to_string(),
            reason: "must not belong to a school",
        }),
        _ => {}
    }
    finish(errors)
}

pub fn validate_new_class(class: &NewClass) -> Checked {
    let mut errors = [
        text("grade", &class.grade, 20),
        text("section", &class.section, 10),
        optional_text("academic_year", class.academic_year.as_deref(), 20),
        optional_text("room_number", class.room_number.as_deref(), 20),
        range("capacity", class.capacity, 1, MAX_CLASS_CAPACITY),
    ]
    .concat();
    if let Some(timetable) = &class.timetable {
        errors.extend(timetable_errors(timetable));
    }
    finish(errors)
}

pub fn validate_timetable(timetable: &Timetable) -> Checked {
    finish(timetable_errors(timetable))
}

fn timetable_errors(timetable: &Timetable) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut days = HashSet::new();
    for day in &timetable.days {
        if !days.insert(day.day) {
            errors.push(ValidationError::DuplicateDay {
                day: day.day.to_string(),
            });
        }
        let mut periods = HashSet::new();
        for slot in &day.slots {
            errors.extend(range("timetable.period", slot.period, 1, MAX_PERIOD));
            if !periods.insert(slot.period) {
                errors.push(ValidationError::DuplicatePeriod {
                    day: day.day.to_string(),
                    period: slot.period,
                });
            }
            if slot.ends_at <= slot.starts_at {
                errors.push(ValidationError::SlotEndsBeforeStart {
                    day: day.day.to_string(),
                    period: slot.period,
                });
            }
        }
    }
    errors
}

pub fn validate_new_subject(subject: &NewSubject) -> Checked {
    finish(
        [
            text("name", &subject.name, NAME_MAX),
            text("code", &subject.code, 20),
            optional_text("description", subject.description.as_deref(), TEXT_MAX),
        ]
        .concat(),
    )
}

pub fn validate_new_teacher(teacher: &NewTeacher) -> Checked {
    finish(
        [
            text("employee_id", &teacher.employee_id, 50),
            optional_text("qualification", teacher.qualification.as_deref(), TITLE_MAX),
            optional_text("specialization", teacher.specialization.as_deref(), TITLE_MAX),
            range("experience_years", teacher.experience_years, 0, 60),
        ]
        .concat(),
    )
}

pub fn validate_new_student(student: &NewStudent) -> Checked {
    finish(
        [
            text("roll_number", &student.roll_number, 20),
            text("admission_number", &student.admission_number, 50),
            optional_text("blood_group", student.blood_group.as_deref(), 5),
        ]
        .concat(),
    )
}

pub fn validate_new_parent(parent: &NewParent) -> Checked {
    finish(optional_text(
        "occupation",
        parent.occupation.as_deref(),
        NAME_MAX,
    ))
}

pub fn validate_new_attendance(attendance: &NewAttendance) -> Checked {
    finish(
        [
            range("period", attendance.period, 0, MAX_PERIOD),
            optional_text("remarks", attendance.remarks.as_deref(), 500),
        ]
        .concat(),
    )
}

pub fn validate_new_fee(fee: &NewFee) -> Checked {
    finish(
        [
            text("name", &fee.name, NAME_MAX),
            money("amount", fee.amount),
            optional_text("academic_year", fee.academic_year.as_deref(), 20),
        ]
        .concat(),
    )
}

pub fn validate_scholarship(details: &ScholarshipDetails) -> Checked {
    let award = match details.award {
        ScholarshipAward::Percentage { percent } => {
            range("award.percent", i64::from(percent), 1, 100)
        }
        ScholarshipAward::FixedAmount { amount } => money("award.amount", amount),
    };
    finish(
        [
            text("scholarship.name", &details.name, NAME_MAX),
            optional_text("scholarship.sponsor", details.sponsor.as_deref(), TITLE_MAX),
            award,
        ]
        .concat(),
    )
}

pub fn validate_new_complaint(complaint: &NewComplaint) -> Checked {
    finish(
        [
            text("title", &complaint.title, TITLE_MAX),
            text("description", &complaint.description, TEXT_MAX),
        ]
        .concat(),
    )
}

pub fn validate_new_event(event: &NewEvent) -> Checked {
    let mut errors = [
        text("title", &event.title, TITLE_MAX),
        optional_text("description", event.description.as_deref(), TEXT_MAX),
        optional_text("location", event.location.as_deref(), TITLE_MAX),
    ]
    .concat();
    if event.end_date.is_some_and(|end| end < event.start_date) {
        errors.push(ValidationError::EndsBeforeStart {
            field: "end_date".to_string(),
        });
    }
    finish(errors)
}

pub fn validate_new_inquiry(inquiry: &NewInquiry) -> Checked {
    let mut errors = [
        text("school_name", &inquiry.school_name, TITLE_MAX),
        text("contact_name", &inquiry.contact_name, NAME_MAX),
        email(&inquiry.email),
        optional_text("phone", inquiry.phone.as_deref(), PHONE_MAX),
        optional_text("message", inquiry.message.as_deref(), TEXT_MAX),
    ]
    .concat();
    if let Some(count) = inquiry.student_count {
        errors.extend(non_negative("student_count", count));
    }
    finish(errors)
}

pub fn validate_new_contact_message(message: &NewContactMessage) -> Checked {
    finish(
        [
            text("name", &message.name, NAME_MAX),
            email(&message.email),
            optional_text("phone", message.phone.as_deref(), PHONE_MAX),
            optional_text("subject", message.subject.as_deref(), TITLE_MAX),
            text("message", &message.message, TEXT_MAX),
        ]
        .concat(),
    )
}

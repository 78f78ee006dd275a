//! Classes, subjects and attendance.

use chrono::NaiveDate;
use schoolbase_core::{AttendanceStatus, NewAttendance, NewClass, NewSubject};
use sea_query::{Alias, Asterisk, Expr, Func, Order, Query, SelectStatement, SqliteQueryBuilder};
use uuid::Uuid;

use super::tables::{
    ATTENDANCE_COLUMNS, Attendance, CLASS_COLUMNS, Classes, SUBJECT_COLUMNS, Subjects,
};
use super::{Built, date, opt_text, opt_uuid, uuid};

// ── Classes ────────────────────────────────────────────────────────────────

pub fn insert_class(id: Uuid, class: &NewClass, timetable_json: Option<&str>) -> Built {
    Query::insert()
        .into_table(Classes::Table)
        .columns([
            Classes::Id,
            Classes::SchoolId,
            Classes::Grade,
            Classes::Section,
            Classes::ClassTeacherId,
            Classes::AcademicYear,
            Classes::RoomNumber,
            Classes::Capacity,
            Classes::Timetable,
        ])
        .values_panic([
            uuid(id),
            uuid(class.school_id),
            class.grade.as_str().into(),
            class.section.as_str().into(),
            opt_uuid(class.class_teacher_id),
            opt_text(class.academic_year.as_deref()),
            opt_text(class.room_number.as_deref()),
            class.capacity.into(),
            opt_text(timetable_json),
        ])
        .build(SqliteQueryBuilder)
}

fn select_classes() -> SelectStatement {
    Query::select()
        .columns(CLASS_COLUMNS)
        .from(Classes::Table)
        .to_owned()
}

pub fn get_class(id: Uuid) -> Built {
    select_classes()
        .and_where(Expr::col(Classes::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn find_class(school_id: Uuid, grade: &str, section: &str) -> Built {
    select_classes()
        .and_where(Expr::col(Classes::SchoolId).eq(school_id.to_string()))
        .and_where(Expr::col(Classes::Grade).eq(grade))
        .and_where(Expr::col(Classes::Section).eq(section))
        .build(SqliteQueryBuilder)
}

pub fn classes_for_school(school_id: Uuid) -> Built {
    select_classes()
        .and_where(Expr::col(Classes::SchoolId).eq(school_id.to_string()))
        .order_by(Classes::Grade, Order::Asc)
        .order_by(Classes::Section, Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn assign_class_teacher(class_id: Uuid, teacher_user_id: Option<Uuid>) -> Built {
    Query::update()
        .table(Classes::Table)
        .value(Classes::ClassTeacherId, opt_uuid(teacher_user_id))
        .value(Classes::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Classes::Id).eq(class_id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn set_timetable(class_id: Uuid, timetable_json: Option<&str>) -> Built {
    Query::update()
        .table(Classes::Table)
        .value(Classes::Timetable, opt_text(timetable_json))
        .value(Classes::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Classes::Id).eq(class_id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn set_class_active(class_id: Uuid, active: bool) -> Built {
    Query::update()
        .table(Classes::Table)
        .value(Classes::IsActive, active)
        .value(Classes::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Classes::Id).eq(class_id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn delete_class(class_id: Uuid) -> Built {
    Query::delete()
        .from_table(Classes::Table)
        .and_where(Expr::col(Classes::Id).eq(class_id.to_string()))
        .build(SqliteQueryBuilder)
}

// ── Subjects ───────────────────────────────────────────────────────────────

pub fn insert_subject(id: Uuid, subject: &NewSubject) -> Built {
    Query::insert()
        .into_table(Subjects::Table)
        .columns([
            Subjects::Id,
            Subjects::SchoolId,
            Subjects::Name,
            Subjects::Code,
            Subjects::Description,
            Subjects::ClassId,
            Subjects::TeacherId,
        ])
        .values_panic([
            uuid(id),
            uuid(subject.school_id),
            subject.name.as_str().into(),
            subject.code.as_str().into(),
            opt_text(subject.description.as_deref()),
            opt_uuid(subject.class_id),
            opt_uuid(subject.teacher_id),
        ])
        .build(SqliteQueryBuilder)
}

fn select_subjects() -> SelectStatement {
    Query::select()
        .columns(SUBJECT_COLUMNS)
        .from(Subjects::Table)
        .to_owned()
}

pub fn get_subject(id: Uuid) -> Built {
    select_subjects()
        .and_where(Expr::col(Subjects::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn subjects_for_school(school_id: Uuid) -> Built {
    select_subjects()
        .and_where(Expr::col(Subjects::SchoolId).eq(school_id.to_string()))
        .order_by(Subjects::Code, Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn subjects_for_class(class_id: Uuid) -> Built {
    select_subjects()
        .and_where(Expr::col(Subjects::ClassId).eq(class_id.to_string()))
        .order_by(Subjects::Code, Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn assign_subject_teacher(subject_id: Uuid, teacher_user_id: Option<Uuid>) -> Built {
    Query::update()
        .table(Subjects::Table)
        .value(Subjects::TeacherId, opt_uuid(teacher_user_id))
        .value(Subjects::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Subjects::Id).eq(subject_id.to_string()))
        .build(SqliteQueryBuilder)
}

// ── Attendance ─────────────────────────────────────────────────────────────

pub fn insert_attendance(id: Uuid, record: &NewAttendance) -> Built {
    Query::insert()
        .into_table(Attendance::Table)
        .columns([
            Attendance::Id,
            Attendance::SchoolId,
            Attendance::StudentId,
            Attendance::ClassId,
            Attendance::Date,
            Attendance::Period,
            Attendance::Status,
            Attendance::MarkedBy,
            Attendance::Remarks,
        ])
        .values_panic([
            uuid(id),
            uuid(record.school_id),
            uuid(record.student_id),
            uuid(record.class_id),
            date(record.date),
            record.period.into(),
            record.status.as_str().into(),
            opt_uuid(record.marked_by),
            opt_text(record.remarks.as_deref()),
        ])
        .build(SqliteQueryBuilder)
}

fn select_attendance() -> SelectStatement {
    Query::select()
        .columns(ATTENDANCE_COLUMNS)
        .from(Attendance::Table)
        .to_owned()
}

pub fn get_attendance(id: Uuid) -> Built {
    select_attendance()
        .and_where(Expr::col(Attendance::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

/// Correct an existing mark in place.
pub fn update_attendance(
    id: Uuid,
    status: AttendanceStatus,
    remarks: Option<&str>,
    marked_by: Option<Uuid>,
) -> Built {
    Query::update()
        .table(Attendance::Table)
        .value(Attendance::Status, status.as_str())
        .value(Attendance::Remarks, opt_text(remarks))
        .value(Attendance::MarkedBy, opt_uuid(marked_by))
        .value(Attendance::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Attendance::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn attendance_for_class_on(class_id: Uuid, on: NaiveDate) -> Built {
    select_attendance()
        .and_where(Expr::col(Attendance::ClassId).eq(class_id.to_string()))
        .and_where(Expr::col(Attendance::Date).eq(date(on)))
        .order_by(Attendance::Period, Order::Asc)
        .order_by(Attendance::StudentId, Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn attendance_for_student(student_id: Uuid, from: NaiveDate, to: NaiveDate) -> Built {
    select_attendance()
        .and_where(Expr::col(Attendance::StudentId).eq(student_id.to_string()))
        .and_where(Expr::col(Attendance::Date).between(date(from), date(to)))
        .order_by(Attendance::Date, Order::Asc)
        .order_by(Attendance::Period, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// `(status, count)` rows for one student over an inclusive date range.
pub fn attendance_summary(student_id: Uuid, from: NaiveDate, to: NaiveDate) -> Built {
    Query::select()
        .column(Attendance::Status)
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("n"))
        .from(Attendance::Table)
        .and_where(Expr::col(Attendance::StudentId).eq(student_id.to_string()))
        .and_where(Expr::col(Attendance::Date).between(date(from), date(to)))
        .group_by_col(Attendance::Status)
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_groups_by_status() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let (sql, values) = attendance_summary(Uuid::nil(), day, day);
        assert!(sql.contains(r#"GROUP BY "status""#));
        assert_eq!(values.0.len(), 3);
    }

    #[test]
    fn test_insert_class_binds_every_column() {
        let class = NewClass {
            school_id: Uuid::nil(),
            grade: "10".into(),
            section: "A".into(),
            class_teacher_id: None,
            academic_year: None,
            room_number: None,
            capacity: 40,
            timetable: None,
        };
        let (sql, values) = insert_class(Uuid::nil(), &class, None);
        assert!(sql.starts_with(r#"INSERT INTO "classes""#));
        assert_eq!(values.0.len(), 9);
    }
}

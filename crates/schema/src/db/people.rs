//! Teacher, student and parent profiles and the student ↔ parent link.

use schoolbase_core::{NewParent, NewStudent, NewTeacher};
use sea_query::{Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use uuid::Uuid;

use super::tables::{
    PARENT_COLUMNS, Parents, STUDENT_COLUMNS, StudentParents, Students, TEACHER_COLUMNS, Teachers,
};
use super::{Built, opt_date, opt_text, uuid};

// ── Teachers ───────────────────────────────────────────────────────────────

pub fn insert_teacher(id: Uuid, teacher: &NewTeacher) -> Built {
    Query::insert()
        .into_table(Teachers::Table)
        .columns([
            Teachers::Id,
            Teachers::UserId,
            Teachers::SchoolId,
            Teachers::EmployeeId,
            Teachers::Qualification,
            Teachers::Specialization,
            Teachers::ExperienceYears,
            Teachers::JoiningDate,
        ])
        .values_panic([
            uuid(id),
            uuid(teacher.user_id),
            uuid(teacher.school_id),
            teacher.employee_id.as_str().into(),
            opt_text(teacher.qualification.as_deref()),
            opt_text(teacher.specialization.as_deref()),
            teacher.experience_years.into(),
            opt_date(teacher.joining_date),
        ])
        .build(SqliteQueryBuilder)
}

fn select_teachers() -> SelectStatement {
    Query::select()
        .columns(TEACHER_COLUMNS)
        .from(Teachers::Table)
        .to_owned()
}

pub fn get_teacher(id: Uuid) -> Built {
    select_teachers()
        .and_where(Expr::col(Teachers::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn teacher_by_user(user_id: Uuid) -> Built {
    select_teachers()
        .and_where(Expr::col(Teachers::UserId).eq(user_id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn teachers_for_school(school_id: Uuid) -> Built {
    select_teachers()
        .and_where(Expr::col(Teachers::SchoolId).eq(school_id.to_string()))
        .order_by(Teachers::EmployeeId, Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn set_teacher_active(id: Uuid, active: bool) -> Built {
    Query::update()
        .table(Teachers::Table)
        .value(Teachers::IsActive, active)
        .value(Teachers::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Teachers::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

// ── Students ───────────────────────────────────────────────────────────────

pub fn insert_student(id: Uuid, student: &NewStudent) -> Built {
    Query::insert()
        .into_table(Students::Table)
        .columns([
            Students::Id,
            Students::UserId,
            Students::SchoolId,
            Students::ClassId,
            Students::RollNumber,
            Students::AdmissionNumber,
            Students::DateOfBirth,
            Students::Gender,
            Students::BloodGroup,
            Students::Address,
            Students::AdmissionDate,
        ])
        .values_panic([
            uuid(id),
            uuid(student.user_id),
            uuid(student.school_id),
            uuid(student.class_id),
            student.roll_number.as_str().into(),
            student.admission_number.as_str().into(),
            opt_date(student.date_of_birth),
            opt_text(student.gender.map(|g| g.as_str())),
            opt_text(student.blood_group.as_deref()),
            opt_text(student.address.as_deref()),
            opt_date(student.admission_date),
        ])
        .build(SqliteQueryBuilder)
}

fn select_students() -> SelectStatement {
    Query::select()
        .columns(STUDENT_COLUMNS.map(|c| (Students::Table, c)))
        .from(Students::Table)
        .to_owned()
}

pub fn get_student(id: Uuid) -> Built {
    select_students()
        .and_where(Expr::col((Students::Table, Students::Id)).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn student_by_user(user_id: Uuid) -> Built {
    select_students()
        .and_where(Expr::col((Students::Table, Students::UserId)).eq(user_id.to_string()))
        .build(SqliteQueryBuilder)
}

/// Students of one class ordered by roll number.
pub fn students_in_class(class_id: Uuid, active_only: bool) -> Built {
    let mut q = select_students();
    q.and_where(Expr::col((Students::Table, Students::ClassId)).eq(class_id.to_string()));
    if active_only {
        q.and_where(Expr::col((Students::Table, Students::IsActive)).eq(true));
    }
    q.order_by((Students::Table, Students::RollNumber), Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn set_student_active(id: Uuid, active: bool) -> Built {
    Query::update()
        .table(Students::Table)
        .value(Students::IsActive, active)
        .value(Students::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Students::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

// ── Parents ────────────────────────────────────────────────────────────────

pub fn insert_parent(id: Uuid, parent: &NewParent) -> Built {
    Query::insert()
        .into_table(Parents::Table)
        .columns([
            Parents::Id,
            Parents::UserId,
            Parents::SchoolId,
            Parents::RelationshipType,
            Parents::Occupation,
        ])
        .values_panic([
            uuid(id),
            uuid(parent.user_id),
            uuid(parent.school_id),
            parent.relationship_type.as_str().into(),
            opt_text(parent.occupation.as_deref()),
        ])
        .build(SqliteQueryBuilder)
}

fn select_parents() -> SelectStatement {
    Query::select()
        .columns(PARENT_COLUMNS.map(|c| (Parents::Table, c)))
        .from(Parents::Table)
        .to_owned()
}

pub fn get_parent(id: Uuid) -> Built {
    select_parents()
        .and_where(Expr::col((Parents::Table, Parents::Id)).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn parent_by_user(user_id: Uuid) -> Built {
    select_parents()
        .and_where(Expr::col((Parents::Table, Parents::UserId)).eq(user_id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn link_parent(student_id: Uuid, parent_id: Uuid, is_primary: bool) -> Built {
    Query::insert()
        .into_table(StudentParents::Table)
        .columns([
            StudentParents::StudentId,
            StudentParents::ParentId,
            StudentParents::IsPrimary,
        ])
        .values_panic([uuid(student_id), uuid(parent_id), is_primary.into()])
        .build(SqliteQueryBuilder)
}

pub fn unlink_parent(student_id: Uuid, parent_id: Uuid) -> Built {
    Query::delete()
        .from_table(StudentParents::Table)
        .and_where(Expr::col(StudentParents::StudentId).eq(student_id.to_string()))
        .and_where(Expr::col(StudentParents::ParentId).eq(parent_id.to_string()))
        .build(SqliteQueryBuilder)
}

/// Parents of a student, primary contact first.
pub fn parents_of_student(student_id: Uuid) -> Built {
    select_parents()
        .inner_join(
            StudentParents::Table,
            Expr::col((StudentParents::Table, StudentParents::ParentId))
                .equals((Parents::Table, Parents::Id)),
        )
        .and_where(
            Expr::col((StudentParents::Table, StudentParents::StudentId))
                .eq(student_id.to_string()),
        )
        .order_by((StudentParents::Table, StudentParents::IsPrimary), Order::Desc)
        .order_by((Parents::Table, Parents::CreatedAt), Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn children_of_parent(parent_id: Uuid) -> Built {
    select_students()
        .inner_join(
            StudentParents::Table,
            Expr::col((StudentParents::Table, StudentParents::StudentId))
                .equals((Students::Table, Students::Id)),
        )
        .and_where(
            Expr::col((StudentParents::Table, StudentParents::ParentId)).eq(parent_id.to_string()),
        )
        .order_by((Students::Table, Students::RollNumber), Order::Asc)
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_queries_go_through_link_table() {
        let (sql, _) = parents_of_student(Uuid::nil());
        assert!(sql.contains(r#"INNER JOIN "student_parents""#));
        assert!(sql.contains(r#""student_parents"."is_primary" DESC"#));

        let (sql, _) = children_of_parent(Uuid::nil());
        assert!(sql.contains(r#""student_parents"."parent_id" = ?"#));
    }
}

use sea_query::{Index, IndexCreateStatement};

use super::SchemaChange;
use crate::db::tables::{Attendance, Complaints, Events, Inquiries, StudentFees, Students, Users};

fn lookup_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_users_school_role")
            .table(Users::Table)
            .col(Users::SchoolId)
            .col(Users::Role)
            .to_owned(),
        Index::create()
            .name("idx_students_school_class")
            .table(Students::Table)
            .col(Students::SchoolId)
            .col(Students::ClassId)
            .to_owned(),
        Index::create()
            .name("idx_attendance_class_date")
            .table(Attendance::Table)
            .col(Attendance::ClassId)
            .col(Attendance::Date)
            .to_owned(),
        Index::create()
            .name("idx_student_fees_status_due")
            .table(StudentFees::Table)
            .col(StudentFees::Status)
            .col(StudentFees::DueDate)
            .to_owned(),
        Index::create()
            .name("idx_complaints_school_status")
            .table(Complaints::Table)
            .col(Complaints::SchoolId)
            .col(Complaints::Status)
            .to_owned(),
        Index::create()
            .name("idx_events_school_start")
            .table(Events::Table)
            .col(Events::SchoolId)
            .col(Events::StartDate)
            .to_owned(),
        Index::create()
            .name("idx_inquiries_status")
            .table(Inquiries::Table)
            .col(Inquiries::Status)
            .to_owned(),
    ]
}

/// Indexes some deployments already created by hand; replays are no-ops.
pub fn up() -> Vec<SchemaChange> {
    lookup_indexes()
        .into_iter()
        .map(|stmt| SchemaChange::CreateIndex {
            stmt,
            tolerate_existing: true,
        })
        .collect()
}

pub fn down() -> Vec<SchemaChange> {
    let drops = [
        Index::drop().name("idx_inquiries_status").table(Inquiries::Table).to_owned(),
        Index::drop().name("idx_events_school_start").table(Events::Table).to_owned(),
        Index::drop().name("idx_complaints_school_status").table(Complaints::Table).to_owned(),
        Index::drop().name("idx_student_fees_status_due").table(StudentFees::Table).to_owned(),
        Index::drop().name("idx_attendance_class_date").table(Attendance::Table).to_owned(),
        Index::drop().name("idx_students_school_class").table(Students::Table).to_owned(),
        Index::drop().name("idx_users_school_role").table(Users::Table).to_owned(),
    ];
    drops.into_iter().map(SchemaChange::DropIndex).collect()
}

use schoolbase_core::{AttendanceStatus, MAX_PERIOD};
use sea_query::{ColumnDef, Expr, ForeignKeyAction, Index, Table};

use super::{SchemaChange, enum_col, foreign_key, stamp, uuid_pk, uuid_ref, uuid_ref_null};
use crate::db::tables::{Attendance, Classes, Schools, Students, Users};

pub fn up() -> Vec<SchemaChange> {
    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Attendance::Table)
            .col(uuid_pk(Attendance::Id))
            .col(uuid_ref(Attendance::SchoolId))
            .col(uuid_ref(Attendance::StudentId))
            .col(uuid_ref(Attendance::ClassId))
            .col(ColumnDef::new(Attendance::Date).date().not_null())
            // 0 records the whole day, 1.. a timetable period.
            .col(
                ColumnDef::new(Attendance::Period)
                    .integer()
                    .not_null()
                    .default(0)
                    .check(Expr::col(Attendance::Period).between(0, MAX_PERIOD)),
            )
            .col(enum_col(
                Attendance::Status,
                AttendanceStatus::ALL.iter().map(|s| s.as_str()),
            ))
            .col(uuid_ref_null(Attendance::MarkedBy))
            .col(ColumnDef::new(Attendance::Remarks).text().null())
            .col(stamp(Attendance::CreatedAt))
            .col(stamp(Attendance::UpdatedAt))
            .index(
                Index::create()
                    .name("uq_attendance_student_class_date_period")
                    .col(Attendance::StudentId)
                    .col(Attendance::ClassId)
                    .col(Attendance::Date)
                    .col(Attendance::Period)
                    .unique(),
            )
            .foreign_key(&mut foreign_key(
                "fk_attendance_school_id",
                Attendance::Table,
                Attendance::SchoolId,
                Schools::Table,
                Schools::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_attendance_student_id",
                Attendance::Table,
                Attendance::StudentId,
                Students::Table,
                Students::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_attendance_class_id",
                Attendance::Table,
                Attendance::ClassId,
                Classes::Table,
                Classes::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_attendance_marked_by",
                Attendance::Table,
                Attendance::MarkedBy,
                Users::Table,
                Users::Id,
                ForeignKeyAction::SetNull,
            ))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Attendance::Table).to_owned(),
    )]
}

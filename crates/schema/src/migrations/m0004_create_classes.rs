use schoolbase_core::validate::MAX_CLASS_CAPACITY;
use sea_query::{ColumnDef, Expr, ForeignKeyAction, Index, Table};

use super::{
    SchemaChange, flag, foreign_key, stamp, text_col, text_col_null, uuid_pk, uuid_ref,
    uuid_ref_null,
};
use crate::db::tables::{Classes, Schools, Users};

pub fn up() -> Vec<SchemaChange> {
    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Classes::Table)
            .col(uuid_pk(Classes::Id))
            .col(uuid_ref(Classes::SchoolId))
            .col(text_col(Classes::Grade, 20))
            .col(text_col(Classes::Section, 10))
            .col(uuid_ref_null(Classes::ClassTeacherId))
            .col(text_col_null(Classes::AcademicYear, 20))
            .col(text_col_null(Classes::RoomNumber, 20))
            .col(
                ColumnDef::new(Classes::Capacity)
                    .integer()
                    .not_null()
                    .default(40)
                    .check(Expr::col(Classes::Capacity).between(1, MAX_CLASS_CAPACITY)),
            )
            .col(ColumnDef::new(Classes::Timetable).json().null())
            .col(flag(Classes::IsActive, true))
            .col(stamp(Classes::CreatedAt))
            .col(stamp(Classes::UpdatedAt))
            .index(
                Index::create()
                    .name("uq_classes_school_grade_section")
                    .col(Classes::SchoolId)
                    .col(Classes::Grade)
                    .col(Classes::Section)
                    .unique(),
            )
            .foreign_key(&mut foreign_key(
                "fk_classes_school_id",
                Classes::Table,
                Classes::SchoolId,
                Schools::Table,
                Schools::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_classes_class_teacher_id",
                Classes::Table,
                Classes::ClassTeacherId,
                Users::Table,
                Users::Id,
                ForeignKeyAction::SetNull,
            ))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Classes::Table).to_owned(),
    )]
}

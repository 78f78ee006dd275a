use sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

use super::{SchemaChange, flag, foreign_key, stamp, text_col, uuid_pk, uuid_ref, uuid_ref_null};
use crate::db::tables::{Classes, Schools, Subjects, Users};

pub fn up() -> Vec<SchemaChange> {
    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Subjects::Table)
            .col(uuid_pk(Subjects::Id))
            .col(uuid_ref(Subjects::SchoolId))
            .col(text_col(Subjects::Name, 100))
            .col(text_col(Subjects::Code, 20))
            .col(ColumnDef::new(Subjects::Description).text().null())
            .col(uuid_ref_null(Subjects::ClassId))
            .col(uuid_ref_null(Subjects::TeacherId))
            .col(flag(Subjects::IsActive, true))
            .col(stamp(Subjects::CreatedAt))
            .col(stamp(Subjects::UpdatedAt))
            .index(
                Index::create()
                    .name("uq_subjects_school_code")
                    .col(Subjects::SchoolId)
                    .col(Subjects::Code)
                    .unique(),
            )
            .foreign_key(&mut foreign_key(
                "fk_subjects_school_id",
                Subjects::Table,
                Subjects::SchoolId,
                Schools::Table,
                Schools::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_subjects_class_id",
                Subjects::Table,
                Subjects::ClassId,
                Classes::Table,
                Classes::Id,
                ForeignKeyAction::SetNull,
            ))
            .foreign_key(&mut foreign_key(
                "fk_subjects_teacher_id",
                Subjects::Table,
                Subjects::TeacherId,
                Users::Table,
                Users::Id,
                ForeignKeyAction::SetNull,
            ))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Subjects::Table).to_owned(),
    )]
}

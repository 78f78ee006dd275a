use schoolbase_core::Gender;
use sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

use super::{
    SchemaChange, enum_col_null, flag, foreign_key, stamp, text_col, text_col_null, uuid_pk,
    uuid_ref,
};
use crate::db::tables::{Classes, Schools, Students, Users};

pub fn up() -> Vec<SchemaChange> {
    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Students::Table)
            .col(uuid_pk(Students::Id))
            .col(uuid_ref(Students::UserId).unique_key())
            .col(uuid_ref(Students::SchoolId))
            .col(uuid_ref(Students::ClassId))
            .col(text_col(Students::RollNumber, 20))
            .col(text_col(Students::AdmissionNumber, 50))
            .col(ColumnDef::new(Students::DateOfBirth).date().null())
            .col(enum_col_null(Students::Gender, Gender::ALL.iter().map(|g| g.as_str())))
            .col(text_col_null(Students::BloodGroup, 5))
            .col(ColumnDef::new(Students::Address).text().null())
            .col(ColumnDef::new(Students::AdmissionDate).date().null())
            .col(flag(Students::IsActive, true))
            .col(stamp(Students::CreatedAt))
            .col(stamp(Students::UpdatedAt))
            .index(
                Index::create()
                    .name("uq_students_class_roll_number")
                    .col(Students::ClassId)
                    .col(Students::RollNumber)
                    .unique(),
            )
            .index(
                Index::create()
                    .name("uq_students_school_admission_number")
                    .col(Students::SchoolId)
                    .col(Students::AdmissionNumber)
                    .unique(),
            )
            .foreign_key(&mut foreign_key(
                "fk_students_user_id",
                Students::Table,
                Students::UserId,
                Users::Table,
                Users::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_students_school_id",
                Students::Table,
                Students::SchoolId,
                Schools::Table,
                Schools::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_students_class_id",
                Students::Table,
                Students::ClassId,
                Classes::Table,
                Classes::Id,
                ForeignKeyAction::Cascade,
            ))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Students::Table).to_owned(),
    )]
}

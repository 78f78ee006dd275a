use schoolbase_core::RelationshipType;
use sea_query::{ForeignKeyAction, Index, Table};

use super::{
    SchemaChange, enum_col, flag, foreign_key, stamp, text_col_null, uuid_pk, uuid_ref,
};
use crate::db::tables::{Parents, Schools, StudentParents, Students, Users};

pub fn up() -> Vec<SchemaChange> {
    vec![
        SchemaChange::CreateTable(
            Table::create()
                .table(Parents::Table)
                .col(uuid_pk(Parents::Id))
                .col(uuid_ref(Parents::UserId).unique_key())
                .col(uuid_ref(Parents::SchoolId))
                .col(
                    enum_col(
                        Parents::RelationshipType,
                        RelationshipType::ALL.iter().map(|r| r.as_str()),
                    )
                    .default(RelationshipType::Guardian.as_str()),
                )
                .col(text_col_null(Parents::Occupation, 100))
                .col(flag(Parents::IsActive, true))
                .col(stamp(Parents::CreatedAt))
                .col(stamp(Parents::UpdatedAt))
                .foreign_key(&mut foreign_key(
                    "fk_parents_user_id",
                    Parents::Table,
                    Parents::UserId,
                    Users::Table,
                    Users::Id,
                    ForeignKeyAction::Cascade,
                ))
                .foreign_key(&mut foreign_key(
                    "fk_parents_school_id",
                    Parents::Table,
                    Parents::SchoolId,
                    Schools::Table,
                    Schools::Id,
                    ForeignKeyAction::Cascade,
                ))
                .to_owned(),
        ),
        SchemaChange::CreateTable(
            Table::create()
                .table(StudentParents::Table)
                .col(uuid_ref(StudentParents::StudentId))
                .col(uuid_ref(StudentParents::ParentId))
                .col(flag(StudentParents::IsPrimary, false))
                .col(stamp(StudentParents::CreatedAt))
                .primary_key(
                    Index::create()
                        .col(StudentParents::StudentId)
                        .col(StudentParents::ParentId),
                )
                .foreign_key(&mut foreign_key(
                    "fk_student_parents_student_id",
                    StudentParents::Table,
                    StudentParents::StudentId,
                    Students::Table,
                    Students::Id,
                    ForeignKeyAction::Cascade,
                ))
                .foreign_key(&mut foreign_key(
                    "fk_student_parents_parent_id",
                    StudentParents::Table,
                    StudentParents::ParentId,
                    Parents::Table,
                    Parents::Id,
                    ForeignKeyAction::Cascade,
                ))
                .to_owned(),
        ),
    ]
}

pub fn down() -> Vec<SchemaChange> {
    vec![
        SchemaChange::DropTable(Table::drop().table(StudentParents::Table).to_owned()),
        SchemaChange::DropTable(Table::drop().table(Parents::Table).to_owned()),
    ]
}

use sea_query::{ColumnDef, Expr, ForeignKeyAction, Index, Table};

use super::{
    SchemaChange, flag, foreign_key, stamp, text_col, text_col_null, uuid_pk, uuid_ref,
};
use crate::db::tables::{Schools, Teachers, Users};

pub fn up() -> Vec<SchemaChange> {
    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Teachers::Table)
            .col(uuid_pk(Teachers::Id))
            .col(uuid_ref(Teachers::UserId).unique_key())
            .col(uuid_ref(Teachers::SchoolId))
            .col(text_col(Teachers::EmployeeId, 50))
            .col(text_col_null(Teachers::Qualification, 200))
            .col(text_col_null(Teachers::Specialization, 200))
            .col(
                ColumnDef::new(Teachers::ExperienceYears)
                    .integer()
                    .not_null()
                    .default(0)
                    .check(Expr::col(Teachers::ExperienceYears).gte(0)),
            )
            .col(ColumnDef::new(Teachers::JoiningDate).date().null())
            .col(flag(Teachers::IsActive, true))
            .col(stamp(Teachers::CreatedAt))
            .col(stamp(Teachers::UpdatedAt))
            .index(
                Index::create()
                    .name("uq_teachers_school_employee_id")
                    .col(Teachers::SchoolId)
                    .col(Teachers::EmployeeId)
                    .unique(),
            )
            .foreign_key(&mut foreign_key(
                "fk_teachers_user_id",
                Teachers::Table,
                Teachers::UserId,
                Users::Table,
                Users::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_teachers_school_id",
                Teachers::Table,
                Teachers::SchoolId,
                Schools::Table,
                Schools::Id,
                ForeignKeyAction::Cascade,
            ))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Teachers::Table).to_owned(),
    )]
}

use schoolbase_core::UserRole;
use sea_query::{ColumnDef, Expr, ForeignKeyAction, Table};

use super::{
    SchemaChange, enum_col, flag, foreign_key, stamp, stamp_null, text_col, text_col_null,
    uuid_pk, uuid_ref_null,
};
use crate::db::tables::{Schools, Users};

pub fn up() -> Vec<SchemaChange> {
    let super_admin = UserRole::SuperAdmin.as_str();
    // Only the platform super admin lives outside a school.
    let tenancy = Expr::col(Users::Role)
        .eq(super_admin)
        .and(Expr::col(Users::SchoolId).is_null())
        .or(Expr::col(Users::Role)
            .ne(super_admin)
            .and(Expr::col(Users::SchoolId).is_not_null()));

    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Users::Table)
            .col(uuid_pk(Users::Id))
            .col(text_col(Users::Email, 255).unique_key())
            .col(ColumnDef::new(Users::PasswordHash).text().not_null())
            .col(ColumnDef::new(Users::PasswordSalt).text().not_null())
            .col(text_col(Users::FirstName, 100))
            .col(text_col(Users::LastName, 100))
            .col(text_col_null(Users::Phone, 20))
            .col(enum_col(Users::Role, UserRole::ALL.iter().map(|r| r.as_str())))
            .col(uuid_ref_null(Users::SchoolId))
            .col(flag(Users::IsActive, true))
            .col(stamp_null(Users::LastLoginAt))
            .col(stamp(Users::CreatedAt))
            .col(stamp(Users::UpdatedAt))
            .check(tenancy)
            .foreign_key(&mut foreign_key(
                "fk_users_school_id",
                Users::Table,
                Users::SchoolId,
                Schools::Table,
                Schools::Id,
                ForeignKeyAction::Cascade,
            ))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Users::Table).to_owned(),
    )]
}

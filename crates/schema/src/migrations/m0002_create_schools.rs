use sea_query::{ForeignKeyAction, Table};

use super::{SchemaChange, flag, foreign_key, stamp, text_col, text_col_null, uuid_pk, uuid_ref_null};
use crate::db::tables::{Schools, Subscriptions};

pub fn up() -> Vec<SchemaChange> {
    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Schools::Table)
            .col(uuid_pk(Schools::Id))
            .col(text_col(Schools::Name, 200))
            .col(text_col(Schools::Email, 255).unique_key())
            .col(text_col_null(Schools::Phone, 20))
            .col(text_col_null(Schools::Address, 500))
            .col(text_col_null(Schools::City, 100))
            .col(text_col_null(Schools::State, 100))
            .col(text_col_null(Schools::Website, 255))
            .col(uuid_ref_null(Schools::SubscriptionId))
            .col(flag(Schools::IsActive, true))
            .col(stamp(Schools::CreatedAt))
            .col(stamp(Schools::UpdatedAt))
            .foreign_key(&mut foreign_key(
                "fk_schools_subscription_id",
                Schools::Table,
                Schools::SubscriptionId,
                Subscriptions::Table,
                Subscriptions::Id,
                ForeignKeyAction::SetNull,
            ))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Schools::Table).to_owned(),
    )]
}

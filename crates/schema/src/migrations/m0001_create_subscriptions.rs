use schoolbase_core::{BillingCycle, PlanType};
use sea_query::{ColumnDef, Expr, Table};

use super::{SchemaChange, enum_col, flag, stamp, text_col, uuid_pk};
use crate::db::tables::Subscriptions;

pub fn up() -> Vec<SchemaChange> {
    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Subscriptions::Table)
            .col(uuid_pk(Subscriptions::Id))
            .col(text_col(Subscriptions::Name, 100).unique_key())
            .col(enum_col(
                Subscriptions::PlanType,
                PlanType::ALL.iter().map(|p| p.as_str()),
            ))
            .col(
                ColumnDef::new(Subscriptions::Price)
                    .big_integer()
                    .not_null()
                    .default(0)
                    .check(Expr::col(Subscriptions::Price).gte(0)),
            )
            .col(
                enum_col(
                    Subscriptions::BillingCycle,
                    BillingCycle::ALL.iter().map(|c| c.as_str()),
                )
                .default(BillingCycle::Monthly.as_str()),
            )
            .col(limit(Subscriptions::MaxStudents))
            .col(limit(Subscriptions::MaxTeachers))
            .col(limit(Subscriptions::MaxClasses))
            .col(
                ColumnDef::new(Subscriptions::Features)
                    .json()
                    .not_null()
                    .default("{}"),
            )
            .col(flag(Subscriptions::IsActive, true))
            .col(stamp(Subscriptions::CreatedAt))
            .col(stamp(Subscriptions::UpdatedAt))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Subscriptions::Table).to_owned(),
    )]
}

fn limit(column: Subscriptions) -> ColumnDef {
    ColumnDef::new(column)
        .integer()
        .not_null()
        .check(Expr::col(column).gte(0))
        .to_owned()
}

use schoolbase_core::{EventType, TargetAudience};
use sea_query::{ColumnDef, Expr, ForeignKeyAction, Table};

use super::{
    SchemaChange, enum_col, flag, foreign_key, stamp, stamp_null, text_col, text_col_null,
    uuid_pk, uuid_ref, uuid_ref_null,
};
use crate::db::tables::{Classes, Events, Schools, Users};

pub fn up() -> Vec<SchemaChange> {
    let ordered = Expr::col(Events::EndDate)
        .is_null()
        .or(Expr::col(Events::EndDate).gte(Expr::col(Events::StartDate)));

    vec![SchemaChange::CreateTable(
        Table::create()
            .table(Events::Table)
            .col(uuid_pk(Events::Id))
            .col(uuid_ref(Events::SchoolId))
            .col(uuid_ref_null(Events::ClassId))
            .col(uuid_ref_null(Events::CreatedBy))
            .col(text_col(Events::Title, 200))
            .col(ColumnDef::new(Events::Description).text().null())
            .col(enum_col(Events::EventType, EventType::ALL.iter().map(|e| e.as_str())))
            .col(
                enum_col(
                    Events::TargetAudience,
                    TargetAudience::ALL.iter().map(|a| a.as_str()),
                )
                .default(TargetAudience::All.as_str()),
            )
            .col(
                ColumnDef::new(Events::StartDate)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(stamp_null(Events::EndDate))
            .col(text_col_null(Events::Location, 200))
            .col(flag(Events::IsPublished, false))
            .col(stamp(Events::CreatedAt))
            .col(stamp(Events::UpdatedAt))
            .check(ordered)
            .foreign_key(&mut foreign_key(
                "fk_events_school_id",
                Events::Table,
                Events::SchoolId,
                Schools::Table,
                Schools::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_events_class_id",
                Events::Table,
                Events::ClassId,
                Classes::Table,
                Classes::Id,
                ForeignKeyAction::Cascade,
            ))
            .foreign_key(&mut foreign_key(
                "fk_events_created_by",
                Events::Table,
                Events::CreatedBy,
                Users::Table,
                Users::Id,
                ForeignKeyAction::SetNull,
            ))
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::DropTable(
        Table::drop().table(Events::Table).to_owned(),
    )]
}

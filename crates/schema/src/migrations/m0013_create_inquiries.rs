use schoolbase_core::InquiryStatus;
use sea_query::{ColumnDef, Expr, Table};

use super::{SchemaChange, enum_col, stamp, stamp_null, text_col, text_col_null};
use crate::db::tables::{ContactMessages, Inquiries};

pub fn up() -> Vec<SchemaChange> {
    vec![
        SchemaChange::CreateTable(
            Table::create()
                .table(Inquiries::Table)
                .col(
                    ColumnDef::new(Inquiries::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(text_col(Inquiries::SchoolName, 200))
                .col(text_col(Inquiries::ContactName, 100))
                .col(text_col(Inquiries::Email, 255))
                .col(text_col_null(Inquiries::Phone, 20))
                .col(text_col_null(Inquiries::City, 100))
                .col(
                    ColumnDef::new(Inquiries::StudentCount)
                        .integer()
                        .null()
                        .check(Expr::col(Inquiries::StudentCount).gte(0)),
                )
                .col(ColumnDef::new(Inquiries::Message).text().null())
                .col(
                    enum_col(Inquiries::Status, InquiryStatus::ALL.iter().map(|s| s.as_str()))
                        .default(InquiryStatus::Pending.as_str()),
                )
                .col(ColumnDef::new(Inquiries::Notes).text().null())
                .col(stamp_null(Inquiries::DemoScheduledAt))
                .col(stamp(Inquiries::CreatedAt))
                .col(stamp(Inquiries::UpdatedAt))
                .to_owned(),
        ),
        SchemaChange::CreateTable(
            Table::create()
                .table(ContactMessages::Table)
                .col(
                    ColumnDef::new(ContactMessages::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(text_col(ContactMessages::Name, 100))
                .col(text_col(ContactMessages::Email, 255))
                .col(text_col_null(ContactMessages::Phone, 20))
                .col(text_col_null(ContactMessages::Subject, 200))
                .col(ColumnDef::new(ContactMessages::Message).text().not_null())
                .col(stamp(ContactMessages::CreatedAt))
                .to_owned(),
        ),
    ]
}

pub fn down() -> Vec<SchemaChange> {
    vec![
        SchemaChange::DropTable(Table::drop().table(ContactMessages::Table).to_owned()),
        SchemaChange::DropTable(Table::drop().table(Inquiries::Table).to_owned()),
    ]
}

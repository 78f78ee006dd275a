use schoolbase_core::{FeeStatus, FeeType, PaymentMethod};
use sea_query::{ColumnDef, Expr, ForeignKeyAction, Index, Table};

use super::{
    SchemaChange, enum_col, enum_col_null, flag, foreign_key, non_negative, stamp, stamp_null,
    text_col, text_col_null, uuid_pk, uuid_ref, uuid_ref_null,
};
use crate::db::tables::{Classes, Fees, Schools, StudentFees, Students};

pub fn up() -> Vec<SchemaChange> {
    vec![
        SchemaChange::CreateTable(
            Table::create()
                .table(Fees::Table)
                .col(uuid_pk(Fees::Id))
                .col(uuid_ref(Fees::SchoolId))
                .col(uuid_ref_null(Fees::ClassId))
                .col(text_col(Fees::Name, 100))
                .col(enum_col(Fees::FeeType, FeeType::ALL.iter().map(|f| f.as_str())))
                .col(
                    ColumnDef::new(Fees::Amount)
                        .big_integer()
                        .not_null()
                        .check(Expr::col(Fees::Amount).gte(0)),
                )
                .col(ColumnDef::new(Fees::DueDate).date().not_null())
                .col(text_col_null(Fees::AcademicYear, 20))
                .col(ColumnDef::new(Fees::Description).text().null())
                .col(flag(Fees::IsActive, true))
                .col(stamp(Fees::CreatedAt))
                .col(stamp(Fees::UpdatedAt))
                .foreign_key(&mut foreign_key(
                    "fk_fees_school_id",
                    Fees::Table,
                    Fees::SchoolId,
                    Schools::Table,
                    Schools::Id,
                    ForeignKeyAction::Cascade,
                ))
                .foreign_key(&mut foreign_key(
                    "fk_fees_class_id",
                    Fees::Table,
                    Fees::ClassId,
                    Classes::Table,
                    Classes::Id,
                    ForeignKeyAction::SetNull,
                ))
                .to_owned(),
        ),
        SchemaChange::CreateTable(
            Table::create()
                .table(StudentFees::Table)
                .col(uuid_pk(StudentFees::Id))
                .col(uuid_ref(StudentFees::FeeId))
                .col(uuid_ref(StudentFees::StudentId))
                .col(non_negative(StudentFees::Amount))
                .col(non_negative(StudentFees::PaidAmount))
                .col(
                    enum_col(StudentFees::Status, FeeStatus::ALL.iter().map(|s| s.as_str()))
                        .default(FeeStatus::Pending.as_str()),
                )
                .col(ColumnDef::new(StudentFees::DueDate).date().not_null())
                .col(stamp_null(StudentFees::PaidAt))
                .col(enum_col_null(
                    StudentFees::PaymentMethod,
                    PaymentMethod::ALL.iter().map(|m| m.as_str()),
                ))
                .col(text_col_null(StudentFees::TransactionRef, 100))
                .col(ColumnDef::new(StudentFees::Remarks).text().null())
                .col(stamp(StudentFees::CreatedAt))
                .col(stamp(StudentFees::UpdatedAt))
                .index(
                    Index::create()
                        .name("uq_student_fees_fee_student")
                        .col(StudentFees::FeeId)
                        .col(StudentFees::StudentId)
                        .unique(),
                )
                .foreign_key(&mut foreign_key(
                    "fk_student_fees_fee_id",
                    StudentFees::Table,
                    StudentFees::FeeId,
                    Fees::Table,
                    Fees::Id,
                    ForeignKeyAction::Cascade,
                ))
                .foreign_key(&mut foreign_key(
                    "fk_student_fees_student_id",
                    StudentFees::Table,
                    StudentFees::StudentId,
                    Students::Table,
                    Students::Id,
                    ForeignKeyAction::Cascade,
                ))
                .to_owned(),
        ),
    ]
}

pub fn down() -> Vec<SchemaChange> {
    vec![
        SchemaChange::DropTable(Table::drop().table(StudentFees::Table).to_owned()),
        SchemaChange::DropTable(Table::drop().table(Fees::Table).to_owned()),
    ]
}

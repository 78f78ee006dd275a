use sea_query::{ColumnDef, Table};

use super::SchemaChange;
use crate::db::tables::StudentFees;

const DROP_COLUMN: &str = r#"ALTER TABLE "student_fees" DROP COLUMN "scholarship_details""#;

pub fn up() -> Vec<SchemaChange> {
    vec![SchemaChange::AlterTable(
        Table::alter()
            .table(StudentFees::Table)
            .add_column(ColumnDef::new(StudentFees::ScholarshipDetails).json().null())
            .to_owned(),
    )]
}

pub fn down() -> Vec<SchemaChange> {
    vec![SchemaChange::Raw {
        sqlite: DROP_COLUMN,
        postgres: DROP_COLUMN,
    }]
}
